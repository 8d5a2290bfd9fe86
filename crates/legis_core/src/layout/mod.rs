//! Diagram layout for built timelines.
//!
//! Two placements share one output shape: [`layout_sequential`] puts every
//! main node in a fixed-pitch column, [`layout_proportional`] packs nodes
//! left to right and stretches long readings and committee work by their
//! duration. Both are pure; the renderer only converts the coordinates to
//! pixels.

mod geometry;
mod proportional;
mod sequential;

pub use geometry::{
    LabelBlock, NowLine, TimeAxis, connector_path, day_label_anchor, fit_scale, label_block,
    now_line, now_line_position, time_axis,
};
pub use proportional::layout_proportional;
pub use sequential::layout_sequential;

use crate::errors::ConfigError;
use crate::schema::{SymbolShape, TimelineNode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Space above the main row, between the padding and the symbols.
pub(crate) const HEADER_HEIGHT: f64 = 20.0;
/// Space below the last row reserved for label blocks.
pub(crate) const FOOTER_HEIGHT: f64 = 140.0;
/// Alternative branches are drawn slightly smaller than main nodes.
pub(crate) const ALTERNATIVE_SCALE: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub cell_size: f64,   // column pitch in sequential mode
    pub symbol_size: f64, // base size every symbol is derived from
    pub padding: f64,
    pub line_height: f64, // connector stroke width
    pub label_offset: f64,
    pub row_height: f64, // vertical pitch of alternative branches
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 140.0,
            symbol_size: 56.0,
            padding: 80.0,
            line_height: 3.0,
            label_offset: 16.0,
            row_height: 180.0,
        }
    }
}

impl GridConfig {
    /// Multiplies every spatial setting except the stroke width.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            cell_size: self.cell_size * factor,
            symbol_size: self.symbol_size * factor,
            padding: self.padding * factor,
            line_height: self.line_height,
            label_offset: self.label_offset * factor,
            row_height: self.row_height * factor,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cellSize", self.cell_size)?;
        positive("symbolSize", self.symbol_size)?;
        positive("rowHeight", self.row_height)?;
        non_negative("padding", self.padding)?;
        non_negative("labelOffset", self.label_offset)?;
        non_negative("lineHeight", self.line_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProportionalConfig {
    pub pixels_per_day: f64,
    pub min_gap: f64, // horizontal space kept free between neighbours
}

impl Default for ProportionalConfig {
    fn default() -> Self {
        Self {
            pixels_per_day: 8.0,
            min_gap: 120.0,
        }
    }
}

impl ProportionalConfig {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            pixels_per_day: self.pixels_per_day * factor,
            min_gap: self.min_gap * factor,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("pixelsPerDay", self.pixels_per_day)?;
        non_negative("minGap", self.min_gap)
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Sequential,
    Proportional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct GridPoint {
    pub col: usize,
    pub row: usize, // 0 is the main sequence
}

/// A timeline node with its absolute geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    #[serde(flatten)]
    pub node: TimelineNode,
    pub grid_position: GridPoint,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl DiagramNode {
    pub fn is_main(&self) -> bool {
        self.grid_position.row == 0
    }

    pub fn left(&self) -> f64 {
        self.center_x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.center_x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center_y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.center_y + self.height / 2.0
    }
}

/// Directed edge between two entries of [`Layout::nodes`], by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorLine {
    pub from: usize,
    pub to: usize,
    pub days_between: u32,
    pub is_alternative: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub nodes: Vec<DiagramNode>,
    pub connectors: Vec<ConnectorLine>,
    pub total_width: f64,
    pub total_height: f64,
}

impl Layout {
    pub fn main_nodes(&self) -> impl Iterator<Item = &DiagramNode> {
        self.nodes.iter().filter(|node| node.is_main())
    }

    pub fn max_row(&self) -> usize {
        self.nodes.iter().map(|node| node.grid_position.row).max().unwrap_or(0)
    }

    pub fn max_col(&self) -> usize {
        self.nodes.iter().map(|node| node.grid_position.col).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Box of a symbol drawn at `base_size`. In proportional mode readings and
/// committee work lasting more than a day grow with their duration.
pub fn symbol_dimensions(
    shape: SymbolShape,
    base_size: f64,
    duration_days: u32,
    proportional: bool,
) -> Dimensions {
    match shape {
        SymbolShape::Circle | SymbolShape::DoubleCircle | SymbolShape::CircleX => Dimensions {
            width: base_size,
            height: base_size,
        },
        SymbolShape::Rectangle | SymbolShape::RoundedRect => {
            let width = if proportional && duration_days > 1 {
                base_size.max(base_size * 0.7 + f64::from(duration_days) * 3.0)
            } else {
                base_size
            };
            Dimensions {
                width,
                height: base_size * 0.7,
            }
        }
        SymbolShape::Diamond => Dimensions {
            width: base_size * 0.7,
            height: base_size * 0.7,
        },
    }
}

/// Lays out `nodes` with the given mode.
pub fn layout(
    nodes: &[TimelineNode],
    mode: LayoutMode,
    grid: &GridConfig,
    proportional: &ProportionalConfig,
    include_alternatives: bool,
) -> Layout {
    match mode {
        LayoutMode::Sequential => layout_sequential(nodes, grid, include_alternatives),
        LayoutMode::Proportional => {
            layout_proportional(nodes, grid, proportional, include_alternatives)
        }
    }
}

/// Accumulates nodes and connectors for one layout pass.
#[derive(Default)]
struct Placement {
    nodes: Vec<DiagramNode>,
    connectors: Vec<ConnectorLine>,
}

impl Placement {
    fn push(
        &mut self,
        node: &TimelineNode,
        grid_position: GridPoint,
        center: (f64, f64),
        size: Dimensions,
    ) -> usize {
        self.nodes.push(DiagramNode {
            node: node.clone(),
            grid_position,
            center_x: center.0,
            center_y: center.1,
            width: size.width,
            height: size.height,
        });
        self.nodes.len() - 1
    }

    /// Hangs the alternatives of the node at `parent` below it, one row each.
    fn push_alternatives(
        &mut self,
        parent: usize,
        column: usize,
        center_x: f64,
        grid: &GridConfig,
    ) {
        let parent_y = self.nodes[parent].center_y;
        let alternatives = self.nodes[parent].node.alternatives.clone();
        for (index, alternative) in alternatives.iter().enumerate() {
            let row = index + 1;
            let base = grid.symbol_size * ALTERNATIVE_SCALE;
            let size = symbol_dimensions(alternative.shape, base, 1, false);
            let center_y = parent_y + grid.row_height * row as f64;
            let cell = GridPoint { col: column, row };
            let to = self.push(alternative, cell, (center_x, center_y), size);
            self.connectors.push(ConnectorLine {
                from: parent,
                to,
                days_between: 0,
                is_alternative: true,
            });
        }
    }

    /// Links consecutive main nodes, recording the gap between them in days.
    fn connect_main(&mut self) {
        let main: Vec<usize> = (0..self.nodes.len()).filter(|&i| self.nodes[i].is_main()).collect();
        for pair in main.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let (before, after) = (&self.nodes[from].node, &self.nodes[to].node);
            let days_between = crate::dates::days_between(&before.date_end, &after.date_start);
            self.connectors.push(ConnectorLine {
                from,
                to,
                days_between,
                is_alternative: false,
            });
        }
    }

    fn total_height(&self, grid: &GridConfig) -> f64 {
        let max_row = self.nodes.iter().map(|n| n.grid_position.row).max().unwrap_or(0);
        grid.padding * 2.0 + (max_row + 1) as f64 * grid.row_height + FOOTER_HEIGHT
    }
}

/// Vertical centre shared by all main nodes.
fn main_row_y(grid: &GridConfig) -> f64 {
    grid.padding + grid.symbol_size / 2.0 + HEADER_HEIGHT
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_dimensions() {
        let round = symbol_dimensions(SymbolShape::DoubleCircle, 56.0, 10, true);
        assert_eq!((round.width, round.height), (56.0, 56.0));
        let rect = symbol_dimensions(SymbolShape::Rectangle, 56.0, 1, false);
        assert_eq!(rect.width, 56.0);
        assert!((rect.height - 39.2).abs() < 1e-9);
        let diamond = symbol_dimensions(SymbolShape::Diamond, 56.0, 30, true);
        assert!((diamond.width - 39.2).abs() < 1e-9);
        assert_eq!(diamond.width, diamond.height);
    }

    #[test]
    fn stretch_only_in_proportional_mode() {
        let fixed = symbol_dimensions(SymbolShape::RoundedRect, 56.0, 40, false);
        assert_eq!(fixed.width, 56.0);
        let stretched = symbol_dimensions(SymbolShape::RoundedRect, 56.0, 40, true);
        assert!((stretched.width - (56.0 * 0.7 + 120.0)).abs() < 1e-9);
    }

    #[test]
    fn scaling_keeps_stroke_width() {
        let scaled = GridConfig::default().scaled(0.5);
        assert_eq!(scaled.cell_size, 70.0);
        assert_eq!(scaled.symbol_size, 28.0);
        assert_eq!(scaled.line_height, 3.0);
    }

    #[test]
    fn validation_rejects_degenerate_grid() {
        let grid = GridConfig {
            symbol_size: 0.0,
            ..GridConfig::default()
        };
        assert!(grid.validate().is_err());
        assert!(GridConfig::default().validate().is_ok());
        assert!(ProportionalConfig { min_gap: -1.0, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn dispatch_matches_direct_calls() {
        let nodes = vec![test_support::node("a", SymbolShape::Circle, "2024-01-01", "2024-01-01")];
        let grid = GridConfig::default();
        let prop = ProportionalConfig::default();
        assert_eq!(
            layout(&nodes, LayoutMode::Sequential, &grid, &prop, true),
            layout_sequential(&nodes, &grid, true)
        );
        assert_eq!(
            layout(&nodes, LayoutMode::Proportional, &grid, &prop, true),
            layout_proportional(&nodes, &grid, &prop, true)
        );
    }
}
