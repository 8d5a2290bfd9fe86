use super::{
    GridConfig, GridPoint, Layout, Placement, ProportionalConfig, main_row_y, symbol_dimensions,
};
use crate::dates::duration_days;
use crate::schema::TimelineNode;
use tracing::debug;

/// Alternatives sit this fraction of the minimum gap right of their parent.
const ALTERNATIVE_OFFSET: f64 = 0.6;

/// Packs main nodes left to right, widening long readings and committee
/// work by `pixels_per_day`.
///
/// Each node starts at least `min_gap` after the right edge of the previous
/// one, so main nodes never overlap however skewed the durations are.
pub fn layout_proportional(
    nodes: &[TimelineNode],
    grid: &GridConfig,
    config: &ProportionalConfig,
    include_alternatives: bool,
) -> Layout {
    if nodes.is_empty() {
        return Layout::default();
    }

    let mut placement = Placement::default();
    let center_y = main_row_y(grid);
    let mut right_edge = grid.padding;

    for (index, node) in nodes.iter().enumerate() {
        let days = duration_days(&node.date_start, &node.date_end);
        let mut size = symbol_dimensions(node.shape, grid.symbol_size, days, true);
        if node.shape.is_stretchable() && days > 1 {
            size.width = size.width.max(f64::from(days) * config.pixels_per_day);
        }

        let gap = if index == 0 { 0.0 } else { config.min_gap };
        let center_x = right_edge + gap + size.width / 2.0;
        let cell = GridPoint { col: index, row: 0 };
        let parent = placement.push(node, cell, (center_x, center_y), size);
        right_edge = center_x + size.width / 2.0;

        if include_alternatives {
            let alt_x = center_x + config.min_gap * ALTERNATIVE_OFFSET;
            placement.push_alternatives(parent, index + 1, alt_x, grid);
        }
    }
    placement.connect_main();

    let max_x = placement
        .nodes
        .iter()
        .map(|n| n.right())
        .fold(f64::NEG_INFINITY, f64::max);
    let total_width = max_x + grid.padding;
    let total_height = placement.total_height(grid);

    debug!(nodes = placement.nodes.len(), total_width, total_height, "proportional layout");
    Layout {
        nodes: placement.nodes,
        connectors: placement.connectors,
        total_width,
        total_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::node;
    use crate::schema::{SymbolShape, TimelineNode};

    fn place(nodes: &[TimelineNode], include_alternatives: bool) -> Layout {
        let config = ProportionalConfig::default();
        layout_proportional(nodes, &GridConfig::default(), &config, include_alternatives)
    }

    #[test]
    fn long_stages_stretch_and_keep_their_gap() {
        let nodes = vec![
            node("short", SymbolShape::Rectangle, "2024-03-01", "2024-03-02"),
            node("long", SymbolShape::RoundedRect, "2024-03-01", "2024-04-10"),
        ];
        let layout = place(&nodes, false);
        let (first, second) = (&layout.nodes[0], &layout.nodes[1]);
        assert_eq!(first.width, 56.0);
        assert_eq!(second.width, 320.0);
        assert_eq!(first.left(), 80.0);
        assert!(second.left() >= first.right() + 120.0 - 1e-9);
        assert_eq!(layout.total_width, second.right() + 80.0);
    }

    #[test]
    fn round_and_diamond_shapes_never_stretch() {
        let nodes = vec![
            node("vote", SymbolShape::Diamond, "2024-01-01", "2024-06-01"),
            node("end", SymbolShape::DoubleCircle, "2024-01-01", "2024-06-01"),
        ];
        let layout = place(&nodes, false);
        assert!((layout.nodes[0].width - 39.2).abs() < 1e-9);
        assert_eq!(layout.nodes[1].width, 56.0);
    }

    #[test]
    fn malformed_dates_fall_back_to_base_width() {
        let nodes = vec![node("odd", SymbolShape::Rectangle, "soon", "later")];
        let layout = place(&nodes, false);
        assert_eq!(layout.nodes[0].width, 56.0);
    }

    #[test]
    fn alternatives_follow_the_gap() {
        let mut parent = node("reading", SymbolShape::Rectangle, "2024-01-01", "2024-01-01");
        parent.alternatives = vec![node("alt", SymbolShape::CircleX, "", "")];
        let layout = place(&[parent], true);
        assert_eq!(layout.nodes.len(), 2);
        assert_eq!(layout.nodes[1].center_x, layout.nodes[0].center_x + 72.0);
        assert_eq!(layout.connectors.len(), 1);
        assert!(layout.connectors[0].is_alternative);
    }
}
