//! Derived drawing geometry: connector paths, labels, the time axis and the
//! "now" marker. Nothing here feeds back into node placement.

use super::{ConnectorLine, DiagramNode, GridConfig, Layout};
use crate::dates::days_between;
use crate::schema::StageStatus;
use glam::{DVec2, dvec2};

/// Offsets of the four label lines below `label_offset`.
const NAME_LINE: f64 = 12.0;
const INSTITUTION_LINE: f64 = 28.0;
const DURATION_LINE: f64 = 44.0;
const DATES_LINE: f64 = 58.0;

/// Room left after the last completed node when nothing follows it.
const NOW_LINE_TRAIL: f64 = 20.0;
const NOW_LINE_TOP: f64 = 40.0;

const AXIS_MARGIN: f64 = 30.0;

const FIT_SCALE_MIN: f64 = 0.4;
const FIT_SCALE_MAX: f64 = 1.5;

/// Polyline of a connector. Main connectors run edge to edge; alternative
/// ones drop from the parent's bottom and turn right into the branch.
pub fn connector_path(layout: &Layout, connector: &ConnectorLine) -> Option<Vec<DVec2>> {
    let from = layout.nodes.get(connector.from)?;
    let to = layout.nodes.get(connector.to)?;
    let path = if connector.is_alternative {
        vec![
            dvec2(from.center_x, from.bottom()),
            dvec2(from.center_x, to.center_y),
            dvec2(to.left(), to.center_y),
        ]
    } else {
        vec![dvec2(from.right(), from.center_y), dvec2(to.left(), to.center_y)]
    };
    Some(path)
}

/// Where the day-gap pill of a main connector goes; none for alternatives
/// and for same-day neighbours.
pub fn day_label_anchor(layout: &Layout, connector: &ConnectorLine) -> Option<DVec2> {
    if connector.is_alternative || connector.days_between == 0 {
        return None;
    }
    let path = connector_path(layout, connector)?;
    let (start, end) = (path.first()?, path.last()?);
    Some((*start + *end) / 2.0)
}

/// The text block under a node: short name, institution, duration, dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelBlock {
    pub x: f64,
    pub name_y: f64,
    pub institution_y: f64,
    pub duration_y: f64,
    pub dates_y: f64,
    /// Inclusive length of the node's date range.
    pub duration_days: u32,
}

pub fn label_block(node: &DiagramNode, grid: &GridConfig) -> LabelBlock {
    let top = node.bottom() + grid.label_offset;
    LabelBlock {
        x: node.center_x,
        name_y: top + NAME_LINE,
        institution_y: top + INSTITUTION_LINE,
        duration_y: top + DURATION_LINE,
        dates_y: top + DATES_LINE,
        duration_days: days_between(&node.node.date_start, &node.node.date_end) + 1,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub y: f64,
    pub start_x: f64,
    pub end_x: f64,
    pub ticks: Vec<f64>,
}

/// Axis under the diagram with one tick per main node.
pub fn time_axis(layout: &Layout, grid: &GridConfig, show_alternatives: bool) -> Option<TimeAxis> {
    let ticks: Vec<f64> = layout.main_nodes().map(|node| node.center_x).collect();
    let (first, last) = (*ticks.first()?, *ticks.last()?);
    Some(TimeAxis {
        y: rows_bottom(layout, grid, show_alternatives) + 100.0,
        start_x: first - AXIS_MARGIN,
        end_x: last + AXIS_MARGIN,
        ticks,
    })
}

/// Horizontal position of the "now" marker among the main nodes.
///
/// The current node's centre if there is one; else midway between the
/// last completed and the first future node; else just past the last
/// completed node.
pub fn now_line_position(nodes: &[DiagramNode]) -> Option<f64> {
    let main: Vec<&DiagramNode> = nodes.iter().filter(|node| node.is_main()).collect();
    if let Some(current) = main.iter().find(|node| node.node.status == StageStatus::Current) {
        return Some(current.center_x);
    }
    let last_completed = main
        .iter()
        .rev()
        .find(|node| node.node.status == StageStatus::Completed);
    let first_future = main.iter().find(|node| node.node.status == StageStatus::Future);
    match (last_completed, first_future) {
        (Some(done), Some(next)) => Some((done.right() + next.left()) / 2.0),
        (Some(done), None) => Some(done.right() + NOW_LINE_TRAIL),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NowLine {
    pub x: f64,
    pub top: f64,
    pub bottom: f64,
}

pub fn now_line(layout: &Layout, grid: &GridConfig, show_alternatives: bool) -> Option<NowLine> {
    let x = now_line_position(&layout.nodes)?;
    let height = rows_bottom(layout, grid, show_alternatives) + 120.0;
    Some(NowLine {
        x,
        top: NOW_LINE_TOP,
        bottom: height - 20.0,
    })
}

/// Scale that fits a layout of `layout_width` into `available_width`.
pub fn fit_scale(available_width: f64, layout_width: f64) -> f64 {
    if layout_width <= 0.0 || !available_width.is_finite() {
        return 1.0;
    }
    (available_width / layout_width).clamp(FIT_SCALE_MIN, FIT_SCALE_MAX)
}

/// Bottom of the lowest drawn symbol row, before the axis and label margins.
fn rows_bottom(layout: &Layout, grid: &GridConfig, show_alternatives: bool) -> f64 {
    let rows = if show_alternatives {
        layout.max_row() as f64
    } else {
        0.0
    };
    grid.padding + rows * grid.row_height + grid.symbol_size
}
