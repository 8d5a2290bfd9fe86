use super::{GridConfig, GridPoint, Layout, Placement, main_row_y, symbol_dimensions};
use crate::schema::TimelineNode;
use tracing::debug;

/// Alternatives sit half a cell to the right of their parent.
const ALTERNATIVE_OFFSET: f64 = 0.5;

/// One fixed-width column per main node, all on the same row.
pub fn layout_sequential(
    nodes: &[TimelineNode],
    grid: &GridConfig,
    include_alternatives: bool,
) -> Layout {
    if nodes.is_empty() {
        return Layout::default();
    }

    let mut placement = Placement::default();
    let center_y = main_row_y(grid);

    for (index, node) in nodes.iter().enumerate() {
        let size = symbol_dimensions(node.shape, grid.symbol_size, 1, false);
        let center_x = grid.padding + index as f64 * grid.cell_size + grid.cell_size / 2.0;
        let cell = GridPoint { col: index, row: 0 };
        let parent = placement.push(node, cell, (center_x, center_y), size);

        if include_alternatives {
            let alt_x = center_x + grid.cell_size * ALTERNATIVE_OFFSET;
            placement.push_alternatives(parent, index + 1, alt_x, grid);
        }
    }
    placement.connect_main();

    let max_col = placement.nodes.iter().map(|n| n.grid_position.col).max().unwrap_or(0);
    let total_width = grid.padding * 2.0 + (max_col + 1) as f64 * grid.cell_size;
    let total_height = placement.total_height(grid);

    debug!(nodes = placement.nodes.len(), total_width, total_height, "sequential layout");
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
    use crate::schema::{StageStatus, SymbolShape};

    fn timeline() -> Vec<TimelineNode> {
        let mut reading = node("reading", SymbolShape::Rectangle, "2024-01-10", "2024-01-10");
        let mut rejected = node("rejected", SymbolShape::CircleX, "", "");
        rejected.status = StageStatus::Alternative;
        reading.alternatives = vec![rejected];
        vec![
            node("start", SymbolShape::Circle, "2024-01-01", "2024-01-01"),
            reading,
            node("vote", SymbolShape::Diamond, "2024-02-20", "2024-02-21"),
        ]
    }

    #[test]
    fn empty_timeline_gives_empty_canvas() {
        let layout = layout_sequential(&[], &GridConfig::default(), true);
        assert!(layout.nodes.is_empty());
        assert_eq!((layout.total_width, layout.total_height), (0.0, 0.0));
    }

    #[test]
    fn columns_have_fixed_pitch() {
        let grid = GridConfig::default();
        let layout = layout_sequential(&timeline(), &grid, false);
        let xs: Vec<f64> = layout.nodes.iter().map(|n| n.center_x).collect();
        assert_eq!(xs, vec![150.0, 290.0, 430.0]);
        assert!(layout.nodes.iter().all(|n| n.center_y == 128.0));
        assert_eq!(layout.total_width, 80.0 * 2.0 + 3.0 * 140.0);
        assert_eq!(layout.total_height, 80.0 * 2.0 + 180.0 + 140.0);
    }

    #[test]
    fn connectors_carry_day_gaps() {
        let layout = layout_sequential(&timeline(), &GridConfig::default(), false);
        let gaps: Vec<(usize, usize, u32)> = layout
            .connectors
            .iter()
            .map(|c| (c.from, c.to, c.days_between))
            .collect();
        assert_eq!(gaps, vec![(0, 1, 9), (1, 2, 41)]);
        assert!(layout.connectors.iter().all(|c| !c.is_alternative));
    }

    #[test]
    fn alternatives_hang_below_their_parent() {
        let grid = GridConfig::default();
        let layout = layout_sequential(&timeline(), &grid, true);
        assert_eq!(layout.nodes.len(), 4);
        let alt = &layout.nodes[2];
        assert_eq!(alt.node.id, "rejected");
        assert_eq!(alt.grid_position, GridPoint { col: 2, row: 1 });
        assert_eq!(alt.center_x, 290.0 + 70.0);
        assert_eq!(alt.center_y, 128.0 + 180.0);
        assert!((alt.width - 56.0 * 0.85).abs() < 1e-9);

        let alt_link = layout.connectors.iter().find(|c| c.is_alternative).unwrap();
        assert_eq!((alt_link.from, alt_link.to, alt_link.days_between), (1, 2, 0));
        let main_links: Vec<(usize, usize)> = layout
            .connectors
            .iter()
            .filter(|c| !c.is_alternative)
            .map(|c| (c.from, c.to))
            .collect();
        assert_eq!(main_links, vec![(0, 1), (1, 3)]);
        assert_eq!(layout.total_height, 80.0 * 2.0 + 2.0 * 180.0 + 140.0);
    }
}
