use legis_core::layout::{DiagramNode, Layout};

/// Extra reach around each symbol so small shapes stay easy to pick.
const SLACK: f64 = 10.0;

/// First node whose padded box contains the point, in layout order.
/// Alternative nodes are skipped when they are not drawn.
pub fn hit_test(layout: &Layout, x: f64, y: f64, show_alternatives: bool) -> Option<&DiagramNode> {
    layout
        .nodes
        .iter()
        .filter(|node| show_alternatives || node.is_main())
        .find(|node| {
            (x - node.center_x).abs() < node.width / 2.0 + SLACK
                && (y - node.center_y).abs() < node.height / 2.0 + SLACK
        })
}
