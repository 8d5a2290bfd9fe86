//! SVG rendering of a computed layout.
//!
//! Paint order: connectors, main symbols, alternative symbols, labels, the
//! time axis, then the "now" line on top.

use crate::palette::{self, institution_colors};
use crate::text::{approx_text_width, format_date_range, format_days};
use anyhow::Result;
use legis_core::layout::{
    ConnectorLine, DiagramNode, GridConfig, Layout, connector_path, day_label_anchor, label_block,
    now_line, time_axis,
};
use legis_core::schema::{StageStatus, SymbolShape};
use std::fmt::{self, Write};
use tracing::debug;

const FONT_FAMILY: &str = "system-ui, sans-serif";
const PILL_HEIGHT: f64 = 20.0;
const PILL_PADDING: f64 = 16.0;
const AXIS_DOT_RADIUS: f64 = 5.0;
const NOW_LABEL_Y: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_now_line: bool,
    pub show_alternatives: bool,
    pub selected_node_id: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_now_line: true,
            show_alternatives: true,
            selected_node_id: None,
        }
    }
}

pub fn render_svg(layout: &Layout, grid: &GridConfig, options: &RenderOptions) -> Result<String> {
    let mut svg = String::new();
    write!(
        svg,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="{FONT_FAMILY}">
  <rect width="100%" height="100%" fill="{bg}" />
"#,
        w = layout.total_width,
        h = layout.total_height,
        bg = palette::CANVAS,
    )?;

    for connector in &layout.connectors {
        if connector.is_alternative && !options.show_alternatives {
            continue;
        }
        write_connector(&mut svg, layout, connector)?;
    }

    let selected = options.selected_node_id.as_deref();
    for node in layout.main_nodes() {
        let is_selected = selected == Some(node.node.id.as_str());
        let is_current = node.node.status == StageStatus::Current;
        write_symbol(&mut svg, node, is_current, is_selected)?;
    }
    if options.show_alternatives {
        for node in layout.nodes.iter().filter(|node| !node.is_main()) {
            let is_selected = selected == Some(node.node.id.as_str());
            write_symbol(&mut svg, node, false, is_selected)?;
        }
    }

    for node in layout
        .nodes
        .iter()
        .filter(|node| options.show_alternatives || node.is_main())
    {
        write_label(&mut svg, node, grid)?;
    }

    if let Some(axis) = time_axis(layout, grid, options.show_alternatives) {
        write!(
            svg,
            "  <g class=\"axis\">\n    <line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{}\" stroke-width=\"2\" />\n",
            axis.start_x,
            axis.end_x,
            palette::HAIRLINE,
            y = axis.y,
        )?;
        for tick in &axis.ticks {
            writeln!(
                svg,
                "    <circle cx=\"{tick:.1}\" cy=\"{:.1}\" r=\"{AXIS_DOT_RADIUS}\" fill=\"{}\" />",
                axis.y,
                palette::FAINT_TEXT
            )?;
        }
        svg.push_str("  </g>\n");
    }

    if options.show_now_line {
        if let Some(line) = now_line(layout, grid, options.show_alternatives) {
            write!(
                svg,
                "  <g class=\"now-line\">\n    <line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"{c}\" stroke-width=\"2\" stroke-dasharray=\"8,4\" />\n    <text x=\"{x:.1}\" y=\"{NOW_LABEL_Y:.1}\" fill=\"{c}\" font-size=\"11\" font-weight=\"bold\" text-anchor=\"middle\">TERAZ</text>\n  </g>\n",
                line.top,
                line.bottom,
                x = line.x,
                c = palette::NOW_LINE,
            )?;
        }
    }

    svg.push_str("</svg>\n");
    debug!(
        nodes = layout.nodes.len(),
        connectors = layout.connectors.len(),
        bytes = svg.len(),
        "rendered svg"
    );
    Ok(svg)
}

fn write_connector(svg: &mut String, layout: &Layout, connector: &ConnectorLine) -> fmt::Result {
    let Some(path) = connector_path(layout, connector) else {
        return Ok(());
    };
    let points = path
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");

    if connector.is_alternative {
        return writeln!(
            svg,
            "  <polyline class=\"connector alternative\" points=\"{points}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"6,4\" opacity=\"0.5\" />",
            palette::ALTERNATIVE
        );
    }

    let stroke = layout
        .nodes
        .get(connector.to)
        .map_or(palette::ALTERNATIVE, |to| institution_colors(to.node.institution).border);
    writeln!(
        svg,
        "  <polyline class=\"connector\" points=\"{points}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"3\" />"
    )?;

    if let Some(mid) = day_label_anchor(layout, connector) {
        let text = format_days(connector.days_between);
        let width = approx_text_width(&text, 11.0) + PILL_PADDING;
        write!(
            svg,
            "  <g class=\"day-pill\">\n    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{width:.1}\" height=\"{PILL_HEIGHT:.1}\" rx=\"{r:.1}\" ry=\"{r:.1}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\" />\n    <text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\" font-size=\"11\" text-anchor=\"middle\" dominant-baseline=\"middle\">{text}</text>\n  </g>\n",
            mid.x - width / 2.0,
            mid.y - PILL_HEIGHT / 2.0,
            palette::CANVAS,
            palette::HAIRLINE,
            mid.x,
            mid.y,
            palette::MUTED_TEXT,
            r = PILL_HEIGHT / 2.0,
        )?;
    }
    Ok(())
}

fn write_symbol(
    svg: &mut String,
    node: &DiagramNode,
    is_current: bool,
    is_selected: bool,
) -> fmt::Result {
    let shape = node.node.shape;
    let colors = institution_colors(node.node.institution);
    let (cx, cy, w, h) = (node.center_x, node.center_y, node.width, node.height);
    let stroke = if node.node.status == StageStatus::Alternative {
        palette::ALTERNATIVE
    } else {
        colors.border
    };
    let stroke_width = if shape == SymbolShape::Rectangle { 4 } else { 3 };
    let fill_alpha = match shape {
        SymbolShape::Rectangle | SymbolShape::Diamond => "20",
        SymbolShape::CircleX => "10",
        _ => "15",
    };
    let fill = format!("{}{fill_alpha}", colors.background);
    let opacity = if node.node.status.is_dimmed() { 0.4 } else { 1.0 };

    writeln!(
        svg,
        "  <g class=\"symbol\" data-id=\"{}\" opacity=\"{opacity}\">\n    <title>{}</title>",
        escape_xml(&node.node.id),
        escape_xml(&node.node.name)
    )?;
    match shape {
        SymbolShape::Circle => writeln!(
            svg,
            "    <circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{:.1}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\" />",
            w / 2.0
        )?,
        SymbolShape::DoubleCircle => {
            writeln!(
                svg,
                "    <circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{:.1}\" fill=\"{fill}\" stroke=\"{b}\" stroke-width=\"3\" />\n    <circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{:.1}\" fill=\"{b}\" />",
                w / 2.0,
                w / 4.0,
                b = colors.border,
            )?;
        }
        SymbolShape::CircleX => {
            let arm = w / 2.0 * 0.45;
            writeln!(
                svg,
                "    <circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{:.1}\" fill=\"{}\" stroke=\"{b}\" stroke-width=\"3\" />\n    <path d=\"M{:.1},{:.1} L{:.1},{:.1} M{:.1},{:.1} L{:.1},{:.1}\" stroke=\"{b}\" stroke-width=\"4\" stroke-linecap=\"round\" />",
                w / 2.0,
                palette::REJECTED_FILL,
                cx - arm,
                cy - arm,
                cx + arm,
                cy + arm,
                cx + arm,
                cy - arm,
                cx - arm,
                cy + arm,
                b = colors.border,
            )?;
        }
        SymbolShape::Rectangle => writeln!(
            svg,
            "    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{w:.1}\" height=\"{h:.1}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\" />",
            cx - w / 2.0,
            cy - h / 2.0
        )?,
        SymbolShape::RoundedRect => writeln!(
            svg,
            "    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{w:.1}\" height=\"{h:.1}\" rx=\"8\" ry=\"8\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\" />",
            cx - w / 2.0,
            cy - h / 2.0
        )?,
        SymbolShape::Diamond => writeln!(
            svg,
            "    <polygon points=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\" />",
            diamond_points(cx, cy, w.max(h))
        )?,
    }
    svg.push_str("  </g>\n");

    if is_selected {
        write_ring(svg, node, palette::SELECTION, 3, 6.0, 12.0)?;
    } else if is_current {
        write_ring(svg, node, palette::CURRENT_RING, 4, 8.0, 16.0)?;
    }
    Ok(())
}

/// Outline drawn around a symbol at full opacity; `round_gap` widens the
/// radius of round shapes, `box_gap` the box of everything else.
fn write_ring(
    svg: &mut String,
    node: &DiagramNode,
    color: &str,
    width: u32,
    round_gap: f64,
    box_gap: f64,
) -> fmt::Result {
    let (cx, cy, w, h) = (node.center_x, node.center_y, node.width, node.height);
    match node.node.shape {
        SymbolShape::Circle | SymbolShape::DoubleCircle | SymbolShape::CircleX => writeln!(
            svg,
            "  <circle class=\"ring\" cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{:.1}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{width}\" />",
            w / 2.0 + round_gap
        ),
        SymbolShape::Diamond => writeln!(
            svg,
            "  <polygon class=\"ring\" points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{width}\" />",
            diamond_points(cx, cy, w.max(h) + box_gap)
        ),
        SymbolShape::Rectangle | SymbolShape::RoundedRect => writeln!(
            svg,
            "  <rect class=\"ring\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"10\" ry=\"10\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{width}\" />",
            cx - (w + box_gap) / 2.0,
            cy - (h + box_gap) / 2.0,
            w + box_gap,
            h + box_gap
        ),
    }
}

fn write_label(svg: &mut String, node: &DiagramNode, grid: &GridConfig) -> fmt::Result {
    let block = label_block(node, grid);
    let colors = institution_colors(node.node.institution);
    let opacity = if node.node.status.is_dimmed() { 0.5 } else { 1.0 };
    let x = block.x;
    write!(
        svg,
        "  <g class=\"label\" opacity=\"{opacity}\" text-anchor=\"middle\">\n    <text x=\"{x:.1}\" y=\"{:.1}\" fill=\"{}\" font-size=\"12\" font-weight=\"bold\">{}</text>\n    <text x=\"{x:.1}\" y=\"{:.1}\" fill=\"{}\" font-size=\"11\">{}</text>\n    <text x=\"{x:.1}\" y=\"{:.1}\" fill=\"{faint}\" font-size=\"10\">{}</text>\n    <text x=\"{x:.1}\" y=\"{:.1}\" fill=\"{faint}\" font-size=\"10\">{}</text>\n  </g>\n",
        block.name_y,
        colors.border,
        escape_xml(&node.node.short_name),
        block.institution_y,
        palette::MUTED_TEXT,
        escape_xml(colors.label),
        block.duration_y,
        format_days(block.duration_days),
        block.dates_y,
        format_date_range(&node.node.date_start, &node.node.date_end),
        faint = palette::FAINT_TEXT,
    )
}

fn diamond_points(cx: f64, cy: f64, size: f64) -> String {
    let half = size / 2.0;
    format!(
        "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
        cx,
        cy - half,
        cx + half,
        cy,
        cx,
        cy + half,
        cx - half,
        cy
    )
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use legis_core::layout::layout_sequential;
    use legis_core::schema::{Institution, TimelineNode};

    fn node(id: &str, shape: SymbolShape, status: StageStatus, start: &str) -> TimelineNode {
        TimelineNode {
            id: id.to_string(),
            name: id.to_string(),
            short_name: id.to_string(),
            description: String::new(),
            date_start: start.to_string(),
            date_end: start.to_string(),
            shape,
            institution: Institution::LowerHouse,
            status,
            voting_result: None,
            document_number: None,
            document_title: None,
            alternatives: Vec::new(),
        }
    }

    fn sample() -> Layout {
        let mut middle = node("b", SymbolShape::Rectangle, StageStatus::Current, "2024-01-03");
        middle.alternatives = vec![node("alt", SymbolShape::CircleX, StageStatus::Alternative, "")];
        layout_sequential(
            &[
                node("a", SymbolShape::Circle, StageStatus::Completed, "2024-01-01"),
                middle,
                node("c", SymbolShape::DoubleCircle, StageStatus::Future, ""),
            ],
            &GridConfig::default(),
            true,
        )
    }

    #[test]
    fn layers_are_painted_in_order() {
        let svg = render_svg(&sample(), &GridConfig::default(), &RenderOptions::default()).unwrap();
        let at = |needle: &str| svg.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(at("class=\"connector") < at("class=\"symbol\""));
        assert!(at("data-id=\"c\"") < at("data-id=\"alt\""));
        assert!(at("data-id=\"alt\"") < at("class=\"label\""));
        assert!(at("class=\"label\"") < at("class=\"axis\""));
        assert!(at("class=\"axis\"") < at("class=\"now-line\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn hiding_alternatives_drops_their_shapes_and_connectors() {
        let options = RenderOptions {
            show_alternatives: false,
            ..RenderOptions::default()
        };
        let svg = render_svg(&sample(), &GridConfig::default(), &options).unwrap();
        assert!(!svg.contains("data-id=\"alt\""));
        assert!(!svg.contains("connector alternative"));
        assert_eq!(svg.matches("class=\"label\"").count(), 3);
    }

    #[test]
    fn current_and_selected_rings() {
        let svg = render_svg(&sample(), &GridConfig::default(), &RenderOptions::default()).unwrap();
        assert!(svg.contains(&format!("stroke=\"{}\" stroke-width=\"4\"", palette::CURRENT_RING)));

        let options = RenderOptions {
            selected_node_id: Some("b".to_string()),
            ..RenderOptions::default()
        };
        let svg = render_svg(&sample(), &GridConfig::default(), &options).unwrap();
        assert!(svg.contains(palette::SELECTION));
        assert!(!svg.contains(palette::CURRENT_RING));
    }

    #[test]
    fn day_pill_and_now_line() {
        let svg = render_svg(&sample(), &GridConfig::default(), &RenderOptions::default()).unwrap();
        assert!(svg.contains(">2 dni</text>"));
        assert!(svg.contains(">TERAZ</text>"));

        let options = RenderOptions {
            show_now_line: false,
            ..RenderOptions::default()
        };
        let svg = render_svg(&sample(), &GridConfig::default(), &options).unwrap();
        assert!(!svg.contains("TERAZ"));
    }

    #[test]
    fn names_are_escaped() {
        let mut risky = node("x", SymbolShape::Circle, StageStatus::Completed, "2024-01-01");
        risky.name = "Ustawa <o> \"A & B\"".to_string();
        risky.short_name = risky.name.clone();
        let layout = layout_sequential(&[risky], &GridConfig::default(), false);
        let svg = render_svg(&layout, &GridConfig::default(), &RenderOptions::default()).unwrap();
        assert!(svg.contains("Ustawa &lt;o&gt; &quot;A &amp; B&quot;"));
        assert!(!svg.contains("<o>"));
    }

    #[test]
    fn empty_layout_is_a_blank_canvas() {
        let options = RenderOptions::default();
        let svg = render_svg(&Layout::default(), &GridConfig::default(), &options).unwrap();
        assert!(!svg.contains("class=\"symbol\""));
        assert!(!svg.contains("class=\"axis\""));
        assert!(svg.contains("<svg"));
    }
}
