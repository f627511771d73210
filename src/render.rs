use crate::config::{CardConfig, RenderConfig, TimelineConfig};
use crate::layout::{CardLayout, PointLayout, TimelineLayout};
use crate::measure::CardStyle;
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

const MAJOR_TICK_HEIGHT: f64 = 10.0;
const MINOR_TICK_HEIGHT: f64 = 5.0;
const LABEL_GAP: f64 = 14.0;

/// Draws the visible part of `layout` as a standalone SVG document the size
/// of the viewport.
pub fn render_svg(layout: &TimelineLayout, theme: &Theme, config: &TimelineConfig) -> String {
    let mut svg = String::new();
    let width = layout.viewport_width.max(1.0);
    let height = layout.height.max(config.axis_height + 1.0);
    let pan = layout.pan_offset;
    let theme = &attribute_safe(theme);
    let style = CardStyle::new(theme, &config.card);

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    );
    let _ = write!(svg, "<g transform=\"translate({:.2} 0)\">", -pan);

    render_axis(&mut svg, layout, theme, config);

    let visible = |x: f64, w: f64| x + w >= pan && x <= pan + width;
    for point in &layout.points {
        let extent = point.width.unwrap_or(config.point_size).max(config.point_size);
        if visible(point.x, extent) {
            render_point(&mut svg, point, theme, config);
        }
    }
    for card in &layout.cards {
        if visible(card.x, card.width) {
            let anchor_x = layout
                .point(&card.id)
                .map(|point| point.x + config.point_size / 2.0);
            render_card(&mut svg, card, anchor_x, theme, config, &style);
        }
    }

    svg.push_str("</g></svg>");
    svg
}

fn render_axis(svg: &mut String, layout: &TimelineLayout, theme: &Theme, config: &TimelineConfig) {
    let baseline = config.axis_height - 1.0;
    let _ = write!(
        svg,
        "<line x1=\"{:.2}\" y1=\"{baseline:.2}\" x2=\"{:.2}\" y2=\"{baseline:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
        0.0,
        layout.content_width,
        theme.axis_color
    );
    for tick in &layout.ticks {
        let tick_height = if tick.is_major {
            MAJOR_TICK_HEIGHT
        } else {
            MINOR_TICK_HEIGHT
        };
        let color = if tick.is_major {
            &theme.axis_color
        } else {
            &theme.tick_color
        };
        let _ = write!(
            svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{tick_height:.2}\" fill=\"{color}\"/>",
            tick.x,
            baseline - tick_height,
            config.tick_width
        );
        if let Some(label) = &tick.label {
            let _ = write!(
                svg,
                "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                tick.x + 2.0,
                baseline - LABEL_GAP,
                theme.font_family,
                theme.font_size * 0.85,
                theme.muted_text_color,
                escape_xml(label)
            );
        }
    }
}

fn render_point(svg: &mut String, point: &PointLayout, theme: &Theme, config: &TimelineConfig) {
    let top = config.axis_height;
    let size = config.point_size;
    let color = escape_xml(&point.color);
    let stroke = emphasis_stroke(point.hovered, point.selected, &color, theme);
    match point.width {
        Some(width) => {
            let _ = write!(
                svg,
                "<rect x=\"{:.2}\" y=\"{top:.2}\" width=\"{:.2}\" height=\"{size:.2}\" rx=\"{:.2}\" fill=\"{}\"{stroke}/>",
                point.x,
                width.max(0.0),
                size / 2.0,
                color
            );
        }
        None => {
            let _ = write!(
                svg,
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"{stroke}/>",
                point.x + size / 2.0,
                top + size / 2.0,
                size / 2.0,
                color
            );
        }
    }
}

fn render_card(
    svg: &mut String,
    card: &CardLayout,
    anchor_x: Option<f64>,
    theme: &Theme,
    config: &TimelineConfig,
    style: &CardStyle,
) {
    let top = config.axis_height + card.y;
    let color = escape_xml(&card.color);
    let CardConfig {
        padding_x,
        border_width,
        ..
    } = config.card;

    if let Some(anchor_x) = anchor_x {
        let _ = write!(
            svg,
            "<line x1=\"{anchor_x:.2}\" y1=\"{:.2}\" x2=\"{anchor_x:.2}\" y2=\"{top:.2}\" stroke=\"{}\" stroke-width=\"1\" stroke-dasharray=\"2 2\"/>",
            config.axis_height + config.point_size,
            color
        );
    }

    let stroke = emphasis_stroke(card.hovered, card.selected, &color, theme);
    let stroke = if stroke.is_empty() {
        format!(" stroke=\"{}\" stroke-width=\"1\"", theme.card_shadow)
    } else {
        stroke
    };
    let _ = write!(
        svg,
        "<g class=\"timeline-card\" data-id=\"{}\">",
        escape_xml(&card.id)
    );
    let _ = write!(
        svg,
        "<rect x=\"{:.2}\" y=\"{top:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\"{stroke}/>",
        card.x, card.width, card.height, theme.card_background
    );
    let _ = write!(
        svg,
        "<rect x=\"{:.2}\" y=\"{top:.2}\" width=\"{border_width:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
        card.x, card.height, color
    );

    let text_x = card.x + border_width + padding_x;
    let weight = if card.selected { " font-weight=\"600\"" } else { "" };
    let _ = write!(
        svg,
        "<text x=\"{text_x:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\"{weight}>{}</text>",
        top + style.title_baseline(),
        theme.font_family,
        style.font_size,
        theme.text_color,
        escape_xml(&card.title)
    );
    let _ = write!(
        svg,
        "<text x=\"{text_x:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\">{}</text>",
        top + style.subtitle_baseline(),
        theme.font_family,
        style.subtitle_font_size(),
        theme.muted_text_color,
        escape_xml(&card.time_label)
    );
    svg.push_str("</g>");
}

fn emphasis_stroke(hovered: bool, selected: bool, color: &str, theme: &Theme) -> String {
    if selected {
        format!(" stroke=\"{color}\" stroke-width=\"2\"")
    } else if hovered {
        format!(" stroke=\"{}\" stroke-width=\"2\"", theme.highlight_color)
    } else {
        String::new()
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().to_string())
        .unwrap_or_else(|| "Inter".to_string());
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width as f32, render_cfg.height as f32) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

/// Copy of `theme` whose strings can be written into attribute values.
fn attribute_safe(theme: &Theme) -> Theme {
    Theme {
        font_family: escape_xml(&theme.font_family),
        font_size: theme.font_size,
        text_color: escape_xml(&theme.text_color),
        muted_text_color: escape_xml(&theme.muted_text_color),
        axis_color: escape_xml(&theme.axis_color),
        tick_color: escape_xml(&theme.tick_color),
        card_background: escape_xml(&theme.card_background),
        card_shadow: escape_xml(&theme.card_shadow),
        highlight_color: escape_xml(&theme.highlight_color),
        background: escape_xml(&theme.background),
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Container;
    use crate::config::RangeMode;
    use crate::ir::{Event, parse_timestamp};
    use crate::measure::ApproxMeasurer;
    use crate::timeline::Timeline;

    fn layout() -> (TimelineLayout, TimelineConfig) {
        let config = TimelineConfig {
            range_mode: RangeMode::Fit,
            ..Default::default()
        };
        let theme = Theme::pansy();
        let style = CardStyle::new(&theme, &config.card);
        let events = vec![
            Event::instant("a", "Design <review>", parse_timestamp("2024-03-10 10:00").unwrap()),
            Event::span(
                "b",
                "Build & test",
                parse_timestamp("2024-03-10 10:30").unwrap(),
                parse_timestamp("2024-03-10 14:00").unwrap(),
            )
            .with_color("#10B981"),
        ];
        let mut timeline =
            Timeline::create(Some(Container::new(900.0, 360.0)), events, config.clone())
                .unwrap()
                .with_measurer(Box::new(ApproxMeasurer::new(style)));
        timeline.select("b");
        timeline.frame();
        (timeline.layout(), config)
    }

    #[test]
    fn renders_axis_points_and_cards() {
        let (layout, config) = layout();
        let svg = render_svg(&layout, &Theme::pansy(), &config);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Design &lt;review&gt;"));
        assert!(svg.contains("Build &amp; test"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("fill=\"#10B981\""));
        assert!(svg.contains("2024-03-10"));
        assert_eq!(svg.matches("class=\"timeline-card\"").count(), 2);
    }

    #[test]
    fn selected_card_is_emphasised() {
        let (layout, config) = layout();
        let svg = render_svg(&layout, &Theme::pansy(), &config);
        assert!(svg.contains("stroke=\"#10B981\" stroke-width=\"2\""));
        assert!(svg.contains("font-weight=\"600\""));
    }

    #[test]
    fn off_screen_cards_are_skipped() {
        let (mut layout, config) = layout();
        layout.pan_offset = 100_000.0;
        let svg = render_svg(&layout, &Theme::pansy(), &config);
        assert!(!svg.contains("timeline-card"));
    }

    #[test]
    fn quoted_font_family_and_colors_stay_inside_attributes() {
        let (mut layout, config) = layout();
        layout.cards[0].color = "red\" onload=\"x".to_string();
        let mut theme = Theme::pansy();
        theme.font_family = "\"Fira Sans\", serif".to_string();
        let svg = render_svg(&layout, &theme, &config);
        assert!(svg.contains("font-family=\"&quot;Fira Sans&quot;, serif\""));
        assert!(svg.contains("fill=\"red&quot; onload=&quot;x\""));
        assert!(!svg.contains("\"Fira Sans\""));
        assert!(!svg.contains(" onload=\"x"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("<a href='x'>&</a>"), "&lt;a href=&apos;x&apos;&gt;&amp;&lt;/a&gt;");
    }
}
