use crate::error::TimelineError;
use crate::layout::{AxisGeometry, Granularity, default_granularities};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    /// Padded, hour-aligned window around the data.
    Fit,
    /// Day-aligned window wide enough for the coarsest zoom level.
    #[default]
    Interactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub padding_x: f64,
    pub padding_y: f64,
    pub line_gap: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub border_width: f64,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            padding_x: 10.0,
            padding_y: 8.0,
            line_gap: 4.0,
            min_width: 80.0,
            max_width: 320.0,
            border_width: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub padding_minutes: i64,
    pub min_range_minutes: i64,
    pub range_mode: RangeMode,
    pub interactive_pad_days: i64,
    pub tick_width: f64,
    pub padding_start: f64,
    pub padding_end: f64,
    pub point_size: f64,
    pub card_offset_x: f64,
    pub card_margin_top: f64,
    pub row_gap: f64,
    pub default_granularity: usize,
    pub granularities: Vec<Granularity>,
    pub moveable: bool,
    pub zoomable: bool,
    pub default_color: String,
    pub axis_height: f64,
    pub tick_overscan: usize,
    pub max_redraw_passes: usize,
    pub card: CardConfig,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            padding_minutes: 30,
            min_range_minutes: 60 * 24,
            range_mode: RangeMode::default(),
            interactive_pad_days: 30,
            tick_width: 1.0,
            padding_start: 24.0,
            padding_end: 24.0,
            point_size: 10.0,
            card_offset_x: 4.0,
            card_margin_top: 24.0,
            row_gap: 8.0,
            default_granularity: 5,
            granularities: default_granularities(),
            moveable: true,
            zoomable: true,
            default_color: "#2B6DE5".to_string(),
            axis_height: 48.0,
            tick_overscan: 4,
            max_redraw_passes: 5,
            card: CardConfig::default(),
        }
    }
}

impl TimelineConfig {
    pub fn geometry(&self, granularity: &Granularity) -> AxisGeometry {
        AxisGeometry {
            tick_width: self.tick_width,
            tick_gap: granularity.tick_gap_px,
            padding_start: self.padding_start,
            padding_end: self.padding_end,
            point_size: self.point_size,
        }
    }

    pub fn granularity(&self, index: usize) -> Option<&Granularity> {
        self.granularities.get(index)
    }

    /// Rejects granularity tables the layout cannot step through: empty
    /// tables, zero steps or label intervals, and ticks without a positive
    /// pixel pitch.
    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.granularities.is_empty() {
            return Err(TimelineError::EmptyGranularities);
        }
        for (index, granularity) in self.granularities.iter().enumerate() {
            let pitch = self.geometry(granularity).pitch();
            let reason = if granularity.step == 0 {
                Some("step must be at least 1")
            } else if granularity.label_step_every == 0 {
                Some("label_step_every must be at least 1")
            } else if !granularity.tick_gap_px.is_finite() || granularity.tick_gap_px < 0.0 {
                Some("tick_gap_px must be a finite, non-negative number")
            } else if !pitch.is_finite() || pitch <= 0.0 {
                Some("tick width plus gap must be positive")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(TimelineError::InvalidGranularity {
                    index,
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 400.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub timeline: TimelineConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::pansy();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            timeline: TimelineConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    axis_color: Option<String>,
    tick_color: Option<String>,
    card_background: Option<String>,
    highlight_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardConfigFile {
    padding_x: Option<f64>,
    padding_y: Option<f64>,
    line_gap: Option<f64>,
    min_width: Option<f64>,
    max_width: Option<f64>,
    border_width: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineConfigFile {
    padding_minutes: Option<i64>,
    min_range_minutes: Option<i64>,
    range_mode: Option<RangeMode>,
    interactive_pad_days: Option<i64>,
    tick_width: Option<f64>,
    padding_start: Option<f64>,
    padding_end: Option<f64>,
    point_size: Option<f64>,
    card_offset_x: Option<f64>,
    card_margin_top: Option<f64>,
    row_gap: Option<f64>,
    default_granularity: Option<usize>,
    granularities: Option<Vec<Granularity>>,
    moveable: Option<bool>,
    zoomable: Option<bool>,
    default_color: Option<String>,
    axis_height: Option<f64>,
    tick_overscan: Option<usize>,
    max_redraw_passes: Option<usize>,
    card: Option<CardConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    timeline: Option<TimelineConfigFile>,
    width: Option<f64>,
    height: Option<f64>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Overlays a camelCase JSON (or JSON5) document on the defaults. Every
/// field is optional.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|json5_err| {
            anyhow::anyhow!("invalid config: {json_err}; json5: {json5_err}")
        })?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "dark" {
            config.theme = Theme::dark();
        } else if theme_name == "default" || theme_name == "pansy" {
            config.theme = Theme::pansy();
        } else {
            anyhow::bail!("unknown theme '{theme_name}'");
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.muted_text_color {
            config.theme.muted_text_color = v;
        }
        if let Some(v) = vars.axis_color {
            config.theme.axis_color = v;
        }
        if let Some(v) = vars.tick_color {
            config.theme.tick_color = v;
        }
        if let Some(v) = vars.card_background {
            config.theme.card_background = v;
        }
        if let Some(v) = vars.highlight_color {
            config.theme.highlight_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(file) = parsed.timeline {
        apply_timeline_overrides(&mut config.timeline, file);
    }
    if let Some(width) = parsed.width {
        config.render.width = width;
    }
    if let Some(height) = parsed.height {
        config.render.height = height;
    }

    config.timeline.validate()?;
    Ok(config)
}

fn apply_timeline_overrides(timeline: &mut TimelineConfig, file: TimelineConfigFile) {
    if let Some(v) = file.padding_minutes {
        timeline.padding_minutes = v;
    }
    if let Some(v) = file.min_range_minutes {
        timeline.min_range_minutes = v;
    }
    if let Some(v) = file.range_mode {
        timeline.range_mode = v;
    }
    if let Some(v) = file.interactive_pad_days {
        timeline.interactive_pad_days = v;
    }
    if let Some(v) = file.tick_width {
        timeline.tick_width = v;
    }
    if let Some(v) = file.padding_start {
        timeline.padding_start = v;
    }
    if let Some(v) = file.padding_end {
        timeline.padding_end = v;
    }
    if let Some(v) = file.point_size {
        timeline.point_size = v;
    }
    if let Some(v) = file.card_offset_x {
        timeline.card_offset_x = v;
    }
    if let Some(v) = file.card_margin_top {
        timeline.card_margin_top = v;
    }
    if let Some(v) = file.row_gap {
        timeline.row_gap = v;
    }
    if let Some(v) = file.default_granularity {
        timeline.default_granularity = v;
    }
    if let Some(v) = file.granularities {
        timeline.granularities = v;
    }
    if let Some(v) = file.moveable {
        timeline.moveable = v;
    }
    if let Some(v) = file.zoomable {
        timeline.zoomable = v;
    }
    if let Some(v) = file.default_color {
        timeline.default_color = v;
    }
    if let Some(v) = file.axis_height {
        timeline.axis_height = v;
    }
    if let Some(v) = file.tick_overscan {
        timeline.tick_overscan = v;
    }
    if let Some(v) = file.max_redraw_passes {
        timeline.max_redraw_passes = v;
    }
    if let Some(card) = file.card {
        if let Some(v) = card.padding_x {
            timeline.card.padding_x = v;
        }
        if let Some(v) = card.padding_y {
            timeline.card.padding_y = v;
        }
        if let Some(v) = card.line_gap {
            timeline.card.line_gap = v;
        }
        if let Some(v) = card.min_width {
            timeline.card.min_width = v;
        }
        if let Some(v) = card.max_width {
            timeline.card.max_width = v;
        }
        if let Some(v) = card.border_width {
            timeline.card.border_width = v;
        }
    }
}
