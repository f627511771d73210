use pansy_timeline::config::{Config, parse_config};
use pansy_timeline::ir::parse_timestamp;
use pansy_timeline::layout_dump::layout_dump_json;
use pansy_timeline::theme::Theme;
use pansy_timeline::{RenderOptions, build_timeline, render_timeline};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    zoom: Option<i32>,
    pan: Option<f64>,
    center: Option<String>,
    /// Full config document, same shape as the CLI config file.
    config: Option<serde_json::Value>,
}

fn build_render_options(options: TimelineRenderOptions) -> Result<RenderOptions, String> {
    let mut config = match options.config {
        Some(value) => parse_config(&value.to_string()).map_err(|error| error.to_string())?,
        None => Config::default(),
    };
    if options.theme.as_deref() == Some("dark") {
        config.theme = Theme::dark();
        config.render.background = config.theme.background.clone();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    let center = options
        .center
        .as_deref()
        .map(parse_timestamp)
        .transpose()
        .map_err(|error| error.to_string())?;

    Ok(RenderOptions {
        config,
        zoom_steps: options.zoom.unwrap_or(0),
        pan: options.pan.unwrap_or(0.0),
        center,
        default_center: None,
        font_metrics: false,
    })
}

fn parse_options(options_json: Option<String>) -> Result<RenderOptions, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TimelineRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TimelineRenderOptions::default()
    };
    build_render_options(options).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn render_timeline_svg(events: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    render_timeline(events, &options).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn layout_timeline_json(events: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let timeline =
        build_timeline(events, &options).map_err(|error| JsValue::from_str(&error.to_string()))?;
    layout_dump_json(&timeline.layout()).map_err(|error| JsValue::from_str(&error.to_string()))
}
