use crate::config::load_config;
use crate::ir::parse_timestamp;
use crate::layout_dump::{layout_dump_json, write_layout_dump};
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::{RenderOptions, build_timeline};
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "ptl", version, about = "Lay out and render event timelines")]
pub struct Args {
    /// Input event document (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. SVG and JSON default to stdout when omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (themeVariables, timeline options)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f64,

    /// Viewport height
    #[arg(short = 'H', long = "height", default_value_t = 400.0)]
    pub height: f64,

    /// Wheel steps to apply; positive is coarser, negative finer
    #[arg(long = "zoom", default_value_t = 0, allow_hyphen_values = true)]
    pub zoom: i32,

    /// Extra horizontal scroll in pixels
    #[arg(long = "pan", default_value_t = 0.0, allow_hyphen_values = true)]
    pub pan: f64,

    /// Centre the viewport on this time (e.g. "2024-03-10 12:00")
    #[arg(long = "center")]
    pub center: Option<String>,

    /// Use an average glyph advance instead of installed fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let center = args.center.as_deref().map(parse_timestamp).transpose()?;
    let options = RenderOptions {
        config,
        zoom_steps: args.zoom,
        pan: args.pan,
        center,
        default_center: None,
        font_metrics: !args.fast_text,
    };

    let input = read_input(args.input.as_deref())?;
    let timeline = build_timeline(&input, &options)?;
    let layout = timeline.layout();
    tracing::info!(
        events = timeline.events().len(),
        cards = layout.cards.len(),
        granularity = %layout.granularity.label(),
        "laid out timeline"
    );

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &options.config.theme, &options.config.timeline);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &options.config.theme, &options.config.timeline);
            write_output_png(&svg, &output, &options.config.render, &options.config.theme)?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &layout)?,
            None => println!("{}", layout_dump_json(&layout)?),
        },
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_flags() {
        let args = Args::parse_from([
            "ptl",
            "-i",
            "events.json",
            "-e",
            "json",
            "-w",
            "900",
            "--zoom",
            "-2",
            "--center",
            "2024-03-10 12:00",
            "-vv",
        ]);
        assert_eq!(args.input.as_deref(), Some(Path::new("events.json")));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.width, 900.0);
        assert_eq!(args.height, 400.0);
        assert_eq!(args.zoom, -2);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.center.as_deref(), Some("2024-03-10 12:00"));
    }

    #[test]
    fn png_needs_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert!(ensure_output(&Some(PathBuf::from("out.png")), "png").is_ok());
    }
}
