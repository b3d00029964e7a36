use crate::config::{Config, load_config, merge_init_config};
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_document;
use crate::render::{layout_description, render_svg, write_output_svg};
use crate::theme::Theme;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rfsvg", version, about = "Declarative SVG diagram renderer")]
pub struct Args {
    /// Input description (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (themeVariables, layout)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Named theme, overriding the config file
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Write the settled layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Width of the PNG viewport
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height of the PNG viewport
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Log lifecycle events to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut base_config = load_config(args.config.as_deref())?;
    if let Some(name) = args.theme.as_deref() {
        base_config.theme =
            Theme::named(name).ok_or_else(|| anyhow::anyhow!("unknown theme `{name}`"))?;
        base_config.render.background = base_config.theme.background.clone();
    }
    base_config.render.width = args.width;
    base_config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let parsed = parse_document(&input)?;
    let mut config = base_config;
    if let Some(init) = parsed.init_config {
        merge_init_config(&mut config, init)?;
    }
    let count = parsed.descriptions.len();
    if count == 0 {
        return Err(anyhow::anyhow!("No descriptions found in input"));
    }
    debug!(count, "parsed input");

    let outputs = if count == 1 {
        if args.output_format == OutputFormat::Png {
            vec![Some(ensure_output(&args.output, "png")?)]
        } else {
            vec![args.output.clone()]
        }
    } else {
        resolve_multi_outputs(args.output.as_deref(), args.output_format, count)?
            .into_iter()
            .map(Some)
            .collect()
    };
    let dumps = match (&args.dump_layout, count) {
        (None, _) => vec![None; count],
        (Some(path), 1) => vec![Some(path.clone())],
        (Some(path), _) => numbered_paths(path, "json", count)
            .into_iter()
            .map(Some)
            .collect(),
    };

    for ((description, output), dump) in parsed.descriptions.iter().zip(outputs).zip(dumps) {
        let tree = layout_description(description, &config)?;
        if let Some(path) = dump.as_deref() {
            write_layout_dump(path, &tree)?;
        }
        let svg = render_svg(&tree, &config.render);
        write_output(&svg, output.as_deref(), args.output_format, &config)?;
        if let Some(path) = output.as_deref() {
            info!(path = %path.display(), nodes = tree.len(), "wrote diagram");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn write_output(
    svg: &str,
    output: Option<&Path>,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    match format {
        OutputFormat::Svg => write_output_svg(svg, output),
        OutputFormat::Png => {
            let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_png(svg, output, config)
        }
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render, &config.theme.font_family)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires building with the `png` feature"
    ))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let base = output
        .ok_or_else(|| anyhow::anyhow!("Output path required for multiple descriptions"))?;
    if base.is_dir() {
        return Ok((0..count)
            .map(|idx| base.join(format!("diagram-{}.{}", idx + 1, ext)))
            .collect());
    }
    Ok(numbered_paths(base, ext, count))
}

fn numbered_paths(base: &Path, ext: &str, count: usize) -> Vec<PathBuf> {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("diagram");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    (0..count)
        .map(|idx| parent.join(format!("{}-{}.{}", stem, idx + 1, ext)))
        .collect()
}
