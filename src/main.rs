//! geo-isobands CLI - interpolate point observations and write filled isobands

use anyhow::{Context, Result};
use clap::Parser;
use geo_isobands::{
    limits, pipeline, AttributePolicy, Config, Extend, Kernel, LevelSet, Method,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "geo-isobands")]
#[command(author, version, about = "Interpolate scattered observations and write filled isobands", long_about = None)]
struct Cli {
    /// Input CSV with a header row
    src: PathBuf,

    /// Output file, replaced if it exists
    out: PathBuf,

    /// Comma separated contour levels, ascending (e.g. 0,5,10,15)
    #[arg(short = 'l', long)]
    levels: Option<String>,

    /// Value column in the CSV and attribute name in the output
    #[arg(short = 'a', long = "attribute")]
    attribute: Option<String>,

    /// Output layer name
    #[arg(long = "nln", visible_alias = "layer-name")]
    layer_name: Option<String>,

    /// Output driver: GeoJSON, GeoJSONSeq
    #[arg(short = 'f', long = "format")]
    format: Option<String>,

    /// CPU time limit in seconds
    #[arg(long = "tl", visible_alias = "time-limit")]
    time_limit: Option<u64>,

    /// Interpolation method: nearest, linear, cubic, rbf
    #[arg(long)]
    method: Option<Method>,

    /// Grid resolution in coordinate units
    #[arg(long)]
    resolution: Option<f64>,

    /// Padding added around the data extent
    #[arg(long)]
    pad: Option<f64>,

    /// RBF kernel: multiquadric, inverse, gaussian, linear, cubic, quintic, thin_plate
    #[arg(long)]
    rbf_kernel: Option<Kernel>,

    /// RBF smoothing, 0 interpolates exactly
    #[arg(long)]
    rbf_smooth: Option<f64>,

    /// RBF shape parameter
    #[arg(long)]
    rbf_epsilon: Option<f64>,

    /// Open bands beyond the levels: neither, min, max, both
    #[arg(long)]
    extend: Option<Extend>,

    /// Attribute value of a band: lower, upper, midpoint
    #[arg(long)]
    attribute_policy: Option<AttributePolicy>,

    /// Decimal places kept in output coordinates
    #[arg(long)]
    precision: Option<u32>,

    /// Longitude column name
    #[arg(long)]
    x_field: Option<String>,

    /// Latitude column name
    #[arg(long)]
    y_field: Option<String>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<(PathBuf, PathBuf, Config)> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(levels) = &self.levels {
            config.levels = LevelSet::parse(levels)
                .context("Invalid level list")?
                .levels()
                .to_vec();
        }
        if let Some(attribute) = self.attribute {
            config.attribute_field_name = attribute;
        }
        if let Some(layer) = self.layer_name {
            config.layer_name = layer;
        }
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if let Some(seconds) = self.time_limit {
            config.cpu_time_limit_seconds = Some(seconds);
        }
        if let Some(method) = self.method {
            config.interp_method = method;
        }
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        if let Some(pad) = self.pad {
            config.spatial_pad = pad;
        }
        if let Some(kernel) = self.rbf_kernel {
            config.rbf_kernel = kernel;
        }
        if let Some(smoothing) = self.rbf_smooth {
            config.rbf_smoothing = smoothing;
        }
        if let Some(epsilon) = self.rbf_epsilon {
            config.rbf_epsilon = Some(epsilon);
        }
        if let Some(extend) = self.extend {
            config.extend = extend;
        }
        if let Some(policy) = self.attribute_policy {
            config.attribute_policy = policy;
        }
        if let Some(precision) = self.precision {
            config.coordinate_precision = Some(precision);
        }
        if let Some(x_field) = self.x_field {
            config.x_field = x_field;
        }
        if let Some(y_field) = self.y_field {
            config.y_field = y_field;
        }

        Ok((self.src, self.out, config))
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the log subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let (src, out, config) = cli.into_config()?;
    config.validate().context("Invalid configuration")?;

    if let Some(seconds) = config.cpu_time_limit_seconds {
        limits::set_cpu_limit(seconds).context("Failed to install the CPU time limit")?;
    }

    let start = Instant::now();
    let collection = pipeline::run_files(&src, &out, &config).with_context(|| {
        format!(
            "Failed to build isobands from {} into {}",
            src.display(),
            out.display()
        )
    })?;

    info!(
        features = collection.len(),
        output = %out.display(),
        elapsed = ?start.elapsed(),
        "done"
    );

    Ok(())
}
