use anyhow::{Context, Result};
use churnprep::{run, PipelineConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Preprocess customer-churn data into train/test sets.
///
/// Flags override values read from `--config`; anything unset falls back to
/// the built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "churnprep")]
#[command(about = "Validate, clean, encode and split customer-churn data", long_about = None)]
#[command(version)]
struct Cli {
    /// Input delimited file [default: data/sample_data.csv]
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Directory for processed outputs [default: data/processed]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Fraction of rows held out for testing [default: 0.2]
    #[arg(long)]
    test_size: Option<f64>,

    /// Seed for the stratified split [default: 42]
    #[arg(long)]
    random_state: Option<u64>,

    /// TOML file with pipeline settings
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_toml_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(path) = self.data_path {
            config = config.with_data_path(path);
        }
        if let Some(dir) = self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(test_size) = self.test_size {
            config = config.with_test_size(test_size);
        }
        if let Some(seed) = self.random_state {
            config = config.with_random_state(seed);
        }
        config.validate().context("invalid settings")?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let config = Cli::parse().into_config()?;
    run(&config).with_context(|| {
        format!(
            "preprocessing {} into {} failed",
            config.data_path.display(),
            config.output_dir.display()
        )
    })?;
    Ok(())
}
