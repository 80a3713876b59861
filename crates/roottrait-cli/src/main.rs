//! roottrait CLI — command-line interface for root-system trait extraction.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use roottrait::{AnalysisConfig, RootSystem, SkeletonMethod, ThreshMethod, ThresholdConfig};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "roottrait")]
#[command(about = "Extract phenotypic traits from a grayscale root-system scan")]
#[command(version)]
struct Cli {
    /// Path to the input image (loaded as 8-bit grayscale).
    image: PathBuf,

    /// Thresholding strategy.
    #[arg(long, value_enum, default_value_t = ThreshMethodArg::Fixed)]
    thresh_method: ThreshMethodArg,

    /// Global threshold cutoff (inclusive).
    #[arg(long, default_value = "183")]
    cutoff: u8,

    /// Odd block side length for the adaptive thresholds.
    #[arg(long, default_value = "19")]
    block_size: u32,

    /// Skeletonization strategy.
    #[arg(long, value_enum, default_value_t = SkeletonMethodArg::Morphological)]
    skeleton_method: SkeletonMethodArg,

    /// Print the trait report as JSON instead of labeled lines.
    #[arg(long)]
    json: bool,

    /// Path to write the refined network mask (PNG) for inspection.
    #[arg(long)]
    debug_image: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThreshMethodArg {
    Fixed,
    Adaptive,
    DoubleAdaptive,
}

impl ThreshMethodArg {
    fn to_core(self) -> ThreshMethod {
        match self {
            Self::Fixed => ThreshMethod::Fixed,
            Self::Adaptive => ThreshMethod::Adaptive,
            Self::DoubleAdaptive => ThreshMethod::DoubleAdaptive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SkeletonMethodArg {
    Morphological,
    MedialAxis,
}

impl SkeletonMethodArg {
    fn to_core(self) -> SkeletonMethod {
        match self {
            Self::Morphological => SkeletonMethod::Morphological,
            Self::MedialAxis => SkeletonMethod::MedialAxis,
        }
    }
}

impl Cli {
    fn to_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            threshold: ThresholdConfig {
                method: self.thresh_method.to_core(),
                cutoff: self.cutoff,
                block_size: self.block_size,
            },
            skeleton: self.skeleton_method.to_core(),
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> CliResult<()> {
    let scan = image::open(&cli.image)
        .map_err(|e| format!("failed to load {}: {e}", cli.image.display()))?
        .to_luma8();
    tracing::info!(
        path = %cli.image.display(),
        width = scan.width(),
        height = scan.height(),
        "loaded scan"
    );

    let system = RootSystem::from_image(&scan, &cli.to_config())?;
    let report = system.report();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (label, value, unit) in report.entries() {
            if unit.is_empty() {
                println!("{label}: {value}");
            } else {
                println!("{label}: {value} {unit}");
            }
        }
    }

    if let Some(path) = &cli.debug_image {
        system.mask().save(path)?;
        tracing::info!(path = %path.display(), "wrote refined mask");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_to_core_config() {
        let cli = Cli::try_parse_from(["roottrait", "scan.png"]).expect("positional path");
        let config = cli.to_config();
        assert_eq!(config, AnalysisConfig::default());
        assert!(!cli.json);
        assert!(cli.debug_image.is_none());
    }

    #[test]
    fn flags_override_threshold_and_skeleton() {
        let cli = Cli::try_parse_from([
            "roottrait",
            "scan.png",
            "--thresh-method",
            "double-adaptive",
            "--cutoff",
            "120",
            "--skeleton-method",
            "medial-axis",
        ])
        .expect("valid flags");
        let config = cli.to_config();
        assert_eq!(config.threshold.method, ThreshMethod::DoubleAdaptive);
        assert_eq!(config.threshold.cutoff, 120);
        assert_eq!(config.skeleton, SkeletonMethod::MedialAxis);
    }

    #[test]
    fn missing_path_is_a_parse_error() {
        assert!(Cli::try_parse_from(["roottrait"]).is_err());
    }
}
