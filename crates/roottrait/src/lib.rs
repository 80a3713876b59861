//! Root-system phenotyping from grayscale scans.
//!
//! The pipeline turns one 8-bit grayscale image into a battery of scalar
//! architecture traits:
//!
//! 1. **Threshold** ([`threshold`]): binarize the scan with a fixed,
//!    adaptive, or gated double-adaptive cutoff.
//! 2. **Isolate** ([`isolate`]): keep only the largest connected foreground
//!    component, tracing its full-resolution boundary contour.
//! 3. **Skeletonize** ([`skeleton`]): reduce the refined mask to a thin
//!    center-line raster, by morphological residues or a directional
//!    medial-axis heuristic.
//! 4. **Measure** ([`root_system`]): derive areas, extents, ellipse axes,
//!    row-sweep root counts, and their ratios from mask, contour, and
//!    skeleton.
//!
//! [`RootSystem::from_image`] runs the whole pipeline once and owns the
//! results; trait queries are pure reads and instances are independent, so
//! images can be analyzed in parallel with one instance each.
//!
//! ```no_run
//! use roottrait::{AnalysisConfig, RootSystem};
//!
//! let scan = image::open("scan.png")?.to_luma8();
//! let system = RootSystem::from_image(&scan, &AnalysisConfig::default())?;
//! println!("network area: {} px", system.network_area());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ellipse;
pub mod error;
pub mod geom;
pub mod isolate;
pub mod root_system;
pub mod skeleton;
pub mod threshold;

pub use ellipse::Ellipse;
pub use error::AnalysisError;
pub use isolate::IsolatedNetwork;
pub use root_system::{AnalysisConfig, RootSystem, TraitReport};
pub use skeleton::SkeletonMethod;
pub use threshold::{ThreshMethod, ThresholdConfig};
