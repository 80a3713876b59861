//! Analysis error type.

/// Errors that can occur while refining a root network mask.
///
/// Degenerate geometry *after* a network has been isolated never raises:
/// ratio traits with a zero denominator return the `-1.0` sentinel instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// No foreground component survived thresholding; there is no network
    /// to trace.
    EmptyNetwork,
    /// A boundary was selected but its point list is degenerate.
    EmptyContour,
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNetwork => {
                write!(f, "no foreground component found in the thresholded mask")
            }
            Self::EmptyContour => write!(f, "selected network boundary has no points"),
        }
    }
}

impl std::error::Error for AnalysisError {}
