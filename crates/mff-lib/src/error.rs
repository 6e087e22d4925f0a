use thiserror::Error;

/// Everything that can abort an analysis run. Each variant is fatal: the
/// pipeline never retries, and no result row is written after a failure.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("signal has {len} samples but zero-phase filtering needs more than {min}")]
    InsufficientData { len: usize, min: usize },

    #[error("{task}: expected {expected} point(s), got {actual}; repeat the selection")]
    WrongSelectionCount {
        task: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("force never reached {target:.2} N (63% of MViF) after sample {onset}")]
    TargetNotReached { target: f64, onset: usize },

    #[error("sample index {index} out of range for a series of {len} samples")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("rest twitch window is flat; activation capacity is undefined")]
    DivisionByZero,

    #[error("degenerate window: start {start} is not before end {end}")]
    EmptyWindow { start: usize, end: usize },

    #[error("{task}: selection aborted by the operator")]
    SelectionAborted { task: &'static str },
}
