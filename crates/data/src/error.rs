use thiserror::Error;

/// Errors that can occur while building the benchmark timeline or aligning
/// symbol data to it.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Empty benchmark series")]
    EmptyBenchmark,

    #[error("Benchmark timestamps not strictly increasing at index {0}")]
    NonMonotonicBenchmark(usize),

    #[error("Benchmark not set")]
    BenchmarkNotSet,

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}
