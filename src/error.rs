pub type Result<T, E = GribError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum GribError {
    #[error("end of input")]
    Eof,

    #[error("truncated message: expected {expected} bytes, got {got}")]
    TruncatedMessage { expected: usize, got: usize },

    #[error("unsupported GRIB edition {0}")]
    UnsupportedEdition(u8),

    #[error("unsupported grid definition template {0}")]
    UnsupportedGridTemplate(u16),

    #[error("unsupported product definition template {0}")]
    UnsupportedProductTemplate(u16),

    #[error("unsupported data representation template {0}")]
    UnsupportedDataTemplate(u16),

    #[error("unsupported packing: {0}")]
    UnsupportedPacking(String),

    #[error("no GRIB1 level code for GRIB2 level type {0}")]
    UnmappedLevel(u8),

    #[error("unmapped statistical process: {0}")]
    UnmappedProcess(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("JPEG 2000 stream rejected: {0}")]
    Jpeg2000(String),

    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),
}
