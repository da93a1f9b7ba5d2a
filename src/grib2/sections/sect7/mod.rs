pub mod complex;
pub mod jpeg2000;
pub mod simple;

use crate::error::Result;
use crate::grib2::GridMetadata;

/// Turns a Data Section body (everything past the 5-byte section header)
/// into dense gridpoints, `GRIB_MISSING` at masked positions.
pub(crate) trait DataDecoder {
    fn decode(&self, md: &GridMetadata, body: &[u8]) -> Result<Vec<f64>>;
}
