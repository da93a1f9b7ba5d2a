use crate::bits::unpack;
use crate::error::{GribError, Result};
use crate::grib2::sections::sect7::DataDecoder;
use crate::grib2::GridMetadata;
use crate::GRIB_MISSING;

/// Data Representation Template 5.0: each unmasked point is
/// `R + packed * 2^E / 10^D`. A pack width of zero is a constant field.
pub(crate) struct SimplePackingDecoder;

impl DataDecoder for SimplePackingDecoder {
    fn decode(&self, md: &GridMetadata, body: &[u8]) -> Result<Vec<f64>> {
        let repr = &md.repr;
        let num_points = md.grid.num_points();
        let e = 2f64.powi(repr.e);
        let d = 10f64.powi(repr.d);

        let unmasked = match md.bitmap.as_ref() {
            Some(bitmap) => bitmap.iter().take(num_points).filter(|&&b| b == 1).count(),
            None => num_points,
        };
        if unmasked * repr.pack_width > body.len() * 8 {
            return Err(GribError::TruncatedMessage {
                expected: (unmasked * repr.pack_width + 7) / 8,
                got: body.len(),
            });
        }

        let mut gridpoints = Vec::with_capacity(num_points);
        let mut off = 0usize;
        for n in 0..num_points {
            let present = match md.bitmap.as_ref() {
                Some(bitmap) => bitmap.get(n) == Some(&1),
                None => true,
            };
            if present {
                let packed = unpack(body, off, repr.pack_width);
                off += repr.pack_width;
                gridpoints.push(repr.r + f64::from(packed) * e / d);
            } else {
                gridpoints.push(GRIB_MISSING);
            }
        }
        Ok(gridpoints)
    }
}
