use crate::error::{GribError, Result};
use crate::grib2::sections::sect7::DataDecoder;
use crate::grib2::GridMetadata;
use crate::GRIB_MISSING;

/// External JPEG 2000 collaborator for Data Representation Templates 5.40
/// and 5.40000. The codec hands over the raw Data Section payload starting
/// at the code-stream header and expects one grayscale sample per packed
/// point. Implementations must reject multi-component imagery with an error
/// distinguishable from a plain decode failure.
pub trait Jpeg2000Decoder {
    fn decode(&self, payload: &[u8], width: usize, height: usize) -> Result<Vec<u32>>;
}

pub(crate) struct Jpeg2000PackingDecoder<'a> {
    pub(crate) decoder: Option<&'a dyn Jpeg2000Decoder>,
}

impl DataDecoder for Jpeg2000PackingDecoder<'_> {
    fn decode(&self, md: &GridMetadata, body: &[u8]) -> Result<Vec<f64>> {
        let repr = &md.repr;
        let (nx, ny) = md.grid.shape();
        let num_points = nx * ny;
        let e = 2f64.powi(repr.e);
        let d = 10f64.powi(repr.d);

        // an empty code stream is a constant field; the collaborator is not
        // consulted
        let samples = if body.is_empty() {
            Vec::new()
        } else {
            let decoder = self
                .decoder
                .ok_or(GribError::UnsupportedDataTemplate(repr.templ_num))?;
            decoder.decode(body, nx, ny)?
        };

        let mut gridpoints = Vec::with_capacity(num_points);
        let mut cnt = 0usize;
        for n in 0..num_points {
            let present = match md.bitmap.as_ref() {
                Some(bitmap) => bitmap.get(n) == Some(&1),
                None => true,
            };
            if present {
                let sample = if samples.is_empty() {
                    0
                } else {
                    *samples.get(cnt).ok_or_else(|| {
                        GribError::Jpeg2000(format!(
                            "code stream yielded {} samples for {} unmasked points",
                            samples.len(),
                            cnt + 1
                        ))
                    })?
                };
                cnt += 1;
                gridpoints.push(repr.r + f64::from(sample) * e / d);
            } else {
                gridpoints.push(GRIB_MISSING);
            }
        }
        Ok(gridpoints)
    }
}
