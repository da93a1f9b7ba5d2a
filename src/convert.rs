use std::io::{Read, Write};

use crate::error::{GribError, Result};
use crate::grib1;
use crate::grib2;
use crate::grib2::sections::sect7::jpeg2000::Jpeg2000Decoder;

/// Pumps a GRIB2 stream into a GRIB1 stream, one output message per grid.
/// Returns the number of grids written.
pub fn grib2_to_grib1<R: Read, W: Write>(input: R, output: W) -> Result<u64> {
    grib2_to_grib1_with(grib2::Reader::new(input), output)
}

/// Same pump with a JPEG 2000 collaborator installed for DRS templates
/// 40/40000.
pub fn grib2_to_grib1_with_jpeg2000<R: Read, W: Write>(
    input: R,
    output: W,
    decoder: Box<dyn Jpeg2000Decoder>,
) -> Result<u64> {
    grib2_to_grib1_with(grib2::Reader::new(input).with_jpeg2000(decoder), output)
}

fn grib2_to_grib1_with<R: Read, W: Write>(mut reader: grib2::Reader<R>, mut output: W) -> Result<u64> {
    let mut encoder = grib1::encode::Encoder::new();
    let mut grids = 0u64;
    loop {
        let msg = match reader.read_message() {
            Ok(msg) => msg,
            Err(GribError::Eof) => break,
            Err(err) => return Err(err),
        };
        for grid in &msg.grids {
            output.write_all(encoder.encode(&msg, grid)?)?;
            grids += 1;
        }
    }
    output.flush()?;
    Ok(grids)
}

/// Pumps a GRIB1 stream into a GRIB2 stream. Returns the number of
/// messages written.
pub fn grib1_to_grib2<R: Read, W: Write>(input: R, mut output: W) -> Result<u64> {
    let mut reader = grib1::Reader::new(input);
    let mut encoder = grib2::encode::Encoder::new();
    let mut messages = 0u64;
    loop {
        let msg = match reader.read_message() {
            Ok(msg) => msg,
            Err(GribError::Eof) => break,
            Err(err) => return Err(err),
        };
        output.write_all(encoder.encode(&msg)?)?;
        messages += 1;
    }
    output.flush()?;
    Ok(messages)
}
