use crate::bits::unpack;
use crate::error::{GribError, Result};

/// What a Bit-Map Section does to the message-wide bitmap slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitmapUpdate {
    /// Indicator 0: an explicit bitmap, one byte per bit.
    Explicit(Vec<u8>),
    /// Indicator 254: the previously defined bitmap applies.
    ReusePrevious,
    /// Indicator 255: no bitmap.
    None,
}

pub(crate) fn decode(buffer: &[u8], off: usize, section_len: usize) -> Result<BitmapUpdate> {
    let indicator = unpack(buffer, off + 40, 8);
    match indicator {
        0 => {
            if section_len < 6 {
                return Err(GribError::InvariantViolation(format!(
                    "bit-map section declares {} octets",
                    section_len
                )));
            }
            let num_bits = (section_len - 6) * 8;
            let mut bitmap = Vec::with_capacity(num_bits);
            for n in 0..num_bits {
                bitmap.push(unpack(buffer, off + 48 + n, 1) as u8);
            }
            Ok(BitmapUpdate::Explicit(bitmap))
        }
        254 => Ok(BitmapUpdate::ReusePrevious),
        255 => Ok(BitmapUpdate::None),
        other => Err(GribError::UnsupportedPacking(format!(
            "predefined bit-map {}",
            other
        ))),
    }
}
