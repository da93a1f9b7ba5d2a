use crate::bits::{unpack, unpack_signed};
use crate::error::{GribError, Result};

/// Extra descriptors for Data Representation Template 5.3 (complex packing
/// with spatial differencing).
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexPacking {
    pub split_method: u8,
    pub miss_val_mgmt: u8,
    pub primary_miss_sub: f64,
    pub secondary_miss_sub: f64,
    pub num_groups: usize,
    pub width_ref: u32,
    pub width_pack_width: usize,
    pub length_ref: u32,
    pub length_incr: u32,
    pub length_last: u32,
    pub length_pack_width: usize,
    pub spatial_order: usize,
    pub spatial_vals_width: usize,
}

/// Data Representation Templates 5.0, 5.3, 5.40 and 5.40000. The leading
/// fields are shared; 40/40000 signal a JPEG 2000 payload in section 7.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRepresentation {
    pub templ_num: u16,
    pub num_packed: usize,
    /// Reference value, already divided by 10^D.
    pub r: f64,
    pub e: i32,
    pub d: i32,
    pub pack_width: usize,
    pub orig_val_type: u8,
    pub complex: Option<ComplexPacking>,
}

impl DataRepresentation {
    pub(crate) fn decode(buffer: &[u8], off: usize) -> Result<Self> {
        let num_packed = unpack(buffer, off + 40, 32) as usize;
        let templ_num = unpack(buffer, off + 72, 16) as u16;
        if !matches!(templ_num, 0 | 3 | 40 | 40000) {
            return Err(GribError::UnsupportedDataTemplate(templ_num));
        }
        let raw_r = f64::from(f32::from_bits(unpack(buffer, off + 88, 32)));
        let e = unpack_signed(buffer, off + 120, 16);
        let d = unpack_signed(buffer, off + 136, 16);
        let pack_width = unpack(buffer, off + 152, 8) as usize;
        if pack_width > 32 {
            return Err(GribError::UnsupportedPacking(format!(
                "{}-bit packed values",
                pack_width
            )));
        }
        let orig_val_type = unpack(buffer, off + 160, 8) as u8;
        let complex = if templ_num == 3 {
            let (primary, secondary) = match orig_val_type {
                0 => (
                    f64::from(f32::from_bits(unpack(buffer, off + 184, 32))),
                    f64::from(f32::from_bits(unpack(buffer, off + 216, 32))),
                ),
                1 => (
                    f64::from(unpack(buffer, off + 184, 32)),
                    f64::from(unpack(buffer, off + 216, 32)),
                ),
                other => {
                    return Err(GribError::UnsupportedPacking(format!(
                        "missing value substitutes for original value type {}",
                        other
                    )));
                }
            };
            Some(ComplexPacking {
                split_method: unpack(buffer, off + 168, 8) as u8,
                miss_val_mgmt: unpack(buffer, off + 176, 8) as u8,
                primary_miss_sub: primary,
                secondary_miss_sub: secondary,
                num_groups: unpack(buffer, off + 248, 32) as usize,
                width_ref: unpack(buffer, off + 280, 8),
                width_pack_width: unpack(buffer, off + 288, 8) as usize,
                length_ref: unpack(buffer, off + 296, 32),
                length_incr: unpack(buffer, off + 328, 8),
                length_last: unpack(buffer, off + 336, 32),
                length_pack_width: unpack(buffer, off + 368, 8) as usize,
                spatial_order: unpack(buffer, off + 376, 8) as usize,
                spatial_vals_width: unpack(buffer, off + 384, 8) as usize,
            })
        } else {
            None
        };
        Ok(Self {
            templ_num,
            num_packed,
            r: raw_r / 10f64.powi(d),
            e,
            d,
            pack_width,
            orig_val_type,
            complex,
        })
    }
}
