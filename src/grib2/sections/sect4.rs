use crate::bits::{unpack, unpack_signed};
use crate::error::{GribError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ensemble {
    pub ens_type: u8,
    pub perturb_num: u8,
    pub num_in_ensemble: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedForecast {
    pub code: u8,
    pub num_in_ensemble: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialProcess {
    pub stat_proc: u8,
    pub proc_type: u8,
    pub num_points: u8,
}

/// One time-range specification of a statistical process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRange {
    pub proc_code: u8,
    pub incr_type: u8,
    pub time_unit: u8,
    pub time_length: u32,
    pub incr_unit: u8,
    pub incr_length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatProcess {
    pub eyr: i32,
    pub emo: u32,
    pub edy: u32,
    /// HHMMSS
    pub etime: u32,
    pub nmiss: u32,
    pub ranges: Vec<StatRange>,
}

/// Product Definition Templates 4.0, 4.1, 4.2, 4.8, 4.11, 4.12 and 4.15.
/// All share the parameter/time/level block; the optional tails differ.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub templ_num: u16,
    pub param_cat: u8,
    pub param_num: u8,
    pub gen_proc: u8,
    pub time_unit: u8,
    pub fcst_time: u32,
    pub lvl1_type: u8,
    pub lvl1: f64,
    pub lvl2_type: u8,
    pub lvl2: f64,
    pub ens: Option<Ensemble>,
    pub derived: Option<DerivedForecast>,
    pub stat_proc: Option<StatProcess>,
    pub spatial_proc: Option<SpatialProcess>,
}

fn scaled_level(buffer: &[u8], off: usize) -> f64 {
    let factor = unpack_signed(buffer, off, 8);
    let value = unpack_signed(buffer, off + 8, 32);
    f64::from(value) / 10f64.powi(factor)
}

fn stat_process(buffer: &[u8], off: usize) -> StatProcess {
    let hh = unpack(buffer, off + 32, 8);
    let mm = unpack(buffer, off + 40, 8);
    let ss = unpack(buffer, off + 48, 8);
    let num_ranges = unpack(buffer, off + 56, 8) as usize;
    let nmiss = unpack(buffer, off + 64, 32);
    let mut ranges = Vec::with_capacity(num_ranges);
    let mut range_off = off + 96;
    for _ in 0..num_ranges {
        ranges.push(StatRange {
            proc_code: unpack(buffer, range_off, 8) as u8,
            incr_type: unpack(buffer, range_off + 8, 8) as u8,
            time_unit: unpack(buffer, range_off + 16, 8) as u8,
            time_length: unpack(buffer, range_off + 24, 32),
            incr_unit: unpack(buffer, range_off + 56, 8) as u8,
            incr_length: unpack(buffer, range_off + 64, 32),
        });
        range_off += 96;
    }
    StatProcess {
        eyr: unpack(buffer, off, 16) as i32,
        emo: unpack(buffer, off + 16, 8),
        edy: unpack(buffer, off + 24, 8),
        etime: hh * 10000 + mm * 100 + ss,
        nmiss,
        ranges,
    }
}

impl Product {
    pub(crate) fn decode(buffer: &[u8], off: usize) -> Result<Self> {
        let num_coords = unpack(buffer, off + 40, 16);
        if num_coords > 0 {
            return Err(GribError::UnsupportedPacking(String::from(
                "hybrid vertical coordinates",
            )));
        }
        let templ_num = unpack(buffer, off + 56, 16) as u16;
        if !matches!(templ_num, 0 | 1 | 2 | 8 | 11 | 12 | 15) {
            return Err(GribError::UnsupportedProductTemplate(templ_num));
        }
        let mut product = Product {
            templ_num,
            param_cat: unpack(buffer, off + 72, 8) as u8,
            param_num: unpack(buffer, off + 80, 8) as u8,
            gen_proc: unpack(buffer, off + 88, 8) as u8,
            time_unit: unpack(buffer, off + 136, 8) as u8,
            fcst_time: unpack(buffer, off + 144, 32),
            lvl1_type: unpack(buffer, off + 176, 8) as u8,
            lvl1: scaled_level(buffer, off + 184),
            lvl2_type: unpack(buffer, off + 224, 8) as u8,
            lvl2: scaled_level(buffer, off + 232),
            ens: None,
            derived: None,
            stat_proc: None,
            spatial_proc: None,
        };
        match templ_num {
            1 | 11 => {
                product.ens = Some(Ensemble {
                    ens_type: unpack(buffer, off + 272, 8) as u8,
                    perturb_num: unpack(buffer, off + 280, 8) as u8,
                    num_in_ensemble: unpack(buffer, off + 288, 8) as u8,
                });
                if templ_num == 11 {
                    product.stat_proc = Some(stat_process(buffer, off + 296));
                }
            }
            2 | 12 => {
                product.derived = Some(DerivedForecast {
                    code: unpack(buffer, off + 272, 8) as u8,
                    num_in_ensemble: unpack(buffer, off + 280, 8) as u8,
                });
                if templ_num == 12 {
                    product.stat_proc = Some(stat_process(buffer, off + 288));
                }
            }
            8 => {
                product.stat_proc = Some(stat_process(buffer, off + 272));
            }
            15 => {
                product.spatial_proc = Some(SpatialProcess {
                    stat_proc: unpack(buffer, off + 272, 8) as u8,
                    proc_type: unpack(buffer, off + 280, 8) as u8,
                    num_points: unpack(buffer, off + 288, 8) as u8,
                });
            }
            _ => {}
        }
        Ok(product)
    }
}
