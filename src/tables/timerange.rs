//! Time-range / statistical-process translation.

use chrono::NaiveDate;

use crate::error::{GribError, Result};
use crate::grib2::sections::sect1::Identification;
use crate::grib2::sections::sect4::Product;

/// NCEP CFSR monthly products: statistical process code → GRIB1 time-range
/// indicator, for the two-range form of templates 4.8/4.11/4.12.
const CFSR_MONTHLY: &[(u8, u8)] = &[
    (193, 113),
    (194, 123),
    (195, 128),
    (196, 129),
    (197, 130),
    (198, 131),
    (199, 132),
    (200, 133),
    (201, 134),
    (202, 135),
    (203, 136),
    (204, 137),
    (205, 138),
    (206, 139),
    (207, 140),
];

/// GRIB1 time ranges {0,1,10} carry a plain forecast (template 4.0);
/// {2,3,4} carry one statistical range (template 4.8).
pub fn grib2_template(t_range: u8) -> Result<u16> {
    match t_range {
        0 | 1 | 10 => Ok(0),
        2 | 3 | 4 => Ok(8),
        other => Err(GribError::UnmappedProcess(format!(
            "time range indicator {}",
            other
        ))),
    }
}

/// The statistical process of a GRIB1 aggregation, derived from the time
/// range and, failing that, the parameter (max/min temperature).
/// Returns (process code, time-increment type).
pub fn statistical_process(t_range: u8, param: u8) -> Result<(u8, u8)> {
    if t_range == 4 {
        return Ok((1, 2)); // accumulation
    }
    match param {
        15 => Ok((2, 2)), // maximum temperature
        16 => Ok((3, 2)), // minimum temperature
        _ => Err(GribError::UnmappedProcess(format!(
            "statistical process type for parameter code {}",
            param
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grib1TimeRange {
    pub p1: i64,
    pub p2: i64,
    pub t_range: u8,
    pub n_avg: u32,
    pub n_missing: u32,
}

fn to_datetime(yr: i32, mo: u32, dy: u32, hhmmss: u32) -> Result<chrono::NaiveDateTime> {
    NaiveDate::from_ymd_opt(yr, mo, dy)
        .and_then(|d| d.and_hms_opt(hhmmss / 10000, hhmmss / 100 % 100, hhmmss % 100))
        .ok_or_else(|| {
            GribError::InvariantViolation(format!(
                "bad statistical time {:04}-{:02}-{:02} {:06}",
                yr, mo, dy, hhmmss
            ))
        })
}

/// End-of-aggregation minus reference time, expressed in the product's own
/// time unit.
fn statistical_end_offset(ident: &Identification, product: &Product) -> Result<i64> {
    let stat = product.stat_proc.as_ref().ok_or_else(|| {
        GribError::InvariantViolation(String::from("statistical template without ranges"))
    })?;
    match product.time_unit {
        0 | 1 | 2 => {
            let start = to_datetime(ident.yr, ident.mo, ident.dy, ident.time)?;
            let end = to_datetime(stat.eyr, stat.emo, stat.edy, stat.etime)?;
            let span = end - start;
            Ok(match product.time_unit {
                0 => span.num_minutes(),
                1 => span.num_hours(),
                _ => span.num_days(),
            })
        }
        3 => Ok(i64::from(stat.eyr - ident.yr) * 12 + i64::from(stat.emo) - i64::from(ident.mo)),
        4 => Ok(i64::from(stat.eyr - ident.yr)),
        other => Err(GribError::UnmappedProcess(format!(
            "end time with units {}",
            other
        ))),
    }
}

/// GRIB2 → GRIB1 time descriptor for one grid.
pub fn grib1_time_range(
    ident: &Identification,
    product: &Product,
    discipline: u8,
) -> Result<Grib1TimeRange> {
    match product.templ_num {
        0 | 1 | 2 | 15 => Ok(Grib1TimeRange {
            p1: i64::from(product.fcst_time),
            p2: 0,
            t_range: if product.time_unit == 0 { 10 } else { 0 },
            n_avg: 0,
            n_missing: 0,
        }),
        8 | 11 | 12 => {
            let stat = product.stat_proc.as_ref().ok_or_else(|| {
                GribError::InvariantViolation(String::from("statistical template without ranges"))
            })?;
            if stat.ranges.is_empty() {
                return Err(GribError::InvariantViolation(String::from(
                    "statistical template with zero ranges",
                )));
            }
            if stat.ranges.len() > 1 {
                if ident.center_id == 7 && stat.ranges.len() == 2 {
                    // NCEP CFSR monthly grids
                    let t_range = CFSR_MONTHLY
                        .iter()
                        .find(|row| row.0 == stat.ranges[0].proc_code)
                        .map(|row| row.1)
                        .ok_or_else(|| {
                            GribError::UnmappedProcess(format!(
                                "NCEP statistical process code {}",
                                stat.ranges[0].proc_code
                            ))
                        })?;
                    let p2 = i64::from(stat.ranges[0].incr_length);
                    return Ok(Grib1TimeRange {
                        p1: p2 - i64::from(stat.ranges[1].time_length),
                        p2,
                        t_range,
                        n_avg: stat.ranges[0].time_length,
                        n_missing: stat.nmiss,
                    });
                }
                return Err(GribError::UnmappedProcess(String::from(
                    "multiple statistical processes",
                )));
            }
            let range = &stat.ranges[0];
            let t_range = match range.proc_code {
                0 => 3, // average
                1 => 4, // accumulation
                4 => 5, // difference
                2 | 3 => 2,
                // NCEP encodes max/min temperature with a missing process
                255 if ident.center_id == 7
                    && discipline == 0
                    && product.param_cat == 0
                    && matches!(product.param_num, 4 | 5) =>
                {
                    2
                }
                other => {
                    return Err(GribError::UnmappedProcess(format!(
                        "statistical process {}",
                        other
                    )));
                }
            };
            if range.incr_length != 0 {
                return Err(GribError::UnmappedProcess(String::from(
                    "discrete processing",
                )));
            }
            Ok(Grib1TimeRange {
                p1: i64::from(product.fcst_time),
                p2: statistical_end_offset(ident, product)?,
                t_range,
                n_avg: 0,
                n_missing: stat.nmiss,
            })
        }
        other => Err(GribError::UnsupportedProductTemplate(other)),
    }
}
