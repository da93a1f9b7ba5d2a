//! Level-type translation.
//!
//! GRIB1 packs a level type plus one 16-bit value or two 8-bit bounds;
//! GRIB2 carries two independently scaled surfaces. Both directions are
//! total over the code sets the converter understands and explicit about
//! everything else.

use crate::error::{GribError, Result};

/// A GRIB2 (first surface, second surface) pair. A `lvl2_scale` of `None`
/// packs the missing-scale octet 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grib2Level {
    pub lvl1_type: u8,
    pub lvl1_scale: i32,
    pub lvl1_value: i64,
    pub lvl2_type: u8,
    pub lvl2_scale: Option<i32>,
    pub lvl2_value: i64,
}

/// GRIB1 → GRIB2. Aggregated layer codes split into two surfaces with
/// independent scales; single-surface codes leave the second surface
/// missing (type 255).
pub fn grib2_level(level_type: u8, lvl1: u32, lvl2: u32) -> Grib2Level {
    let lvl1 = i64::from(lvl1);
    let lvl2 = i64::from(lvl2);
    let single = |lvl1_type: u8, scale: i32, value: i64| Grib2Level {
        lvl1_type,
        lvl1_scale: scale,
        lvl1_value: value,
        lvl2_type: 255,
        lvl2_scale: None,
        lvl2_value: lvl2,
    };
    let layer = |lvl_type: u8, scale1: i32, value1: i64, scale2: i32, value2: i64| Grib2Level {
        lvl1_type: lvl_type,
        lvl1_scale: scale1,
        lvl1_value: value1,
        lvl2_type: lvl_type,
        lvl2_scale: Some(scale2),
        lvl2_value: value2,
    };
    match level_type {
        20 | 100 => single(level_type, -2, lvl1),
        101 => layer(100, -3, lvl1, -3, lvl2),
        102 => single(101, 0, lvl1),
        103 => single(102, 0, lvl1),
        104 => layer(102, -2, lvl1, -2, lvl2),
        105 => single(103, 0, lvl1),
        106 => layer(103, -2, lvl1, -2, lvl2),
        107 => single(104, 4, lvl1),
        108 => layer(104, 2, lvl1, 2, lvl2),
        109 => single(105, 0, lvl1),
        110 => layer(105, 0, lvl1, 0, lvl2),
        111 => single(106, 2, lvl1),
        112 => layer(106, 2, lvl1, 2, lvl2),
        113 => single(107, 0, lvl1),
        114 => layer(107, 0, 475 - lvl1, 0, 475 - lvl2),
        115 => single(108, -2, lvl1),
        116 => layer(108, -2, lvl1, -2, lvl2),
        117 => single(109, 9, lvl1),
        119 => single(111, 4, lvl1),
        120 => layer(111, 2, lvl1, 2, lvl2),
        121 => layer(100, -2, 1100 - lvl1, -2, 1100 - lvl2),
        125 => single(103, 2, lvl1),
        128 => layer(104, 3, 1100 - lvl1, 3, 1100 - lvl2),
        141 => layer(100, -3, lvl1, -2, 1100 - lvl2),
        other => single(other, 0, lvl1),
    }
}

/// GRIB2 → GRIB1: (level type, level 1, level 2). A second surface of a
/// different type than the first has no GRIB1 encoding; neither does the
/// mixed layer depth (GRIB2 type 117) or any unknown type.
pub fn grib1_level(lvl1_type: u8, lvl2_type: u8, lvl1: f64, lvl2: f64, center: u16) -> Result<(u8, i64, i64)> {
    if lvl2_type != 255 && lvl1_type != lvl2_type {
        return Err(GribError::InvariantViolation(format!(
            "layer bounded by different level types {} and {}",
            lvl1_type, lvl2_type
        )));
    }
    let single = lvl2_type == 255;
    let mapped = match lvl1_type {
        1..=9 | 20 => (lvl1_type, 0, 0),
        100 => {
            if single {
                (100, (lvl1 / 100.0) as i64, 0)
            } else {
                (101, (lvl1 / 1000.0) as i64, (lvl2 / 1000.0) as i64)
            }
        }
        101 => (102, 0, 0),
        102 => {
            if single {
                (103, lvl1 as i64, 0)
            } else {
                (104, (lvl1 / 100.0) as i64, (lvl2 / 100.0) as i64)
            }
        }
        103 => {
            if single {
                (105, lvl1 as i64, 0)
            } else {
                (106, (lvl1 / 100.0) as i64, (lvl2 / 100.0) as i64)
            }
        }
        104 => {
            if single {
                (107, (lvl1 * 10000.0) as i64, 0)
            } else {
                (108, (lvl1 * 100.0) as i64, (lvl2 * 100.0) as i64)
            }
        }
        105 => {
            if single {
                (109, lvl1 as i64, 0)
            } else {
                (110, lvl1 as i64, lvl2 as i64)
            }
        }
        106 => {
            if single {
                (111, (lvl1 * 100.0) as i64, 0)
            } else {
                (112, (lvl1 * 100.0) as i64, (lvl2 * 100.0) as i64)
            }
        }
        107 => {
            if single {
                (113, lvl1 as i64, 0)
            } else {
                (114, (475.0 - lvl1) as i64, (475.0 - lvl2) as i64)
            }
        }
        108 => {
            if single {
                (115, (lvl1 / 100.0) as i64, 0)
            } else {
                (116, (lvl1 / 100.0) as i64, (lvl2 / 100.0) as i64)
            }
        }
        109 => (117, (lvl1 * 1.0e9) as i64, 0),
        111 => {
            if single {
                (119, (lvl1 * 10000.0) as i64, 0)
            } else {
                (120, (lvl1 * 100.0) as i64, (lvl2 * 100.0) as i64)
            }
        }
        160 => (160, lvl1 as i64, 0),
        200 if center == 7 => (200, 0, 0),
        other => return Err(GribError::UnmappedLevel(other)),
    };
    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isobaric_levels_change_units() {
        // GRIB1 stores hPa, GRIB2 pascals
        let fwd = grib2_level(100, 500, 0);
        assert_eq!((fwd.lvl1_type, fwd.lvl1_scale, fwd.lvl1_value), (100, -2, 500));
        assert_eq!(fwd.lvl2_type, 255);
        assert_eq!(grib1_level(100, 255, 50000.0, 0.0, 7).unwrap(), (100, 500, 0));
    }

    #[test]
    fn isobaric_layers_scale_by_kilopascals() {
        let fwd = grib2_level(101, 100, 50);
        assert_eq!((fwd.lvl1_type, fwd.lvl1_scale, fwd.lvl1_value), (100, -3, 100));
        assert_eq!((fwd.lvl2_type, fwd.lvl2_scale, fwd.lvl2_value), (100, Some(-3), 50));
        assert_eq!(
            grib1_level(100, 100, 100_000.0, 50_000.0, 7).unwrap(),
            (101, 100, 50)
        );
    }

    #[test]
    fn height_levels_round_trip() {
        let fwd = grib2_level(105, 2, 0);
        assert_eq!((fwd.lvl1_type, fwd.lvl1_scale, fwd.lvl1_value), (103, 0, 2));
        assert_eq!(grib1_level(103, 255, 2.0, 0.0, 7).unwrap(), (105, 2, 0));
    }

    #[test]
    fn sigma_layers_keep_both_bounds() {
        let fwd = grib2_level(108, 850, 1000);
        assert_eq!((fwd.lvl1_type, fwd.lvl1_scale, fwd.lvl1_value), (104, 2, 850));
        assert_eq!((fwd.lvl2_type, fwd.lvl2_scale, fwd.lvl2_value), (104, Some(2), 1000));
        assert_eq!(
            grib1_level(104, 104, 8.50, 10.0, 7).unwrap(),
            (108, 850, 1000)
        );
    }

    #[test]
    fn mixed_layer_depth_has_no_equivalent() {
        assert!(matches!(
            grib1_level(117, 255, 10.0, 0.0, 7),
            Err(GribError::UnmappedLevel(117))
        ));
    }

    #[test]
    fn unknown_types_are_refused() {
        assert!(grib1_level(23, 255, 0.0, 0.0, 7).is_err());
        assert!(grib1_level(200, 255, 0.0, 0.0, 98).is_err());
        assert_eq!(grib1_level(200, 255, 0.0, 0.0, 7).unwrap(), (200, 0, 0));
    }

    #[test]
    fn mismatched_layer_bounds_are_refused() {
        assert!(grib1_level(100, 103, 0.0, 0.0, 7).is_err());
    }
}
