use crate::bits::{unpack, unpack_signed};
use crate::error::{GribError, Result};
use crate::grib2::sections::sect7::DataDecoder;
use crate::grib2::GridMetadata;
use crate::GRIB_MISSING;

/// Data Representation Template 5.3: group-split packing with optional
/// spatial differencing. Groups carry raw differences; reconstruction runs
/// the inverse differencing over non-missing positions only, then applies
/// the `R + raw * 2^E / 10^D` scaling as a cumulative pass.
pub(crate) struct ComplexPackingDecoder;

fn ensure_bits(body: &[u8], end: usize) -> Result<()> {
    if end > body.len() * 8 {
        return Err(GribError::TruncatedMessage {
            expected: (end + 7) / 8,
            got: body.len(),
        });
    }
    Ok(())
}

fn byte_align(off: usize) -> usize {
    (off + 7) / 8 * 8
}

impl DataDecoder for ComplexPackingDecoder {
    fn decode(&self, md: &GridMetadata, body: &[u8]) -> Result<Vec<f64>> {
        let repr = &md.repr;
        let cp = repr.complex.as_ref().ok_or_else(|| {
            GribError::InvariantViolation(String::from("complex packing descriptors missing"))
        })?;
        let num_points = md.grid.num_points();
        let mut gridpoints = vec![GRIB_MISSING; num_points];
        if cp.num_groups == 0 {
            return Ok(gridpoints);
        }

        let e = 2f64.powi(repr.e);
        let d = 10f64.powi(repr.d);
        let mut off = 0usize;

        let vals_bits = cp.spatial_vals_width * 8;
        if vals_bits > 32 {
            return Err(GribError::UnsupportedPacking(format!(
                "{}-octet spatial difference values",
                cp.spatial_vals_width
            )));
        }
        let mut first_vals = Vec::with_capacity(cp.spatial_order);
        for _ in 0..cp.spatial_order {
            ensure_bits(body, off + vals_bits)?;
            first_vals.push(i64::from(unpack_signed(body, off, vals_bits)));
            off += vals_bits;
        }
        ensure_bits(body, off + vals_bits)?;
        let omin = i64::from(unpack_signed(body, off, vals_bits));
        off += vals_bits;

        ensure_bits(body, off + cp.num_groups * repr.pack_width)?;
        let mut refs = Vec::with_capacity(cp.num_groups);
        for _ in 0..cp.num_groups {
            refs.push(i64::from(unpack(body, off, repr.pack_width)));
            off += repr.pack_width;
        }
        off = byte_align(off);

        ensure_bits(body, off + cp.num_groups * cp.width_pack_width)?;
        let mut widths = Vec::with_capacity(cp.num_groups);
        for _ in 0..cp.num_groups {
            widths.push(i64::from(cp.width_ref) as usize + unpack(body, off, cp.width_pack_width) as usize);
            off += cp.width_pack_width;
        }
        off = byte_align(off);

        ensure_bits(body, off + cp.num_groups * cp.length_pack_width)?;
        let mut lengths = Vec::with_capacity(cp.num_groups);
        for _ in 0..cp.num_groups {
            lengths.push(unpack(body, off, cp.length_pack_width) as usize);
            off += cp.length_pack_width;
        }
        off = byte_align(off);
        for length in lengths.iter_mut().take(cp.num_groups - 1) {
            *length = cp.length_ref as usize + *length * cp.length_incr as usize;
        }
        lengths[cp.num_groups - 1] = cp.length_last as usize;

        // expand the field of differences
        let group_miss = |width: usize| -> Option<i64> {
            if cp.miss_val_mgmt > 0 {
                Some((1i64 << width) - 1)
            } else {
                None
            }
        };
        let mut idx = 0usize;
        for g in 0..cp.num_groups {
            if idx + lengths[g] > num_points {
                return Err(GribError::InvariantViolation(format!(
                    "group lengths cover {} points of a {}-point grid",
                    idx + lengths[g],
                    num_points
                )));
            }
            if widths[g] > 32 {
                return Err(GribError::UnsupportedPacking(format!(
                    "{}-bit group values",
                    widths[g]
                )));
            }
            if widths[g] > 0 {
                ensure_bits(body, off + lengths[g] * widths[g])?;
                let miss = group_miss(widths[g]);
                for _ in 0..lengths[g] {
                    let packed = i64::from(unpack(body, off, widths[g]));
                    off += widths[g];
                    let masked = md.bitmap.as_ref().map(|b| b.get(idx) != Some(&1)).unwrap_or(false);
                    if masked || miss == Some(packed) {
                        gridpoints[idx] = GRIB_MISSING;
                    } else {
                        gridpoints[idx] = (packed + refs[g] + omin) as f64;
                    }
                    idx += 1;
                }
            } else {
                let miss = group_miss(repr.pack_width);
                for _ in 0..lengths[g] {
                    let masked = md.bitmap.as_ref().map(|b| b.get(idx) != Some(&1)).unwrap_or(false);
                    if masked || miss == Some(refs[g]) {
                        gridpoints[idx] = GRIB_MISSING;
                    } else {
                        gridpoints[idx] = (refs[g] + omin) as f64;
                    }
                    idx += 1;
                }
            }
        }

        // inverse spatial differencing, non-missing positions only
        for pass in (1..cp.spatial_order).rev() {
            let mut last = (first_vals[pass] - first_vals[pass - 1]) as f64;
            let mut non_missing = 0usize;
            for v in gridpoints.iter_mut() {
                if *v != GRIB_MISSING {
                    if non_missing >= cp.spatial_order {
                        *v += last;
                        last = *v;
                    }
                    non_missing += 1;
                }
            }
        }

        // anchor the first values, cumulative-sum the rest into real units
        let mut last = 0f64;
        let mut non_missing = 0usize;
        for v in gridpoints.iter_mut() {
            if *v != GRIB_MISSING {
                if non_missing < cp.spatial_order {
                    *v = repr.r + first_vals[non_missing] as f64 * e / d;
                    last = repr.r * d / e + first_vals[non_missing] as f64;
                } else {
                    last += *v;
                    *v = last * e / d;
                }
                non_missing += 1;
            }
        }
        Ok(gridpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grib2::sections::sect3::{Grid, LatLonGrid};
    use crate::grib2::sections::sect4::Product;
    use crate::grib2::sections::sect5::{ComplexPacking, DataRepresentation};

    fn metadata(miss_val_mgmt: u8) -> GridMetadata {
        GridMetadata {
            grid: Grid::LatLon(LatLonGrid {
                earth_shape: 6,
                nx: 3,
                ny: 2,
                slat: 0.0,
                slon: 0.0,
                rescomp: 0,
                elat: 0.0,
                elon: 0.0,
                loinc: 1.0,
                lainc: 1.0,
                scan_mode: 0,
            }),
            product: Product {
                templ_num: 0,
                param_cat: 0,
                param_num: 0,
                gen_proc: 0,
                time_unit: 1,
                fcst_time: 0,
                lvl1_type: 1,
                lvl1: 0.0,
                lvl2_type: 255,
                lvl2: 0.0,
                ens: None,
                derived: None,
                stat_proc: None,
                spatial_proc: None,
            },
            repr: DataRepresentation {
                templ_num: 3,
                num_packed: 6,
                r: 0.0,
                e: 0,
                d: 0,
                pack_width: 8,
                orig_val_type: 1,
                complex: Some(ComplexPacking {
                    split_method: 1,
                    miss_val_mgmt,
                    primary_miss_sub: 0.0,
                    secondary_miss_sub: 0.0,
                    num_groups: 2,
                    width_ref: 0,
                    width_pack_width: 8,
                    length_ref: 2,
                    length_incr: 1,
                    length_last: 4,
                    length_pack_width: 8,
                    spatial_order: 2,
                    spatial_vals_width: 1,
                }),
            },
            bitmap: None,
        }
    }

    // first values 10, 12; overall minimum -1; constant group (ref 5) of
    // length 2; one width-8 group (ref 1) holding second differences
    // 3, 0, 2, 1.
    const BODY: [u8; 12] = [
        0x0a, 0x0c, 0x81, // first_vals, omin
        0x05, 0x01, // group references
        0x00, 0x08, // group widths
        0x00, // scaled group lengths (first group only)
        0x03, 0x00, 0x02, 0x01, // packed second differences
    ];

    #[test]
    fn reconstructs_second_order_differences() -> anyhow::Result<()> {
        let md = metadata(0);
        let points = ComplexPackingDecoder.decode(&md, &BODY)?;
        assert_eq!(points, vec![10.0, 12.0, 17.0, 22.0, 29.0, 37.0]);
        Ok(())
    }

    #[test]
    fn group_missing_sentinel_is_skipped_by_the_summation() -> anyhow::Result<()> {
        let md = metadata(1);
        let mut body = BODY;
        body[9] = 0xff; // second packed value becomes the width-8 sentinel
        let points = ComplexPackingDecoder.decode(&md, &body)?;
        assert_eq!(points, vec![10.0, 12.0, 17.0, GRIB_MISSING, 24.0, 32.0]);
        Ok(())
    }

    #[test]
    fn zero_groups_means_all_missing() -> anyhow::Result<()> {
        let mut md = metadata(0);
        md.repr.complex.as_mut().unwrap().num_groups = 0;
        let points = ComplexPackingDecoder.decode(&md, &BODY)?;
        assert_eq!(points, vec![GRIB_MISSING; 6]);
        Ok(())
    }
}
