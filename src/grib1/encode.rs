use log::warn;

use crate::bits::{pack, pack_signed};
use crate::error::{GribError, Result};
use crate::grib2::sections::sect3::Grid;
use crate::grib2::{GridField, Message as Grib2Message};
use crate::ibm;
use crate::tables::{level, param, timerange};
use crate::GRIB_MISSING;

/// Writes one GRIB1 message per GRIB2 grid. The scratch buffer grows
/// monotonically; the one-time notices about PDS octets 41..43 are tracked
/// per encoder session.
#[derive(Default)]
pub struct Encoder {
    buffer: Vec<u8>,
    warned_pds_ext: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates `grid` and returns the complete GRIB1 message, indicator
    /// and end sections included. The returned slice borrows the encoder's
    /// scratch buffer.
    pub fn encode(&mut self, msg: &Grib2Message, grid: &GridField) -> Result<&[u8]> {
        let product = &grid.metadata.product;
        let repr = &grid.metadata.repr;

        let pds_len = match product.templ_num {
            0 | 8 => 28,
            1 | 11 => 43,
            2 | 12 => 42,
            15 => 43,
            other => return Err(GribError::UnsupportedProductTemplate(other)),
        };
        let gds_len = match grid.metadata.grid {
            Grid::LatLon(_) => 32,
            Grid::Lambert(_) => 42,
            ref other => {
                return Err(GribError::UnsupportedGridTemplate(other.template_number()));
            }
        };
        let num_points = grid.metadata.grid.num_points();
        if grid.gridpoints.len() != num_points {
            return Err(GribError::InvariantViolation(format!(
                "{} gridpoints for a {}-point grid",
                grid.gridpoints.len(),
                num_points
            )));
        }

        let (bms_len, num_to_pack) = match grid.metadata.bitmap.as_ref() {
            Some(bitmap) => (
                6 + (num_points + 7) / 8,
                bitmap.iter().take(num_points).filter(|&&b| b == 1).count(),
            ),
            None => (0, num_points),
        };

        // requantize against the original reference value and scales
        let d = 10f64.powi(repr.d);
        let e = 2f64.powi(repr.e);
        let mut pvals = Vec::with_capacity(num_to_pack);
        let mut max_pack: i64 = 0;
        for &v in &grid.gridpoints {
            if v == GRIB_MISSING {
                continue;
            }
            if pvals.len() == num_to_pack {
                return Err(GribError::InvariantViolation(String::from(
                    "conflicting number of missing gridpoints",
                )));
            }
            let pval = (((v - repr.r) * d / e).round() as i64).max(0);
            max_pack = max_pack.max(pval);
            pvals.push(pval);
        }
        let mut pack_width = 1usize;
        while (1i64 << pack_width) - 1 < max_pack {
            pack_width += 1;
            if pack_width > 32 {
                return Err(GribError::InvariantViolation(format!(
                    "packed value {} exceeds 32 bits",
                    max_pack
                )));
            }
        }
        let bds_len = 11 + (num_to_pack * pack_width + 7) / 8;

        let length = pds_len + gds_len + bms_len + bds_len;
        let total = length + 12;
        self.buffer.clear();
        self.buffer.resize(total, 0);
        self.buffer[..4].copy_from_slice(b"GRIB");
        pack(&mut self.buffer, total as u32, 32, 24);
        pack(&mut self.buffer, 1, 56, 8);

        let mut offset = 64;
        self.pack_pds(msg, grid, pds_len, &mut offset)?;
        self.pack_gds(grid, &mut offset);
        if grid.metadata.bitmap.is_some() {
            self.pack_bms(grid, num_points, &mut offset);
        }
        self.pack_bds(grid, &pvals, pack_width, bds_len, offset)?;
        self.buffer[total - 4..].copy_from_slice(b"7777");
        Ok(&self.buffer[..total])
    }

    fn pack_pds(
        &mut self,
        msg: &Grib2Message,
        grid: &GridField,
        pds_len: usize,
        offset: &mut usize,
    ) -> Result<()> {
        let ident = &msg.identification;
        let product = &grid.metadata.product;
        let repr = &grid.metadata.repr;
        let spatial_type = product.spatial_proc.as_ref().map(|s| s.proc_type);
        let (table_ver, param_code) = param::grib1_parameter(
            msg.discipline,
            product.param_cat,
            product.param_num,
            ident.center_id,
            spatial_type,
        )
        .unwrap_or_else(|| {
            warn!(
                "no GRIB1 parameter code for discipline {}, parameter category {}, parameter number {}, center {}; setting to 255",
                msg.discipline, product.param_cat, product.param_num, ident.center_id
            );
            (3, 255)
        });
        let (level_type, level1, level2) = level::grib1_level(
            product.lvl1_type,
            product.lvl2_type,
            product.lvl1,
            product.lvl2,
            ident.center_id,
        )?;
        let range = timerange::grib1_time_range(ident, product, msg.discipline)?;

        let buf = &mut self.buffer;
        let off = *offset;
        pack(buf, pds_len as u32, off, 24);
        pack(buf, u32::from(table_ver), off + 24, 8);
        pack(buf, u32::from(ident.center_id), off + 32, 8);
        pack(buf, u32::from(product.gen_proc), off + 40, 8);
        // grid definition catalog number, 255 because a GDS follows
        pack(buf, 255, off + 48, 8);
        let flag = if grid.metadata.bitmap.is_some() { 0xc0 } else { 0x80 };
        pack(buf, flag, off + 56, 8);
        pack(buf, u32::from(param_code), off + 64, 8);
        pack(buf, u32::from(level_type), off + 72, 8);
        if product.lvl2_type == 255 {
            pack(buf, level1 as u32, off + 80, 16);
        } else {
            pack(buf, level1 as u32, off + 80, 8);
            pack(buf, level2 as u32, off + 88, 8);
        }
        pack(buf, (ident.yr % 100) as u32, off + 96, 8);
        pack(buf, ident.mo, off + 104, 8);
        pack(buf, ident.dy, off + 112, 8);
        pack(buf, ident.time / 10000, off + 120, 8);
        pack(buf, ident.time / 100 % 100, off + 128, 8);
        if product.time_unit == 13 {
            warn!("unable to indicate 'Second' for time unit in GRIB1");
        } else {
            pack(buf, u32::from(product.time_unit), off + 136, 8);
        }
        if range.t_range == 10 {
            pack(buf, range.p1 as u32, off + 144, 16);
        } else {
            pack(buf, range.p1 as u32, off + 144, 8);
            pack(buf, range.p2 as u32, off + 152, 8);
        }
        pack(buf, u32::from(range.t_range), off + 160, 8);
        pack(buf, range.n_avg, off + 168, 16);
        pack(buf, range.n_missing, off + 184, 8);
        pack(buf, (ident.yr / 100 + 1) as u32, off + 192, 8);
        pack(buf, u32::from(ident.sub_center_id), off + 200, 8);
        pack_signed(buf, repr.d, off + 208, 16);
        *offset = off + 224;

        if let Some(ens) = product.ens.as_ref() {
            pack(buf, u32::from(ens.ens_type), *offset + 96, 8);
            pack(buf, u32::from(ens.perturb_num), *offset + 104, 8);
            pack(buf, u32::from(ens.num_in_ensemble), *offset + 112, 8);
            *offset += 120;
            if !self.warned_pds_ext {
                warn!(
                    "the ensemble type code, perturbation number and ensemble size \
                     have been packed in octets 41, 42 and 43 of the GRIB1 PDS"
                );
                self.warned_pds_ext = true;
            }
        } else if let Some(derived) = product.derived.as_ref() {
            pack(buf, u32::from(derived.code), *offset + 96, 8);
            pack(buf, u32::from(derived.num_in_ensemble), *offset + 104, 8);
            *offset += 112;
            if !self.warned_pds_ext {
                warn!(
                    "the derived forecast code and ensemble size have been packed \
                     in octets 41 and 42 of the GRIB1 PDS"
                );
                self.warned_pds_ext = true;
            }
        } else if let Some(spatial) = product.spatial_proc.as_ref() {
            pack(buf, u32::from(spatial.stat_proc), *offset + 96, 8);
            pack(buf, u32::from(spatial.proc_type), *offset + 104, 8);
            pack(buf, u32::from(spatial.num_points), *offset + 112, 8);
            *offset += 120;
            if !self.warned_pds_ext {
                warn!(
                    "the spatial processing codes have been packed in octets 41, \
                     42 and 43 of the GRIB1 PDS"
                );
                self.warned_pds_ext = true;
            }
        }
        Ok(())
    }

    fn pack_gds(&mut self, grid: &GridField, offset: &mut usize) {
        let buf = &mut self.buffer;
        let off = *offset;
        // no vertical coordinate parameters
        pack(buf, 255, off + 24, 8);
        pack(buf, 255, off + 32, 8);
        match &grid.metadata.grid {
            Grid::LatLon(g) => {
                pack(buf, 32, off, 24);
                pack(buf, 0, off + 40, 8);
                pack(buf, g.nx as u32, off + 48, 16);
                pack(buf, g.ny as u32, off + 64, 16);
                pack_milli(buf, g.slat, off + 80);
                pack_milli(buf, g.slon, off + 104);
                pack(buf, rescomp_flags(g.rescomp, g.earth_shape), off + 128, 8);
                pack_milli(buf, g.elat, off + 136);
                pack_milli(buf, g.elon, off + 160);
                pack_signed(buf, (g.loinc * 1000.0).round() as i32, off + 184, 16);
                pack_signed(buf, (g.lainc * 1000.0).round() as i32, off + 200, 16);
                pack(buf, u32::from(g.scan_mode), off + 216, 8);
                *offset = off + 256;
            }
            Grid::Lambert(g) => {
                pack(buf, 42, off, 24);
                pack(buf, 3, off + 40, 8);
                pack(buf, g.nx as u32, off + 48, 16);
                pack(buf, g.ny as u32, off + 64, 16);
                pack_milli(buf, g.slat, off + 80);
                pack_milli(buf, g.slon, off + 104);
                pack(buf, rescomp_flags(g.rescomp, g.earth_shape), off + 128, 8);
                pack_milli(buf, g.lov, off + 136);
                pack(buf, (g.dxinc + 0.5) as u32, off + 160, 24);
                pack(buf, (g.dyinc + 0.5) as u32, off + 184, 24);
                pack(buf, u32::from(g.proj_flag), off + 208, 8);
                pack(buf, u32::from(g.scan_mode), off + 216, 8);
                pack_milli(buf, g.latin1, off + 224);
                pack_milli(buf, g.latin2, off + 248);
                pack_milli(buf, g.splat, off + 272);
                pack_milli(buf, g.splon, off + 296);
                *offset = off + 336;
            }
            // encode() already refused the other geometries
            _ => unreachable!("unsupported geometry survived the length computation"),
        }
    }

    fn pack_bms(&mut self, grid: &GridField, num_points: usize, offset: &mut usize) {
        let buf = &mut self.buffer;
        let off = *offset;
        let length = 6 + (num_points + 7) / 8;
        let unused = (8 - num_points % 8) % 8;
        pack(buf, length as u32, off, 24);
        pack(buf, unused as u32, off + 24, 8);
        pack(buf, 0, off + 32, 16);
        let bitmap = grid.metadata.bitmap.as_ref().expect("bitmap checked by caller");
        for (n, &bit) in bitmap.iter().take(num_points).enumerate() {
            pack(buf, u32::from(bit), off + 48 + n, 1);
        }
        *offset = off + length * 8;
    }

    fn pack_bds(
        &mut self,
        grid: &GridField,
        pvals: &[i64],
        pack_width: usize,
        bds_len: usize,
        offset: usize,
    ) -> Result<()> {
        let repr = &grid.metadata.repr;
        let reference = ibm::real_to_ibm(repr.r * 10f64.powi(repr.d))?;
        let buf = &mut self.buffer;
        pack(buf, bds_len as u32, offset, 24);
        pack(buf, 0, offset + 24, 4);
        let unused = (bds_len - 11) * 8 - pvals.len() * pack_width;
        pack(buf, unused as u32, offset + 28, 4);
        pack_signed(buf, repr.e, offset + 32, 16);
        pack(buf, reference, offset + 48, 32);
        pack(buf, pack_width as u32, offset + 80, 8);
        let mut off = offset + 88;
        for &pval in pvals {
            pack(buf, pval as u32, off, pack_width);
            off += pack_width;
        }
        Ok(())
    }
}

fn rescomp_flags(rescomp: u8, earth_shape: u8) -> u32 {
    let mut flags = 0u32;
    if rescomp & 0x20 == 0x20 {
        flags |= 0x80;
    }
    if earth_shape == 2 {
        flags |= 0x40;
    }
    if rescomp & 0x8 == 0x8 {
        flags |= 0x8;
    }
    flags
}

fn pack_milli(buf: &mut [u8], degrees: f64, off: usize) {
    pack_signed(buf, (degrees * 1000.0).round() as i32, off, 24);
}
