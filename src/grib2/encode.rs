use crate::bits::{pack, pack_signed};
use crate::datetime::add_duration;
use crate::error::{GribError, Result};
use crate::grib1::{Geometry, Message as Grib1Message};
use crate::tables::{level, param, timerange};
use crate::GRIB_MISSING;

const IS_SIZE: usize = 16;

/// Writes one GRIB2 message per GRIB1 message. The scratch buffer grows
/// monotonically across messages.
#[derive(Default)]
pub struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates `msg` and returns the complete GRIB2 message, indicator
    /// and end sections included. The returned slice borrows the encoder's
    /// scratch buffer.
    pub fn encode(&mut self, msg: &Grib1Message) -> Result<&[u8]> {
        let grid = msg.grid.as_ref().ok_or_else(|| {
            GribError::InvariantViolation(String::from("message carries no grid definition"))
        })?;
        let (gds_len, gds_templ) = match grid {
            Geometry::LatLon(_) => (72, 0u16),
            Geometry::Mercator(_) => (72, 10),
            Geometry::Gaussian(_) => (72, 40),
            Geometry::PolarStereo(_) => (65, 20),
            Geometry::Lambert(_) => return Err(GribError::UnsupportedGridTemplate(3)),
            Geometry::Rotated(_) => return Err(GribError::UnsupportedGridTemplate(10)),
        };
        let pds_templ = timerange::grib2_template(msg.t_range)?;
        let pds_len = if pds_templ == 8 { 58 } else { 34 };
        let num_points = grid.num_points();
        let bms_len = if msg.bms_included {
            6 + (msg.bitmap.as_ref().map(Vec::len).unwrap_or(0) + 7) / 8
        } else {
            6
        };
        let ds_len = 5 + (num_points * msg.pack_width + 7) / 8;
        let length = 21 + gds_len + pds_len + 21 + bms_len + ds_len;
        let total = length + IS_SIZE + 4;

        let (discipline, category, number) =
            param::grib2_parameter(msg.param, msg.center_id, msg.table_ver)
                .unwrap_or((255, 255, 255));

        self.buffer.clear();
        self.buffer.resize(total, 0);
        self.buffer[..4].copy_from_slice(b"GRIB");
        pack(&mut self.buffer, u32::from(discipline), 48, 8);
        pack(&mut self.buffer, 2, 56, 8);
        pack(&mut self.buffer, (total as u64 >> 32) as u32, 64, 32);
        pack(&mut self.buffer, total as u32, 96, 32);

        let mut offset = IS_SIZE * 8;
        self.pack_ids(msg, &mut offset);
        self.pack_gds(grid, gds_len, gds_templ, &mut offset);
        self.pack_pds(msg, pds_templ, pds_len, category, number, &mut offset)?;
        self.pack_drs(msg, num_points, &mut offset);
        self.pack_bms(msg, bms_len, &mut offset);
        self.pack_ds(msg, ds_len, offset);
        self.buffer[total - 4..].copy_from_slice(b"7777");
        Ok(&self.buffer[..total])
    }

    fn pack_ids(&mut self, msg: &Grib1Message, offset: &mut usize) {
        let buf = &mut self.buffer;
        let off = *offset;
        pack(buf, 21, off, 32);
        pack(buf, 1, off + 32, 8);
        pack(buf, u32::from(msg.center_id), off + 40, 16);
        pack(buf, u32::from(msg.sub_center_id), off + 56, 16);
        // master table version in force when the translation was written
        pack(buf, 18, off + 72, 8);
        pack(buf, 0, off + 80, 8);
        // reference time is the start of the forecast
        pack(buf, 1, off + 88, 8);
        pack(buf, msg.yr as u32, off + 96, 16);
        pack(buf, msg.mo, off + 112, 8);
        pack(buf, msg.dy, off + 120, 8);
        pack(buf, msg.time / 100, off + 128, 8);
        pack(buf, msg.time % 100, off + 136, 8);
        pack(buf, 0, off + 144, 8);
        pack(buf, 255, off + 152, 8);
        pack(buf, 255, off + 160, 8);
        *offset = off + 21 * 8;
    }

    fn pack_gds(&mut self, grid: &Geometry, gds_len: usize, gds_templ: u16, offset: &mut usize) {
        let buf = &mut self.buffer;
        let off = *offset;
        pack(buf, gds_len as u32, off, 32);
        pack(buf, 3, off + 32, 8);
        pack(buf, 0, off + 40, 8);
        pack(buf, grid.num_points() as u32, off + 48, 32);
        pack(buf, 0, off + 80, 16);
        pack(buf, u32::from(gds_templ), off + 96, 16);
        // spherical earth with the standard radius; the six shape
        // parameters stay zero
        pack(buf, 6, off + 112, 8);
        match grid {
            Geometry::LatLon(g) | Geometry::Gaussian(g) => {
                pack(buf, g.nx as u32, off + 240, 32);
                pack(buf, g.ny as u32, off + 272, 32);
                pack_micro(buf, g.slat, off + 368);
                pack_micro(buf, g.slon, off + 400);
                pack(buf, rescomp_flags(g.rescomp), off + 432, 8);
                pack_micro(buf, g.elat, off + 440);
                pack_micro(buf, g.elon, off + 472);
                if gds_templ == 0 {
                    pack(buf, (g.loinc * 1_000_000.0).round() as u32, off + 504, 32);
                    pack(buf, (g.lainc * 1_000_000.0).round() as u32, off + 536, 32);
                    pack(buf, u32::from(g.scan_mode), off + 568, 8);
                } else {
                    // the i-direction slot receives the latitude increment
                    // and octet 67 the raw parallel count, matching the
                    // layout long emitted for Gaussian grids
                    pack(buf, (g.lainc * 1_000_000.0).round() as u32, off + 504, 32);
                    pack(buf, g.lainc.round() as u32, off + 536, 32);
                    pack(buf, u32::from(g.scan_mode) | 0x10, off + 568, 8);
                }
            }
            Geometry::Mercator(g) => {
                pack(buf, g.nx as u32, off + 240, 32);
                pack(buf, g.ny as u32, off + 272, 32);
                pack_micro(buf, g.slat, off + 304);
                pack_micro(buf, g.slon, off + 336);
                pack(buf, rescomp_flags(g.rescomp), off + 368, 8);
                pack_micro(buf, g.std_lat1, off + 376);
                pack_micro(buf, g.elat, off + 408);
                pack_micro(buf, g.elon, off + 440);
                pack(buf, u32::from(g.scan_mode), off + 472, 8);
                pack(buf, 0, off + 480, 32);
                pack(buf, g.xlen.saturating_mul(1000), off + 512, 32);
                pack(buf, g.ylen.saturating_mul(1000), off + 544, 32);
            }
            Geometry::PolarStereo(g) => {
                pack(buf, g.nx as u32, off + 240, 32);
                pack(buf, g.ny as u32, off + 272, 32);
                pack_micro(buf, g.slat, off + 304);
                pack_micro(buf, g.slon, off + 336);
                pack(buf, rescomp_flags(g.rescomp), off + 368, 8);
                // latitude at which dx and dy are valid, signed toward the
                // projection pole
                pack(buf, u32::from(g.proj == 1), off + 376, 1);
                pack(buf, 40_000_000, off + 377, 31);
                pack_micro(buf, g.olon, off + 408);
                pack(buf, g.xlen.saturating_mul(1000), off + 440, 32);
                pack(buf, g.ylen.saturating_mul(1000), off + 472, 32);
                pack(buf, u32::from(g.proj), off + 504, 8);
                pack(buf, u32::from(g.scan_mode) | 0x10, off + 512, 8);
            }
            Geometry::Lambert(_) | Geometry::Rotated(_) => {
                unreachable!("unsupported geometry survived the length computation")
            }
        }
        *offset = off + gds_len * 8;
    }

    fn pack_pds(
        &mut self,
        msg: &Grib1Message,
        pds_templ: u16,
        pds_len: usize,
        category: u8,
        number: u8,
        offset: &mut usize,
    ) -> Result<()> {
        let mapped = level::grib2_level(msg.level_type, msg.lvl1, msg.lvl2);
        let end_time = if pds_templ == 8 {
            Some(add_duration(
                msg.yr,
                msg.mo,
                msg.dy,
                msg.time,
                i64::from(msg.p2),
                msg.fcst_units,
            )?)
        } else {
            None
        };
        let process = if pds_templ == 8 {
            Some(timerange::statistical_process(msg.t_range, msg.param)?)
        } else {
            None
        };

        let buf = &mut self.buffer;
        let off = *offset;
        pack(buf, pds_len as u32, off, 32);
        pack(buf, 4, off + 32, 8);
        pack(buf, 0, off + 40, 16);
        pack(buf, u32::from(pds_templ), off + 56, 16);
        pack(buf, u32::from(category), off + 72, 8);
        pack(buf, u32::from(number), off + 80, 8);
        pack(buf, 255, off + 88, 8);
        pack(buf, u32::from(msg.gen_proc), off + 96, 8);
        pack(buf, 255, off + 104, 8);
        pack(buf, 65535, off + 112, 16);
        pack(buf, 255, off + 128, 8);
        pack(buf, u32::from(msg.fcst_units), off + 136, 8);
        // an initialized product (time range 1) is valid at the reference
        // time itself
        let fcst_time = if msg.t_range == 1 { 0 } else { msg.p1 };
        pack(buf, fcst_time, off + 144, 32);
        pack(buf, u32::from(mapped.lvl1_type), off + 176, 8);
        pack_signed(buf, mapped.lvl1_scale, off + 184, 8);
        pack(buf, mapped.lvl1_value as u32, off + 192, 32);
        pack(buf, u32::from(mapped.lvl2_type), off + 224, 8);
        match mapped.lvl2_scale {
            Some(scale) => pack_signed(buf, scale, off + 232, 8),
            None => pack(buf, 255, off + 232, 8),
        }
        pack(buf, mapped.lvl2_value as u32, off + 240, 32);
        if let (Some((eyr, emo, edy, etime)), Some((process, time_incr))) = (end_time, process) {
            pack(buf, eyr as u32, off + 272, 16);
            pack(buf, emo, off + 288, 8);
            pack(buf, edy, off + 296, 8);
            pack(buf, etime / 100, off + 304, 8);
            pack(buf, etime % 100, off + 312, 8);
            pack(buf, 0, off + 320, 8);
            pack(buf, 1, off + 328, 8);
            pack(buf, 0, off + 336, 32);
            pack(buf, u32::from(process), off + 368, 8);
            pack(buf, u32::from(time_incr), off + 376, 8);
            pack(buf, u32::from(msg.fcst_units), off + 384, 8);
            pack(buf, msg.p2.wrapping_sub(msg.p1), off + 392, 32);
            pack(buf, u32::from(msg.fcst_units), off + 424, 8);
            pack(buf, 0, off + 432, 32);
        }
        *offset = off + pds_len * 8;
        Ok(())
    }

    fn pack_drs(&mut self, msg: &Grib1Message, num_points: usize, offset: &mut usize) {
        let buf = &mut self.buffer;
        let off = *offset;
        pack(buf, 21, off, 32);
        pack(buf, 5, off + 32, 8);
        pack(buf, num_points as u32, off + 40, 32);
        pack(buf, 0, off + 72, 16);
        let reference = (msg.ref_val * 10f64.powi(msg.d_scale)) as f32;
        pack(buf, reference.to_bits(), off + 88, 32);
        pack_signed(buf, msg.e_scale, off + 120, 16);
        pack_signed(buf, msg.d_scale, off + 136, 16);
        pack(buf, msg.pack_width as u32, off + 152, 8);
        pack(buf, 0, off + 160, 8);
        *offset = off + 21 * 8;
    }

    fn pack_bms(&mut self, msg: &Grib1Message, bms_len: usize, offset: &mut usize) {
        let buf = &mut self.buffer;
        let off = *offset;
        pack(buf, bms_len as u32, off, 32);
        pack(buf, 6, off + 32, 8);
        match msg.bitmap.as_ref() {
            Some(bitmap) if msg.bms_included => {
                pack(buf, 0, off + 40, 8);
                for (n, &bit) in bitmap.iter().enumerate() {
                    pack(buf, u32::from(bit), off + 48 + n, 1);
                }
            }
            _ => {
                pack(buf, 255, off + 40, 8);
            }
        }
        *offset = off + bms_len * 8;
    }

    fn pack_ds(&mut self, msg: &Grib1Message, ds_len: usize, offset: usize) {
        let buf = &mut self.buffer;
        pack(buf, ds_len as u32, offset, 32);
        pack(buf, 7, offset + 32, 8);
        let d = 10f64.powi(msg.d_scale);
        let e = 2f64.powi(msg.e_scale);
        let mut off = offset + 40;
        for &v in &msg.gridpoints {
            if v == GRIB_MISSING {
                continue;
            }
            let pval = (((v - msg.ref_val) * d / e).round()).max(0.0) as u32;
            pack(buf, pval, off, msg.pack_width);
            off += msg.pack_width;
        }
    }
}

fn rescomp_flags(rescomp: u8) -> u32 {
    u32::from(((rescomp & 0x80) >> 2) | ((rescomp & 0x80) >> 3) | (rescomp & 0xf))
}

fn pack_micro(buf: &mut [u8], degrees: f64, off: usize) {
    let value = (degrees.abs() * 1_000_000.0).round() as u32;
    pack(buf, u32::from(degrees < 0.0), off, 1);
    pack(buf, value, off + 1, 31);
}
