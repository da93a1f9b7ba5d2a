use std::io::Read;

use log::warn;

use crate::bits::{unpack, unpack_signed};
use crate::error::{GribError, Result};
use crate::ibm;
use crate::GRIB_MISSING;

pub mod encode;

/// Level-type codes whose first level occupies the full 16-bit field
/// (everything else splits into two 8-bit levels).
const WIDE_LEVEL_TYPES: [u8; 12] = [100, 103, 105, 107, 109, 111, 113, 115, 125, 160, 200, 201];

/// Time-range indicators that carry a "number included in average" count.
const AVERAGED_TIME_RANGES: [u8; 10] = [3, 4, 51, 113, 114, 115, 116, 117, 123, 124];

/// NCEP grid catalog numbers whose packed stream starts with one throwaway
/// word.
const NCEP_SKIP_GRID_TYPES: [u8; 5] = [23, 24, 26, 63, 64];

#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGrid {
    pub nx: usize,
    pub ny: usize,
    pub slat: f64,
    pub slon: f64,
    pub rescomp: u8,
    pub elat: f64,
    pub elon: f64,
    pub loinc: f64,
    /// Latitude increment, or the number of parallels between equator and
    /// pole for Gaussian grids.
    pub lainc: f64,
    pub scan_mode: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MercatorGrid {
    pub nx: usize,
    pub ny: usize,
    pub slat: f64,
    pub slon: f64,
    pub rescomp: u8,
    pub elat: f64,
    pub elon: f64,
    pub std_lat1: f64,
    pub scan_mode: u8,
    pub xlen: u32,
    pub ylen: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConformalGrid {
    pub nx: usize,
    pub ny: usize,
    pub slat: f64,
    pub slon: f64,
    pub rescomp: u8,
    pub olon: f64,
    pub xlen: u32,
    pub ylen: u32,
    pub proj: u8,
    pub scan_mode: u8,
    pub std_lat1: f64,
    pub std_lat2: f64,
}

/// Grid geometry keyed by the GRIB1 data-representation type.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// data representation 0
    LatLon(LatLonGrid),
    /// data representation 1
    Mercator(MercatorGrid),
    /// data representation 3
    Lambert(ConformalGrid),
    /// data representation 4
    Gaussian(LatLonGrid),
    /// data representation 5
    PolarStereo(ConformalGrid),
    /// data representation 10
    Rotated(LatLonGrid),
}

impl Geometry {
    pub fn num_points(&self) -> usize {
        let (nx, ny) = self.shape();
        nx * ny
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            Geometry::LatLon(g) | Geometry::Gaussian(g) | Geometry::Rotated(g) => (g.nx, g.ny),
            Geometry::Mercator(g) => (g.nx, g.ny),
            Geometry::Lambert(g) | Geometry::PolarStereo(g) => (g.nx, g.ny),
        }
    }
}

/// One decoded GRIB edition 0/1 message. Fully owned by the caller; the
/// reader's scratch buffer is reused for the next message.
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub ed_num: u8,
    pub total_len: usize,
    pub pds_len: usize,
    pub gds_len: usize,
    pub bds_len: usize,
    pub table_ver: u8,
    pub center_id: u8,
    pub sub_center_id: u8,
    pub gen_proc: u8,
    pub grid_type: u8,
    pub gds_included: bool,
    pub bms_included: bool,
    pub param: u8,
    pub level_type: u8,
    pub lvl1: u32,
    pub lvl2: u32,
    pub yr: i32,
    pub mo: u32,
    pub dy: u32,
    /// HHMM
    pub time: u32,
    pub fcst_units: u8,
    pub p1: u32,
    pub p2: u32,
    pub t_range: u8,
    pub navg: u32,
    pub nmiss: u32,
    /// Decimal scale factor D
    pub d_scale: i32,
    /// Binary scale factor E
    pub e_scale: i32,
    pub ref_val: f64,
    pub pack_width: usize,
    pub bds_flag: u8,
    pub data_rep: u8,
    pub grid: Option<Geometry>,
    /// One byte per gridpoint, 1 = value present.
    pub bitmap: Option<Vec<u8>>,
    /// Opaque bytes found past the standard PDS, preserved verbatim.
    pub pds_ext: Option<Vec<u8>>,
    pub gridpoints: Vec<f64>,
}

impl Message {
    pub fn num_points(&self) -> usize {
        self.grid.as_ref().map(Geometry::num_points).unwrap_or(self.gridpoints.len())
    }
}

/// Streaming GRIB1 decoder. One scratch buffer per reader, grown
/// monotonically so repeated messages amortize allocations.
pub struct Reader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buffer: Vec::new() }
    }

    /// Decodes the next message, scanning forward to the next `GRIB` magic.
    /// Returns `Err(GribError::Eof)` once the stream is exhausted.
    pub fn read_message(&mut self) -> Result<Message> {
        let ed_num = self.fill_buffer()?;

        let mut msg = Message {
            ed_num,
            total_len: self.buffer.len(),
            ..Message::default()
        };
        let mut offset = if ed_num == 0 { 32 } else { 64 };
        decode_pds(&self.buffer, &mut offset, &mut msg)?;
        if msg.gds_included {
            decode_gds(&self.buffer, &mut offset, &mut msg)?;
        }
        if msg.bms_included {
            decode_bms(&self.buffer, &mut offset, &mut msg)?;
        }
        decode_bds(&self.buffer, offset, &mut msg)?;
        Ok(msg)
    }

    /// Locates the magic, then reads one whole message (through the end
    /// marker) into the scratch buffer. Returns the edition number.
    fn fill_buffer(&mut self) -> Result<u8> {
        let mut head = [0u8; 8];
        self.scan_for_magic(&mut head)?;
        let declared = unpack(&head, 32, 24) as usize;

        if declared == 24 {
            // edition 0: no total length on the wire, sections are sized as
            // they are discovered
            self.assemble_edition0(&head)?;
            return Ok(0);
        }

        let ed_num = head[7];
        if ed_num != 1 {
            return Err(GribError::UnsupportedEdition(ed_num));
        }
        if declared < 12 {
            return Err(GribError::InvariantViolation(format!(
                "declared message length {} is too short",
                declared
            )));
        }
        self.buffer.clear();
        self.buffer.extend_from_slice(&head);
        self.read_body(declared, 8)?;
        if &self.buffer[declared - 4..declared] != b"7777" {
            warn!("no end section found");
        }
        Ok(1)
    }

    fn scan_for_magic(&mut self, head: &mut [u8; 8]) -> Result<()> {
        let mut window = [0u8; 4];
        let got = self.read_upto(&mut window)?;
        if got == 0 {
            return Err(GribError::Eof);
        }
        if got < 4 {
            return Err(GribError::TruncatedMessage { expected: 4, got });
        }
        while &window != b"GRIB" {
            window.copy_within(1.., 0);
            let mut next = [0u8; 1];
            if self.read_upto(&mut next)? == 0 {
                return Err(GribError::Eof);
            }
            window[3] = next[0];
        }
        head[..4].copy_from_slice(&window);
        let got = self.read_upto(&mut head[4..])?;
        if got < 4 {
            return Err(GribError::TruncatedMessage { expected: 8, got: 4 + got });
        }
        Ok(())
    }

    fn read_upto(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut got = 0;
        while got < buf.len() {
            let n = self.reader.read(&mut buf[got..])?;
            if n == 0 {
                break;
            }
            got += n;
        }
        Ok(got)
    }

    fn read_body(&mut self, total: usize, already: usize) -> Result<()> {
        self.buffer.resize(total, 0);
        let got = {
            let dst = &mut self.buffer[already..];
            let mut got = 0;
            while got < dst.len() {
                let n = self.reader.read(&mut dst[got..])?;
                if n == 0 {
                    break;
                }
                got += n;
            }
            got
        };
        if got + already < total {
            return Err(GribError::TruncatedMessage { expected: total, got: got + already });
        }
        Ok(())
    }

    /// Edition 0 carries no total length; grow the buffer one section at a
    /// time, peeking each section's own 24-bit length.
    fn assemble_edition0(&mut self, head: &[u8; 8]) -> Result<()> {
        self.buffer.clear();
        self.buffer.extend_from_slice(head);
        // head already holds 4 bytes of the 24-byte PDS
        self.extend_by(24 - 4)?;
        let flag = self.buffer[11];
        if flag & 0x80 != 0 {
            let len = self.peek_section_len()?;
            self.extend_by(len - 3)?;
        }
        if flag & 0x40 != 0 {
            let len = self.peek_section_len()?;
            self.extend_by(len - 3)?;
        }
        let len = self.peek_section_len()?;
        self.extend_by(len - 3)?;
        self.extend_by(4)?;
        let end = self.buffer.len();
        if &self.buffer[end - 4..] != b"7777" {
            warn!("no end section found");
        }
        Ok(())
    }

    fn peek_section_len(&mut self) -> Result<usize> {
        let start = self.buffer.len();
        self.extend_by(3)?;
        Ok(unpack(&self.buffer, start * 8, 24) as usize)
    }

    fn extend_by(&mut self, n: usize) -> Result<()> {
        let already = self.buffer.len();
        self.read_body(already + n, already)
    }
}

fn decode_pds(buffer: &[u8], offset: &mut usize, msg: &mut Message) -> Result<()> {
    let off = *offset;
    if msg.ed_num == 0 {
        msg.pds_len = 24;
    } else {
        msg.pds_len = unpack(buffer, off, 24) as usize;
        msg.table_ver = unpack(buffer, off + 24, 8) as u8;
    }
    msg.center_id = unpack(buffer, off + 32, 8) as u8;
    msg.gen_proc = unpack(buffer, off + 40, 8) as u8;
    msg.grid_type = unpack(buffer, off + 48, 8) as u8;
    let flag = unpack(buffer, off + 56, 8) as u8;
    msg.gds_included = flag & 0x80 == 0x80;
    msg.bms_included = flag & 0x40 == 0x40;
    msg.param = unpack(buffer, off + 64, 8) as u8;
    msg.level_type = unpack(buffer, off + 72, 8) as u8;
    if WIDE_LEVEL_TYPES.contains(&msg.level_type) {
        msg.lvl1 = unpack(buffer, off + 80, 16);
        msg.lvl2 = 0;
    } else {
        msg.lvl1 = unpack(buffer, off + 80, 8);
        msg.lvl2 = unpack(buffer, off + 88, 8);
    }
    msg.yr = unpack(buffer, off + 96, 8) as i32;
    msg.mo = unpack(buffer, off + 104, 8);
    msg.dy = unpack(buffer, off + 112, 8);
    let hour = unpack(buffer, off + 120, 8);
    let min = unpack(buffer, off + 128, 8);
    msg.time = hour * 100 + min;
    msg.fcst_units = unpack(buffer, off + 136, 8) as u8;
    msg.t_range = unpack(buffer, off + 160, 8) as u8;
    // time range 10 spreads P1 across both period octets
    if msg.t_range == 10 {
        msg.p1 = unpack(buffer, off + 144, 16);
        msg.p2 = 0;
    } else {
        msg.p1 = unpack(buffer, off + 144, 8);
        msg.p2 = unpack(buffer, off + 152, 8);
    }
    msg.navg = if AVERAGED_TIME_RANGES.contains(&msg.t_range) {
        unpack(buffer, off + 168, 16)
    } else {
        0
    };
    msg.nmiss = unpack(buffer, off + 184, 8);
    if msg.ed_num == 0 {
        // no century, sub-center or decimal scale in edition 0
        msg.yr += 1900;
        msg.pds_ext = None;
        *offset = off + 192;
        return Ok(());
    }
    let century = unpack(buffer, off + 192, 8) as i32;
    msg.yr += (century - 1) * 100;
    msg.sub_center_id = unpack(buffer, off + 200, 8) as u8;
    msg.d_scale = unpack_signed(buffer, off + 208, 16);
    *offset = off + 224;
    if msg.pds_len > 28 {
        let pds_start = off / 8;
        if pds_start + msg.pds_len > buffer.len() {
            return Err(GribError::TruncatedMessage {
                expected: pds_start + msg.pds_len,
                got: buffer.len(),
            });
        }
        if msg.pds_len < 40 {
            warn!("PDS extension is in wrong location");
            let ext_len = msg.pds_len - 28;
            msg.pds_ext = Some(buffer[pds_start + 28..pds_start + 28 + ext_len].to_vec());
            *offset += ext_len * 8;
        } else {
            let ext_len = msg.pds_len - 40;
            msg.pds_ext = Some(buffer[pds_start + 40..pds_start + 40 + ext_len].to_vec());
            *offset += (ext_len + 12) * 8;
        }
    } else {
        msg.pds_ext = None;
    }
    Ok(())
}

fn signed_milli(buffer: &[u8], off: usize) -> f64 {
    f64::from(unpack_signed(buffer, off, 24)) * 0.001
}

fn decode_gds(buffer: &[u8], offset: &mut usize, msg: &mut Message) -> Result<()> {
    let off = *offset;
    msg.gds_len = unpack(buffer, off, 24) as usize;
    msg.data_rep = unpack(buffer, off + 40, 8) as u8;
    let nx = unpack(buffer, off + 48, 16) as usize;
    let ny = unpack(buffer, off + 64, 16) as usize;
    let slat = signed_milli(buffer, off + 80);
    let slon = signed_milli(buffer, off + 104);
    let rescomp = unpack(buffer, off + 128, 8) as u8;
    msg.grid = Some(match msg.data_rep {
        0 | 4 | 10 => {
            let elat = signed_milli(buffer, off + 136);
            let elon = signed_milli(buffer, off + 160);
            let loinc = f64::from(unpack(buffer, off + 184, 16)) * 0.001;
            let lainc_raw = unpack(buffer, off + 200, 16);
            let scan_mode = unpack(buffer, off + 216, 8) as u8;
            let grid = LatLonGrid {
                nx,
                ny,
                slat,
                slon,
                rescomp,
                elat,
                elon,
                loinc,
                // Gaussian grids store the parallel count here, unscaled
                lainc: if msg.data_rep == 4 {
                    f64::from(lainc_raw)
                } else {
                    f64::from(lainc_raw) * 0.001
                },
                scan_mode,
            };
            match msg.data_rep {
                0 => Geometry::LatLon(grid),
                4 => Geometry::Gaussian(grid),
                _ => Geometry::Rotated(grid),
            }
        }
        1 => {
            let elat = signed_milli(buffer, off + 136);
            let elon = signed_milli(buffer, off + 160);
            let std_lat1 = signed_milli(buffer, off + 184);
            let scan_mode = unpack(buffer, off + 216, 8) as u8;
            let xlen = unpack(buffer, off + 224, 24);
            let ylen = unpack(buffer, off + 248, 24);
            Geometry::Mercator(MercatorGrid {
                nx,
                ny,
                slat,
                slon,
                rescomp,
                elat,
                elon,
                std_lat1,
                scan_mode,
                xlen,
                ylen,
            })
        }
        3 | 5 => {
            let olon = signed_milli(buffer, off + 136);
            let xlen = unpack(buffer, off + 160, 24);
            let ylen = unpack(buffer, off + 184, 24);
            let proj = unpack(buffer, off + 208, 8) as u8;
            let scan_mode = unpack(buffer, off + 216, 8) as u8;
            let (std_lat1, std_lat2) = if msg.data_rep == 3 {
                (signed_milli(buffer, off + 224), signed_milli(buffer, off + 248))
            } else {
                (0.0, 0.0)
            };
            let grid = ConformalGrid {
                nx,
                ny,
                slat,
                slon,
                rescomp,
                olon,
                xlen,
                ylen,
                proj,
                scan_mode,
                std_lat1,
                std_lat2,
            };
            if msg.data_rep == 3 {
                Geometry::Lambert(grid)
            } else {
                Geometry::PolarStereo(grid)
            }
        }
        other => {
            return Err(GribError::UnsupportedGridTemplate(other.into()));
        }
    });
    *offset = off + msg.gds_len * 8;
    Ok(())
}

fn decode_bms(buffer: &[u8], offset: &mut usize, msg: &mut Message) -> Result<()> {
    let off = *offset;
    let bms_len = unpack(buffer, off, 24) as usize;
    let unused = unpack(buffer, off + 24, 8) as usize;
    if bms_len * 8 < 48 + unused {
        return Err(GribError::InvariantViolation(format!(
            "bit-map section declares {} octets",
            bms_len
        )));
    }
    let table_ref = unpack(buffer, off + 32, 16);
    if table_ref != 0 {
        return Err(GribError::UnsupportedPacking(format!(
            "pre-defined bit-map {}",
            table_ref
        )));
    }
    let bitmap_len = (bms_len - 6) * 8 - unused;
    let mut bitmap = Vec::with_capacity(bitmap_len);
    for n in 0..bitmap_len {
        bitmap.push(unpack(buffer, off + 48 + n, 1) as u8);
    }
    if let Some(points) = msg.grid.as_ref().map(Geometry::num_points) {
        if bitmap.len() != points {
            return Err(GribError::InvariantViolation(format!(
                "bitmap holds {} bits for {} gridpoints",
                bitmap.len(),
                points
            )));
        }
    }
    msg.bitmap = Some(bitmap);
    *offset = off + bms_len * 8;
    Ok(())
}

fn decode_bds(buffer: &[u8], offset: usize, msg: &mut Message) -> Result<()> {
    let off = offset;
    msg.bds_len = unpack(buffer, off, 24) as usize;
    msg.bds_flag = unpack(buffer, off + 24, 4) as u8;
    let unused = unpack(buffer, off + 28, 4) as usize;
    msg.e_scale = unpack_signed(buffer, off + 32, 16);
    msg.pack_width = unpack(buffer, off + 80, 8) as usize;
    if msg.bds_len * 8 < 88 + unused {
        return Err(GribError::InvariantViolation(format!(
            "binary data section declares {} octets",
            msg.bds_len
        )));
    }
    if msg.pack_width > 32 {
        return Err(GribError::UnsupportedPacking(format!(
            "{}-bit packed values",
            msg.pack_width
        )));
    }
    let d = 10f64.powi(msg.d_scale);
    let e = 2f64.powi(msg.e_scale);
    msg.ref_val = ibm::ibm_to_real(unpack(buffer, off + 48, 32)) / d;
    if msg.bds_flag & 0x4 != 0 {
        return Err(GribError::UnsupportedPacking(String::from(
            "GRIB1 second-order packing",
        )));
    }

    let mut data_off = off + 88;
    let mut avail_bits = msg.bds_len * 8 - 88 - unused;
    if matches!(msg.data_rep, 0 | 4 | 10) && NCEP_SKIP_GRID_TYPES.contains(&msg.grid_type) {
        data_off += msg.pack_width;
        avail_bits = avail_bits.saturating_sub(msg.pack_width);
    }
    let num_packed = if msg.pack_width > 0 {
        avail_bits / msg.pack_width
    } else {
        0
    };

    let bitmap_len = msg.bitmap.as_ref().map(Vec::len).unwrap_or(0);
    let num_points = match msg.grid.as_ref() {
        Some(grid) => grid.num_points(),
        // no recognized GDS, unpack the stream as-is
        None => num_packed.max(bitmap_len),
    };

    msg.gridpoints.clear();
    msg.gridpoints.reserve(num_points);
    let mut pcnt = 0usize;
    for n in 0..num_points {
        let present = match msg.bitmap.as_ref() {
            Some(bitmap) => bitmap.get(n) == Some(&1),
            None => true,
        };
        if !present {
            msg.gridpoints.push(GRIB_MISSING);
        } else if msg.pack_width == 0 {
            // constant field, the reference value repeats
            msg.gridpoints.push(msg.ref_val);
        } else {
            if pcnt >= num_packed {
                return Err(GribError::InvariantViolation(format!(
                    "bitmap selects more than the {} packed values",
                    num_packed
                )));
            }
            let packed = unpack(buffer, data_off + pcnt * msg.pack_width, msg.pack_width);
            msg.gridpoints.push(msg.ref_val + f64::from(packed) * e / d);
            pcnt += 1;
        }
    }
    Ok(())
}
