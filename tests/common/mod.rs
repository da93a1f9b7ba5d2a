//! Byte-level GRIB2 message builders shared by the integration tests.
//! Sections are assembled independently of the crate's own encoders so the
//! decode and translation paths are checked against hand-packed octets.
#![allow(dead_code)]

use gribconv::bits::{pack, pack_signed};

pub fn assemble(discipline: u8, sections: &[Vec<u8>]) -> Vec<u8> {
    let total = 16 + sections.iter().map(Vec::len).sum::<usize>() + 4;
    let mut out = vec![0u8; 16];
    out[..4].copy_from_slice(b"GRIB");
    pack(&mut out, u32::from(discipline), 48, 8);
    pack(&mut out, 2, 56, 8);
    pack(&mut out, (total >> 32) as u32, 64, 32);
    pack(&mut out, total as u32, 96, 32);
    for section in sections {
        out.extend_from_slice(section);
    }
    out.extend_from_slice(b"7777");
    out
}

fn micro(buf: &mut [u8], degrees: f64, off: usize) {
    pack_signed(buf, (degrees * 1_000_000.0).round() as i32, off, 32);
}

pub fn ids(center: u16, yr: u32, mo: u32, dy: u32, hh: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 21];
    pack(&mut buf, 21, 0, 32);
    pack(&mut buf, 1, 32, 8);
    pack(&mut buf, u32::from(center), 40, 16);
    pack(&mut buf, 18, 72, 8);
    pack(&mut buf, 1, 88, 8);
    pack(&mut buf, yr, 96, 16);
    pack(&mut buf, mo, 112, 8);
    pack(&mut buf, dy, 120, 8);
    pack(&mut buf, hh, 128, 8);
    pack(&mut buf, 1, 152, 8);
    pack(&mut buf, 1, 160, 8);
    buf
}

#[allow(clippy::too_many_arguments)]
pub fn gds_latlon(
    nx: u32,
    ny: u32,
    slat: f64,
    slon: f64,
    elat: f64,
    elon: f64,
    loinc: f64,
    lainc: f64,
    rescomp: u8,
    earth_shape: u8,
    scan_mode: u8,
) -> Vec<u8> {
    let mut buf = vec![0u8; 72];
    pack(&mut buf, 72, 0, 32);
    pack(&mut buf, 3, 32, 8);
    pack(&mut buf, 0, 40, 8);
    pack(&mut buf, nx * ny, 48, 32);
    pack(&mut buf, 0, 96, 16);
    pack(&mut buf, u32::from(earth_shape), 112, 8);
    pack(&mut buf, nx, 240, 32);
    pack(&mut buf, ny, 272, 32);
    micro(&mut buf, slat, 368);
    micro(&mut buf, slon, 400);
    pack(&mut buf, u32::from(rescomp), 432, 8);
    micro(&mut buf, elat, 440);
    micro(&mut buf, elon, 472);
    pack(&mut buf, (loinc * 1_000_000.0).round() as u32, 504, 32);
    pack(&mut buf, (lainc * 1_000_000.0).round() as u32, 536, 32);
    pack(&mut buf, u32::from(scan_mode), 568, 8);
    buf
}

#[allow(clippy::too_many_arguments)]
pub fn gds_lambert(
    nx: u32,
    ny: u32,
    slat: f64,
    slon: f64,
    lad: f64,
    lov: f64,
    dx_meters: f64,
    dy_meters: f64,
    latin1: f64,
    latin2: f64,
    rescomp: u8,
    earth_shape: u8,
) -> Vec<u8> {
    let mut buf = vec![0u8; 81];
    pack(&mut buf, 81, 0, 32);
    pack(&mut buf, 3, 32, 8);
    pack(&mut buf, 0, 40, 8);
    pack(&mut buf, nx * ny, 48, 32);
    pack(&mut buf, 30, 96, 16);
    pack(&mut buf, u32::from(earth_shape), 112, 8);
    pack(&mut buf, nx, 240, 32);
    pack(&mut buf, ny, 272, 32);
    micro(&mut buf, slat, 304);
    micro(&mut buf, slon, 336);
    pack(&mut buf, u32::from(rescomp), 368, 8);
    micro(&mut buf, lad, 376);
    micro(&mut buf, lov, 408);
    pack(&mut buf, (dx_meters * 1000.0).round() as u32, 440, 32);
    pack(&mut buf, (dy_meters * 1000.0).round() as u32, 472, 32);
    pack(&mut buf, 0, 504, 8);
    pack(&mut buf, 0x40, 512, 8);
    micro(&mut buf, latin1, 520);
    micro(&mut buf, latin2, 552);
    micro(&mut buf, -90.0, 584);
    micro(&mut buf, 0.0, 616);
    buf
}

pub fn pds0(
    category: u8,
    number: u8,
    time_unit: u8,
    fcst_time: u32,
    lvl1_type: u8,
    lvl1_scale: i32,
    lvl1_value: i64,
) -> Vec<u8> {
    let mut buf = vec![0u8; 34];
    pack(&mut buf, 34, 0, 32);
    pack(&mut buf, 4, 32, 8);
    pack(&mut buf, 0, 56, 16);
    pack(&mut buf, u32::from(category), 72, 8);
    pack(&mut buf, u32::from(number), 80, 8);
    pack(&mut buf, 96, 88, 8);
    pack(&mut buf, u32::from(time_unit), 136, 8);
    pack(&mut buf, fcst_time, 144, 32);
    pack(&mut buf, u32::from(lvl1_type), 176, 8);
    pack_signed(&mut buf, lvl1_scale, 184, 8);
    pack(&mut buf, lvl1_value as u32, 192, 32);
    pack(&mut buf, 255, 224, 8);
    pack(&mut buf, 255, 232, 8);
    buf
}

pub fn drs(templ_num: u16, num_packed: u32, raw_r: f32, e: i32, d: i32, pack_width: u8) -> Vec<u8> {
    let len = if templ_num == 40 { 23 } else { 21 };
    let mut buf = vec![0u8; len];
    pack(&mut buf, len as u32, 0, 32);
    pack(&mut buf, 5, 32, 8);
    pack(&mut buf, num_packed, 40, 32);
    pack(&mut buf, u32::from(templ_num), 72, 16);
    pack(&mut buf, raw_r.to_bits(), 88, 32);
    pack_signed(&mut buf, e, 120, 16);
    pack_signed(&mut buf, d, 136, 16);
    pack(&mut buf, u32::from(pack_width), 152, 8);
    buf
}

pub fn bms_none() -> Vec<u8> {
    let mut buf = vec![0u8; 6];
    pack(&mut buf, 6, 0, 32);
    pack(&mut buf, 6, 32, 8);
    pack(&mut buf, 255, 40, 8);
    buf
}

pub fn bms(bits: &[u8]) -> Vec<u8> {
    let len = 6 + (bits.len() + 7) / 8;
    let mut buf = vec![0u8; len];
    pack(&mut buf, len as u32, 0, 32);
    pack(&mut buf, 6, 32, 8);
    pack(&mut buf, 0, 40, 8);
    for (n, &bit) in bits.iter().enumerate() {
        pack(&mut buf, u32::from(bit), 48 + n, 1);
    }
    buf
}

pub fn ds(body: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; 5];
    pack(&mut buf, (5 + body.len()) as u32, 0, 32);
    pack(&mut buf, 7, 32, 8);
    buf.extend_from_slice(body);
    buf
}

/// Packs `values` as a simple-packing payload of `width`-bit fields.
pub fn packed_body(values: &[u32], width: usize) -> Vec<u8> {
    let mut buf = vec![0u8; (values.len() * width + 7) / 8];
    for (n, &v) in values.iter().enumerate() {
        pack(&mut buf, v, n * width, width);
    }
    buf
}
