use crate::bits::{unpack, unpack_signed};
use crate::error::{GribError, Result};

fn micro(buffer: &[u8], off: usize) -> f64 {
    f64::from(unpack_signed(buffer, off, 32)) / 1_000_000.0
}

/// Grid Definition Template 3.0 (latitude/longitude).
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGrid {
    pub earth_shape: u8,
    pub nx: usize,
    pub ny: usize,
    pub slat: f64,
    pub slon: f64,
    pub rescomp: u8,
    pub elat: f64,
    pub elon: f64,
    pub loinc: f64,
    pub lainc: f64,
    pub scan_mode: u8,
}

/// Grid Definition Template 3.40 (Gaussian latitude/longitude).
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianGrid {
    pub earth_shape: u8,
    pub nx: usize,
    pub ny: usize,
    pub slat: f64,
    pub slon: f64,
    pub rescomp: u8,
    pub elat: f64,
    pub elon: f64,
    pub loinc: f64,
    /// Parallels between the equator and the pole.
    pub n_parallels: u32,
    pub scan_mode: u8,
}

/// Grid Definition Template 3.10 (Mercator).
#[derive(Debug, Clone, PartialEq)]
pub struct MercatorGrid {
    pub earth_shape: u8,
    pub nx: usize,
    pub ny: usize,
    pub slat: f64,
    pub slon: f64,
    pub rescomp: u8,
    pub latin1: f64,
    pub elat: f64,
    pub elon: f64,
    pub scan_mode: u8,
    /// Grid lengths in meters.
    pub dxinc: f64,
    pub dyinc: f64,
}

/// Grid Definition Template 3.30 (Lambert conformal).
#[derive(Debug, Clone, PartialEq)]
pub struct LambertGrid {
    pub earth_shape: u8,
    pub nx: usize,
    pub ny: usize,
    pub slat: f64,
    pub slon: f64,
    pub rescomp: u8,
    /// Latitude where the grid lengths are valid.
    pub lad: f64,
    /// Meridian parallel to the y-axis.
    pub lov: f64,
    pub dxinc: f64,
    pub dyinc: f64,
    pub proj_flag: u8,
    pub scan_mode: u8,
    pub latin1: f64,
    pub latin2: f64,
    pub splat: f64,
    pub splon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Grid {
    LatLon(LatLonGrid),
    Mercator(MercatorGrid),
    Lambert(LambertGrid),
    Gaussian(GaussianGrid),
}

impl Grid {
    pub fn template_number(&self) -> u16 {
        match self {
            Grid::LatLon(_) => 0,
            Grid::Mercator(_) => 10,
            Grid::Lambert(_) => 30,
            Grid::Gaussian(_) => 40,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            Grid::LatLon(g) => (g.nx, g.ny),
            Grid::Mercator(g) => (g.nx, g.ny),
            Grid::Lambert(g) => (g.nx, g.ny),
            Grid::Gaussian(g) => (g.nx, g.ny),
        }
    }

    pub fn num_points(&self) -> usize {
        let (nx, ny) = self.shape();
        nx * ny
    }

    pub(crate) fn decode(buffer: &[u8], off: usize) -> Result<Self> {
        let source = unpack(buffer, off + 40, 8);
        if source != 0 {
            return Err(GribError::UnsupportedPacking(format!(
                "predetermined grid definition source {}",
                source
            )));
        }
        let num_in_list = unpack(buffer, off + 80, 8);
        if num_in_list > 0 {
            return Err(GribError::UnsupportedPacking(String::from("quasi-regular grid")));
        }
        let templ_num = unpack(buffer, off + 96, 16) as u16;
        let earth_shape = unpack(buffer, off + 112, 8) as u8;
        match templ_num {
            0 | 40 => {
                let nx = unpack(buffer, off + 240, 32) as usize;
                let ny = unpack(buffer, off + 272, 32) as usize;
                let slat = micro(buffer, off + 368);
                let slon = micro(buffer, off + 400);
                let rescomp = unpack(buffer, off + 432, 8) as u8;
                let elat = micro(buffer, off + 440);
                let elon = micro(buffer, off + 472);
                let loinc = f64::from(unpack(buffer, off + 504, 32)) / 1_000_000.0;
                let scan_mode = unpack(buffer, off + 568, 8) as u8;
                if templ_num == 0 {
                    Ok(Grid::LatLon(LatLonGrid {
                        earth_shape,
                        nx,
                        ny,
                        slat,
                        slon,
                        rescomp,
                        elat,
                        elon,
                        loinc,
                        lainc: f64::from(unpack(buffer, off + 536, 32)) / 1_000_000.0,
                        scan_mode,
                    }))
                } else {
                    Ok(Grid::Gaussian(GaussianGrid {
                        earth_shape,
                        nx,
                        ny,
                        slat,
                        slon,
                        rescomp,
                        elat,
                        elon,
                        loinc,
                        n_parallels: unpack(buffer, off + 536, 32),
                        scan_mode,
                    }))
                }
            }
            10 => Ok(Grid::Mercator(MercatorGrid {
                earth_shape,
                nx: unpack(buffer, off + 240, 32) as usize,
                ny: unpack(buffer, off + 272, 32) as usize,
                slat: micro(buffer, off + 304),
                slon: micro(buffer, off + 336),
                rescomp: unpack(buffer, off + 368, 8) as u8,
                latin1: micro(buffer, off + 376),
                elat: micro(buffer, off + 408),
                elon: micro(buffer, off + 440),
                scan_mode: unpack(buffer, off + 472, 8) as u8,
                dxinc: f64::from(unpack(buffer, off + 512, 32)) / 1_000.0,
                dyinc: f64::from(unpack(buffer, off + 544, 32)) / 1_000.0,
            })),
            30 => Ok(Grid::Lambert(LambertGrid {
                earth_shape,
                nx: unpack(buffer, off + 240, 32) as usize,
                ny: unpack(buffer, off + 272, 32) as usize,
                slat: micro(buffer, off + 304),
                slon: micro(buffer, off + 336),
                rescomp: unpack(buffer, off + 368, 8) as u8,
                lad: micro(buffer, off + 376),
                lov: micro(buffer, off + 408),
                dxinc: f64::from(unpack(buffer, off + 440, 32)) / 1_000.0,
                dyinc: f64::from(unpack(buffer, off + 472, 32)) / 1_000.0,
                proj_flag: unpack(buffer, off + 504, 8) as u8,
                scan_mode: unpack(buffer, off + 512, 8) as u8,
                latin1: micro(buffer, off + 520),
                latin2: micro(buffer, off + 552),
                splat: micro(buffer, off + 584),
                splon: micro(buffer, off + 616),
            })),
            other => Err(GribError::UnsupportedGridTemplate(other)),
        }
    }
}
