mod common;

use gribconv::bits::unpack;
use gribconv::convert;
use gribconv::grib1::{self, Geometry};
use gribconv::grib2;
use gribconv::GRIB_MISSING;

use common::*;

/// A global 2.5-degree temperature analysis travels from GRIB2 to GRIB1
/// with its codes, geometry and quantization intact.
#[test]
fn latlon_analysis_converts_to_grib1() -> anyhow::Result<()> {
    let (nx, ny) = (144u32, 73u32);
    let num_points = (nx * ny) as usize;
    let values: Vec<u32> = (0..num_points as u32).map(|n| n % 4000).collect();
    let message = assemble(
        0,
        &[
            ids(7, 2023, 6, 15, 12),
            gds_latlon(nx, ny, 90.0, 0.0, -90.0, 357.5, 2.5, 2.5, 0x30, 6, 0),
            pds0(0, 0, 1, 6, 100, 0, 50000),
            drs(0, nx * ny, 2100.0, 1, 1, 12),
            bms_none(),
            ds(&packed_body(&values, 12)),
        ],
    );

    let decoded = grib2::Reader::new(&message[..]).read_message()?;
    assert_eq!(decoded.grids.len(), 1);
    assert!(decoded.packed_counts_fit());
    let source = &decoded.grids[0];
    assert!((source.metadata.repr.r - 210.0).abs() < 1.0e-9);

    let mut output = Vec::new();
    let grids = convert::grib2_to_grib1(&message[..], &mut output)?;
    assert_eq!(grids, 1);

    let msg = grib1::Reader::new(&output[..]).read_message()?;
    assert_eq!(msg.ed_num, 1);
    assert_eq!(msg.table_ver, 3);
    assert_eq!(msg.param, 11);
    assert_eq!(msg.level_type, 100);
    assert_eq!(msg.lvl1, 500);
    assert_eq!((msg.yr, msg.mo, msg.dy, msg.time), (2023, 6, 15, 1200));
    assert_eq!((msg.fcst_units, msg.p1, msg.t_range), (1, 6, 0));
    assert_eq!(msg.d_scale, 1);
    assert_eq!(msg.e_scale, 1);
    assert_eq!(msg.pack_width, 12);
    match msg.grid.as_ref() {
        Some(Geometry::LatLon(g)) => {
            assert_eq!((g.nx, g.ny), (144, 73));
            assert!((g.slat - 90.0).abs() < 1.0e-9);
            assert!((g.elat + 90.0).abs() < 1.0e-9);
            assert!((g.elon - 357.5).abs() < 1.0e-9);
            assert!((g.loinc - 2.5).abs() < 1.0e-9);
        }
        other => panic!("wrong geometry {:?}", other),
    }
    // the IBM-encoded reference value recovers R * 10^D exactly
    assert!((msg.ref_val - 210.0).abs() < 1.0e-9);
    let step = 2f64.powi(1) / 10f64.powi(1);
    for (a, b) in msg.gridpoints.iter().zip(&source.gridpoints) {
        assert!((a - b).abs() < step / 2.0, "{} vs {}", a, b);
    }
    Ok(())
}

/// The Lambert conformal path emits a 42-octet GDS and rebuilds the
/// resolution-and-component flags from the GRIB2 bits plus the earth shape.
#[test]
fn lambert_grids_keep_their_projection() -> anyhow::Result<()> {
    let values: Vec<u32> = (0..6).collect();
    let message = assemble(
        0,
        &[
            ids(7, 2024, 3, 1, 0),
            gds_lambert(
                3, 2, 21.1, 237.3, 25.0, 265.0, 12191.0, 12191.0, 25.0, 25.0, 0x28, 2,
            ),
            pds0(0, 0, 1, 3, 103, 0, 2),
            drs(0, 6, 0.0, 0, 0, 8),
            bms_none(),
            ds(&packed_body(&values, 8)),
        ],
    );

    let mut output = Vec::new();
    convert::grib2_to_grib1(&message[..], &mut output)?;

    // GDS starts after the 8-byte indicator and 28-byte PDS
    let gds = (8 + 28) * 8;
    assert_eq!(unpack(&output, gds, 24), 42);
    assert_eq!(unpack(&output, gds + 40, 8), 3);
    // 0x20 -> 0x80, spherical-earth bit from shape 2, 0x8 carried through
    assert_eq!(unpack(&output, gds + 128, 8), 0xc8);

    let msg = grib1::Reader::new(&output[..]).read_message()?;
    match msg.grid.as_ref() {
        Some(Geometry::Lambert(g)) => {
            assert_eq!((g.nx, g.ny), (3, 2));
            assert!((g.std_lat1 - 25.0).abs() < 1.0e-9);
            assert!((g.std_lat2 - 25.0).abs() < 1.0e-9);
            assert!((g.olon - 265.0).abs() < 1.0e-9);
            assert_eq!((g.xlen, g.ylen), (12191, 12191));
        }
        other => panic!("wrong geometry {:?}", other),
    }
    assert_eq!(msg.level_type, 105);
    assert_eq!(msg.lvl1, 2);
    Ok(())
}

/// An all-zero bitmap packs nothing: the output BDS is its bare 11 octets
/// and every decoded point is the missing sentinel.
#[test]
fn an_empty_bitmap_packs_no_values() -> anyhow::Result<()> {
    let message = assemble(
        0,
        &[
            ids(7, 2023, 6, 15, 0),
            gds_latlon(2, 2, 50.0, 0.0, 47.5, 2.5, 2.5, 2.5, 0, 6, 0),
            pds0(0, 0, 1, 0, 1, 0, 0),
            drs(0, 0, 0.0, 0, 0, 8),
            bms(&[0, 0, 0, 0]),
            ds(&[]),
        ],
    );

    let mut output = Vec::new();
    convert::grib2_to_grib1(&message[..], &mut output)?;

    // BDS follows the PDS, GDS and the 7-octet BMS
    let bds = (8 + 28 + 32 + 7) * 8;
    assert_eq!(unpack(&output, bds, 24), 11);

    let msg = grib1::Reader::new(&output[..]).read_message()?;
    assert!(msg.gridpoints.iter().all(|&v| v == GRIB_MISSING));
    Ok(())
}

#[test]
fn a_single_bitmap_bit_selects_one_value() -> anyhow::Result<()> {
    let message = assemble(
        0,
        &[
            ids(7, 2023, 6, 15, 0),
            gds_latlon(2, 2, 50.0, 0.0, 47.5, 2.5, 2.5, 2.5, 0, 6, 0),
            pds0(0, 0, 1, 0, 1, 0, 0),
            drs(0, 1, 7.0, 0, 0, 8),
            bms(&[0, 1, 0, 0]),
            ds(&packed_body(&[3], 8)),
        ],
    );

    let mut output = Vec::new();
    convert::grib2_to_grib1(&message[..], &mut output)?;
    let msg = grib1::Reader::new(&output[..]).read_message()?;
    assert_eq!(msg.bitmap.as_deref(), Some(&[0u8, 1, 0, 0][..]));
    assert_eq!(msg.gridpoints[0], GRIB_MISSING);
    assert!((msg.gridpoints[1] - 10.0).abs() < 1.0e-9);
    assert_eq!(msg.gridpoints[2], GRIB_MISSING);
    Ok(())
}

/// Repeated sections 4..7 form a multi-grid message; each data section
/// snapshots the metadata in force and becomes its own GRIB1 message.
#[test]
fn multi_grid_messages_emit_one_message_per_grid() -> anyhow::Result<()> {
    let first: Vec<u32> = (0..4).collect();
    let second: Vec<u32> = (10..14).collect();
    let message = assemble(
        0,
        &[
            ids(7, 2023, 6, 15, 0),
            gds_latlon(2, 2, 50.0, 0.0, 47.5, 2.5, 2.5, 2.5, 0, 6, 0),
            pds0(0, 0, 1, 0, 100, 0, 50000),
            drs(0, 4, 0.0, 0, 0, 8),
            bms_none(),
            ds(&packed_body(&first, 8)),
            pds0(2, 2, 1, 0, 100, 0, 50000),
            drs(0, 4, 100.0, 0, 0, 8),
            bms_none(),
            ds(&packed_body(&second, 8)),
        ],
    );

    let decoded = grib2::Reader::new(&message[..]).read_message()?;
    assert_eq!(decoded.grids.len(), 2);
    // the first grid kept its own metadata snapshot
    assert_eq!(decoded.grids[0].metadata.product.param_num, 0);
    assert_eq!(decoded.grids[1].metadata.product.param_num, 2);
    assert!((decoded.grids[0].metadata.repr.r - 0.0).abs() < 1.0e-9);
    assert!((decoded.grids[1].metadata.repr.r - 100.0).abs() < 1.0e-9);

    let mut output = Vec::new();
    let grids = convert::grib2_to_grib1(&message[..], &mut output)?;
    assert_eq!(grids, 2);

    let mut reader = grib1::Reader::new(&output[..]);
    let one = reader.read_message()?;
    let two = reader.read_message()?;
    assert_eq!(one.param, 11);
    assert_eq!(two.param, 33);
    assert_eq!(one.gridpoints, vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(two.gridpoints, vec![110.0, 111.0, 112.0, 113.0]);
    Ok(())
}

/// Tuples outside the translation tables degrade to parameter 255 in table
/// 3 instead of failing the conversion.
#[test]
fn unmapped_parameters_degrade_to_255() -> anyhow::Result<()> {
    let values: Vec<u32> = (0..4).collect();
    let message = assemble(
        0,
        &[
            ids(7, 2023, 6, 15, 0),
            gds_latlon(2, 2, 50.0, 0.0, 47.5, 2.5, 2.5, 2.5, 0, 6, 0),
            // aerosol products have no GRIB1 home
            pds0(13, 0, 1, 0, 1, 0, 0),
            drs(0, 4, 0.0, 0, 0, 8),
            bms_none(),
            ds(&packed_body(&values, 8)),
        ],
    );

    let mut output = Vec::new();
    convert::grib2_to_grib1(&message[..], &mut output)?;
    let msg = grib1::Reader::new(&output[..]).read_message()?;
    assert_eq!((msg.table_ver, msg.param), (3, 255));
    Ok(())
}
