mod common;

use gribconv::grib2::sections::sect7::jpeg2000::Jpeg2000Decoder;
use gribconv::grib2::Reader;
use gribconv::{GribError, Result, GRIB_MISSING};

use common::*;

fn jpeg_message(body: &[u8], pack_width: u8, bitmap_bits: Option<&[u8]>) -> Vec<u8> {
    let bms_section = match bitmap_bits {
        Some(bits) => bms(bits),
        None => bms_none(),
    };
    assemble(
        0,
        &[
            ids(7, 2023, 6, 15, 0),
            gds_latlon(2, 2, 50.0, 0.0, 47.5, 2.5, 2.5, 2.5, 0, 6, 0),
            pds0(0, 0, 1, 0, 1, 0, 0),
            drs(40, 4, 150.0, 0, 0, pack_width),
            bms_section,
            ds(body),
        ],
    )
}

/// With a zero-length code stream the collaborator is never consulted and
/// the field collapses to the reference value.
#[test]
fn an_empty_code_stream_is_a_constant_field() -> anyhow::Result<()> {
    struct Panicking;
    impl Jpeg2000Decoder for Panicking {
        fn decode(&self, _payload: &[u8], _width: usize, _height: usize) -> Result<Vec<u32>> {
            panic!("the collaborator must not run for an empty payload");
        }
    }

    let message = jpeg_message(&[], 0, None);
    let decoded = Reader::new(&message[..])
        .with_jpeg2000(Box::new(Panicking))
        .read_message()?;
    assert!(decoded.grids[0].gridpoints.iter().all(|&v| (v - 150.0).abs() < 1.0e-9));
    Ok(())
}

/// A non-empty code stream without an installed collaborator is an
/// unsupported data template.
#[test]
fn a_code_stream_without_a_decoder_is_refused() {
    let message = jpeg_message(&[0xff, 0x4f, 0xff, 0x51], 8, None);
    let err = Reader::new(&message[..]).read_message().unwrap_err();
    assert!(matches!(err, GribError::UnsupportedDataTemplate(40)));
}

/// Grayscale samples from the collaborator go through the simple-packing
/// formula, honoring the bitmap.
#[test]
fn collaborator_samples_feed_the_packing_formula() -> anyhow::Result<()> {
    struct Fixed;
    impl Jpeg2000Decoder for Fixed {
        fn decode(&self, payload: &[u8], width: usize, height: usize) -> Result<Vec<u32>> {
            assert_eq!(payload, b"stream");
            assert_eq!((width, height), (2, 2));
            Ok(vec![1, 2, 3])
        }
    }

    let message = jpeg_message(b"stream", 8, Some(&[1, 0, 1, 1]));
    let decoded = Reader::new(&message[..])
        .with_jpeg2000(Box::new(Fixed))
        .read_message()?;
    let points = &decoded.grids[0].gridpoints;
    assert!((points[0] - 151.0).abs() < 1.0e-9);
    assert_eq!(points[1], GRIB_MISSING);
    assert!((points[2] - 152.0).abs() < 1.0e-9);
    assert!((points[3] - 153.0).abs() < 1.0e-9);
    Ok(())
}

/// Errors from the collaborator surface unchanged, so callers can tell a
/// multi-component rejection from a decode failure.
#[test]
fn collaborator_errors_pass_through() {
    struct MultiComponent;
    impl Jpeg2000Decoder for MultiComponent {
        fn decode(&self, _payload: &[u8], _width: usize, _height: usize) -> Result<Vec<u32>> {
            Err(GribError::Jpeg2000(String::from(
                "found a color image, grayscale expected",
            )))
        }
    }

    let message = jpeg_message(b"stream", 8, None);
    let err = Reader::new(&message[..])
        .with_jpeg2000(Box::new(MultiComponent))
        .read_message()
        .unwrap_err();
    assert!(matches!(err, GribError::Jpeg2000(_)));
}
