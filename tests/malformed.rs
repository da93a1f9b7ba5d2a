mod common;

use gribconv::convert;
use gribconv::grib2::Reader;
use gribconv::GribError;

use common::*;

fn small_message() -> Vec<u8> {
    let values: Vec<u32> = (0..4).collect();
    assemble(
        0,
        &[
            ids(7, 2023, 6, 15, 0),
            gds_latlon(2, 2, 50.0, 0.0, 47.5, 2.5, 2.5, 2.5, 0, 6, 0),
            pds0(0, 0, 1, 0, 1, 0, 0),
            drs(0, 4, 0.0, 0, 0, 8),
            bms_none(),
            ds(&packed_body(&values, 8)),
        ],
    )
}

/// A message without the trailing 7777 still decodes (with a warning); the
/// re-encoded message carries the marker again.
#[test]
fn a_missing_end_marker_is_tolerated() -> anyhow::Result<()> {
    let mut message = small_message();
    let len = message.len();
    message[len - 4..].copy_from_slice(&[0, 0, 0, 0]);

    let decoded = Reader::new(&message[..]).read_message()?;
    assert_eq!(decoded.grids.len(), 1);
    assert_eq!(decoded.grids[0].gridpoints.len(), 4);

    let mut output = Vec::new();
    convert::grib2_to_grib1(&message[..], &mut output)?;
    assert_eq!(&output[output.len() - 4..], b"7777");
    Ok(())
}

#[test]
fn a_truncated_message_reports_the_shortfall() {
    let message = small_message();
    let err = Reader::new(&message[..message.len() - 10])
        .read_message()
        .unwrap_err();
    assert!(matches!(err, GribError::TruncatedMessage { .. }));
}

#[test]
fn a_wrong_edition_is_refused() {
    let mut message = small_message();
    message[7] = 3;
    let err = Reader::new(&message[..]).read_message().unwrap_err();
    assert!(matches!(err, GribError::UnsupportedEdition(3)));
}

/// Garbage between messages is skipped; decoding resumes at the next
/// magic and stops cleanly at end of input.
#[test]
fn concatenated_streams_resync_on_the_magic() -> anyhow::Result<()> {
    let mut stream = b"leading noise".to_vec();
    stream.extend_from_slice(&small_message());
    stream.extend_from_slice(b"interstitial");
    stream.extend_from_slice(&small_message());

    let mut reader = Reader::new(&stream[..]);
    assert_eq!(reader.read_message()?.grids.len(), 1);
    assert_eq!(reader.read_message()?.grids.len(), 1);
    assert!(matches!(reader.read_message(), Err(GribError::Eof)));
    Ok(())
}
