use std::io::Read;

use log::warn;

use crate::bits::unpack_u64;
use crate::error::{GribError, Result};

pub mod encode;
pub mod sections;

use sections::sect1::Identification;
use sections::sect3::Grid;
use sections::sect4::Product;
use sections::sect5::DataRepresentation;
use sections::sect6::{self, BitmapUpdate};
use sections::sect7::complex::ComplexPackingDecoder;
use sections::sect7::jpeg2000::{Jpeg2000Decoder, Jpeg2000PackingDecoder};
use sections::sect7::simple::SimplePackingDecoder;
use sections::sect7::DataDecoder;
use sections::SectionHeader;

const IS_SIZE: usize = 16;
const END_MAGIC: &[u8] = b"7777";

/// Metadata in force when a Data Section was read. Every grid gets its own
/// deep copy: later sections 3/4/5/6 in the same message overwrite the
/// common slot, and the bitmap would otherwise alias a dead buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMetadata {
    pub grid: Grid,
    pub product: Product,
    pub repr: DataRepresentation,
    pub bitmap: Option<Vec<u8>>,
}

/// One field of a (possibly multi-grid) GRIB2 message.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    pub metadata: GridMetadata,
    pub gridpoints: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub discipline: u8,
    pub total_len: u64,
    pub identification: Identification,
    pub grids: Vec<GridField>,
}

/// Streaming GRIB2 decoder. The input buffer grows monotonically across
/// messages; an optional JPEG 2000 collaborator handles templates 40/40000.
pub struct Reader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    jpeg2000: Option<Box<dyn Jpeg2000Decoder>>,
}

#[derive(Default)]
struct PendingMetadata {
    grid: Option<Grid>,
    product: Option<Product>,
    repr: Option<DataRepresentation>,
    bitmap: Option<Vec<u8>>,
}

impl PendingMetadata {
    fn snapshot(&self) -> Result<GridMetadata> {
        let missing = |what: &str| {
            GribError::InvariantViolation(format!("data section before any {}", what))
        };
        Ok(GridMetadata {
            grid: self.grid.clone().ok_or_else(|| missing("grid definition"))?,
            product: self.product.clone().ok_or_else(|| missing("product definition"))?,
            repr: self.repr.clone().ok_or_else(|| missing("data representation"))?,
            bitmap: self.bitmap.clone(),
        })
    }
}

impl<R: Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            jpeg2000: None,
        }
    }

    /// Installs the external JPEG 2000 collaborator.
    pub fn with_jpeg2000(mut self, decoder: Box<dyn Jpeg2000Decoder>) -> Self {
        self.jpeg2000 = Some(decoder);
        self
    }

    /// Decodes the next message, scanning forward to the next `GRIB` magic.
    /// Returns `Err(GribError::Eof)` once the stream is exhausted.
    pub fn read_message(&mut self) -> Result<Message> {
        let (discipline, total_len) = self.fill_buffer()?;

        // structure pass: how many grids does this message hold
        let num_grids = self.count_grids(total_len);
        let mut grids = Vec::with_capacity(num_grids);

        // decode pass
        let mut identification = None;
        let mut pending = PendingMetadata::default();
        let mut offset = IS_SIZE * 8;
        while !self.at_end_marker(offset, total_len) {
            let header = SectionHeader::read(&self.buffer, offset);
            if header.len < 5 {
                return Err(GribError::InvariantViolation(format!(
                    "section {} declares {} octets",
                    header.number, header.len
                )));
            }
            if offset / 8 + header.len > total_len {
                return Err(GribError::TruncatedMessage {
                    expected: offset / 8 + header.len,
                    got: total_len,
                });
            }
            match header.number {
                1 => identification = Some(Identification::decode(&self.buffer, offset)),
                2 => {} // local use section, skipped
                3 => pending.grid = Some(Grid::decode(&self.buffer, offset)?),
                4 => pending.product = Some(Product::decode(&self.buffer, offset)?),
                5 => pending.repr = Some(DataRepresentation::decode(&self.buffer, offset)?),
                6 => match sect6::decode(&self.buffer, offset, header.len)? {
                    BitmapUpdate::Explicit(bitmap) => pending.bitmap = Some(bitmap),
                    BitmapUpdate::ReusePrevious => {}
                    BitmapUpdate::None => pending.bitmap = None,
                },
                7 => {
                    let metadata = pending.snapshot()?;
                    let body = &self.buffer[offset / 8 + 5..offset / 8 + header.len];
                    let gridpoints = self.decode_gridpoints(&metadata, body)?;
                    grids.push(GridField { metadata, gridpoints });
                }
                n => {
                    return Err(GribError::InvariantViolation(format!(
                        "unknown section number {}",
                        n
                    )));
                }
            }
            offset += header.len * 8;
        }

        Ok(Message {
            discipline,
            total_len: total_len as u64,
            identification: identification.ok_or_else(|| {
                GribError::InvariantViolation(String::from("missing identification section"))
            })?,
            grids,
        })
    }

    fn decode_gridpoints(&self, metadata: &GridMetadata, body: &[u8]) -> Result<Vec<f64>> {
        match metadata.repr.templ_num {
            0 => SimplePackingDecoder.decode(metadata, body),
            3 => ComplexPackingDecoder.decode(metadata, body),
            40 | 40000 => Jpeg2000PackingDecoder {
                decoder: self.jpeg2000.as_deref(),
            }
            .decode(metadata, body),
            other => Err(GribError::UnsupportedDataTemplate(other)),
        }
    }

    fn count_grids(&self, total_len: usize) -> usize {
        let mut num_grids = 0;
        let mut offset = IS_SIZE * 8;
        while !self.at_end_marker(offset, total_len) {
            let header = SectionHeader::read(&self.buffer, offset);
            if header.len < 5 {
                break;
            }
            if header.number == 7 {
                num_grids += 1;
            }
            offset += header.len * 8;
        }
        num_grids
    }

    fn at_end_marker(&self, offset: usize, total_len: usize) -> bool {
        let byte = offset / 8;
        // a message without the trailing 7777 already warned; stop at the
        // declared length instead of running off the buffer
        byte + 4 >= total_len || &self.buffer[byte..byte + 4] == END_MAGIC
    }

    fn fill_buffer(&mut self) -> Result<(u8, usize)> {
        let mut head = [0u8; IS_SIZE];
        self.scan_for_magic(&mut head)?;
        let discipline = head[6];
        let edition = head[7];
        if edition != 2 {
            return Err(GribError::UnsupportedEdition(edition));
        }
        let total_len = unpack_u64(&head, 64) as usize;
        if total_len < IS_SIZE + 4 {
            return Err(GribError::InvariantViolation(format!(
                "declared message length {} is too short",
                total_len
            )));
        }
        self.buffer.clear();
        self.buffer.resize(total_len, 0);
        self.buffer[..IS_SIZE].copy_from_slice(&head);
        let mut got = IS_SIZE;
        while got < total_len {
            let n = self.reader.read(&mut self.buffer[got..])?;
            if n == 0 {
                return Err(GribError::TruncatedMessage {
                    expected: total_len,
                    got,
                });
            }
            got += n;
        }
        if &self.buffer[total_len - 4..] != END_MAGIC {
            warn!("no end section found");
        }
        Ok((discipline, total_len))
    }

    fn scan_for_magic(&mut self, head: &mut [u8; IS_SIZE]) -> Result<()> {
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
        if got < IS_SIZE - 4 {
            return Err(GribError::TruncatedMessage {
                expected: IS_SIZE,
                got: 4 + got,
            });
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
}

impl Message {
    /// Sanity bound: the per-grid packed counts can never exceed the bits
    /// the message itself holds.
    pub fn packed_counts_fit(&self) -> bool {
        let total: usize = self.grids.iter().map(|g| g.metadata.repr.num_packed).sum();
        (total as u64) <= self.total_len * 8
    }
}
