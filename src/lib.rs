//! Reads and rewrites the `pHYs` (physical pixel dimensions) chunk of PNG data held in memory.

mod chunks;
mod crc;
mod error;
mod png;
mod writer;

pub use chunks::phys::{decode, has_resolution, to_dpi, to_ppm, Resolution, Unit, PHYS};
pub use chunks::{iter_chunks, locate, tag_from_str, ChunkIter, RawChunk, IDAT, IEND};
pub use crc::{checksum, chunk_crc, update_crc};
pub use error::{Error, Result};
pub use png::{parse_signature, PNG_SIGNATURE};
pub use writer::set_resolution;
