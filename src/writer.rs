use std::ops::Range;

use crate::{
    chunks::{
        find,
        phys::{pHYsChunk, DATA_LENGTH, PHYS, RECORD_LENGTH},
        Found, ParseableChunk,
    },
    error::{Error, Result},
    png::check_signature,
};

/// Where the new `pHYs` record goes.
#[derive(Debug, PartialEq, Eq)]
enum Placement {
    /// A well-formed `pHYs` chunk starts at this length field.
    Overwrite(usize),
    /// A `pHYs` chunk of the wrong size occupies this range.
    Replace(Range<usize>),
    /// No `pHYs` chunk before the image data; insert at the `IDAT` length field.
    Insert(usize),
}

fn placement(buffer: &[u8]) -> Result<Placement> {
    match find(buffer, PHYS, true)? {
        Some(Found::Tag(chunk)) if chunk.data.len() == DATA_LENGTH => {
            Ok(Placement::Overwrite(chunk.length_offset()))
        }
        Some(Found::Tag(chunk)) => Ok(Placement::Replace(chunk.length_offset()..chunk.end())),
        Some(Found::ImageData(chunk)) => Ok(Placement::Insert(chunk.length_offset())),
        None => Err(Error::MissingImageDataChunk),
    }
}

/// Stores a resolution of `dpi_x` by `dpi_y` pixels per inch in `buffer`.
///
/// An existing `pHYs` chunk ahead of the image data is rewritten where it
/// stands, otherwise a new one is placed right before the first `IDAT`
/// chunk. Use the returned buffer from then on: it may or may not share
/// storage with the one passed in.
pub fn set_resolution(mut buffer: Vec<u8>, dpi_x: f64, dpi_y: f64) -> Result<Vec<u8>> {
    let record = pHYsChunk::with_dpi(dpi_x, dpi_y)?.to_bytes();
    check_signature(&buffer)?;

    match placement(&buffer)? {
        Placement::Overwrite(start) => {
            log::debug!("overwriting pHYs chunk at offset {start}");
            buffer[start..start + RECORD_LENGTH].copy_from_slice(&record);
            Ok(buffer)
        }
        Placement::Replace(range) => {
            log::debug!(
                "replacing {}-byte pHYs chunk at offset {}",
                range.len(),
                range.start
            );
            buffer.splice(range, record);
            Ok(buffer)
        }
        Placement::Insert(at) => {
            log::debug!("inserting pHYs chunk before IDAT at offset {at}");
            let mut output = Vec::with_capacity(buffer.len() + RECORD_LENGTH);
            output.extend_from_slice(&buffer[..at]);
            output.extend_from_slice(&record);
            output.extend_from_slice(&buffer[at..]);
            Ok(output)
        }
    }
}
