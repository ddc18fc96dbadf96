use nom::{
    bytes::complete::take,
    combinator::map,
    number::complete::be_u32,
    sequence::tuple,
    IResult,
};

use crate::{
    crc::chunk_crc,
    error::{Error, Result},
    png::PNG_SIGNATURE,
};

pub(crate) mod phys;

pub const IDAT: &[u8; 4] = b"IDAT";
pub const IEND: &[u8; 4] = b"IEND";

/// Bytes a chunk occupies besides its data: length, type and CRC.
pub(crate) const CHUNK_OVERHEAD: usize = 12;

/// One chunk as it sits in the buffer, borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
    /// Position of the type field, four bytes past the length field.
    pub offset: usize,
    pub chunk_type: &'a [u8; 4],
    pub data: &'a [u8],
    pub crc: u32,
}
impl<'a> RawChunk<'a> {
    pub fn length_offset(&self) -> usize {
        self.offset - 4
    }

    /// One past the last CRC byte.
    pub fn end(&self) -> usize {
        self.length_offset() + CHUNK_OVERHEAD + self.data.len()
    }

    pub fn crc_is_valid(&self) -> bool {
        chunk_crc(self.chunk_type, self.data) == self.crc
    }
}

/// Walks the chunks following the signature, stopping after `IEND`, at the
/// end of the buffer or at the first chunk that doesn't fit.
pub fn iter_chunks(source: &[u8]) -> ChunkIter<'_> {
    ChunkIter {
        source,
        position: PNG_SIGNATURE.len(),
        finished: false,
    }
}

pub struct ChunkIter<'a> {
    source: &'a [u8],
    position: usize,
    finished: bool,
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<RawChunk<'a>>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.source.len() < PNG_SIGNATURE.len() {
            self.finished = true;
            return Some(Err(Error::MalformedInput(format!(
                "{} bytes is shorter than the PNG signature",
                self.source.len()
            ))));
        }
        let input = &self.source[self.position..];
        if input.is_empty() {
            self.finished = true;
            return None;
        }
        match parse_chunk(input) {
            Ok((rest, (chunk_type, data, crc))) => {
                let chunk = RawChunk {
                    offset: self.position + 4,
                    chunk_type,
                    data,
                    crc,
                };
                self.position = self.source.len() - rest.len();
                if chunk_type == IEND {
                    self.finished = true;
                }
                Some(Ok(chunk))
            }
            Err(_) => {
                self.finished = true;
                Some(Err(Error::MalformedInput(format!(
                    "chunk at offset {} runs past the end of the data",
                    self.position
                ))))
            }
        }
    }
}

fn parse_chunk<'a>(input: &'a [u8]) -> IResult<&'a [u8], (&'a [u8; 4], &'a [u8], u32)> {
    let (input, (length, chunk_type)) = tuple((
        be_u32,
        map(take(4usize), |v: &'a [u8]| -> &'a [u8; 4] {
            v.try_into().expect("4 bytes should have been taken")
        }),
    ))(input)?;
    let (input, (data, crc)) = tuple((take(length as usize), be_u32))(input)?;
    Ok((input, (chunk_type, data, crc)))
}

/// Where a walk for one chunk type ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Found<'a> {
    Tag(RawChunk<'a>),
    /// `IDAT` came first, so the tag doesn't count.
    ImageData(RawChunk<'a>),
}

/// Walks to the first `tag` chunk, or to the first `IDAT` when
/// `must_precede_image_data` is set. `Ok(None)` when neither turns up.
pub(crate) fn find<'a>(
    buffer: &'a [u8],
    tag: &[u8; 4],
    must_precede_image_data: bool,
) -> Result<Option<Found<'a>>> {
    for chunk in iter_chunks(buffer) {
        let chunk = chunk?;
        if chunk.chunk_type == tag {
            return Ok(Some(Found::Tag(chunk)));
        }
        if must_precede_image_data && chunk.chunk_type == IDAT {
            return Ok(Some(Found::ImageData(chunk)));
        }
    }
    Ok(None)
}

/// Offset of the type field of the first `tag` chunk, or `None`.
///
/// With `must_precede_image_data` set, reaching an `IDAT` chunk first ends
/// the search. A short buffer or a chunk that runs off the end of the data
/// also counts as not found. The walk starts after the signature, so a
/// match never lands inside it.
pub fn locate(buffer: &[u8], tag: &[u8; 4], must_precede_image_data: bool) -> Option<usize> {
    match find(buffer, tag, must_precede_image_data) {
        Ok(Some(Found::Tag(chunk))) => Some(chunk.offset),
        Ok(_) => None,
        Err(e) => {
            log::trace!("stopped looking for {}: {e}", String::from_utf8_lossy(tag));
            None
        }
    }
}

/// Turns a textual chunk type like `"pHYs"` into its four tag bytes.
pub fn tag_from_str(tag: &str) -> Result<[u8; 4]> {
    if !tag.is_ascii() {
        return Err(Error::MalformedInput(format!("chunk type {tag:?} isn't ASCII")));
    }
    tag.as_bytes()
        .try_into()
        .map_err(|_| Error::MalformedInput(format!("chunk type {tag:?} isn't 4 bytes long")))
}

pub(crate) trait ParseableChunk<'a>: Sized {
    type Output: AsRef<[u8]>;
    const HEADER: &'static [u8; 4];

    fn from_bytes(chunk_data: &'a [u8]) -> IResult<&'a [u8], Self>;
    fn to_bytes(&self) -> Self::Output;
}
