use super::{locate, ParseableChunk, CHUNK_OVERHEAD};
use crate::{
    crc::chunk_crc,
    error::{Error, Result},
};
use nom::{
    number::complete::{be_u32, u8},
    sequence::tuple,
    IResult,
};

pub const PHYS: &[u8; 4] = b"pHYs";

/// Metres in one inch.
const METRES_PER_INCH: f64 = 0.0254;

pub(crate) const DATA_LENGTH: usize = 9;
pub(crate) const RECORD_LENGTH: usize = DATA_LENGTH + CHUNK_OVERHEAD;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct pHYsChunk {
    pub(crate) x_axis_ppu: u32,
    pub(crate) y_axis_ppu: u32,
    pub(crate) unit_specifier: Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Unknown(u8),
    Meter,
}
impl From<u8> for Unit {
    fn from(value: u8) -> Self {
        if value == 1 {
            Self::Meter
        } else {
            Self::Unknown(value)
        }
    }
}
impl From<Unit> for u8 {
    fn from(value: Unit) -> Self {
        match value {
            Unit::Meter => 1,
            Unit::Unknown(v) => v,
        }
    }
}

/// Horizontal and vertical pixels per metre of a `pHYs` chunk whose unit is the metre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub x: u32,
    pub y: u32,
}
impl Resolution {
    /// Pixels per inch on both axes.
    pub fn dpi(&self) -> (f64, f64) {
        (to_dpi(self.x), to_dpi(self.y))
    }
}

impl pHYsChunk {
    pub(crate) fn with_dpi(dpi_x: f64, dpi_y: f64) -> Result<Self> {
        Ok(pHYsChunk {
            x_axis_ppu: to_ppm(dpi_x)?,
            y_axis_ppu: to_ppm(dpi_y)?,
            unit_specifier: Unit::Meter,
        })
    }

    pub(crate) fn resolution(&self) -> Option<Resolution> {
        match self.unit_specifier {
            Unit::Meter => Some(Resolution {
                x: self.x_axis_ppu,
                y: self.y_axis_ppu,
            }),
            Unit::Unknown(_) => None,
        }
    }
}

impl<'a> ParseableChunk<'a> for pHYsChunk {
    type Output = [u8; RECORD_LENGTH];

    const HEADER: &'static [u8; 4] = PHYS;

    fn from_bytes(chunk_data: &'a [u8]) -> IResult<&'a [u8], Self> {
        let (rest, (x_axis_ppu, y_axis_ppu, unit)) = tuple((be_u32, be_u32, u8))(chunk_data)?;
        Ok((
            rest,
            pHYsChunk {
                x_axis_ppu,
                y_axis_ppu,
                unit_specifier: unit.into(),
            },
        ))
    }

    /// The whole chunk record: length, type, data and CRC.
    fn to_bytes(&self) -> Self::Output {
        let mut data = [0; DATA_LENGTH];
        data[0..4].copy_from_slice(&self.x_axis_ppu.to_be_bytes());
        data[4..8].copy_from_slice(&self.y_axis_ppu.to_be_bytes());
        data[8] = self.unit_specifier.into();

        let mut bytes = [0; RECORD_LENGTH];
        bytes[0..4].copy_from_slice(&(DATA_LENGTH as u32).to_be_bytes());
        bytes[4..8].copy_from_slice(Self::HEADER);
        bytes[8..17].copy_from_slice(&data);
        bytes[17..].copy_from_slice(&chunk_crc(Self::HEADER, &data).to_be_bytes());
        bytes
    }
}

/// Reads the resolution stored in the `pHYs` chunk whose type field starts at `offset`.
///
/// `None` when the declared length isn't 9, the chunk runs past the end of
/// `buffer`, or the unit isn't the metre.
pub fn decode(buffer: &[u8], offset: usize) -> Option<Resolution> {
    let length_field = buffer.get(offset.checked_sub(4)?..offset)?;
    let (_, length) = be_u32::<_, nom::error::Error<_>>(length_field).ok()?;
    if length as usize != DATA_LENGTH || offset + 4 + DATA_LENGTH + 4 > buffer.len() {
        return None;
    }
    let (_, chunk) = pHYsChunk::from_bytes(&buffer[offset + 4..offset + 4 + DATA_LENGTH]).ok()?;
    chunk.resolution()
}

/// True when a `pHYs` chunk comes before the image data.
pub fn has_resolution(buffer: &[u8]) -> bool {
    locate(buffer, PHYS, true).is_some()
}

pub fn to_dpi(pixels_per_metre: u32) -> f64 {
    pixels_per_metre as f64 * METRES_PER_INCH
}

/// Pixels per inch to pixels per metre, rounded to the nearest integer.
pub fn to_ppm(dpi: f64) -> Result<u32> {
    let ppm = (dpi / METRES_PER_INCH).round();
    if !(0.0..=u32::MAX as f64).contains(&ppm) {
        return Err(Error::IntegerOverflow { dpi });
    }
    Ok(ppm as u32)
}
