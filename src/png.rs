use nom::{bytes::complete::tag, IResult};

use crate::error::{Error, Result};

pub const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\x0d\x0a\x1a\x0a";

pub fn parse_signature(input: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(PNG_SIGNATURE.as_slice())(input)
}

pub(crate) fn check_signature(input: &[u8]) -> Result<()> {
    if input.len() < PNG_SIGNATURE.len() {
        return Err(Error::MalformedInput(format!(
            "{} bytes is shorter than the PNG signature",
            input.len()
        )));
    }
    parse_signature(input)
        .map(|_| ())
        .map_err(|_| Error::MalformedInput("input doesn't start with expected signature".into()))
}
