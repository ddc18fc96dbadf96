/// Result type for PNG resolution edits
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while editing a PNG buffer.
///
/// A buffer whose `pHYs` chunk has no usable density is not an error; see
/// [`decode`](crate::decode).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Short buffer, bad signature, bad chunk tag or a chunk running past the end of the data
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// There is no `IDAT` chunk to place a new `pHYs` chunk in front of
    #[error("No IDAT chunk found")]
    MissingImageDataChunk,

    /// A DPI value that has no pixels-per-metre representation in a `u32`
    #[error("DPI value {dpi} doesn't fit in pixels per metre")]
    IntegerOverflow { dpi: f64 },
}
