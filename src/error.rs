//! Error types for view construction and conversion.

use alloc::boxed::Box;

use crate::descriptor::PixelFormat;

/// Errors from constructing pixel views and buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ViewError {
    #[error("stride is smaller than width * bytes per pixel")]
    StrideTooSmall,

    #[error("data slice is too small for the given dimensions and stride")]
    InsufficientData,

    #[error("width or height causes overflow")]
    InvalidDimensions,

    #[error("expected {expected} planes, got {actual}")]
    PlaneCountMismatch { expected: usize, actual: usize },

    #[error("pixel format plane mode does not match the constructor")]
    PlaneModeMismatch,
}

/// Errors from a transfer (validate, clip, decode, convert).
///
/// Everything is returned to the caller; nothing is retried or swallowed.
/// [`TruncatedSource`](ConvertError::TruncatedSource) may leave the
/// destination partially written — rows transferred before the short read
/// was detected stay visible and are not rolled back.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// Destination view size does not match the source image size under the
    /// `Ensure` dimension policy.
    #[error(
        "destination {dest_width}x{dest_height} does not match source image {src_width}x{src_height}"
    )]
    DimensionMismatch {
        src_width: u32,
        src_height: u32,
        dest_width: u32,
        dest_height: u32,
    },

    /// Destination pixel format does not map to the source's native format
    /// under the `Ensure` format policy.
    #[error("destination format {dest:?} does not match source native format {src:?}")]
    FormatMismatch { src: PixelFormat, dest: PixelFormat },

    /// A vertical region offset keeps the full source width; the destination
    /// width must equal it exactly.
    #[error("vertical-offset region requires full source width {src_width}, destination is {dest_width}")]
    WidthMismatch { src_width: u32, dest_width: u32 },

    /// Region offset starts past the end of the source image.
    #[error("region offset ({x}, {y}) exceeds source dimensions {width}x{height}")]
    OffsetOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// The backend does not support 2-D region offsets.
    #[error("backend supports vertical region offsets only")]
    PointOffsetUnsupported,

    /// The region starts above rows the unit stream has already consumed;
    /// forward-only codecs cannot rewind.
    #[error("region starts at row {requested} but the stream is already at row {position}")]
    StreamRewind { requested: u32, position: u32 },

    /// The codec produced fewer rows than the clipped region requires.
    #[error("source truncated: codec produced {got} of {expected} rows")]
    TruncatedSource { expected: u32, got: u32 },

    /// The destination pixel format has no codec-native equivalent and no
    /// converter (supplied or builtin) covers the pair.
    #[error("no conversion from native format {src:?} to destination format {dest:?}; supply a converter")]
    UnsupportedFormat { src: PixelFormat, dest: PixelFormat },

    /// `Synchronize` was requested for a borrowed destination view, which
    /// cannot be resized.
    #[error("dimension policy Synchronize requires an owned destination buffer")]
    SynchronizeUnsupported,

    /// Invalid destination view or buffer.
    #[error("view error: {0}")]
    View(#[from] ViewError),

    /// Error reported by the codec backend.
    #[error("codec error: {0}")]
    Codec(#[source] Box<dyn core::error::Error + Send + Sync>),
}

impl ConvertError {
    /// Wrap a backend-specific error.
    pub fn from_codec<E>(error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        ConvertError::Codec(Box::new(error))
    }
}
