//! The narrow contract a codec binding implements.
//!
//! The negotiation and conversion core never talks to a concrete codec
//! library; it depends only on [`CodecBackend`]. Bindings (JPEG, PNG, TIFF,
//! platform imaging subsystems, ...) live in their own crates and implement
//! this trait over an opened, header-parsed image. The backend keeps its own
//! decode cursor, so one backend instance must not be shared between
//! concurrent transfers.

use crate::descriptor::PixelFormat;
use crate::region::RegionOffset;
use crate::view::ImageViewMut;

/// Opaque codec-native pixel format identifier.
///
/// The value is meaningful only to the backend that issued it; the core
/// compares identifiers and passes them back, nothing more.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatId(pub u32);

/// Result of one [`CodecBackend::read_next_unit`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct UnitInfo {
    /// Rows of pixel data written into the scratch buffer. Zero means the
    /// codec has no more data.
    pub rows: u32,
}

impl UnitInfo {
    /// Describe a unit of `rows` decoded rows.
    pub const fn new(rows: u32) -> Self {
        Self { rows }
    }
}

/// Describes what a backend supports.
///
/// Returned by [`CodecBackend::capabilities`] as a `&'static` reference.
/// The struct uses getter methods so fields can be added over time without
/// breaking changes.
///
/// # Example
///
/// ```
/// use zenconvert::BackendCaps;
///
/// static CAPS: BackendCaps = BackendCaps::new()
///     .with_builtin_conversion(true)
///     .with_point_offsets(true);
///
/// assert!(CAPS.builtin_conversion());
/// assert!(!CAPS.tiled());
/// ```
#[non_exhaustive]
pub struct BackendCaps {
    builtin_conversion: bool,
    point_offsets: bool,
    tiled: bool,
}

impl Default for BackendCaps {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendCaps {
    /// Create capabilities with everything disabled.
    pub const fn new() -> Self {
        Self {
            builtin_conversion: false,
            point_offsets: false,
            tiled: false,
        }
    }

    /// Whether [`decode_into_with_format`](CodecBackend::decode_into_with_format)
    /// is available (the codec can decode while tagging the buffer with a
    /// different format id).
    pub const fn builtin_conversion(&self) -> bool {
        self.builtin_conversion
    }

    /// Whether 2-D [`RegionOffset::Point`] requests are supported. Codecs
    /// that can only skip whole scanlines leave this false and accept
    /// [`RegionOffset::Rows`] only.
    pub const fn point_offsets(&self) -> bool {
        self.point_offsets
    }

    /// Whether decode units are multi-row tile strips rather than single
    /// scanlines.
    pub const fn tiled(&self) -> bool {
        self.tiled
    }

    /// Builder: enable builtin format conversion.
    pub const fn with_builtin_conversion(mut self, value: bool) -> Self {
        self.builtin_conversion = value;
        self
    }

    /// Builder: enable 2-D region offsets.
    pub const fn with_point_offsets(mut self, value: bool) -> Self {
        self.point_offsets = value;
        self
    }

    /// Builder: mark decode units as tile strips.
    pub const fn with_tiled(mut self, value: bool) -> Self {
        self.tiled = value;
        self
    }
}

/// An opened, header-parsed source image inside a codec binding.
///
/// The core queries format and dimensions, asks for raw decodes into caller
/// buffers, or pulls native-format units through a scratch buffer. It never
/// manages the lifetime of the underlying codec state — dropping the backend
/// is the binding's concern.
///
/// Rows and units are always produced in increasing row-major order; the only
/// backwards-incompatible motion the core ever requests is the forward
/// [`skip_units`](CodecBackend::skip_units).
pub trait CodecBackend {
    /// The binding-specific error type. Already normalized — the core never
    /// sees C-library error codes or longjmp-style escapes.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Static capability descriptor for this backend.
    fn capabilities(&self) -> &'static BackendCaps;

    /// The source image's native pixel format id.
    fn native_format(&self) -> FormatId;

    /// Memory layout of [`native_format`](CodecBackend::native_format),
    /// used to interpret scratch units on the generic path.
    fn native_pixel_format(&self) -> PixelFormat;

    /// Map a pixel format descriptor to this codec's format id, if the codec
    /// supports that exact pixel type. `None` fails closed: the core then
    /// uses the generic conversion path.
    fn native_format_for(&self, format: &PixelFormat) -> Option<FormatId>;

    /// Physical pixel byte size of a codec format id.
    fn format_pixel_byte_size(&self, format: FormatId) -> usize;

    /// Source image dimensions in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Decode directly into the destination with no conversion; source and
    /// destination byte layouts are identical. The offset passes through
    /// unchanged.
    fn decode_into_raw(
        &mut self,
        dest: &mut ImageViewMut<'_>,
        offset: RegionOffset,
    ) -> Result<(), Self::Error>;

    /// Decode into the destination's raw bytes while writing pixels of
    /// `target` (normally the source's own native format, so no codec-level
    /// conversion happens). Only available when
    /// [`BackendCaps::builtin_conversion`] is true.
    fn decode_into_with_format(
        &mut self,
        dest: &mut ImageViewMut<'_>,
        target: FormatId,
        offset: RegionOffset,
    ) -> Result<(), Self::Error>;

    /// Decode the next unit (scanline, or tile strip for tiled codecs) into
    /// `scratch` in the native format and native row order.
    ///
    /// Planar native formats fill the unit plane-major: all of plane 0's
    /// rows, then plane 1's, and so on. Returns the number of rows produced;
    /// zero rows means the stream is exhausted.
    fn read_next_unit(&mut self, scratch: &mut [u8]) -> Result<UnitInfo, Self::Error>;

    /// Skip the next `n` units without producing pixels.
    fn skip_units(&mut self, n: u32) -> Result<(), Self::Error>;

    /// Rows per unit: 1 for scanline codecs, the tile height for tiled ones.
    fn unit_rows(&self) -> u32 {
        1
    }

    /// Source row index of the next unit [`read_next_unit`](CodecBackend::read_next_unit)
    /// will produce. Lets successive offset requests continue a forward-only
    /// stream without re-skipping rows already consumed. Always unit-aligned.
    fn unit_position(&self) -> u32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_builder() {
        const CAPS: BackendCaps = BackendCaps::new()
            .with_builtin_conversion(true)
            .with_tiled(true);
        assert!(CAPS.builtin_conversion());
        assert!(!CAPS.point_offsets());
        assert!(CAPS.tiled());
    }

    #[test]
    fn caps_default_all_off() {
        let caps = BackendCaps::default();
        assert!(!caps.builtin_conversion());
        assert!(!caps.point_offsets());
        assert!(!caps.tiled());
    }

    #[test]
    fn unit_info() {
        assert_eq!(UnitInfo::new(8).rows, 8);
    }
}
