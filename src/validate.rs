//! Dimension and format policies applied before a transfer runs.
//!
//! The caller picks how strictly the destination must match the source:
//! dimensions via [`DimensionPolicy`], pixel format via [`FormatHandling`].
//! Both default to the cheap debug-build check.

use crate::buffer::PixelBuffer;
use crate::convert::PixelConverter;
use crate::error::ConvertError;
use crate::region::RegionOffset;

/// How destination dimensions are checked against the source image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum DimensionPolicy {
    /// `debug_assert!` only; release builds skip the check. For callers that
    /// size the destination themselves.
    #[default]
    Assert,
    /// Return [`ConvertError::DimensionMismatch`] on any difference.
    Ensure,
    /// Reallocate the destination to the source's dimensions. Only owned
    /// destinations support this; a borrowed view fails with
    /// [`ConvertError::SynchronizeUnsupported`].
    Synchronize,
}

/// How the destination pixel format is reconciled with the source.
///
/// Not `Copy`: the `Convert` variant borrows a caller-supplied converter.
#[derive(Clone, Copy, Default)]
#[non_exhaustive]
pub enum FormatHandling<'a> {
    /// `debug_assert!` that the destination format has a codec-native
    /// equivalent; release builds skip the check.
    #[default]
    Assert,
    /// Return [`ConvertError::FormatMismatch`] unless the destination format
    /// maps to the source's native format.
    Ensure,
    /// Use the builtin converter set; fail with
    /// [`ConvertError::UnsupportedFormat`] when no builtin mapping covers
    /// the pair.
    Auto,
    /// Use this converter for the generic path.
    Convert(&'a dyn PixelConverter),
}

impl core::fmt::Debug for FormatHandling<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            FormatHandling::Assert => "Assert",
            FormatHandling::Ensure => "Ensure",
            FormatHandling::Auto => "Auto",
            FormatHandling::Convert(_) => "Convert(..)",
        };
        f.write_str(name)
    }
}

/// Check destination dimensions against the source under `policy`.
///
/// Any explicit region offset bypasses the whole-image comparison — the
/// clipper owns partial-transfer geometry, and a chunked destination is
/// smaller than the source by design.
///
/// `Synchronize` passes here unconditionally; reallocation happens at the
/// call site that owns the destination buffer.
pub fn check_dimensions(
    policy: DimensionPolicy,
    source: (u32, u32),
    dest: (u32, u32),
    offset: RegionOffset,
) -> Result<(), ConvertError> {
    if !offset.is_none() {
        return Ok(());
    }
    match policy {
        DimensionPolicy::Assert => {
            debug_assert!(
                source == dest,
                "destination {}x{} does not match source {}x{}",
                dest.0,
                dest.1,
                source.0,
                source.1
            );
            Ok(())
        }
        DimensionPolicy::Ensure => {
            if source != dest {
                return Err(ConvertError::DimensionMismatch {
                    src_width: source.0,
                    src_height: source.1,
                    dest_width: dest.0,
                    dest_height: dest.1,
                });
            }
            Ok(())
        }
        DimensionPolicy::Synchronize => Ok(()),
    }
}

/// Reallocate `dest` to the source dimensions, keeping its pixel format.
///
/// The one mutating policy: after this the transfer proceeds as if the
/// caller had sized the buffer correctly up front. A no-op when the
/// dimensions already match.
pub fn synchronize_buffer(source: (u32, u32), dest: &mut PixelBuffer) {
    if (dest.width(), dest.height()) != source {
        *dest = PixelBuffer::new(source.0, source.1, dest.format());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_rejects_mismatch() {
        let err = check_dimensions(
            DimensionPolicy::Ensure,
            (100, 50),
            (100, 60),
            RegionOffset::None,
        );
        assert!(matches!(
            err.unwrap_err(),
            ConvertError::DimensionMismatch {
                src_height: 50,
                dest_height: 60,
                ..
            }
        ));
    }

    #[test]
    fn ensure_accepts_match() {
        assert!(
            check_dimensions(
                DimensionPolicy::Ensure,
                (100, 50),
                (100, 50),
                RegionOffset::None
            )
            .is_ok()
        );
    }

    #[test]
    fn offset_bypasses_whole_image_check() {
        // Chunked destinations are smaller than the source on purpose.
        assert!(
            check_dimensions(
                DimensionPolicy::Ensure,
                (100, 50),
                (100, 16),
                RegionOffset::Rows(16)
            )
            .is_ok()
        );
    }

    #[test]
    fn synchronize_always_passes() {
        assert!(
            check_dimensions(
                DimensionPolicy::Synchronize,
                (100, 50),
                (1, 1),
                RegionOffset::None
            )
            .is_ok()
        );
    }

    #[test]
    fn assert_passes_in_release_semantics() {
        // Matching dimensions never trip the debug assert.
        assert!(
            check_dimensions(
                DimensionPolicy::Assert,
                (100, 50),
                (100, 50),
                RegionOffset::None
            )
            .is_ok()
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not match source")]
    fn assert_panics_in_debug_on_mismatch() {
        let _ = check_dimensions(
            DimensionPolicy::Assert,
            (100, 50),
            (90, 50),
            RegionOffset::None,
        );
    }

    #[test]
    fn synchronize_buffer_reallocates_to_source() {
        use crate::descriptor::PixelFormat;
        let mut buf = PixelBuffer::new(1, 1, PixelFormat::RGB8);
        synchronize_buffer((100, 50), &mut buf);
        assert_eq!((buf.width(), buf.height()), (100, 50));
        assert_eq!(buf.format(), PixelFormat::RGB8);
    }

    #[test]
    fn format_handling_debug_names() {
        use alloc::format;
        assert_eq!(format!("{:?}", FormatHandling::Auto), "Auto");
        assert_eq!(
            format!("{:?}", FormatHandling::Convert(&crate::convert::IdentityConverter)),
            "Convert(..)"
        );
    }
}
