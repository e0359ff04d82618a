//! Region offsets and clipping for partial (streaming) decode.
//!
//! A caller paging a large image through a fixed-size destination declares a
//! [`RegionOffset`] per call; [`clip`] turns the offset plus the source and
//! destination extents into the sub-rectangle actually transferred. Every
//! request — including the trailing partial chunk — comes out of the clipper
//! safe to execute, so streaming loops never special-case the last chunk.

use crate::error::ConvertError;

/// Where in the source image a transfer starts.
///
/// Codecs that can only skip scanlines support [`Rows`](RegionOffset::Rows);
/// codecs with full 2-D ROI support also accept
/// [`Point`](RegionOffset::Point). A full-image transfer uses
/// [`None`](RegionOffset::None).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RegionOffset {
    /// Full image, no offset.
    #[default]
    None,
    /// Start at this source row, full width.
    Rows(u32),
    /// Start at this source position (2-D ROI).
    Point { x: u32, y: u32 },
}

impl RegionOffset {
    /// Whether this is a full-image (no-offset) request.
    #[inline]
    pub fn is_none(self) -> bool {
        matches!(self, RegionOffset::None)
    }
}

/// The sub-rectangle of the source a transfer will actually read.
///
/// Always lies fully inside the source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClippedRegion {
    /// Left edge in source coordinates.
    pub x: u32,
    /// Top edge in source coordinates.
    pub y: u32,
    /// Width of the transfer.
    pub width: u32,
    /// Height of the transfer.
    pub height: u32,
}

/// Clip a requested transfer against the source extent.
///
/// - `RegionOffset::None` returns the full source extent regardless of the
///   destination size; whether the destination matches is the validator's
///   concern, not the clipper's.
/// - `RegionOffset::Rows(y0)` keeps the full source width (the destination
///   width must equal it exactly) and caps the height to the rows remaining
///   below `y0`. A destination taller than what remains is silently shrunk —
///   that is the supported mechanism for streaming an image in chunks whose
///   size does not evenly divide its height.
/// - `RegionOffset::Point` caps both axes the same way.
///
/// An offset past the end of the source is an error, not a clamp.
pub fn clip(
    source: (u32, u32),
    dest: (u32, u32),
    offset: RegionOffset,
) -> Result<ClippedRegion, ConvertError> {
    let (src_w, src_h) = source;
    let (dest_w, dest_h) = dest;
    match offset {
        RegionOffset::None => Ok(ClippedRegion {
            x: 0,
            y: 0,
            width: src_w,
            height: src_h,
        }),
        RegionOffset::Rows(y0) => {
            if dest_w != src_w {
                return Err(ConvertError::WidthMismatch {
                    src_width: src_w,
                    dest_width: dest_w,
                });
            }
            if y0 > src_h {
                return Err(ConvertError::OffsetOutOfBounds {
                    x: 0,
                    y: y0,
                    width: src_w,
                    height: src_h,
                });
            }
            Ok(ClippedRegion {
                x: 0,
                y: y0,
                width: src_w,
                height: dest_h.min(src_h - y0),
            })
        }
        RegionOffset::Point { x: x0, y: y0 } => {
            if x0 > src_w || y0 > src_h {
                return Err(ConvertError::OffsetOutOfBounds {
                    x: x0,
                    y: y0,
                    width: src_w,
                    height: src_h,
                });
            }
            Ok(ClippedRegion {
                x: x0,
                y: y0,
                width: dest_w.min(src_w - x0),
                height: dest_h.min(src_h - y0),
            })
        }
    }
}
