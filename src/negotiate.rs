//! Format negotiation between a source's native format and a destination.
//!
//! Negotiation picks the cheapest of three transfer paths, in a fixed
//! priority: raw copy, then in-place reinterpret, then generic
//! scanline/tile conversion. Each step down trades one fewer buffer pass for
//! more runtime branching; the ordering is a contract, not a cost model.
//! Negotiation never fails — the generic path is always available as long as
//! a pixel converter covers the source's native format.

use crate::backend::{CodecBackend, FormatId};
use crate::descriptor::PixelFormat;

/// The transfer path selected for one request.
///
/// Derived fresh for every transfer — never cached, because source format,
/// destination format, and region offset can all vary per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionPlan {
    /// Source and destination byte layouts are identical; delegate the whole
    /// transfer to the codec.
    RawCopy,
    /// Pixel footprints match but color interpretation differs: decode the
    /// native bit pattern straight into the destination buffer, then convert
    /// pixel-by-pixel in place. Saves the scratch allocation and the second
    /// buffer pass.
    ReinterpretInPlace {
        /// The source's native format id, decoded verbatim into the
        /// destination bytes before the in-place pass.
        native: FormatId,
    },
    /// Decode native units into a scratch buffer and copy-convert each pixel
    /// into the destination.
    Generic {
        /// The source's native format id, identifying which concrete pixel
        /// type the scratch buffer holds.
        native: FormatId,
    },
}

impl ConversionPlan {
    /// Whether the plan is a raw, no-conversion transfer.
    #[inline]
    pub fn can_raw_copy(self) -> bool {
        matches!(self, ConversionPlan::RawCopy)
    }

    /// Whether the plan converts in place inside the destination buffer.
    #[inline]
    pub fn needs_in_place_reinterpret(self) -> bool {
        matches!(self, ConversionPlan::ReinterpretInPlace { .. })
    }

    /// The native format id carried by the reinterpret and generic paths.
    #[inline]
    pub fn native(self) -> Option<FormatId> {
        match self {
            ConversionPlan::RawCopy => None,
            ConversionPlan::ReinterpretInPlace { native } | ConversionPlan::Generic { native } => {
                Some(native)
            }
        }
    }
}

/// Choose the transfer path for a destination format.
///
/// Raw copy requires the destination's pixel type to map to the source's
/// native format id **and** the physical pixel sizes to agree. The size
/// check is a hard invariant guard against format tables where two distinct
/// layouts share an id — redundant in a well-formed table, but never skipped.
///
/// In-place reinterpret requires `builtin_conversion_supported`, identical
/// pixel byte footprints, and matching plane modes (an interleaved bit
/// pattern cannot be reinterpreted in place inside planar storage). Planar
/// destinations additionally require identical channel sample sizes: two
/// same-size formats that split their bytes across a different number of
/// planes (two u8 planes vs. one u16 plane) cannot share storage.
///
/// A destination type absent from the codec's format table fails closed to
/// the generic path.
pub fn negotiate<B: CodecBackend + ?Sized>(
    backend: &B,
    dest: &PixelFormat,
    builtin_conversion_supported: bool,
) -> ConversionPlan {
    let source_native = backend.native_format();
    let source_size = backend.format_pixel_byte_size(source_native);
    let dest_size = dest.bytes_per_pixel();

    if let Some(dest_equiv) = backend.native_format_for(dest) {
        if dest_equiv == source_native && source_size == dest_size {
            return ConversionPlan::RawCopy;
        }
    }

    let native_format = backend.native_pixel_format();
    if builtin_conversion_supported
        && source_size == dest_size
        && native_format.planes == dest.planes
        && (!dest.is_planar() || native_format.channel_byte_size() == dest.channel_byte_size())
    {
        return ConversionPlan::ReinterpretInPlace {
            native: source_native,
        };
    }

    ConversionPlan::Generic {
        native: source_native,
    }
}
