//! Pixel-format negotiation and streaming conversion core for image codec
//! backends.
//!
//! Codec bindings (JPEG, PNG, TIFF, platform imaging subsystems, ...)
//! implement the narrow [`CodecBackend`] trait over an opened, header-parsed
//! image; this crate owns everything between that trait and the caller's
//! destination buffer:
//!
//! - [`PixelFormat`]: compact descriptors for channel type, layout, and
//!   interleaved/planar storage.
//! - [`ImageViewMut`] and [`PixelBuffer`]: borrowed and owned destinations,
//!   both planar-aware.
//! - [`RegionOffset`] and clipping: safe partial transfers for streaming
//!   callers paging a large image through a fixed-size chunk.
//! - [`negotiate`]: picks the cheapest transfer path — raw copy, in-place
//!   reinterpret, or generic per-pixel conversion — in that fixed priority.
//! - [`CopyRequest`]: the caller surface tying it all together, with
//!   per-call [`DimensionPolicy`] and [`FormatHandling`] options.
//!
//! The crate is `no_std` + `alloc` and contains no unsafe code. One backend
//! instance carries one decode cursor; wrap it in a lock (or use one
//! instance per transfer) before sharing across threads.
//!
//! ```no_run
//! # use zenconvert::*;
//! # fn demo<B: CodecBackend>(backend: &mut B) -> Result<(), ConvertError> {
//! let image = CopyRequest::new(backend)
//!     .with_format_handling(FormatHandling::Auto)
//!     .copy_to_image(PixelFormat::RGBA8)?;
//! assert_eq!(image.format(), PixelFormat::RGBA8);
//! # Ok(())
//! # }
//! ```

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod backend;
mod buffer;
mod convert;
mod descriptor;
mod engine;
mod error;
mod negotiate;
mod region;
mod transfer;
mod validate;
mod view;

pub use backend::{BackendCaps, CodecBackend, FormatId, UnitInfo};
pub use buffer::PixelBuffer;
pub use convert::{FormatConverter, IdentityConverter, PixelConverter};
pub use descriptor::{ChannelLayout, ChannelType, PixelFormat, PlaneMode, SampleKind};
pub use engine::execute;
pub use error::{ConvertError, ViewError};
pub use negotiate::{negotiate, ConversionPlan};
pub use region::{clip, ClippedRegion, RegionOffset};
pub use transfer::{offset_view, CopyRequest, OffsetView};
pub use validate::{check_dimensions, synchronize_buffer, DimensionPolicy, FormatHandling};
pub use view::ImageViewMut;

// Re-exports for backend implementors and callers.
pub use imgref::{Img, ImgRef, ImgRefMut, ImgVec};
pub use rgb;
pub use rgb::alt::BGRA as Bgra;
pub use rgb::alt::GrayAlpha;
pub use rgb::{Gray, Rgb, Rgba};
