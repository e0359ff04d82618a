//! Caller-facing transfer requests.
//!
//! A [`CopyRequest`] pairs an opened backend with per-call options (region
//! offset, dimension policy, format handling) and drives one transfer:
//! validate, negotiate, execute. Requests are built fresh per call — the
//! negotiated plan is never cached, so a streaming caller can vary offset
//! and destination chunk by chunk.
//!
//! ```no_run
//! # use zenconvert::*;
//! # fn demo<B: CodecBackend>(backend: &mut B, view: &mut ImageViewMut<'_>)
//! #     -> Result<(), ConvertError> {
//! CopyRequest::new(backend)
//!     .with_offset(RegionOffset::Rows(64))
//!     .with_format_handling(FormatHandling::Auto)
//!     .copy_to(view)?;
//! # Ok(())
//! # }
//! ```

use crate::backend::CodecBackend;
use crate::buffer::PixelBuffer;
use crate::convert::{FormatConverter, IdentityConverter, PixelConverter};
use crate::descriptor::PixelFormat;
use crate::engine::execute;
use crate::error::ConvertError;
use crate::negotiate::negotiate;
use crate::region::RegionOffset;
use crate::validate::{check_dimensions, synchronize_buffer, DimensionPolicy, FormatHandling};
use crate::view::ImageViewMut;

/// A destination view bundled with the region offset it expects.
///
/// Streaming callers build one per chunk via [`offset_view`] and hand it to
/// [`CopyRequest::copy_to_view`].
pub struct OffsetView<'a> {
    view: ImageViewMut<'a>,
    offset: RegionOffset,
}

/// Wrap a destination view with a region offset.
pub fn offset_view(view: ImageViewMut<'_>, offset: RegionOffset) -> OffsetView<'_> {
    OffsetView { view, offset }
}

impl<'a> OffsetView<'a> {
    /// The wrapped destination view.
    pub fn view_mut(&mut self) -> &mut ImageViewMut<'a> {
        &mut self.view
    }

    /// The region offset this view expects.
    pub fn offset(&self) -> RegionOffset {
        self.offset
    }
}

/// One transfer from an opened backend into a caller destination.
pub struct CopyRequest<'a, B: CodecBackend + ?Sized> {
    backend: &'a mut B,
    offset: RegionOffset,
    dimensions: DimensionPolicy,
    format: FormatHandling<'a>,
}

impl<'a, B: CodecBackend + ?Sized> CopyRequest<'a, B> {
    /// Start a request with default options: full image, debug-only
    /// dimension and format checks.
    pub fn new(backend: &'a mut B) -> Self {
        Self {
            backend,
            offset: RegionOffset::None,
            dimensions: DimensionPolicy::default(),
            format: FormatHandling::default(),
        }
    }

    /// Transfer a sub-region starting at `offset`.
    pub fn with_offset(mut self, offset: RegionOffset) -> Self {
        self.offset = offset;
        self
    }

    /// How destination dimensions are checked against the source.
    pub fn with_dimension_policy(mut self, policy: DimensionPolicy) -> Self {
        self.dimensions = policy;
        self
    }

    /// How the destination pixel format is reconciled with the source.
    pub fn with_format_handling(mut self, format: FormatHandling<'a>) -> Self {
        self.format = format;
        self
    }

    /// Transfer into a borrowed destination view.
    ///
    /// # Errors
    ///
    /// Fails on dimension or format policy violations, invalid offsets,
    /// truncated sources, and codec errors. [`DimensionPolicy::Synchronize`]
    /// fails here when dimensions differ — a borrowed view cannot be
    /// resized; use [`copy_to_buffer`](CopyRequest::copy_to_buffer).
    pub fn copy_to(self, dest: &mut ImageViewMut<'_>) -> Result<(), ConvertError> {
        let source = self.backend.dimensions();
        let dest_dims = (dest.width(), dest.height());
        if self.dimensions == DimensionPolicy::Synchronize
            && self.offset.is_none()
            && source != dest_dims
        {
            return Err(ConvertError::SynchronizeUnsupported);
        }
        check_dimensions(self.dimensions, source, dest_dims, self.offset)?;

        let dest_fmt = dest.format();
        let plan = negotiate(
            self.backend,
            &dest_fmt,
            self.backend.capabilities().builtin_conversion(),
        );

        let builtin;
        let converter: &dyn PixelConverter = if plan.can_raw_copy() {
            &IdentityConverter
        } else {
            let native = self.backend.native_pixel_format();
            match self.format {
                FormatHandling::Ensure => {
                    return Err(ConvertError::FormatMismatch {
                        src: native,
                        dest: dest_fmt,
                    });
                }
                FormatHandling::Convert(c) => c,
                FormatHandling::Assert | FormatHandling::Auto => {
                    debug_assert!(
                        matches!(self.format, FormatHandling::Auto),
                        "destination format {dest_fmt:?} does not match the source's native format"
                    );
                    match FormatConverter::between(native, dest_fmt) {
                        Some(c) => {
                            builtin = c;
                            &builtin
                        }
                        None => {
                            return Err(ConvertError::UnsupportedFormat {
                                src: native,
                                dest: dest_fmt,
                            });
                        }
                    }
                }
            }
        };

        execute(plan, self.backend, dest, self.offset, converter)
    }

    /// Transfer into an owned buffer, reallocating it first when the policy
    /// is [`DimensionPolicy::Synchronize`] and the dimensions differ.
    pub fn copy_to_buffer(self, dest: &mut PixelBuffer) -> Result<(), ConvertError> {
        if self.dimensions == DimensionPolicy::Synchronize && self.offset.is_none() {
            synchronize_buffer(self.backend.dimensions(), dest);
        }
        self.copy_to(&mut dest.as_view_mut())
    }

    /// Allocate a destination through `factory` and transfer into it.
    ///
    /// The factory receives the dimensions the transfer will cover — the
    /// full image, or what remains below/right of the offset — so pooled
    /// buffers can be resized once, up front.
    pub fn copy_to_image_with<F>(
        self,
        format: PixelFormat,
        factory: F,
    ) -> Result<PixelBuffer, ConvertError>
    where
        F: FnOnce(u32, u32, PixelFormat) -> PixelBuffer,
    {
        let (src_w, src_h) = self.backend.dimensions();
        let (w, h) = match self.offset {
            RegionOffset::None => (src_w, src_h),
            RegionOffset::Rows(y) => (src_w, src_h.saturating_sub(y)),
            RegionOffset::Point { x, y } => {
                (src_w.saturating_sub(x), src_h.saturating_sub(y))
            }
        };
        let mut dest = factory(w, h, format);
        self.copy_to(&mut dest.as_view_mut())?;
        Ok(dest)
    }

    /// Allocate a fresh destination image and transfer into it.
    pub fn copy_to_image(self, format: PixelFormat) -> Result<PixelBuffer, ConvertError> {
        self.copy_to_image_with(format, PixelBuffer::new)
    }

    /// Transfer into an [`OffsetView`], taking the offset from the wrapper.
    pub fn copy_to_view(self, target: &mut OffsetView<'_>) -> Result<(), ConvertError> {
        let offset = target.offset;
        self.with_offset(offset).copy_to(&mut target.view)
    }
}
