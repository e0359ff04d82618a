//! Owned, format-tagged pixel storage.
//!
//! [`PixelBuffer`] is the destination type behind the allocate-and-copy
//! convenience path and the `Synchronize` dimension policy. Rows are tightly
//! packed; planar formats store their planes contiguously, one after the
//! other, in channel order. The backing vec can be recovered with
//! [`into_vec`](PixelBuffer::into_vec) for pool reuse.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::descriptor::PixelFormat;
use crate::error::ViewError;
use crate::view::ImageViewMut;

/// Owned pixel buffer with format metadata.
#[non_exhaustive]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer for the given dimensions and format.
    ///
    /// # Panics
    ///
    /// Panics if the byte size overflows `usize`; use
    /// [`try_new`](PixelBuffer::try_new) to handle untrusted dimensions.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        match Self::try_new(width, height, format) {
            Ok(buf) => buf,
            Err(_) => panic!("pixel buffer size overflows for {width}x{height}"),
        }
    }

    /// Allocate a zero-filled buffer, failing on byte-size overflow.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidDimensions`] if
    /// `stride * height * plane_count` overflows `usize`.
    pub fn try_new(width: u32, height: u32, format: PixelFormat) -> Result<Self, ViewError> {
        let (stride, total) = byte_layout(width, height, format)?;
        Ok(Self {
            data: vec![0u8; total],
            width,
            height,
            stride,
            format,
        })
    }

    /// Wrap an existing vec as a pixel buffer. Rows are assumed tightly
    /// packed, planes contiguous.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InsufficientData`] if the vec is too small.
    pub fn from_vec(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, ViewError> {
        let (stride, total) = byte_layout(width, height, format)?;
        if data.len() < total {
            return Err(ViewError::InsufficientData);
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
        })
    }

    /// Consume the buffer and return the backing vec for pool reuse.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte stride between row starts (per plane for planar formats).
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel format descriptor.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Byte size of one channel plane.
    #[inline]
    fn plane_size(&self) -> usize {
        self.stride * self.height as usize
    }

    /// Pixel bytes for row `y` of an interleaved buffer.
    ///
    /// # Panics
    ///
    /// Panics if the format is planar or `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(
            !self.format.is_planar(),
            "row() on a planar buffer; use plane_row()"
        );
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Channel-sample bytes for row `y` of plane `p`.
    ///
    /// # Panics
    ///
    /// Panics if the format is interleaved, `p` is out of bounds, or
    /// `y >= height`.
    pub fn plane_row(&self, p: usize, y: u32) -> &[u8] {
        assert!(
            self.format.is_planar(),
            "plane_row() on an interleaved buffer; use row()"
        );
        assert!(p < self.format.plane_count(), "plane index {p} out of bounds");
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let start = p * self.plane_size() + y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Borrow the whole buffer as a mutable [`ImageViewMut`].
    pub fn as_view_mut(&mut self) -> ImageViewMut<'_> {
        let plane_size = self.plane_size();
        if self.format.is_planar() {
            let mut planes: Vec<&mut [u8]> = Vec::with_capacity(self.format.plane_count());
            let mut rest = self.data.as_mut_slice();
            for _ in 0..self.format.plane_count() {
                let (plane, tail) = rest.split_at_mut(plane_size);
                planes.push(plane);
                rest = tail;
            }
            ImageViewMut::from_planar_parts(
                planes,
                self.width,
                self.height,
                self.stride,
                self.format,
            )
        } else {
            ImageViewMut::from_interleaved_parts(
                &mut self.data[..plane_size],
                self.width,
                self.height,
                self.stride,
                self.format,
            )
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, {:?} {:?} {:?})",
            self.width,
            self.height,
            self.format.layout,
            self.format.channel_type,
            self.format.planes
        )
    }
}

/// Tightly-packed stride and total byte size, overflow-checked. The stride
/// counts full pixels for interleaved storage, single channel samples per
/// plane for planar storage.
fn byte_layout(width: u32, height: u32, format: PixelFormat) -> Result<(usize, usize), ViewError> {
    let per_pixel = if format.is_planar() {
        format.channel_byte_size()
    } else {
        format.bytes_per_pixel()
    };
    let stride = (width as usize)
        .checked_mul(per_pixel)
        .ok_or(ViewError::InvalidDimensions)?;
    let total = stride
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(format.plane_count()))
        .ok_or(ViewError::InvalidDimensions)?;
    Ok((stride, total))
}
