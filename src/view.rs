//! Borrowed, non-owning image views.
//!
//! An [`ImageViewMut`] describes a caller-owned destination (or source)
//! buffer: dimensions, row stride, the backing byte slice(s) — one per plane
//! for planar formats — and a [`PixelFormat`]. The view never owns or frees
//! the memory behind it.

use alloc::vec::Vec;
use core::fmt;

use imgref::ImgRefMut;
use rgb::alt::BGRA;
use rgb::{Gray, Rgb, Rgba};

use crate::descriptor::PixelFormat;
use crate::error::ViewError;

enum PlanesMut<'a> {
    Interleaved(&'a mut [u8]),
    Planar(Vec<&'a mut [u8]>),
}

/// Mutable borrowed view of pixel data.
///
/// For interleaved formats there is a single backing slice and `stride` is
/// the byte distance between pixel-row starts. For planar formats there is
/// one slice per channel plane and `stride` is the byte distance between
/// row starts within each plane (all planes share it — every channel has the
/// same sample size).
#[non_exhaustive]
pub struct ImageViewMut<'a> {
    planes: PlanesMut<'a>,
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
}

impl<'a> ImageViewMut<'a> {
    /// Create a view over a single interleaved buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is planar (including single-channel
    /// planar formats; use [`planar`](ImageViewMut::planar)), the stride is
    /// smaller than `width * bytes_per_pixel`, or the data is too small.
    pub fn interleaved(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self, ViewError> {
        if format.is_planar() {
            return Err(ViewError::PlaneModeMismatch);
        }
        let min_stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or(ViewError::InvalidDimensions)?;
        check_plane(data.len(), height, stride, min_stride)?;
        Ok(Self {
            planes: PlanesMut::Interleaved(data),
            width,
            height,
            stride,
            format,
        })
    }

    /// Create a view over one buffer per channel plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is interleaved, the number of planes
    /// does not equal the format's plane count, the stride is smaller than
    /// `width * channel_byte_size`, or any plane is too small.
    pub fn planar(
        planes: Vec<&'a mut [u8]>,
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self, ViewError> {
        if !format.is_planar() {
            return Err(ViewError::PlaneModeMismatch);
        }
        let expected = format.plane_count();
        if planes.len() != expected {
            return Err(ViewError::PlaneCountMismatch {
                expected,
                actual: planes.len(),
            });
        }
        let min_stride = (width as usize)
            .checked_mul(format.channel_byte_size())
            .ok_or(ViewError::InvalidDimensions)?;
        for plane in &planes {
            check_plane(plane.len(), height, stride, min_stride)?;
        }
        Ok(Self {
            planes: PlanesMut::Planar(planes),
            width,
            height,
            stride,
            format,
        })
    }

    /// Construct without validation; the caller (in-crate) upholds the
    /// stride and length invariants.
    pub(crate) fn from_interleaved_parts(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Self {
        Self {
            planes: PlanesMut::Interleaved(data),
            width,
            height,
            stride,
            format,
        }
    }

    /// Construct without validation; the caller (in-crate) upholds the
    /// stride, length, and plane-count invariants.
    pub(crate) fn from_planar_parts(
        planes: Vec<&'a mut [u8]>,
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Self {
        Self {
            planes: PlanesMut::Planar(planes),
            width,
            height,
            stride,
            format,
        }
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

    /// Pixel bytes for row `y` of an interleaved view (no stride padding).
    ///
    /// # Panics
    ///
    /// Panics if the view is planar or `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let PlanesMut::Interleaved(data) = &self.planes else {
            panic!("row() on a planar view; use plane_row()");
        };
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let start = y as usize * self.stride;
        let len = self.width as usize * self.format.bytes_per_pixel();
        &data[start..start + len]
    }

    /// Mutable pixel bytes for row `y` of an interleaved view.
    ///
    /// # Panics
    ///
    /// Panics if the view is planar or `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let len = self.width as usize * self.format.bytes_per_pixel();
        let PlanesMut::Interleaved(data) = &mut self.planes else {
            panic!("row_mut() on a planar view; use plane_row_mut()");
        };
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let start = y as usize * self.stride;
        &mut data[start..start + len]
    }

    /// Channel-sample bytes for row `y` of plane `p` (no stride padding).
    ///
    /// # Panics
    ///
    /// Panics if the view is interleaved, `p` is out of bounds, or
    /// `y >= height`.
    #[inline]
    pub fn plane_row(&self, p: usize, y: u32) -> &[u8] {
        let PlanesMut::Planar(planes) = &self.planes else {
            panic!("plane_row() on an interleaved view; use row()");
        };
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let start = y as usize * self.stride;
        let len = self.width as usize * self.format.channel_byte_size();
        &planes[p][start..start + len]
    }

    /// Mutable channel-sample bytes for row `y` of plane `p`.
    ///
    /// # Panics
    ///
    /// Panics if the view is interleaved, `p` is out of bounds, or
    /// `y >= height`.
    #[inline]
    pub fn plane_row_mut(&mut self, p: usize, y: u32) -> &mut [u8] {
        let len = self.width as usize * self.format.channel_byte_size();
        let PlanesMut::Planar(planes) = &mut self.planes else {
            panic!("plane_row_mut() on an interleaved view; use row_mut()");
        };
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let start = y as usize * self.stride;
        &mut planes[p][start..start + len]
    }
}

impl fmt::Debug for ImageViewMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ImageViewMut({}x{}, {:?} {:?} {:?})",
            self.width,
            self.height,
            self.format.layout,
            self.format.channel_type,
            self.format.planes
        )
    }
}

/// Minimum bytes a plane needs: `(rows - 1) * stride + min_stride`.
fn check_plane(len: usize, height: u32, stride: usize, min_stride: usize) -> Result<(), ViewError> {
    if stride < min_stride {
        return Err(ViewError::StrideTooSmall);
    }
    if height == 0 {
        return Ok(());
    }
    let preceding = (height as usize - 1)
        .checked_mul(stride)
        .ok_or(ViewError::InvalidDimensions)?;
    let required = preceding
        .checked_add(min_stride)
        .ok_or(ViewError::InvalidDimensions)?;
    if len < required {
        return Err(ViewError::InsufficientData);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ImgRefMut → ImageViewMut (zero-copy From impls)
// ---------------------------------------------------------------------------

macro_rules! impl_from_imgref_mut {
    ($pixel:ty, $format:expr) => {
        impl<'a> From<ImgRefMut<'a, $pixel>> for ImageViewMut<'a> {
            fn from(img: ImgRefMut<'a, $pixel>) -> Self {
                use rgb::ComponentBytes;
                let width = img.width() as u32;
                let height = img.height() as u32;
                let byte_stride = img.stride() * core::mem::size_of::<$pixel>();
                let buf = img.into_buf();
                ImageViewMut {
                    planes: PlanesMut::Interleaved(buf.as_bytes_mut()),
                    width,
                    height,
                    stride: byte_stride,
                    format: $format,
                }
            }
        }
    };
}

impl_from_imgref_mut!(Rgb<u8>, PixelFormat::RGB8);
impl_from_imgref_mut!(Rgba<u8>, PixelFormat::RGBA8);
impl_from_imgref_mut!(Rgb<u16>, PixelFormat::RGB16);
impl_from_imgref_mut!(Rgba<u16>, PixelFormat::RGBA16);
impl_from_imgref_mut!(Rgb<f32>, PixelFormat::RGBF32);
impl_from_imgref_mut!(Rgba<f32>, PixelFormat::RGBAF32);
impl_from_imgref_mut!(Gray<u8>, PixelFormat::GRAY8);
impl_from_imgref_mut!(Gray<u16>, PixelFormat::GRAY16);
impl_from_imgref_mut!(BGRA<u8>, PixelFormat::BGRA8);
