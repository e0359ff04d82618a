//! Pixel format descriptors.
//!
//! A [`PixelFormat`] describes the in-memory layout of pixel data — channel
//! storage type, channel layout, and whether channels are interleaved or
//! stored in separate planes. It carries no pixel data itself; views and
//! buffers are tagged with one.

/// Channel storage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum ChannelType {
    /// 8-bit unsigned integer (1 byte per channel).
    U8,
    /// 16-bit unsigned integer (2 bytes per channel).
    U16,
    /// 16-bit signed integer (2 bytes per channel).
    I16,
    /// 32-bit floating point (4 bytes per channel).
    F32,
}

/// Numeric interpretation of a channel value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum SampleKind {
    UnsignedInt,
    SignedInt,
    Float,
}

impl ChannelType {
    /// Byte size of a single channel value.
    #[inline]
    pub const fn byte_size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::F32 => 4,
        }
    }

    /// Numeric interpretation of values of this type.
    #[inline]
    pub const fn sample_kind(self) -> SampleKind {
        match self {
            Self::U8 | Self::U16 => SampleKind::UnsignedInt,
            Self::I16 => SampleKind::SignedInt,
            Self::F32 => SampleKind::Float,
        }
    }
}

/// Channel layout (number and meaning of channels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum ChannelLayout {
    /// Single luminance channel.
    Gray,
    /// Luminance + alpha.
    GrayAlpha,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Blue, green, red, alpha (Windows/DirectX byte order).
    Bgra,
    /// Cyan, magenta, yellow, key.
    Cmyk,
}

impl ChannelLayout {
    /// Number of channels in this layout.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba | Self::Bgra | Self::Cmyk => 4,
        }
    }

    /// Whether this layout includes an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba | Self::Bgra)
    }
}

/// Channel arrangement in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PlaneMode {
    /// All channels of one pixel stored contiguously before the next pixel.
    #[default]
    Interleaved,
    /// Each channel stored in its own contiguous plane.
    Planar,
}

/// Compact pixel format descriptor.
///
/// Immutable value type; many views share one by copy. The channel count is
/// implied by the layout — there is no way to construct a descriptor whose
/// count disagrees with its layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PixelFormat {
    /// Channel storage type (u8, u16, i16, f32).
    pub channel_type: ChannelType,
    /// Channel layout (gray, RGB, RGBA, CMYK, etc.).
    pub layout: ChannelLayout,
    /// Interleaved or planar storage.
    pub planes: PlaneMode,
}

impl PixelFormat {
    /// Create an interleaved pixel format descriptor.
    pub const fn new(channel_type: ChannelType, layout: ChannelLayout) -> Self {
        Self {
            channel_type,
            layout,
            planes: PlaneMode::Interleaved,
        }
    }

    // Named constants ---------------------------------------------------------

    /// 8-bit RGB.
    pub const RGB8: Self = Self::new(ChannelType::U8, ChannelLayout::Rgb);
    /// 8-bit RGBA.
    pub const RGBA8: Self = Self::new(ChannelType::U8, ChannelLayout::Rgba);
    /// 8-bit BGRA.
    pub const BGRA8: Self = Self::new(ChannelType::U8, ChannelLayout::Bgra);
    /// 8-bit grayscale.
    pub const GRAY8: Self = Self::new(ChannelType::U8, ChannelLayout::Gray);
    /// 8-bit grayscale + alpha.
    pub const GRAYA8: Self = Self::new(ChannelType::U8, ChannelLayout::GrayAlpha);
    /// 8-bit CMYK.
    pub const CMYK8: Self = Self::new(ChannelType::U8, ChannelLayout::Cmyk);
    /// 16-bit RGB.
    pub const RGB16: Self = Self::new(ChannelType::U16, ChannelLayout::Rgb);
    /// 16-bit RGBA.
    pub const RGBA16: Self = Self::new(ChannelType::U16, ChannelLayout::Rgba);
    /// 16-bit grayscale.
    pub const GRAY16: Self = Self::new(ChannelType::U16, ChannelLayout::Gray);
    /// f32 RGB.
    pub const RGBF32: Self = Self::new(ChannelType::F32, ChannelLayout::Rgb);
    /// f32 RGBA.
    pub const RGBAF32: Self = Self::new(ChannelType::F32, ChannelLayout::Rgba);
    /// f32 grayscale.
    pub const GRAYF32: Self = Self::new(ChannelType::F32, ChannelLayout::Gray);

    // Methods -----------------------------------------------------------------

    /// The same format with planar channel storage.
    #[inline]
    pub const fn as_planar(self) -> Self {
        Self {
            planes: PlaneMode::Planar,
            ..self
        }
    }

    /// The same format with interleaved channel storage.
    #[inline]
    pub const fn as_interleaved(self) -> Self {
        Self {
            planes: PlaneMode::Interleaved,
            ..self
        }
    }

    /// Whether channels live in separate planes.
    #[inline]
    pub const fn is_planar(self) -> bool {
        matches!(self.planes, PlaneMode::Planar)
    }

    /// Byte size of one channel value.
    #[inline]
    pub const fn channel_byte_size(self) -> usize {
        self.channel_type.byte_size()
    }

    /// Bytes per pixel across all channels, regardless of plane mode.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.channel_type.byte_size() * self.layout.channels()
    }

    /// Number of channels.
    #[inline]
    pub const fn channels(self) -> u8 {
        self.layout.channels() as u8
    }

    /// Number of memory planes a view of this format carries.
    #[inline]
    pub const fn plane_count(self) -> usize {
        match self.planes {
            PlaneMode::Interleaved => 1,
            PlaneMode::Planar => self.layout.channels(),
        }
    }

    /// Whether this format has an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        self.layout.has_alpha()
    }

    /// Check if this descriptor matches the storage type and layout of
    /// another, ignoring plane mode.
    ///
    /// Two layout-compatible formats hold the same channel values and differ
    /// at most in how those values are arranged in memory.
    #[inline]
    pub const fn layout_compatible(&self, other: &PixelFormat) -> bool {
        self.channel_type as u8 == other.channel_type as u8
            && self.layout as u8 == other.layout as u8
    }
}
