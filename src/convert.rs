//! Per-pixel converters.
//!
//! The generic and in-place transfer paths call a [`PixelConverter`] once
//! per pixel. The converter sees pixel bytes in channel order regardless of
//! how the pixels are stored — the engine gathers planar samples before the
//! call and scatters them after, so one converter covers all four
//! planar/interleaved combinations.
//!
//! [`FormatConverter`] provides the builtin mappings between the closed set
//! of descriptor formats: channel reorder, gray expansion, alpha add/drop,
//! and sample widening/narrowing. Pairs it does not define (CMYK to RGB, any
//! color-space transform) need a caller-supplied converter.

use crate::descriptor::{ChannelLayout, ChannelType, PixelFormat};

/// Converts one source-native pixel into one destination pixel.
///
/// `src` holds the source pixel's bytes in channel order; `dst` is the
/// destination pixel's bytes, already sized to the destination format.
/// Implementations must be total over the pixels the source codec can
/// produce.
pub trait PixelConverter {
    /// Convert a single pixel.
    fn convert(&self, src: &[u8], dst: &mut [u8]);
}

impl<F> PixelConverter for F
where
    F: Fn(&[u8], &mut [u8]),
{
    fn convert(&self, src: &[u8], dst: &mut [u8]) {
        self(src, dst)
    }
}

/// Byte-for-byte identity converter.
///
/// Only valid when source and destination pixels share a byte size; the
/// generic path run with this converter must reproduce a raw copy exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityConverter;

impl PixelConverter for IdentityConverter {
    #[inline]
    fn convert(&self, src: &[u8], dst: &mut [u8]) {
        let n = dst.len();
        dst.copy_from_slice(&src[..n]);
    }
}

/// Where a destination channel's value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChannelSource {
    /// Copy (and sample-convert) source channel `i`.
    Index(u8),
    /// Fill with the opaque-alpha value for the destination channel type.
    Opaque,
    /// Unused slot (destination has fewer than 4 channels).
    Unused,
}

/// Builtin converter between two descriptor formats.
///
/// Covers channel reorder (RGB/RGBA/BGRA), grayscale expansion, alpha
/// add/drop, and U8/U16/I16/F32 sample conversion. Plane mode is ignored —
/// converters always see channel-ordered pixel bytes.
#[derive(Clone, Copy, Debug)]
pub struct FormatConverter {
    src_type: ChannelType,
    dst_type: ChannelType,
    src_size: usize,
    dst_size: usize,
    map: [ChannelSource; 4],
    dst_channels: usize,
}

impl FormatConverter {
    /// Build a converter from `src` to `dst`, or `None` when no builtin
    /// mapping exists for the layout pair.
    pub fn between(src: PixelFormat, dst: PixelFormat) -> Option<Self> {
        let map = channel_map(src.layout, dst.layout)?;
        Some(Self {
            src_type: src.channel_type,
            dst_type: dst.channel_type,
            src_size: src.channel_byte_size(),
            dst_size: dst.channel_byte_size(),
            map,
            dst_channels: dst.layout.channels(),
        })
    }
}

impl PixelConverter for FormatConverter {
    fn convert(&self, src: &[u8], dst: &mut [u8]) {
        for c in 0..self.dst_channels {
            let out = &mut dst[c * self.dst_size..(c + 1) * self.dst_size];
            match self.map[c] {
                ChannelSource::Index(i) => {
                    let at = i as usize * self.src_size;
                    convert_sample(self.src_type, self.dst_type, &src[at..at + self.src_size], out);
                }
                ChannelSource::Opaque => write_opaque(self.dst_type, out),
                ChannelSource::Unused => unreachable!("unused slot within dst_channels"),
            }
        }
    }
}

/// Destination-channel sourcing for a layout pair.
///
/// Lossy reductions (color to gray) and color-space transforms (CMYK) are
/// deliberately absent; those need a caller-supplied converter.
fn channel_map(src: ChannelLayout, dst: ChannelLayout) -> Option<[ChannelSource; 4]> {
    use ChannelLayout::*;
    use ChannelSource::*;
    let map = match (src, dst) {
        (Gray, Gray) => [Index(0), Unused, Unused, Unused],
        (Gray, GrayAlpha) => [Index(0), Opaque, Unused, Unused],
        (Gray, Rgb) => [Index(0), Index(0), Index(0), Unused],
        (Gray, Rgba) | (Gray, Bgra) => [Index(0), Index(0), Index(0), Opaque],
        (GrayAlpha, Gray) => [Index(0), Unused, Unused, Unused],
        (GrayAlpha, GrayAlpha) => [Index(0), Index(1), Unused, Unused],
        (GrayAlpha, Rgb) => [Index(0), Index(0), Index(0), Unused],
        (GrayAlpha, Rgba) | (GrayAlpha, Bgra) => [Index(0), Index(0), Index(0), Index(1)],
        (Rgb, Rgb) => [Index(0), Index(1), Index(2), Unused],
        (Rgb, Rgba) => [Index(0), Index(1), Index(2), Opaque],
        (Rgb, Bgra) => [Index(2), Index(1), Index(0), Opaque],
        (Rgba, Rgb) => [Index(0), Index(1), Index(2), Unused],
        (Rgba, Rgba) => [Index(0), Index(1), Index(2), Index(3)],
        (Rgba, Bgra) => [Index(2), Index(1), Index(0), Index(3)],
        (Bgra, Rgb) => [Index(2), Index(1), Index(0), Unused],
        (Bgra, Rgba) => [Index(2), Index(1), Index(0), Index(3)],
        (Bgra, Bgra) => [Index(0), Index(1), Index(2), Index(3)],
        (Cmyk, Cmyk) => [Index(0), Index(1), Index(2), Index(3)],
        _ => return None,
    };
    Some(map)
}

/// Convert one channel sample between storage types.
///
/// Integer widening replicates the high byte (`v << 8 | v`), narrowing takes
/// the high byte; float conversion clamps to `[0, 1]` and scales. Negative
/// signed samples clamp to zero on the way to unsigned targets.
fn convert_sample(src_type: ChannelType, dst_type: ChannelType, src: &[u8], dst: &mut [u8]) {
    use ChannelType::*;
    match (src_type, dst_type) {
        (U8, U8) | (U16, U16) | (I16, I16) | (F32, F32) => dst.copy_from_slice(src),
        (U8, U16) => {
            let v = src[0] as u16;
            dst.copy_from_slice(&((v << 8) | v).to_ne_bytes());
        }
        (U16, U8) => dst[0] = (read_u16(src) >> 8) as u8,
        (U8, F32) => dst.copy_from_slice(&(src[0] as f32 / 255.0).to_ne_bytes()),
        (U16, F32) => dst.copy_from_slice(&(read_u16(src) as f32 / 65535.0).to_ne_bytes()),
        (F32, U8) => dst[0] = (read_f32(src).clamp(0.0, 1.0) * 255.0) as u8,
        (F32, U16) => {
            let v = (read_f32(src).clamp(0.0, 1.0) * 65535.0) as u16;
            dst.copy_from_slice(&v.to_ne_bytes());
        }
        (I16, U8) => dst[0] = ((read_i16(src).max(0) as u32 * 255) / 32767) as u8,
        (I16, U16) => {
            let v = ((read_i16(src).max(0) as u32 * 65535) / 32767) as u16;
            dst.copy_from_slice(&v.to_ne_bytes());
        }
        (I16, F32) => {
            let v = (read_i16(src).max(0) as f32 / 32767.0).clamp(0.0, 1.0);
            dst.copy_from_slice(&v.to_ne_bytes());
        }
        (U8, I16) => {
            let v = ((src[0] as u32 * 32767) / 255) as i16;
            dst.copy_from_slice(&v.to_ne_bytes());
        }
        (U16, I16) => {
            let v = ((read_u16(src) as u32 * 32767) / 65535) as i16;
            dst.copy_from_slice(&v.to_ne_bytes());
        }
        (F32, I16) => {
            let v = (read_f32(src).clamp(0.0, 1.0) * 32767.0) as i16;
            dst.copy_from_slice(&v.to_ne_bytes());
        }
    }
}

/// The fully-opaque alpha value for a channel type.
fn write_opaque(dst_type: ChannelType, dst: &mut [u8]) {
    use ChannelType::*;
    match dst_type {
        U8 => dst[0] = 0xFF,
        U16 => dst.copy_from_slice(&u16::MAX.to_ne_bytes()),
        I16 => dst.copy_from_slice(&i16::MAX.to_ne_bytes()),
        F32 => dst.copy_from_slice(&1.0f32.to_ne_bytes()),
    }
}

#[inline]
fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_ne_bytes([bytes[0], bytes[1]])
}

#[inline]
fn read_i16(bytes: &[u8]) -> i16 {
    i16::from_ne_bytes([bytes[0], bytes[1]])
}

#[inline]
fn read_f32(bytes: &[u8]) -> f32 {
    f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
