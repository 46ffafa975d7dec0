//! Engine frame buffers to display-ready packed pixels.
//!
//! The engine hands back 4 bytes per pixel as host-order 32-bit ARGB words
//! (B, G, R, A in memory on little-endian hosts). Display consumers expect
//! alpha-first big-endian words (X, R, G, B in memory on every host), so each
//! word is rewritten big-endian: a byte swap on little-endian hosts, a plain
//! copy on big-endian ones. The alpha byte is not retained.

pub const BYTES_PER_PIXEL: usize = 4;

/// Value written into the unused leading byte of every output pixel.
const OPAQUE: u8 = 0xff;

/// Packed alpha-first pixels, row-major, no row padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PackedImage {
    /// Tightly packed R, G, B samples.
    pub fn to_rgb24(&self) -> Vec<u8> {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .flat_map(|px| [px[1], px[2], px[3]])
            .collect()
    }
}

pub fn frame_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

/// Rewrite one host-order ARGB word as a big-endian XRGB word.
#[inline]
fn host_argb_to_be_xrgb(px: [u8; 4]) -> [u8; 4] {
    let mut out = u32::from_ne_bytes(px).to_be_bytes();
    out[0] = OPAQUE;
    out
}

/// Convert a raw engine frame. Bytes past `width * height * 4` are ignored;
/// `None` when `raw` is shorter than that.
pub fn convert(raw: &[u8], width: u32, height: u32) -> Option<PackedImage> {
    let raw = raw.get(..frame_len(width, height))?;
    Some(pack(raw, width, height))
}

fn pack(raw: &[u8], width: u32, height: u32) -> PackedImage {
    let mut data = Vec::with_capacity(raw.len());
    for px in raw.chunks_exact(BYTES_PER_PIXEL) {
        data.extend_from_slice(&host_argb_to_be_xrgb([px[0], px[1], px[2], px[3]]));
    }
    PackedImage {
        width,
        height,
        data,
    }
}

/// Owns the buffer the engine decodes into.
///
/// The buffer only grows: it is sized to the largest frame seen so far and
/// reused by later, smaller requests. This only saves allocations; every
/// `PackedImage` still gets its own pixel storage. Not shared across threads;
/// callers wrap the converter in a lock.
#[derive(Debug, Default)]
pub struct PixelBufferConverter {
    scratch: Vec<u8>,
}

impl PixelBufferConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scratch_capacity(&self) -> usize {
        self.scratch.len()
    }

    /// Let `fill` write a raw frame into scratch, then convert it.
    pub fn fill_and_convert<E>(
        &mut self,
        width: u32,
        height: u32,
        fill: impl FnOnce(&mut [u8]) -> Result<(), E>,
    ) -> Result<PackedImage, E> {
        let len = frame_len(width, height);
        if self.scratch.len() < len {
            log::trace!(
                target: "tiny_preview::pixels",
                "growing scratch buffer {} -> {} bytes",
                self.scratch.len(),
                len
            );
            self.scratch.resize(len, 0);
        }
        let raw = &mut self.scratch[..len];
        fill(raw)?;
        Ok(pack(raw, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_word(a: u8, r: u8, g: u8, b: u8) -> [u8; 4] {
        u32::from_be_bytes([a, r, g, b]).to_ne_bytes()
    }

    #[test]
    fn output_is_alpha_first_big_endian() {
        let raw: Vec<u8> = [host_word(0x10, 0xaa, 0xbb, 0xcc), host_word(0x00, 1, 2, 3)]
            .concat();
        let img = convert(&raw, 2, 1).unwrap();
        assert_eq!(img.data, vec![0xff, 0xaa, 0xbb, 0xcc, 0xff, 1, 2, 3]);
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn little_endian_host_swaps_each_word() {
        // B, G, R, A in memory
        let raw = [0x33, 0x22, 0x11, 0x80];
        let img = convert(&raw, 1, 1).unwrap();
        assert_eq!(img.data, vec![0xff, 0x11, 0x22, 0x33]);
    }

    #[test]
    fn alpha_is_not_retained() {
        let transparent = host_word(0x00, 9, 8, 7);
        let opaque = host_word(0xff, 9, 8, 7);
        assert_eq!(convert(&transparent, 1, 1), convert(&opaque, 1, 1));
        assert!(convert(&opaque, 1, 1).is_some());
    }

    #[test]
    fn output_size_matches_input() {
        let raw = vec![0u8; frame_len(7, 5)];
        let img = convert(&raw, 7, 5).unwrap();
        assert_eq!(img.data.len(), 7 * 5 * 4);
        assert_eq!((img.width, img.height), (7, 5));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let raw = vec![0u8; frame_len(3, 2) - 1];
        assert_eq!(convert(&raw, 3, 2), None);
        let longer = vec![0u8; frame_len(3, 2) + 8];
        assert_eq!(convert(&longer, 3, 2).unwrap().data.len(), frame_len(3, 2));
    }

    #[test]
    fn rgb24_drops_padding_byte() {
        let raw = host_word(0x42, 10, 20, 30);
        assert_eq!(convert(&raw, 1, 1).unwrap().to_rgb24(), vec![10, 20, 30]);
    }

    #[test]
    fn scratch_only_grows() {
        let mut conv = PixelBufferConverter::new();
        conv.fill_and_convert::<()>(4, 4, |_| Ok(())).unwrap();
        assert_eq!(conv.scratch_capacity(), frame_len(4, 4));
        let small = conv.fill_and_convert::<()>(2, 2, |raw| {
            assert_eq!(raw.len(), frame_len(2, 2));
            Ok(())
        });
        assert_eq!(small.unwrap().data.len(), frame_len(2, 2));
        assert_eq!(conv.scratch_capacity(), frame_len(4, 4));
    }

    #[test]
    fn fill_error_propagates() {
        let mut conv = PixelBufferConverter::new();
        let res = conv.fill_and_convert(1, 1, |_| Err("decode failed"));
        assert_eq!(res.unwrap_err(), "decode failed");
    }
}
