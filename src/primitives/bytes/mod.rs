#![forbid(unsafe_code)]
//! Encoding, varint, and delta utilities shared by the adjacency layers.

pub mod le {
    //! Fixed-width little-endian accessors used by uncompressed and property blocks.

    use core::convert::TryInto;

    const U32_LEN: usize = core::mem::size_of::<u32>();
    const U64_LEN: usize = core::mem::size_of::<u64>();

    /// Writes `v` as little-endian bytes at `off`.
    pub fn put_u32(dst: &mut [u8], off: usize, v: u32) {
        dst[off..off + U32_LEN].copy_from_slice(&v.to_le_bytes());
    }

    /// Reads a little-endian u32 at `off`.
    #[inline]
    pub fn get_u32(src: &[u8], off: usize) -> u32 {
        let bytes: [u8; U32_LEN] = src[off..off + U32_LEN]
            .try_into()
            .expect("slice length checked by range");
        u32::from_le_bytes(bytes)
    }

    /// Writes `v` as little-endian bytes at `off`.
    pub fn put_u64(dst: &mut [u8], off: usize, v: u64) {
        dst[off..off + U64_LEN].copy_from_slice(&v.to_le_bytes());
    }

    /// Reads a little-endian u64 at `off`.
    #[inline]
    pub fn get_u64(src: &[u8], off: usize) -> u64 {
        let bytes: [u8; U64_LEN] = src[off..off + U64_LEN]
            .try_into()
            .expect("slice length checked by range");
        u64::from_le_bytes(bytes)
    }
}

pub mod var {
    //! Unsigned varints (vlongs): seven value bits per byte, high bit set when
    //! more bytes follow, least significant group first.

    use crate::types::{Result, SombraError};

    /// Returns how many bytes [`encode_u64`] will emit for `v`.
    ///
    /// Every value up to [`crate::types::MAX_NODE_ID`] needs between one and nine
    /// bytes; only values with the top bit set need a tenth.
    #[inline]
    pub const fn encoded_size(v: u64) -> usize {
        let bits = 64 - (v | 1).leading_zeros() as usize;
        (bits + 6) / 7
    }

    /// Encodes a u64 as an unsigned varint.
    pub fn encode_u64(mut v: u64, out: &mut Vec<u8>) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                out.push(byte);
                break;
            } else {
                out.push(byte | 0x80);
            }
        }
    }

    /// Encodes a u64 into `dst` starting at `off`, returning the offset past the
    /// last written byte.
    ///
    /// Panics if `dst` is too short; callers size buffers with [`encoded_size`].
    #[inline]
    pub fn put_u64(dst: &mut [u8], mut off: usize, mut v: u64) -> usize {
        while v >= 0x80 {
            dst[off] = (v as u8) | 0x80;
            v >>= 7;
            off += 1;
        }
        dst[off] = v as u8;
        off + 1
    }

    /// Decodes a u64 varint from a slice, updating the offset.
    ///
    /// This is the hot-path decoder: input is trusted to come from
    /// [`encode_u64`]/[`put_u64`] and a read past the end of `src` panics.
    #[inline]
    pub fn decode_u64(src: &[u8], off: &mut usize) -> u64 {
        let mut idx = *off;
        let mut byte = src[idx];
        idx += 1;
        let mut result = u64::from(byte & 0x7f);
        let mut shift = 7u32;
        while byte & 0x80 != 0 {
            debug_assert!(shift < 64, "varint too long (exceeds 64 bits)");
            byte = src[idx];
            idx += 1;
            result |= u64::from(byte & 0x7f) << shift;
            shift += 7;
        }
        *off = idx;
        result
    }

    /// Checked variant of [`decode_u64`] for untrusted bytes.
    pub fn try_decode_u64(src: &[u8], off: &mut usize) -> Result<u64> {
        let mut result = 0u64;
        let mut shift = 0u32;
        for i in 0..10 {
            let idx = *off;
            let Some(&byte) = src.get(idx) else {
                return Err(SombraError::Corruption("varint decode truncated"));
            };
            *off += 1;
            let payload = u64::from(byte & 0x7f);
            if i == 9 && payload > 1 {
                return Err(SombraError::Corruption("varint overflow (more than 64 bits)"));
            }
            result |= payload << shift;
            if (byte & 0x80) == 0 {
                return Ok(result);
            }
            shift += 7;
        }
        Err(SombraError::Corruption("varint too long (exceeded 10 bytes)"))
    }
}

pub mod delta {
    //! Delta transformation of sorted id lists on top of [`super::var`].
    //!
    //! The first id of every block is encoded against a base of `0`; each
    //! following id against its predecessor. Decoders accumulate the running
    //! base, so equal neighbours (delta `0`) round-trip unchanged.

    use super::var;

    /// Exact number of bytes [`encode_sorted_into`] needs for `values`.
    pub fn encoded_len(values: &[u64]) -> usize {
        let mut prev = 0u64;
        let mut len = 0usize;
        for &v in values {
            debug_assert!(v >= prev, "delta input must be sorted");
            len += var::encoded_size(v - prev);
            prev = v;
        }
        len
    }

    /// Appends the delta-encoded form of a sorted slice to `out`.
    pub fn encode_sorted(values: &[u64], out: &mut Vec<u8>) {
        let mut prev = 0u64;
        for &v in values {
            debug_assert!(v >= prev, "delta input must be sorted");
            var::encode_u64(v - prev, out);
            prev = v;
        }
    }

    /// Writes the delta-encoded form of a sorted slice into `dst`, returning the
    /// number of bytes written.
    pub fn encode_sorted_into(values: &[u64], dst: &mut [u8]) -> usize {
        let mut prev = 0u64;
        let mut off = 0usize;
        for &v in values {
            debug_assert!(v >= prev, "delta input must be sorted");
            off = var::put_u64(dst, off, v - prev);
            prev = v;
        }
        off
    }

    /// Decodes `out.len()` deltas from `src[off..]`, accumulating from `base`.
    ///
    /// Returns the byte offset after the last decoded varint.
    #[inline]
    pub fn decode_block(base: u64, src: &[u8], off: usize, out: &mut [u64]) -> usize {
        let mut prev = base;
        let mut off = off;
        for slot in out.iter_mut() {
            prev += var::decode_u64(src, &mut off);
            *slot = prev;
        }
        off
    }
}
