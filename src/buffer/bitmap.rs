use arrow_buffer::{bit_chunk_iterator::BitChunks, bit_util};

use super::check_window;
use crate::LayoutError;

/// Read-only view over a validity bitmap.
///
/// Bit `i` of the view lives at physical bit `offset + i`, i.e. bit `(offset + i) % 8` of byte
/// `(offset + i) / 8` (LSB numbering). `offset` need not be a multiple of 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapView<'a> {
    bits: &'a [u8],
    offset: usize,
    len: usize,
}

impl<'a> BitmapView<'a> {
    /// Create a view over `len` bits of `bits`, starting at bit `offset`.
    ///
    /// # Errors
    /// Returns [`LayoutError::BufferTooShort`] if `bits` cannot hold `offset + len` bits.
    pub fn try_new(bits: &'a [u8], offset: usize, len: usize) -> Result<Self, LayoutError> {
        let end = offset.checked_add(len).ok_or(LayoutError::Overflow)?;
        let needed = end.div_ceil(8);
        if bits.len() < needed {
            return Err(LayoutError::BufferTooShort {
                buffer: "validity",
                needed,
                actual: bits.len(),
            });
        }
        Ok(Self { bits, offset, len })
    }

    /// Logical bit offset into the underlying buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bits covered by the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the view covers no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns whether row `index` (relative to the view) is valid.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "bitmap index {index} out of bounds for length {}",
            self.len
        );
        bit_util::get_bit(self.bits, self.offset + index)
    }

    /// Returns whether row `index` is valid, or `None` if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| bit_util::get_bit(self.bits, self.offset + index))
    }

    /// Number of unset bits in the view.
    pub fn null_count(&self) -> usize {
        let chunks = BitChunks::new(self.bits, self.offset, self.len);
        let set = chunks
            .iter()
            .map(|chunk| chunk.count_ones() as usize)
            .sum::<usize>()
            + chunks.remainder_bits().count_ones() as usize;
        self.len - set
    }

    /// Narrow the view to `[offset, offset + length)` relative to its current base.
    ///
    /// # Errors
    /// Returns [`LayoutError::WindowOutOfBounds`] if the window exceeds the view.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self, LayoutError> {
        check_window(offset, length, self.len)?;
        Ok(Self {
            bits: self.bits,
            offset: self.offset + offset,
            len: length,
        })
    }
}
