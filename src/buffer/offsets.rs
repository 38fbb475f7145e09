use std::fmt;

use super::check_window;
use crate::LayoutError;

/// Width of the entries in an offsets buffer.
///
/// `Bits32` backs `Utf8`/`Binary`/`List`; `Bits64` backs their `Large*` counterparts, which exist
/// to address more than 2 GiB of child data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffsetWidth {
    /// `i32` offsets.
    Bits32,
    /// `i64` offsets.
    Bits64,
}

impl OffsetWidth {
    /// Resolve a declared width in bits.
    ///
    /// # Errors
    /// Returns [`LayoutError::UnsupportedOffsetWidth`] for anything other than 32 or 64.
    pub fn from_bits(bits: u32) -> Result<Self, LayoutError> {
        match bits {
            32 => Ok(OffsetWidth::Bits32),
            64 => Ok(OffsetWidth::Bits64),
            bits => Err(LayoutError::UnsupportedOffsetWidth { bits }),
        }
    }

    /// Width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            OffsetWidth::Bits32 => 32,
            OffsetWidth::Bits64 => 64,
        }
    }

    /// Width in bytes of a single entry.
    pub const fn byte_width(self) -> usize {
        match self {
            OffsetWidth::Bits32 => 4,
            OffsetWidth::Bits64 => 8,
        }
    }
}

impl fmt::Display for OffsetWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Read-only view over an offsets buffer.
///
/// Row `i` of the view spans `[offsets[offset + i], offsets[offset + i + 1])` in the data buffer
/// or child array. A view over `len` rows therefore reads `len + 1` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetsView<'a> {
    buffer: &'a [u8],
    width: OffsetWidth,
    offset: usize,
    len: usize,
}

impl<'a> OffsetsView<'a> {
    /// Create a view over `len` rows of `buffer` starting at entry `offset`.
    ///
    /// An empty view may be backed by an empty buffer.
    ///
    /// # Errors
    /// Returns [`LayoutError::BufferTooShort`] if `buffer` cannot hold `offset + len + 1` entries.
    pub fn try_new(
        buffer: &'a [u8],
        width: OffsetWidth,
        offset: usize,
        len: usize,
    ) -> Result<Self, LayoutError> {
        if len > 0 || !buffer.is_empty() {
            let needed = offset
                .checked_add(len)
                .and_then(|entries| entries.checked_add(1))
                .and_then(|entries| entries.checked_mul(width.byte_width()))
                .ok_or(LayoutError::Overflow)?;
            if buffer.len() < needed {
                return Err(LayoutError::BufferTooShort {
                    buffer: "offsets",
                    needed,
                    actual: buffer.len(),
                });
            }
        }
        Ok(Self {
            buffer,
            width,
            offset,
            len,
        })
    }

    /// Entry width of the underlying buffer.
    #[inline]
    pub fn width(&self) -> OffsetWidth {
        self.width
    }

    /// Logical entry offset into the underlying buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of rows covered by the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the view covers no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Half-open range of row `index` (relative to the view).
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if `index` is out of bounds, an entry is negative, or the pair of
    /// entries decreases.
    pub fn range_of(&self, index: usize) -> Result<(usize, usize), LayoutError> {
        check_window(index, 1, self.len)?;
        let physical = self.offset + index;
        let start = self.entry(physical)?;
        let end = self.entry(physical + 1)?;
        if end < start {
            return Err(LayoutError::OffsetsNotMonotonic {
                index: physical,
                start,
                end,
            });
        }
        Ok((start, end))
    }

    /// Range spanned by every row of the view, from the first row's start to the last row's end.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] on negative or decreasing boundary entries.
    pub fn total_range(&self) -> Result<(usize, usize), LayoutError> {
        if self.len == 0 {
            return Ok((0, 0));
        }
        let start = self.entry(self.offset)?;
        let end = self.entry(self.offset + self.len)?;
        if end < start {
            return Err(LayoutError::OffsetsNotMonotonic {
                index: self.offset,
                start,
                end,
            });
        }
        Ok((start, end))
    }

    /// Narrow the view to `[offset, offset + length)` relative to its current base.
    ///
    /// # Errors
    /// Returns [`LayoutError::WindowOutOfBounds`] if the window exceeds the view.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self, LayoutError> {
        check_window(offset, length, self.len)?;
        Ok(Self {
            buffer: self.buffer,
            width: self.width,
            offset: self.offset + offset,
            len: length,
        })
    }

    fn entry(&self, index: usize) -> Result<usize, LayoutError> {
        let width = self.width.byte_width();
        let start = index.checked_mul(width).ok_or(LayoutError::Overflow)?;
        let short = || LayoutError::BufferTooShort {
            buffer: "offsets",
            needed: start + width,
            actual: self.buffer.len(),
        };
        let bytes = self.buffer.get(start..start + width).ok_or_else(short)?;
        let value = match self.width {
            OffsetWidth::Bits32 => bytes
                .try_into()
                .map(|raw| i64::from(i32::from_ne_bytes(raw)))
                .map_err(|_| short())?,
            OffsetWidth::Bits64 => bytes
                .try_into()
                .map(i64::from_ne_bytes)
                .map_err(|_| short())?,
        };
        usize::try_from(value).map_err(|_| LayoutError::NegativeOffset { index, value })
    }
}

#[cfg(test)]
mod tests {
    use super::{OffsetWidth, OffsetsView};
    use crate::LayoutError;

    fn offsets32(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    fn offsets64(values: &[i64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn small_and_large_widths_agree() {
        let small = offsets32(&[0, 3, 3, 7, 12]);
        let large = offsets64(&[0, 3, 3, 7, 12]);
        let a = OffsetsView::try_new(&small, OffsetWidth::Bits32, 0, 4).unwrap();
        let b = OffsetsView::try_new(&large, OffsetWidth::Bits64, 0, 4).unwrap();
        for i in 0..4 {
            assert_eq!(a.range_of(i).unwrap(), b.range_of(i).unwrap());
        }
        assert_eq!(a.range_of(1).unwrap(), (3, 3));
        assert_eq!(b.range_of(3).unwrap(), (7, 12));
    }

    #[test]
    fn slice_moves_logical_base_only() {
        let raw = offsets32(&[0, 1, 3, 6, 10, 15]);
        let view = OffsetsView::try_new(&raw, OffsetWidth::Bits32, 1, 4).unwrap();
        assert_eq!(view.range_of(0).unwrap(), (1, 3));
        let sliced = view.slice(2, 2).unwrap();
        assert_eq!(sliced.offset(), 3);
        assert_eq!(sliced.width(), OffsetWidth::Bits32);
        assert_eq!(sliced.range_of(0).unwrap(), (6, 10));
        assert_eq!(sliced.range_of(1).unwrap(), (10, 15));
        assert_eq!(sliced.total_range().unwrap(), (6, 15));
        assert!(sliced.range_of(2).is_err());
    }

    #[test]
    fn decreasing_offsets_are_rejected() {
        let raw = offsets64(&[0, 5, 2]);
        let view = OffsetsView::try_new(&raw, OffsetWidth::Bits64, 0, 2).unwrap();
        assert_eq!(view.range_of(0).unwrap(), (0, 5));
        assert_eq!(
            view.range_of(1).unwrap_err(),
            LayoutError::OffsetsNotMonotonic {
                index: 1,
                start: 5,
                end: 2
            }
        );
    }

    #[test]
    fn negative_offsets_are_rejected() {
        let raw = offsets32(&[0, -4]);
        let view = OffsetsView::try_new(&raw, OffsetWidth::Bits32, 0, 1).unwrap();
        assert_eq!(
            view.range_of(0).unwrap_err(),
            LayoutError::NegativeOffset { index: 1, value: -4 }
        );
    }

    #[test]
    fn short_buffer_is_rejected() {
        let raw = offsets32(&[0, 1, 2]);
        assert!(OffsetsView::try_new(&raw, OffsetWidth::Bits32, 0, 2).is_ok());
        assert!(matches!(
            OffsetsView::try_new(&raw, OffsetWidth::Bits32, 1, 2),
            Err(LayoutError::BufferTooShort { needed: 16, actual: 12, .. })
        ));
        assert!(OffsetsView::try_new(&[], OffsetWidth::Bits64, 0, 0).is_ok());
    }

    #[test]
    fn only_32_and_64_bit_widths_exist() {
        assert_eq!(OffsetWidth::from_bits(32).unwrap(), OffsetWidth::Bits32);
        assert_eq!(OffsetWidth::from_bits(64).unwrap(), OffsetWidth::Bits64);
        assert_eq!(
            OffsetWidth::from_bits(16).unwrap_err(),
            LayoutError::UnsupportedOffsetWidth { bits: 16 }
        );
    }
}
