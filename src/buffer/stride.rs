use super::check_window;
use crate::LayoutError;

/// Offsets-free counterpart of [`OffsetsView`](super::OffsetsView) for fixed-size layouts.
///
/// Row `i` spans `[(offset + i) * stride, (offset + i + 1) * stride)`: the inherited offset is
/// scaled by the stride along with the local index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStrideView {
    stride: usize,
    offset: usize,
    len: usize,
}

impl FixedStrideView {
    /// Create a view over `len` rows of `stride` elements each, starting at row `offset`.
    pub fn new(stride: usize, offset: usize, len: usize) -> Self {
        Self {
            stride,
            offset,
            len,
        }
    }

    /// Elements per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Logical row offset.
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

    /// Half-open element range of row `index` (relative to the view).
    ///
    /// # Errors
    /// Returns [`LayoutError::WindowOutOfBounds`] if `index` is out of bounds, or
    /// [`LayoutError::Overflow`] if the range does not fit in `usize`.
    pub fn range_of(&self, index: usize) -> Result<(usize, usize), LayoutError> {
        check_window(index, 1, self.len)?;
        let row = self.offset + index;
        let start = row.checked_mul(self.stride).ok_or(LayoutError::Overflow)?;
        let end = start.checked_add(self.stride).ok_or(LayoutError::Overflow)?;
        Ok((start, end))
    }

    /// Element range spanned by every row of the view.
    ///
    /// # Errors
    /// Returns [`LayoutError::Overflow`] if the range does not fit in `usize`.
    pub fn total_range(&self) -> Result<(usize, usize), LayoutError> {
        let start = self
            .offset
            .checked_mul(self.stride)
            .ok_or(LayoutError::Overflow)?;
        let end = self
            .offset
            .checked_add(self.len)
            .and_then(|rows| rows.checked_mul(self.stride))
            .ok_or(LayoutError::Overflow)?;
        Ok((start, end))
    }

    /// Narrow the view to `[offset, offset + length)` relative to its current base.
    ///
    /// # Errors
    /// Returns [`LayoutError::WindowOutOfBounds`] if the window exceeds the view.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self, LayoutError> {
        check_window(offset, length, self.len)?;
        Ok(Self {
            stride: self.stride,
            offset: self.offset + offset,
            len: length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::FixedStrideView;

    #[test]
    fn inherited_offset_is_scaled_by_stride() {
        let view = FixedStrideView::new(3, 131_072, 1);
        assert_eq!(view.range_of(0).unwrap(), (393_216, 393_219));
    }

    #[test]
    fn slice_accumulates_offset() {
        let view = FixedStrideView::new(4, 2, 10);
        let sliced = view.slice(3, 5).unwrap();
        assert_eq!(sliced.offset(), 5);
        assert_eq!(sliced.stride(), 4);
        assert_eq!(sliced.range_of(0).unwrap(), (20, 24));
        assert_eq!(sliced.range_of(4).unwrap(), (36, 40));
        assert_eq!(sliced.total_range().unwrap(), (20, 40));
        assert!(sliced.range_of(5).is_err());
        assert!(view.slice(6, 5).is_err());
    }

    #[test]
    fn zero_length_rows_are_empty() {
        let view = FixedStrideView::new(0, 7, 2);
        assert_eq!(view.range_of(1).unwrap(), (0, 0));
    }
}
