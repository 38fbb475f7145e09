//! Read-only views over the physical buffers of one array node.
//!
//! Every view carries a logical base (`offset`) and a logical length. Reslicing a view only moves
//! that base; the borrowed buffer is never copied or rewritten.

mod bitmap;
mod offsets;
mod stride;

pub use bitmap::BitmapView;
pub use offsets::{OffsetWidth, OffsetsView};
pub use stride::FixedStrideView;

use crate::LayoutError;

/// Checks that `[offset, offset + length)` fits inside `len` logical rows.
pub(crate) fn check_window(offset: usize, length: usize, len: usize) -> Result<(), LayoutError> {
    match offset.checked_add(length) {
        Some(end) if end <= len => Ok(()),
        _ => Err(LayoutError::WindowOutOfBounds {
            offset,
            length,
            len,
        }),
    }
}
