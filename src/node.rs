//! Recursive physical array model.
//!
//! An [`ArrayNode`] describes one array exactly as it sits in memory: a logical window
//! (`offset`, `len`) over borrowed buffers and child nodes. The node never owns its buffers; they
//! belong to whoever produced the batch and must outlive every node built over them.

use std::fmt;

use crate::{
    LayoutError,
    buffer::{BitmapView, FixedStrideView, OffsetWidth, OffsetsView, check_window},
};

/// Fixed-width scalar layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `i8`
    Int8,
    /// `i16`
    Int16,
    /// `i32`
    Int32,
    /// `i64`
    Int64,
    /// `u8`
    UInt8,
    /// `u16`
    UInt16,
    /// `u32`
    UInt32,
    /// `u64`
    UInt64,
    /// IEEE half precision.
    Float16,
    /// `f32`
    Float32,
    /// `f64`
    Float64,
    /// Days since the UNIX epoch as `i32`.
    Date32,
    /// Milliseconds since the UNIX epoch as `i64`.
    Date64,
    /// Ticks since the UNIX epoch as `i64`, in the unit declared by the schema.
    Timestamp,
}

impl PrimitiveType {
    /// Width in bytes of one element.
    pub const fn byte_width(self) -> usize {
        match self {
            PrimitiveType::Int8 | PrimitiveType::UInt8 => 1,
            PrimitiveType::Int16 | PrimitiveType::UInt16 | PrimitiveType::Float16 => 2,
            PrimitiveType::Int32
            | PrimitiveType::UInt32
            | PrimitiveType::Float32
            | PrimitiveType::Date32 => 4,
            PrimitiveType::Int64
            | PrimitiveType::UInt64
            | PrimitiveType::Float64
            | PrimitiveType::Date64
            | PrimitiveType::Timestamp => 8,
        }
    }
}

/// Physical type of an [`ArrayNode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Every row is null; no buffers.
    Null,
    /// Bit-packed booleans in buffer 0.
    Boolean,
    /// Fixed-width scalars in buffer 0.
    Primitive(PrimitiveType),
    /// UTF-8 strings: offsets in buffer 0, bytes in buffer 1.
    Utf8(OffsetWidth),
    /// Opaque bytes: offsets in buffer 0, bytes in buffer 1.
    Binary(OffsetWidth),
    /// Byte strings of a fixed width in buffer 0.
    FixedSizeBinary(usize),
    /// Variable-size lists: offsets in buffer 0, elements in child 0.
    List(OffsetWidth),
    /// Lists of a fixed element count (the stride); elements in child 0.
    FixedSizeList(usize),
    /// One child per named field.
    Struct(Vec<String>),
}

impl TypeTag {
    /// Number of buffers the layout reads.
    pub fn buffer_count(&self) -> usize {
        match self {
            TypeTag::Null | TypeTag::FixedSizeList(_) | TypeTag::Struct(_) => 0,
            TypeTag::Boolean
            | TypeTag::Primitive(_)
            | TypeTag::FixedSizeBinary(_)
            | TypeTag::List(_) => 1,
            TypeTag::Utf8(_) | TypeTag::Binary(_) => 2,
        }
    }

    /// Number of child nodes the layout requires.
    pub fn child_count(&self) -> usize {
        match self {
            TypeTag::List(_) | TypeTag::FixedSizeList(_) => 1,
            TypeTag::Struct(names) => names.len(),
            _ => 0,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Null => f.write_str("Null"),
            TypeTag::Boolean => f.write_str("Boolean"),
            TypeTag::Primitive(p) => write!(f, "{p:?}"),
            TypeTag::Utf8(OffsetWidth::Bits32) => f.write_str("Utf8"),
            TypeTag::Utf8(OffsetWidth::Bits64) => f.write_str("LargeUtf8"),
            TypeTag::Binary(OffsetWidth::Bits32) => f.write_str("Binary"),
            TypeTag::Binary(OffsetWidth::Bits64) => f.write_str("LargeBinary"),
            TypeTag::FixedSizeBinary(width) => write!(f, "FixedSizeBinary({width})"),
            TypeTag::List(OffsetWidth::Bits32) => f.write_str("List"),
            TypeTag::List(OffsetWidth::Bits64) => f.write_str("LargeList"),
            TypeTag::FixedSizeList(stride) => write!(f, "FixedSizeList({stride})"),
            TypeTag::Struct(names) => write!(f, "Struct({})", names.join(", ")),
        }
    }
}

/// Half-open logical row range `[offset, offset + length)`, relative to the node it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Window {
    /// First row of the window.
    pub offset: usize,
    /// Number of rows in the window.
    pub length: usize,
}

impl Window {
    /// Create a window of `length` rows starting at `offset`.
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// One past the last row of the window.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Returns true if the window holds no rows.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Physical location of a single row after translation through one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRange {
    /// The row is null; no buffer is read.
    Null,
    /// Element index into the data buffer of a `Boolean` or `Primitive` node.
    Element(usize),
    /// Byte range into the value buffer of a `Utf8`, `Binary` or `FixedSizeBinary` node.
    Bytes {
        /// First byte.
        start: usize,
        /// One past the last byte.
        end: usize,
    },
    /// Element window into the child of a `List` or `FixedSizeList` node.
    Child(Window),
    /// Row index shared by every child of a `Struct` node.
    Fields(usize),
}

/// Borrowed, recursive view of one physical array.
#[derive(Debug, Clone)]
pub struct ArrayNode<'a> {
    tag: TypeTag,
    offset: usize,
    len: usize,
    validity: Option<BitmapView<'a>>,
    buffers: Vec<&'a [u8]>,
    children: Vec<ArrayNode<'a>>,
}

impl<'a> ArrayNode<'a> {
    /// Assemble a node from its parts.
    ///
    /// `offset` applies to the buffers and, for structs, to the children: logical row `i` of the
    /// node reads physical slot `offset + i`. `validity`, when present, must already be positioned
    /// on the node's rows (bit `i` of the view describes row `i`).
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if a buffer or child the tag requires is missing or too short to
    /// hold `offset + len` rows. For offsets-based tags the extent `offsets[offset + len]` must
    /// also fit inside the value buffer or the child.
    pub fn try_new(
        tag: TypeTag,
        offset: usize,
        len: usize,
        validity: Option<BitmapView<'a>>,
        buffers: Vec<&'a [u8]>,
        children: Vec<ArrayNode<'a>>,
    ) -> Result<Self, LayoutError> {
        if buffers.len() < tag.buffer_count() {
            return Err(LayoutError::MissingBuffer {
                index: buffers.len(),
            });
        }
        if children.len() != tag.child_count() {
            return Err(LayoutError::ChildCountMismatch {
                expected: tag.child_count(),
                actual: children.len(),
            });
        }
        if let Some(bitmap) = validity.as_ref().filter(|bitmap| bitmap.len() != len) {
            return Err(LayoutError::ValidityLength {
                expected: len,
                actual: bitmap.len(),
            });
        }
        let rows = offset.checked_add(len).ok_or(LayoutError::Overflow)?;
        match &tag {
            TypeTag::Null => {}
            TypeTag::Boolean => check_extent("values", buffers[0], rows.div_ceil(8))?,
            TypeTag::Primitive(p) => check_bytes("values", buffers[0], rows, p.byte_width())?,
            TypeTag::FixedSizeBinary(width) => {
                let (_, end) = FixedStrideView::new(*width, offset, len).total_range()?;
                check_extent("values", buffers[0], end)?;
            }
            TypeTag::Utf8(width) | TypeTag::Binary(width) => {
                let (_, end) =
                    OffsetsView::try_new(buffers[0], *width, offset, len)?.total_range()?;
                check_extent("values", buffers[1], end)?;
            }
            TypeTag::List(width) => {
                let (_, end) =
                    OffsetsView::try_new(buffers[0], *width, offset, len)?.total_range()?;
                check_child(0, &children[0], end)?;
            }
            TypeTag::FixedSizeList(stride) => {
                let (_, end) = FixedStrideView::new(*stride, offset, len).total_range()?;
                check_child(0, &children[0], end)?;
            }
            TypeTag::Struct(_) => {
                for (index, child) in children.iter().enumerate() {
                    check_child(index, child, rows)?;
                }
            }
        }
        Ok(Self {
            tag,
            offset,
            len,
            validity,
            buffers,
            children,
        })
    }

    /// Physical type of the node.
    #[inline]
    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    /// Logical offset into the buffers (and struct children).
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of logical rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the node holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Validity bitmap positioned on the node's rows, if any.
    #[inline]
    pub fn validity(&self) -> Option<&BitmapView<'a>> {
        self.validity.as_ref()
    }

    /// Borrowed buffers, in layout order.
    #[inline]
    pub fn buffers(&self) -> &[&'a [u8]] {
        &self.buffers
    }

    /// Child nodes, in layout order.
    #[inline]
    pub fn children(&self) -> &[ArrayNode<'a>] {
        &self.children
    }

    /// Field names of a struct node; empty for every other tag.
    pub fn field_names(&self) -> &[String] {
        match &self.tag {
            TypeTag::Struct(names) => names,
            _ => &[],
        }
    }

    /// Position of the struct field called `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_names().iter().position(|n| n == name)
    }

    /// Returns whether row `index` holds a value.
    ///
    /// `Null` nodes have no valid rows; nodes without a bitmap have no null rows.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "row {index} out of bounds for length {}",
            self.len
        );
        match (&self.tag, &self.validity) {
            (TypeTag::Null, _) => false,
            (_, Some(bitmap)) => bitmap.is_valid(index),
            (_, None) => true,
        }
    }

    /// Number of null rows.
    pub fn null_count(&self) -> usize {
        match (&self.tag, &self.validity) {
            (TypeTag::Null, _) => self.len,
            (_, Some(bitmap)) => bitmap.null_count(),
            (_, None) => 0,
        }
    }

    /// Narrow the node to `[offset, offset + length)` relative to its current rows.
    ///
    /// Only the logical base moves; buffers and children are shared.
    ///
    /// # Errors
    /// Returns [`LayoutError::WindowOutOfBounds`] if the window exceeds the node.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self, LayoutError> {
        check_window(offset, length, self.len)?;
        let validity = self
            .validity
            .as_ref()
            .map(|bitmap| bitmap.slice(offset, length))
            .transpose()?;
        Ok(Self {
            tag: self.tag.clone(),
            offset: self.offset + offset,
            len: length,
            validity,
            buffers: self.buffers.clone(),
            children: self.children.clone(),
        })
    }

    pub(crate) fn offsets_view(&self, width: OffsetWidth) -> Result<OffsetsView<'a>, LayoutError> {
        OffsetsView::try_new(self.buffer(0)?, width, self.offset, self.len)
    }

    pub(crate) fn stride_view(&self, stride: usize) -> FixedStrideView {
        FixedStrideView::new(stride, self.offset, self.len)
    }

    pub(crate) fn buffer(&self, index: usize) -> Result<&'a [u8], LayoutError> {
        self.buffers
            .get(index)
            .copied()
            .ok_or(LayoutError::MissingBuffer { index })
    }
}

fn check_bytes(
    buffer: &'static str,
    bytes: &[u8],
    rows: usize,
    width: usize,
) -> Result<(), LayoutError> {
    let needed = rows.checked_mul(width).ok_or(LayoutError::Overflow)?;
    check_extent(buffer, bytes, needed)
}

fn check_extent(buffer: &'static str, bytes: &[u8], needed: usize) -> Result<(), LayoutError> {
    if bytes.len() < needed {
        return Err(LayoutError::BufferTooShort {
            buffer,
            needed,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn check_child(child: usize, node: &ArrayNode<'_>, needed: usize) -> Result<(), LayoutError> {
    if node.len() < needed {
        return Err(LayoutError::ChildTooShort {
            child,
            needed,
            actual: node.len(),
        });
    }
    Ok(())
}
