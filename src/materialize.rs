//! Conversion of resolved physical locations into values.

use std::{mem::size_of, str};

use arrow_buffer::bit_util;
use half::f16;

use crate::{
    ArrayNode, LayoutError, PrimitiveType, ResolvedRange, TranslateError, TypeTag, Value, Window,
    path::Path,
    translate::{resolve_row, translate_items},
};

/// Fixed-width native types readable from a `Primitive` node.
pub trait NativeValue: Copy + Send + Sync + 'static {
    /// Width in bytes.
    const WIDTH: usize;

    /// Whether elements of `ty` are stored as `Self`.
    fn accepts(ty: PrimitiveType) -> bool;

    /// Decode from exactly [`Self::WIDTH`] native-endian bytes.
    fn from_ne_slice(bytes: &[u8]) -> Self;
}

macro_rules! native_value {
    ($($ty:ty => [$($prim:ident),+]),* $(,)?) => {
        $(
            impl NativeValue for $ty {
                const WIDTH: usize = size_of::<$ty>();

                fn accepts(ty: PrimitiveType) -> bool {
                    matches!(ty, $(PrimitiveType::$prim)|+)
                }

                fn from_ne_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_ne_bytes(raw)
                }
            }
        )*
    };
}

native_value! {
    i8 => [Int8],
    i16 => [Int16],
    i32 => [Int32, Date32],
    i64 => [Int64, Date64, Timestamp],
    u8 => [UInt8],
    u16 => [UInt16],
    u32 => [UInt32],
    u64 => [UInt64],
    f16 => [Float16],
    f32 => [Float32],
    f64 => [Float64],
}

/// Turns [`ResolvedRange`]s of one node into [`Value`]s, and offers typed single-row reads.
///
/// Materialization is a read-only projection: strings and bytes borrow the node's buffers, and
/// only nested containers allocate.
#[derive(Debug, Clone, Copy)]
pub struct ScalarMaterializer<'n, 'a> {
    node: &'n ArrayNode<'a>,
    name: &'n str,
}

impl<'n, 'a> ScalarMaterializer<'n, 'a> {
    /// Create a materializer over `node`.
    pub fn new(node: &'n ArrayNode<'a>) -> Self {
        Self { node, name: "" }
    }

    /// Name the root of error paths (typically the column name).
    #[must_use]
    pub fn named(mut self, name: &'n str) -> Self {
        self.name = name;
        self
    }

    /// Produce the value a resolved range designates.
    ///
    /// # Errors
    /// Returns [`TranslateError::TypeMismatch`] if the range kind does not fit the node type, or
    /// [`TranslateError::Layout`] if the range falls outside the buffers.
    pub fn materialize(&self, range: ResolvedRange) -> Result<Value<'a>, TranslateError> {
        materialize_range(self.node, &Path::new(self.name), range)
    }

    /// Read row `row` of a `Utf8`/`LargeUtf8` node. Null rows yield `None`.
    ///
    /// # Errors
    /// Returns [`TranslateError::TypeMismatch`] for other node types.
    pub fn str_at(&self, row: usize) -> Result<Option<&'a str>, TranslateError> {
        let path = Path::new(self.name);
        if !matches!(self.node.tag(), TypeTag::Utf8(_)) {
            return Err(path.type_mismatch("Utf8", self.node.tag()));
        }
        Ok(self.read(&path, row)?.as_str())
    }

    /// Read row `row` of a `Binary`, `LargeBinary` or `FixedSizeBinary` node. Null rows yield
    /// `None`.
    ///
    /// # Errors
    /// Returns [`TranslateError::TypeMismatch`] for other node types.
    pub fn bytes_at(&self, row: usize) -> Result<Option<&'a [u8]>, TranslateError> {
        let path = Path::new(self.name);
        if !matches!(
            self.node.tag(),
            TypeTag::Binary(_) | TypeTag::FixedSizeBinary(_)
        ) {
            return Err(path.type_mismatch("Binary", self.node.tag()));
        }
        Ok(self.read(&path, row)?.as_bin())
    }

    /// Read row `row` of a `Boolean` node. Null rows yield `None`.
    ///
    /// # Errors
    /// Returns [`TranslateError::TypeMismatch`] for other node types.
    pub fn bool_at(&self, row: usize) -> Result<Option<bool>, TranslateError> {
        let path = Path::new(self.name);
        if !matches!(self.node.tag(), TypeTag::Boolean) {
            return Err(path.type_mismatch("Boolean", self.node.tag()));
        }
        Ok(self.read(&path, row)?.as_bool())
    }

    /// Read row `row` of a `Primitive` node stored as `T`. Null rows yield `None`.
    ///
    /// # Errors
    /// Returns [`TranslateError::TypeMismatch`] unless the node holds `T`.
    pub fn primitive_at<T: NativeValue>(&self, row: usize) -> Result<Option<T>, TranslateError> {
        let path = Path::new(self.name);
        match self.node.tag() {
            TypeTag::Primitive(ty) if T::accepts(*ty) => {}
            tag => return Err(path.type_mismatch(std::any::type_name::<T>(), tag)),
        }
        match resolve_row(self.node, &path, row)? {
            ResolvedRange::Element(index) => {
                let bytes = self.node.buffer(0).map_err(|e| path.layout(e))?;
                element_bytes(bytes, index, T::WIDTH)
                    .map(|raw| Some(T::from_ne_slice(raw)))
                    .map_err(|e| path.push_index(row).layout(e))
            }
            _ => Ok(None),
        }
    }

    fn read(&self, path: &Path<'_>, row: usize) -> Result<Value<'a>, TranslateError> {
        let range = resolve_row(self.node, path, row)?;
        materialize_range(self.node, &path.push_index(row), range)
    }
}

pub(crate) fn materialize_range<'a>(
    node: &ArrayNode<'a>,
    path: &Path<'_>,
    range: ResolvedRange,
) -> Result<Value<'a>, TranslateError> {
    let value = match (node.tag(), range) {
        (_, ResolvedRange::Null) => Value::Null,
        (TypeTag::Boolean, ResolvedRange::Element(index)) => {
            let bits = node.buffer(0).map_err(|e| path.layout(e))?;
            if bits.len() * 8 <= index {
                return Err(path.layout(LayoutError::BufferTooShort {
                    buffer: "values",
                    needed: index / 8 + 1,
                    actual: bits.len(),
                }));
            }
            Value::Bool(bit_util::get_bit(bits, index))
        }
        (TypeTag::Primitive(ty), ResolvedRange::Element(index)) => {
            let bytes = node.buffer(0).map_err(|e| path.layout(e))?;
            read_primitive(bytes, *ty, index).map_err(|e| path.layout(e))?
        }
        (TypeTag::Utf8(_), ResolvedRange::Bytes { start, end }) => {
            let data = node.buffer(1).map_err(|e| path.layout(e))?;
            let bytes = value_bytes(data, start, end).map_err(|e| path.layout(e))?;
            let text = str::from_utf8(bytes)
                .map_err(|_| path.layout(LayoutError::InvalidUtf8 { start, end }))?;
            Value::Str(text)
        }
        (TypeTag::Binary(_), ResolvedRange::Bytes { start, end }) => {
            let data = node.buffer(1).map_err(|e| path.layout(e))?;
            Value::Bin(value_bytes(data, start, end).map_err(|e| path.layout(e))?)
        }
        (TypeTag::FixedSizeBinary(_), ResolvedRange::Bytes { start, end }) => {
            let data = node.buffer(0).map_err(|e| path.layout(e))?;
            Value::Bin(value_bytes(data, start, end).map_err(|e| path.layout(e))?)
        }
        (TypeTag::List(_), ResolvedRange::Child(window)) => {
            Value::List(translate_items(&node.children()[0], path, window)?)
        }
        (TypeTag::FixedSizeList(_), ResolvedRange::Child(window)) => {
            Value::FixedSizeList(translate_items(&node.children()[0], path, window)?)
        }
        (TypeTag::Struct(names), ResolvedRange::Fields(row)) => {
            // Each child yields exactly one value for the single-row window.
            let fields = node
                .children()
                .iter()
                .zip(names)
                .map(|(child, name)| {
                    translate_items(child, &path.push_field(name), Window::new(row, 1))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Value::Struct(fields.into_iter().flatten().collect())
        }
        (tag, range) => {
            return Err(path.type_mismatch(format!("{tag} location"), range_kind(range)));
        }
    };
    Ok(value)
}

fn range_kind(range: ResolvedRange) -> &'static str {
    match range {
        ResolvedRange::Null => "null",
        ResolvedRange::Element(_) => "element index",
        ResolvedRange::Bytes { .. } => "byte range",
        ResolvedRange::Child(_) => "child window",
        ResolvedRange::Fields(_) => "struct row",
    }
}

fn value_bytes(data: &[u8], start: usize, end: usize) -> Result<&[u8], LayoutError> {
    data.get(start..end).ok_or(LayoutError::BufferTooShort {
        buffer: "values",
        needed: end,
        actual: data.len(),
    })
}

fn element_bytes(data: &[u8], index: usize, width: usize) -> Result<&[u8], LayoutError> {
    let start = index.checked_mul(width).ok_or(LayoutError::Overflow)?;
    let end = start.checked_add(width).ok_or(LayoutError::Overflow)?;
    value_bytes(data, start, end)
}

fn read_primitive(data: &[u8], ty: PrimitiveType, index: usize) -> Result<Value<'_>, LayoutError> {
    let raw = element_bytes(data, index, ty.byte_width())?;
    let value = match ty {
        PrimitiveType::Int8 => Value::I8(i8::from_ne_slice(raw)),
        PrimitiveType::Int16 => Value::I16(i16::from_ne_slice(raw)),
        PrimitiveType::Int32 => Value::I32(i32::from_ne_slice(raw)),
        PrimitiveType::Int64 => Value::I64(i64::from_ne_slice(raw)),
        PrimitiveType::UInt8 => Value::U8(u8::from_ne_slice(raw)),
        PrimitiveType::UInt16 => Value::U16(u16::from_ne_slice(raw)),
        PrimitiveType::UInt32 => Value::U32(u32::from_ne_slice(raw)),
        PrimitiveType::UInt64 => Value::U64(u64::from_ne_slice(raw)),
        PrimitiveType::Float16 => Value::F16(f16::from_ne_slice(raw)),
        PrimitiveType::Float32 => Value::F32(f32::from_ne_slice(raw)),
        PrimitiveType::Float64 => Value::F64(f64::from_ne_slice(raw)),
        PrimitiveType::Date32 => Value::Date32(i32::from_ne_slice(raw)),
        PrimitiveType::Date64 => Value::Date64(i64::from_ne_slice(raw)),
        PrimitiveType::Timestamp => Value::Timestamp(i64::from_ne_slice(raw)),
    };
    Ok(value)
}
