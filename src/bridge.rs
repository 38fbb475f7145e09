//! Bridge from Arrow's `ArrayData` to [`ArrayNode`] graphs.
//!
//! `ArrayData` is read with the semantics of the Arrow C data interface: a node's `offset`
//! applies to its own buffers and, for structs, to every child. Validity comes from the
//! `NullBuffer`, which arrow-rs keeps already positioned on the array's rows.

use arrow_data::ArrayData;
use arrow_schema::{DataType, Field};

use crate::{
    ArrayNode, BitmapView, LayoutError, OffsetWidth, PrimitiveType, TranslateError, TypeTag,
    path::Path,
};

/// Map an Arrow type to the physical tag that reads it, or `None` if it has no windowed reader.
///
/// Only the outermost level is inspected; nested children are mapped when their nodes are built.
pub fn type_tag_for(data_type: &DataType) -> Option<TypeTag> {
    let tag = match data_type {
        DataType::Null => TypeTag::Null,
        DataType::Boolean => TypeTag::Boolean,
        DataType::Int8 => TypeTag::Primitive(PrimitiveType::Int8),
        DataType::Int16 => TypeTag::Primitive(PrimitiveType::Int16),
        DataType::Int32 => TypeTag::Primitive(PrimitiveType::Int32),
        DataType::Int64 => TypeTag::Primitive(PrimitiveType::Int64),
        DataType::UInt8 => TypeTag::Primitive(PrimitiveType::UInt8),
        DataType::UInt16 => TypeTag::Primitive(PrimitiveType::UInt16),
        DataType::UInt32 => TypeTag::Primitive(PrimitiveType::UInt32),
        DataType::UInt64 => TypeTag::Primitive(PrimitiveType::UInt64),
        DataType::Float16 => TypeTag::Primitive(PrimitiveType::Float16),
        DataType::Float32 => TypeTag::Primitive(PrimitiveType::Float32),
        DataType::Float64 => TypeTag::Primitive(PrimitiveType::Float64),
        DataType::Date32 => TypeTag::Primitive(PrimitiveType::Date32),
        DataType::Date64 => TypeTag::Primitive(PrimitiveType::Date64),
        DataType::Timestamp(_, _) => TypeTag::Primitive(PrimitiveType::Timestamp),
        DataType::Utf8 => TypeTag::Utf8(OffsetWidth::Bits32),
        DataType::LargeUtf8 => TypeTag::Utf8(OffsetWidth::Bits64),
        DataType::Binary => TypeTag::Binary(OffsetWidth::Bits32),
        DataType::LargeBinary => TypeTag::Binary(OffsetWidth::Bits64),
        DataType::FixedSizeBinary(width) => TypeTag::FixedSizeBinary(usize::try_from(*width).ok()?),
        DataType::List(_) => TypeTag::List(OffsetWidth::Bits32),
        DataType::LargeList(_) => TypeTag::List(OffsetWidth::Bits64),
        DataType::FixedSizeList(_, size) => TypeTag::FixedSizeList(usize::try_from(*size).ok()?),
        DataType::Struct(fields) => {
            TypeTag::Struct(fields.iter().map(|f| f.name().clone()).collect())
        }
        _ => return None,
    };
    Some(tag)
}

impl<'a> ArrayNode<'a> {
    /// Build a node graph borrowing the buffers of `data`.
    ///
    /// # Errors
    /// Returns [`TranslateError::UnsupportedType`] for types without a windowed reader, or
    /// [`TranslateError::Layout`] if the buffers are inconsistent with the declared type.
    pub fn from_data(data: &'a ArrayData) -> Result<Self, TranslateError> {
        node_from_data(data, &Path::new(""))
    }

    /// Like [`from_data`](Self::from_data), after checking `data` against the declared `field`.
    ///
    /// Field names and nested nullability are not compared.
    ///
    /// # Errors
    /// Returns [`TranslateError::TypeMismatch`] if the array type differs from the field type.
    pub fn from_data_with_field(
        data: &'a ArrayData,
        field: &Field,
    ) -> Result<Self, TranslateError> {
        let path = Path::new(field.name());
        if !data.data_type().equals_datatype(field.data_type()) {
            return Err(path.type_mismatch(field.data_type().to_string(), data.data_type()));
        }
        node_from_data(data, &path)
    }
}

fn node_from_data<'a>(
    data: &'a ArrayData,
    path: &Path<'_>,
) -> Result<ArrayNode<'a>, TranslateError> {
    let tag = match data.data_type() {
        DataType::FixedSizeBinary(width) | DataType::FixedSizeList(_, width) if *width < 0 => {
            return Err(path.layout(LayoutError::InvalidWidth {
                width: i64::from(*width),
            }));
        }
        data_type => type_tag_for(data_type).ok_or_else(|| TranslateError::UnsupportedType {
            path: path.to_string(),
            data_type: data_type.clone(),
        })?,
    };

    let validity = data
        .nulls()
        .map(|nulls| BitmapView::try_new(nulls.buffer().as_slice(), nulls.offset(), nulls.len()))
        .transpose()
        .map_err(|e| path.layout(e))?;

    let buffers = data
        .buffers()
        .iter()
        .take(tag.buffer_count())
        .map(|buffer| buffer.as_slice())
        .collect();

    let children = match &tag {
        TypeTag::Struct(names) => data
            .child_data()
            .iter()
            .zip(names)
            .map(|(child, name)| node_from_data(child, &path.push_field(name)))
            .collect::<Result<Vec<_>, _>>()?,
        TypeTag::List(_) | TypeTag::FixedSizeList(_) => data
            .child_data()
            .iter()
            .map(|child| node_from_data(child, path))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(
        path = %path,
        tag = %tag,
        offset = data.offset(),
        len = data.len(),
        "built array node"
    );

    ArrayNode::try_new(tag, data.offset(), data.len(), validity, buffers, children)
        .map_err(|e| path.layout(e))
}
