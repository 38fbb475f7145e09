//! Values produced by translating a window.
//!
//! [`Value`] borrows string and binary payloads from the batch buffers; [`OwnedValue`] is its
//! detached counterpart for callers that outlive the batch.

use half::f16;

macro_rules! value_primitive_getters {
    ($(($variant:ident, $getter:ident, $ty:ty, $desc:literal)),* $(,)?) => {
        $(
            #[doc = concat!(
                "Returns the ", $desc, " value if this is a `", stringify!($variant), "`."
            )]
            pub fn $getter(&self) -> Option<$ty> {
                match self {
                    Self::$variant(value) => Some(*value),
                    _ => None,
                }
            }
        )*
    };
}

/// A single materialized value borrowed from the batch buffers.
///
/// `List` serves both `List` and `LargeList`; `Str` and `Bin` serve both offset widths.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Null row.
    Null,
    /// Boolean.
    Bool(bool),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// Half precision float.
    F16(f16),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Days since the UNIX epoch.
    Date32(i32),
    /// Milliseconds since the UNIX epoch.
    Date64(i64),
    /// Ticks since the UNIX epoch.
    Timestamp(i64),
    /// Borrowed UTF-8 string.
    Str(&'a str),
    /// Borrowed bytes (variable or fixed width).
    Bin(&'a [u8]),
    /// Items of a variable-size list row.
    List(Vec<Value<'a>>),
    /// Items of a fixed-size list row.
    FixedSizeList(Vec<Value<'a>>),
    /// Field values of a struct row, in field order.
    Struct(Vec<Value<'a>>),
}

impl<'a> Value<'a> {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    value_primitive_getters! {
        (Bool, as_bool, bool, "boolean"),
        (I8, as_i8, i8, "`i8`"),
        (I16, as_i16, i16, "`i16`"),
        (I32, as_i32, i32, "`i32`"),
        (I64, as_i64, i64, "`i64`"),
        (U8, as_u8, u8, "`u8`"),
        (U16, as_u16, u16, "`u16`"),
        (U32, as_u32, u32, "`u32`"),
        (U64, as_u64, u64, "`u64`"),
        (F16, as_f16, f16, "`f16`"),
        (F32, as_f32, f32, "`f32`"),
        (F64, as_f64, f64, "`f64`"),
    }

    /// Returns the string slice if this is a `Str`.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the byte slice if this is a `Bin`.
    pub fn as_bin(&self) -> Option<&'a [u8]> {
        match self {
            Value::Bin(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the items if this is a `List` or `FixedSizeList`.
    pub fn as_list(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::List(items) | Value::FixedSizeList(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the field values if this is a `Struct`.
    pub fn as_struct(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Detach the value from the batch buffers, copying any borrowed payload.
    pub fn into_owned(self) -> OwnedValue {
        match self {
            Value::Null => OwnedValue::Null,
            Value::Bool(v) => OwnedValue::Bool(v),
            Value::I8(v) => OwnedValue::I8(v),
            Value::I16(v) => OwnedValue::I16(v),
            Value::I32(v) => OwnedValue::I32(v),
            Value::I64(v) => OwnedValue::I64(v),
            Value::U8(v) => OwnedValue::U8(v),
            Value::U16(v) => OwnedValue::U16(v),
            Value::U32(v) => OwnedValue::U32(v),
            Value::U64(v) => OwnedValue::U64(v),
            Value::F16(v) => OwnedValue::F16(v),
            Value::F32(v) => OwnedValue::F32(v),
            Value::F64(v) => OwnedValue::F64(v),
            Value::Date32(v) => OwnedValue::Date32(v),
            Value::Date64(v) => OwnedValue::Date64(v),
            Value::Timestamp(v) => OwnedValue::Timestamp(v),
            Value::Str(v) => OwnedValue::Str(v.to_owned()),
            Value::Bin(v) => OwnedValue::Bin(v.to_vec()),
            Value::List(items) => OwnedValue::List(owned_items(items)),
            Value::FixedSizeList(items) => OwnedValue::FixedSizeList(owned_items(items)),
            Value::Struct(fields) => OwnedValue::Struct(owned_items(fields)),
        }
    }
}

fn owned_items(items: Vec<Value<'_>>) -> Vec<OwnedValue> {
    items.into_iter().map(Value::into_owned).collect()
}

/// Owned counterpart of [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedValue {
    /// Null row.
    Null,
    /// Boolean.
    Bool(bool),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// Half precision float.
    F16(f16),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Days since the UNIX epoch.
    Date32(i32),
    /// Milliseconds since the UNIX epoch.
    Date64(i64),
    /// Ticks since the UNIX epoch.
    Timestamp(i64),
    /// UTF-8 string.
    Str(String),
    /// Bytes.
    Bin(Vec<u8>),
    /// Items of a variable-size list row.
    List(Vec<OwnedValue>),
    /// Items of a fixed-size list row.
    FixedSizeList(Vec<OwnedValue>),
    /// Field values of a struct row, in field order.
    Struct(Vec<OwnedValue>),
}
