#![deny(missing_docs)]
//! arrow-window: offset-correct windowed reads over sliced, nested Arrow arrays.
//!
//! An [`ArrayNode`] borrows the physical buffers of one (possibly nested) Arrow array. The
//! [`OffsetTranslator`] resolves a logical [`Window`] through every nesting level, and the
//! [`ScalarMaterializer`] turns the resolved ranges into borrowed [`Value`]s without copying the
//! underlying data.

// Re-export the selected Arrow crates under stable names so the rest of the crate and downstream
// users don't need to care which Arrow release is enabled.
#[cfg(feature = "arrow-57")]
pub extern crate arrow_array_57 as arrow_array;
#[cfg(feature = "arrow-57")]
pub extern crate arrow_buffer_57 as arrow_buffer;
#[cfg(feature = "arrow-57")]
pub extern crate arrow_data_57 as arrow_data;
#[cfg(feature = "arrow-57")]
pub extern crate arrow_schema_57 as arrow_schema;

#[cfg(all(feature = "arrow-56", not(feature = "arrow-57")))]
pub extern crate arrow_array_56 as arrow_array;
#[cfg(all(feature = "arrow-56", not(feature = "arrow-57")))]
pub extern crate arrow_buffer_56 as arrow_buffer;
#[cfg(all(feature = "arrow-56", not(feature = "arrow-57")))]
pub extern crate arrow_data_56 as arrow_data;
#[cfg(all(feature = "arrow-56", not(feature = "arrow-57")))]
pub extern crate arrow_schema_56 as arrow_schema;

#[cfg(all(feature = "arrow-55", not(any(feature = "arrow-56", feature = "arrow-57"))))]
pub extern crate arrow_array_55 as arrow_array;
#[cfg(all(feature = "arrow-55", not(any(feature = "arrow-56", feature = "arrow-57"))))]
pub extern crate arrow_buffer_55 as arrow_buffer;
#[cfg(all(feature = "arrow-55", not(any(feature = "arrow-56", feature = "arrow-57"))))]
pub extern crate arrow_data_55 as arrow_data;
#[cfg(all(feature = "arrow-55", not(any(feature = "arrow-56", feature = "arrow-57"))))]
pub extern crate arrow_schema_55 as arrow_schema;

#[cfg(not(any(feature = "arrow-55", feature = "arrow-56", feature = "arrow-57")))]
compile_error!("enable one of the `arrow-55`, `arrow-56` or `arrow-57` features");

pub mod bridge;
pub mod buffer;
mod error;
mod materialize;
pub mod node;
mod path;
pub mod scan;
mod translate;
pub mod value;

pub use crate::{
    buffer::{BitmapView, FixedStrideView, OffsetWidth, OffsetsView},
    error::{LayoutError, TranslateError},
    materialize::{NativeValue, ScalarMaterializer},
    node::{ArrayNode, PrimitiveType, ResolvedRange, TypeTag, Window},
    scan::{DEFAULT_CHUNK_SIZE, ScanChunk, ScanOptions, TableScan},
    translate::OffsetTranslator,
    value::{OwnedValue, Value},
};
