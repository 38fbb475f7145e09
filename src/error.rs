//! Error types for windowed reads.

use arrow_schema::DataType;
use thiserror::Error;

/// Physical layout violations found while reading buffers.
///
/// These indicate corrupt or inconsistent input. They are never clamped or papered over: a single
/// violation fails the whole window being translated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// An offsets buffer decreased between two consecutive entries.
    #[error("offsets not monotonic at entry {index}: {start} > {end}")]
    OffsetsNotMonotonic {
        /// Physical index of the first entry of the offending pair.
        index: usize,
        /// Value of the entry at `index`.
        start: usize,
        /// Value of the entry at `index + 1`.
        end: usize,
    },

    /// An offsets buffer held a negative entry.
    #[error("negative offset {value} at entry {index}")]
    NegativeOffset {
        /// Physical index of the entry.
        index: usize,
        /// Raw value read from the buffer.
        value: i64,
    },

    /// A requested window extends past the logical length it was applied to.
    #[error("window [{offset}, {offset}+{length}) out of bounds for length {len}")]
    WindowOutOfBounds {
        /// Window start.
        offset: usize,
        /// Window length.
        length: usize,
        /// Length of the node or view the window was applied to.
        len: usize,
    },

    /// A buffer is shorter than the layout requires.
    #[error("{buffer} buffer too short: need {needed} bytes, have {actual}")]
    BufferTooShort {
        /// Which buffer was short (`validity`, `offsets`, `values`, ...).
        buffer: &'static str,
        /// Number of bytes the layout requires.
        needed: usize,
        /// Number of bytes present.
        actual: usize,
    },

    /// A child array is shorter than its parent's layout requires.
    #[error("child {child} too short: need {needed} rows, have {actual}")]
    ChildTooShort {
        /// Position of the child in the parent.
        child: usize,
        /// Number of logical rows required.
        needed: usize,
        /// Logical length of the child.
        actual: usize,
    },

    /// Offsets were declared with a width other than 32 or 64 bits.
    #[error("unsupported offset width: {bits} bits")]
    UnsupportedOffsetWidth {
        /// Declared width in bits.
        bits: u32,
    },

    /// A buffer required by the type tag is absent.
    #[error("missing buffer {index}")]
    MissingBuffer {
        /// Buffer position expected by the layout.
        index: usize,
    },

    /// The node carries a different number of children than its type tag requires.
    #[error("expected {expected} child arrays, got {actual}")]
    ChildCountMismatch {
        /// Number required by the type tag.
        expected: usize,
        /// Number present.
        actual: usize,
    },

    /// The validity bitmap does not cover exactly the node's logical rows.
    #[error("validity covers {actual} rows, node has {expected}")]
    ValidityLength {
        /// Logical length of the node.
        expected: usize,
        /// Logical length of the validity view.
        actual: usize,
    },

    /// A fixed stride or width of zero or below was declared.
    #[error("invalid fixed width {width}")]
    InvalidWidth {
        /// Declared width.
        width: i64,
    },

    /// Offset arithmetic overflowed `usize`.
    #[error("offset arithmetic overflow")]
    Overflow,

    /// A `Utf8`/`LargeUtf8` value is not valid UTF-8.
    #[error("invalid utf-8 in value bytes [{start}, {end})")]
    InvalidUtf8 {
        /// First byte of the value.
        start: usize,
        /// One past the last byte of the value.
        end: usize,
    },
}

/// Errors surfaced by translation, materialization and scanning.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// A layout violation, annotated with the node where it occurred.
    #[error("layout error at {path}: {source}")]
    Layout {
        /// Dot/index annotated path to the node (e.g. `col2.a[1]`).
        path: String,
        /// Underlying layout violation.
        #[source]
        source: LayoutError,
    },

    /// A value was requested as a type the node does not hold.
    #[error("type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Dot/index annotated path to the node.
        path: String,
        /// Requested type.
        expected: String,
        /// Type actually held by the node.
        actual: String,
    },

    /// An Arrow type with no windowed reader was encountered.
    #[error("unsupported data type at {path}: {data_type}")]
    UnsupportedType {
        /// Dot annotated path to the field.
        path: String,
        /// Arrow type encountered.
        data_type: DataType,
    },

    /// Requested column index exceeded the batch width.
    #[error("column index {column} out of bounds for schema width {width}")]
    ColumnOutOfBounds {
        /// Provided column index.
        column: usize,
        /// Number of columns in the schema.
        width: usize,
    },

    /// Invalid scan configuration or inconsistent input batches.
    #[error("invalid scan: {message}")]
    Invalid {
        /// Explanation of the invalid condition.
        message: String,
    },
}

impl TranslateError {
    /// Returns the underlying layout violation, if this is a layout error.
    pub fn layout(&self) -> Option<&LayoutError> {
        match self {
            TranslateError::Layout { source, .. } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
