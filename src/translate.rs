//! Window translation through nested array nodes.
//!
//! A window always addresses the rows of the node it is applied to. Descending one level maps it
//! into the child's own row space:
//!
//! - struct: child rows are `node.offset + window.offset ..`, same length;
//! - list: each row's `[start, end)` from the offsets buffer becomes a child window;
//! - fixed-size list: each row covers `stride` child rows starting at `(node.offset + i) * stride`.
//!
//! Leaves resolve straight to element indices or byte ranges.

use crate::{
    ArrayNode, LayoutError, OffsetWidth, ResolvedRange, TranslateError, TypeTag, Value, Window,
    buffer::{FixedStrideView, OffsetsView, check_window},
    materialize::materialize_range,
    path::Path,
};

/// Resolves logical windows over an [`ArrayNode`] into per-row physical locations and values.
///
/// Translation only reads the borrowed buffers, so one translator (or several) may run over the
/// same node from multiple threads at once.
#[derive(Debug, Clone, Copy)]
pub struct OffsetTranslator<'n, 'a> {
    node: &'n ArrayNode<'a>,
    name: &'n str,
}

impl<'n, 'a> OffsetTranslator<'n, 'a> {
    /// Create a translator over `node`.
    pub fn new(node: &'n ArrayNode<'a>) -> Self {
        Self { node, name: "" }
    }

    /// Name the root of error paths (typically the column name).
    #[must_use]
    pub fn named(mut self, name: &'n str) -> Self {
        self.name = name;
        self
    }

    /// The node being translated.
    pub fn node(&self) -> &'n ArrayNode<'a> {
        self.node
    }

    /// Resolve every row of `window` to its physical location in this node.
    ///
    /// Returns exactly `window.length` entries; null rows resolve to [`ResolvedRange::Null`].
    ///
    /// # Errors
    /// Returns [`TranslateError::Layout`] if the window exceeds the node or the offsets are
    /// malformed.
    pub fn resolve(&self, window: Window) -> Result<Vec<ResolvedRange>, TranslateError> {
        resolve_window(self.node, &Path::new(self.name), window)
    }

    /// Materialize every row of `window`, descending into children as needed.
    ///
    /// Returns exactly `window.length` values in row order.
    ///
    /// # Errors
    /// Returns the first error met at any nesting level; no partial result is produced.
    pub fn translate(&self, window: Window) -> Result<Vec<Value<'a>>, TranslateError> {
        translate_window(self.node, &Path::new(self.name), window)
    }

    /// Materialize a single row.
    ///
    /// # Errors
    /// Same as [`translate`](Self::translate).
    pub fn value_at(&self, row: usize) -> Result<Value<'a>, TranslateError> {
        let path = Path::new(self.name);
        let range = resolve_row(self.node, &path, row)?;
        materialize_range(self.node, &path.push_index(row), range)
    }

    /// Child windows of every row of `window` for a `List` or `FixedSizeList` node.
    ///
    /// Null rows yield `None`.
    ///
    /// # Errors
    /// Returns [`TranslateError::TypeMismatch`] for other node types.
    pub fn child_windows(&self, window: Window) -> Result<Vec<Option<Window>>, TranslateError> {
        let path = Path::new(self.name);
        if !matches!(self.node.tag(), TypeTag::List(_) | TypeTag::FixedSizeList(_)) {
            return Err(path.type_mismatch("List or FixedSizeList", self.node.tag()));
        }
        let windows = resolve_window(self.node, &path, window)?
            .into_iter()
            .map(|range| match range {
                ResolvedRange::Child(child) => Some(child),
                _ => None,
            })
            .collect();
        Ok(windows)
    }
}

impl<'a> ArrayNode<'a> {
    /// Shorthand for `OffsetTranslator::new(self).translate(window)`.
    ///
    /// # Errors
    /// See [`OffsetTranslator::translate`].
    pub fn translate(&self, window: Window) -> Result<Vec<Value<'a>>, TranslateError> {
        OffsetTranslator::new(self).translate(window)
    }
}

/// How rows of one node map to physical locations, positioned on a window.
enum Locator<'a> {
    AllNull,
    Element { base: usize },
    Bytes(OffsetsView<'a>),
    FixedBytes(FixedStrideView),
    Child(OffsetsView<'a>),
    FixedChild(FixedStrideView),
    Fields { base: usize },
}

impl<'a> Locator<'a> {
    fn new(node: &ArrayNode<'a>, window: Window) -> Result<Self, LayoutError> {
        let locator = match node.tag() {
            TypeTag::Null => Locator::AllNull,
            TypeTag::Boolean | TypeTag::Primitive(_) => Locator::Element {
                base: node.offset() + window.offset,
            },
            TypeTag::Utf8(width) | TypeTag::Binary(width) => {
                Locator::Bytes(offsets_for(node, *width, window)?)
            }
            TypeTag::List(width) => Locator::Child(offsets_for(node, *width, window)?),
            TypeTag::FixedSizeBinary(width) => {
                Locator::FixedBytes(node.stride_view(*width).slice(window.offset, window.length)?)
            }
            TypeTag::FixedSizeList(stride) => {
                Locator::FixedChild(node.stride_view(*stride).slice(window.offset, window.length)?)
            }
            TypeTag::Struct(_) => Locator::Fields {
                base: node.offset() + window.offset,
            },
        };
        Ok(locator)
    }

    /// Location of row `index` of the window.
    fn locate(&self, index: usize) -> Result<ResolvedRange, LayoutError> {
        let range = match self {
            Locator::AllNull => ResolvedRange::Null,
            Locator::Element { base } => ResolvedRange::Element(base + index),
            Locator::Bytes(offsets) => {
                let (start, end) = offsets.range_of(index)?;
                ResolvedRange::Bytes { start, end }
            }
            Locator::FixedBytes(stride) => {
                let (start, end) = stride.range_of(index)?;
                ResolvedRange::Bytes { start, end }
            }
            Locator::Child(offsets) => {
                let (start, end) = offsets.range_of(index)?;
                ResolvedRange::Child(Window::new(start, end - start))
            }
            Locator::FixedChild(stride) => {
                let (start, end) = stride.range_of(index)?;
                ResolvedRange::Child(Window::new(start, end - start))
            }
            Locator::Fields { base } => ResolvedRange::Fields(base + index),
        };
        Ok(range)
    }
}

fn offsets_for<'a>(
    node: &ArrayNode<'a>,
    width: OffsetWidth,
    window: Window,
) -> Result<OffsetsView<'a>, LayoutError> {
    node.offsets_view(width)?
        .slice(window.offset, window.length)
}

pub(crate) fn resolve_window(
    node: &ArrayNode<'_>,
    path: &Path<'_>,
    window: Window,
) -> Result<Vec<ResolvedRange>, TranslateError> {
    resolve_labelled(node, path, window, window.offset)
}

/// Resolves `window`, labelling row `i` of the window as `first + i` in error paths.
fn resolve_labelled(
    node: &ArrayNode<'_>,
    path: &Path<'_>,
    window: Window,
    first: usize,
) -> Result<Vec<ResolvedRange>, TranslateError> {
    check_window(window.offset, window.length, node.len()).map_err(|e| path.layout(e))?;
    let locator = Locator::new(node, window).map_err(|e| path.layout(e))?;
    (0..window.length)
        .map(|index| {
            // Validity is authoritative: a null row is never located, whatever its offsets say.
            if !node.is_valid(window.offset + index) {
                return Ok(ResolvedRange::Null);
            }
            locator
                .locate(index)
                .map_err(|e| path.push_index(first + index).layout(e))
        })
        .collect()
}

pub(crate) fn resolve_row(
    node: &ArrayNode<'_>,
    path: &Path<'_>,
    row: usize,
) -> Result<ResolvedRange, TranslateError> {
    check_window(row, 1, node.len()).map_err(|e| path.layout(e))?;
    if !node.is_valid(row) {
        return Ok(ResolvedRange::Null);
    }
    Locator::new(node, Window::new(row, 1))
        .and_then(|locator| locator.locate(0))
        .map_err(|e| path.push_index(row).layout(e))
}

/// Translates `window`, labelling rows by their position in `node` in error paths.
pub(crate) fn translate_window<'a>(
    node: &ArrayNode<'a>,
    path: &Path<'_>,
    window: Window,
) -> Result<Vec<Value<'a>>, TranslateError> {
    translate_labelled(node, path, window, window.offset)
}

/// Translates the items of one container row, labelling them by their position in the row.
pub(crate) fn translate_items<'a>(
    node: &ArrayNode<'a>,
    path: &Path<'_>,
    window: Window,
) -> Result<Vec<Value<'a>>, TranslateError> {
    translate_labelled(node, path, window, 0)
}

fn translate_labelled<'a>(
    node: &ArrayNode<'a>,
    path: &Path<'_>,
    window: Window,
    first: usize,
) -> Result<Vec<Value<'a>>, TranslateError> {
    if let TypeTag::Struct(names) = node.tag() {
        return translate_struct(node, names, path, window, first);
    }
    resolve_labelled(node, path, window, first)?
        .into_iter()
        .enumerate()
        .map(|(index, range)| materialize_range(node, &path.push_index(first + index), range))
        .collect()
}

/// Translates each child once over the shifted window and zips the columns back into rows.
///
/// Field errors carry the struct's own row labels.
fn translate_struct<'a>(
    node: &ArrayNode<'a>,
    names: &[String],
    path: &Path<'_>,
    window: Window,
    first: usize,
) -> Result<Vec<Value<'a>>, TranslateError> {
    check_window(window.offset, window.length, node.len()).map_err(|e| path.layout(e))?;
    let child_window = Window::new(node.offset() + window.offset, window.length);
    let mut rows: Vec<Vec<Value<'a>>> = (0..window.length)
        .map(|_| Vec::with_capacity(names.len()))
        .collect();
    for (child, name) in node.children().iter().zip(names) {
        let column = translate_labelled(child, &path.push_field(name), child_window, first)?;
        for (row, value) in rows.iter_mut().zip(column) {
            row.push(value);
        }
    }
    let values = rows
        .into_iter()
        .enumerate()
        .map(|(index, fields)| {
            if node.is_valid(window.offset + index) {
                Value::Struct(fields)
            } else {
                Value::Null
            }
        })
        .collect();
    Ok(values)
}
