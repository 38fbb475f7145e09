use std::fmt;

use crate::{LayoutError, TranslateError};

/// Dot/index annotated location of a node inside a column.
///
/// Segments borrow their parent so descending a level costs nothing; the path is only rendered
/// when an error needs it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Path<'p> {
    Root(&'p str),
    Field(&'p Path<'p>, &'p str),
    Index(&'p Path<'p>, usize),
}

impl<'p> Path<'p> {
    pub(crate) fn new(name: &'p str) -> Self {
        Path::Root(name)
    }

    pub(crate) fn push_field<'q>(&'q self, name: &'q str) -> Path<'q> {
        Path::Field(self, name)
    }

    pub(crate) fn push_index(&self, index: usize) -> Path<'_> {
        Path::Index(self, index)
    }

    pub(crate) fn layout(&self, source: LayoutError) -> TranslateError {
        TranslateError::Layout {
            path: self.to_string(),
            source,
        }
    }

    pub(crate) fn type_mismatch(
        &self,
        expected: impl Into<String>,
        actual: impl fmt::Display,
    ) -> TranslateError {
        TranslateError::TypeMismatch {
            path: self.to_string(),
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }

    fn write_segments(&self, out: &mut String) {
        match self {
            Path::Root(name) => out.push_str(name),
            Path::Field(parent, name) => {
                parent.write_segments(out);
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Path::Index(parent, index) => {
                parent.write_segments(out);
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_segments(&mut out);
        if out.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&out)
        }
    }
}
