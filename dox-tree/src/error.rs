//! Errors raised while building or annotating a declaration tree.

/// Malformed descriptor input. Fatal for the file being processed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    #[error("location path {path:?} selects {list} #{index}, but only {len} exist")]
    IndexOutOfRange {
        path: Vec<i32>,
        list: &'static str,
        index: i32,
        len: usize,
    },

    #[error("field {field} of {message} refers to oneof #{index}, but the message declares {len}")]
    DanglingOneOf {
        message: String,
        field: String,
        index: i32,
        len: usize,
    },
}
