use serde::{Deserialize, Serialize};
use tree_sitter::Node;

/// Name recorded for backtick / `%x` execution literals.
pub const XSTRING_NAME: &str = "builtin_xstring";

/// Which syntactic shape produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceShape {
    /// `foo(...)`, `recv.foo(...)`, `Const::foo ...`
    Call,
    /// `` `cmd #{arg}` `` and `%x(...)`
    InlineExecution,
}

/// Extent of a reference in the parsed source.
///
/// Lines are 1-indexed; columns are 0-indexed character offsets and `last_column` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub line: usize,
    pub column: usize,
    pub last_line: usize,
    pub last_column: usize,
}

impl SourceSpan {
    pub fn of(node: Node, source: &[u8]) -> Self {
        Self::spanning(node, node, source)
    }

    /// From the start of `first` to the end of `last`.
    pub fn spanning(first: Node, last: Node, source: &[u8]) -> Self {
        let start = first.start_position();
        let end = last.end_position();
        Self {
            line: start.row + 1,
            column: char_column(source, first.start_byte(), start.column),
            last_line: end.row + 1,
            last_column: char_column(source, last.end_byte(), end.column),
        }
    }

    /// True when the end does not precede the start.
    pub fn is_ordered(&self) -> bool {
        (self.last_line, self.last_column) >= (self.line, self.column)
    }
}

/// Characters between the start of the line and `byte`, given its byte column.
fn char_column(source: &[u8], byte: usize, byte_column: usize) -> usize {
    byte.checked_sub(byte_column)
        .and_then(|line_start| source.get(line_start..byte))
        .map(|prefix| String::from_utf8_lossy(prefix).chars().count())
        .unwrap_or(byte_column)
}

/// A recognized call-like node before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReference {
    pub shape: ReferenceShape,
    pub name: String,
    /// Source text of the receiver; `None` for unqualified calls.
    pub qualifier: Option<String>,
    /// Source text of each argument; `None` when the call carries no arguments.
    pub arguments: Option<Vec<String>>,
    pub span: SourceSpan,
    pub source_text: String,
}

impl CandidateReference {
    pub fn full_name(&self) -> String {
        full_name(self.qualifier.as_deref(), &self.name)
    }
}

/// `qualifier.name`, or `name` alone when there is no qualifier.
pub fn full_name(qualifier: Option<&str>, name: &str) -> String {
    match qualifier {
        Some(qualifier) => format!("{}.{}", qualifier, name),
        None => name.to_string(),
    }
}
