use anyhow::Result;
use std::path::Path;
use tree_sitter::{Parser, Tree};

use crate::error::AstgenError;
use crate::filter::DeclRefFilter;
use crate::parser::ast_utils::find_first_error;
use crate::parser::ast_walker::{DeclRefWalker, DEFAULT_MAX_DEPTH};
use crate::parser::references::CandidateReference;

/// Parses Ruby source and extracts the declaration references a filter accepts.
pub struct RubyParser {
    parser: Parser,
    max_depth: usize,
}

impl RubyParser {
    pub fn new() -> Result<Self> {
        let language = tree_sitter_ruby::language();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| anyhow::anyhow!("Failed to set language: {}", e))?;

        Ok(Self {
            parser,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn read_source(file_path: &Path) -> Result<String, AstgenError> {
        std::fs::read_to_string(file_path).map_err(|source| AstgenError::FileRead {
            path: file_path.to_path_buf(),
            source,
        })
    }

    pub fn parse_file(
        &mut self,
        file_path: &Path,
        filter: &DeclRefFilter,
    ) -> Result<Vec<CandidateReference>, AstgenError> {
        let source = Self::read_source(file_path)?;
        self.extract_references(&source, file_path, filter)
    }

    /// Parse `source` into a syntax tree; trees containing syntax errors are rejected.
    pub fn parse_source(&mut self, source: &str, file_path: &Path) -> Result<Tree, AstgenError> {
        let tree = self.parser.parse(source, None).ok_or_else(|| AstgenError::Parse {
            path: file_path.to_path_buf(),
            reason: "parser produced no tree".to_string(),
        })?;

        if let Some(error_node) = find_first_error(tree.root_node()) {
            let position = error_node.start_position();
            let what = if error_node.is_missing() {
                format!("missing {}", error_node.kind())
            } else {
                "syntax error".to_string()
            };
            return Err(AstgenError::Parse {
                path: file_path.to_path_buf(),
                reason: format!("{} at line {}, column {}", what, position.row + 1, position.column),
            });
        }

        Ok(tree)
    }

    pub fn extract_references(
        &mut self,
        source: &str,
        file_path: &Path,
        filter: &DeclRefFilter,
    ) -> Result<Vec<CandidateReference>, AstgenError> {
        let tree = self.parse_source(source, file_path)?;

        DeclRefWalker::new(source.as_bytes(), filter)
            .with_max_depth(self.max_depth)
            .walk(tree.root_node())
            .map_err(|e| AstgenError::Traversal {
                path: file_path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_simple_calls() {
        let mut parser = RubyParser::new().unwrap();
        let source = "foo()\nbar.baz(1, \"x\")\n";

        let refs = parser
            .extract_references(source, &PathBuf::from("test.rb"), &DeclRefFilter::pass_through())
            .unwrap();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "foo");
        assert_eq!(refs[0].qualifier, None);
        assert_eq!(refs[0].arguments, None);
        assert_eq!(refs[1].full_name(), "bar.baz");
        assert_eq!(refs[1].arguments, Some(vec!["1".to_string(), "\"x\"".to_string()]));
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let mut parser = RubyParser::new().unwrap();
        let err = parser
            .extract_references("def broken(\n  )))\n", &PathBuf::from("bad.rb"), &DeclRefFilter::pass_through())
            .unwrap_err();

        assert!(matches!(err, AstgenError::Parse { .. }), "unexpected error: {err}");
        assert!(err.to_string().contains("bad.rb"));
    }

    #[test]
    fn test_depth_limit_is_traversal_failure() {
        let mut parser = RubyParser::new().unwrap().with_max_depth(4);
        let err = parser
            .extract_references("a(b(c(d(e(1)))))\n", &PathBuf::from("deep.rb"), &DeclRefFilter::pass_through())
            .unwrap_err();

        assert!(matches!(err, AstgenError::Traversal { .. }), "unexpected error: {err}");
        assert!(err.to_string().contains("nesting exceeds 4 levels"));
    }

    #[test]
    fn test_missing_file_is_read_failure() {
        let mut parser = RubyParser::new().unwrap();
        let err = parser
            .parse_file(Path::new("/no/such/file.rb"), &DeclRefFilter::pass_through())
            .unwrap_err();
        assert!(matches!(err, AstgenError::FileRead { .. }));
    }
}
