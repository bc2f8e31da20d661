use std::collections::HashSet;
use thiserror::Error;
use tree_sitter::Node;
use tracing::trace;

use crate::filter::DeclRefFilter;
use crate::parser::ast_utils::*;
use crate::parser::references::*;

/// Nesting limit for the recursive walk.
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// Failure while walking a successfully parsed tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at line {line}")]
pub struct TraversalError {
    pub line: usize,
    pub reason: String,
}

impl TraversalError {
    fn at(node: Node, reason: impl Into<String>) -> Self {
        Self {
            line: get_line_range(node).0,
            reason: reason.into(),
        }
    }
}

/// Node shapes the walker distinguishes. Everything else is plain recursive descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeShape {
    Call,
    Subshell,
    Identifier,
    MethodDef,
    SingletonMethodDef,
    Other,
}

impl NodeShape {
    fn of(node: Node) -> Self {
        match node.kind() {
            "call" => NodeShape::Call,
            "subshell" => NodeShape::Subshell,
            "identifier" => NodeShape::Identifier,
            "method" => NodeShape::MethodDef,
            "singleton_method" => NodeShape::SingletonMethodDef,
            _ => NodeShape::Other,
        }
    }
}

/// What an identifier stands for in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentifierRole {
    /// Assignment target, parameter or pattern variable
    Binding,
    /// Method name in a call, definition, alias or setter
    Name,
    /// Receiver of a call; the outer call carries it as its qualifier
    Receiver,
    Read,
}

impl IdentifierRole {
    fn of(node: Node) -> Self {
        let Some(parent) = node.parent() else {
            return IdentifierRole::Read;
        };
        match parent.kind() {
            "call" if is_field(parent, "receiver", node) => IdentifierRole::Receiver,
            "call" | "method" | "singleton_method" if is_field(parent, "name", node) || is_field(parent, "method", node) => {
                IdentifierRole::Name
            }
            "alias" | "undef" | "setter" => IdentifierRole::Name,
            "assignment" | "operator_assignment" if is_field(parent, "left", node) => IdentifierRole::Binding,
            "optional_parameter" | "keyword_parameter" | "as_pattern" if is_field(parent, "name", node) => {
                IdentifierRole::Binding
            }
            "for" | "in_clause" if is_field(parent, "pattern", node) => IdentifierRole::Binding,
            "left_assignment_list"
            | "destructured_left_assignment"
            | "rest_assignment"
            | "method_parameters"
            | "block_parameters"
            | "lambda_parameters"
            | "destructured_parameter"
            | "splat_parameter"
            | "hash_splat_parameter"
            | "block_parameter"
            | "exception_variable"
            | "array_pattern"
            | "find_pattern"
            | "alternative_pattern"
            | "keyword_pattern" => IdentifierRole::Binding,
            _ => IdentifierRole::Read,
        }
    }
}

/// Local variables visible at the current point of the walk.
///
/// Definitions, classes and modules start a fresh frame; blocks and lambdas see the
/// enclosing frame as well as their own.
#[derive(Debug, Default)]
struct LocalScopes {
    frames: Vec<(HashSet<String>, bool)>,
}

impl LocalScopes {
    fn opened_by(node: Node) -> Option<bool> {
        match node.kind() {
            "method" | "singleton_method" | "class" | "module" | "singleton_class" => Some(false),
            "block" | "do_block" | "lambda" => Some(true),
            _ => None,
        }
    }

    fn push(&mut self, inherits: bool) {
        self.frames.push((HashSet::new(), inherits));
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn declare(&mut self, name: &str) {
        if let Some((names, _)) = self.frames.last_mut() {
            names.insert(name.to_string());
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        for (names, inherits) in self.frames.iter().rev() {
            if names.contains(name) {
                return true;
            }
            if !inherits {
                break;
            }
        }
        false
    }
}

/// Pre-order walker collecting declaration references accepted by a filter.
///
/// Children are always visited, whether or not the current node was recognized or
/// accepted, so calls nested in receivers, arguments or blocks are found on their own.
pub struct DeclRefWalker<'a> {
    source: &'a [u8],
    filter: &'a DeclRefFilter,
    max_depth: usize,
}

impl<'a> DeclRefWalker<'a> {
    pub fn new(source: &'a [u8], filter: &'a DeclRefFilter) -> Self {
        Self {
            source,
            filter,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Main entry point for walking the AST
    pub fn walk(&self, root: Node<'a>) -> Result<Vec<CandidateReference>, TraversalError> {
        let mut refs = Vec::new();
        let mut scopes = LocalScopes::default();
        scopes.push(false);
        self.walk_node(root, 0, &mut scopes, &mut refs)?;
        Ok(refs)
    }

    fn walk_node(
        &self,
        node: Node<'a>,
        depth: usize,
        scopes: &mut LocalScopes,
        refs: &mut Vec<CandidateReference>,
    ) -> Result<(), TraversalError> {
        if depth > self.max_depth {
            return Err(TraversalError::at(
                node,
                format!("nesting exceeds {} levels", self.max_depth),
            ));
        }

        let opened = LocalScopes::opened_by(node);
        if let Some(inherits) = opened {
            scopes.push(inherits);
        }

        match NodeShape::of(node) {
            NodeShape::Call => {
                if let Some(candidate) = self.process_call(node)? {
                    self.offer(candidate, refs);
                }
            }
            NodeShape::Subshell => {
                let candidate = self.process_subshell(node)?;
                self.offer(candidate, refs);
            }
            NodeShape::Identifier => {
                if let Some(candidate) = self.process_identifier(node, scopes)? {
                    self.offer(candidate, refs);
                }
            }
            NodeShape::MethodDef => {
                trace!(
                    "found a method body for {} at line {}",
                    extract_field_text(node, "name", self.source),
                    get_line_range(node).0
                );
            }
            NodeShape::SingletonMethodDef => {
                trace!(
                    "found a singleton method body for {}.{} at line {}",
                    extract_field_text(node, "object", self.source),
                    extract_field_text(node, "name", self.source),
                    get_line_range(node).0
                );
            }
            NodeShape::Other => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_node(child, depth + 1, scopes, refs)?;
        }

        if opened.is_some() {
            scopes.pop();
        }
        Ok(())
    }

    fn offer(&self, candidate: CandidateReference, refs: &mut Vec<CandidateReference>) {
        if self.filter.accepts(&candidate) {
            trace!("accepted {} at line {}", candidate.full_name(), candidate.span.line);
            refs.push(candidate);
        }
    }

    /// `recv.name(args)`, `name args`, `Const::name`, `recv&.name`, `recv.name = value`
    fn process_call(&self, node: Node<'a>) -> Result<Option<CandidateReference>, TraversalError> {
        let method_node = node.child_by_field_name("method");
        let arguments_node = node.child_by_field_name("arguments");

        let mut name = match method_node {
            // `super(...)` invokes the parent method, not a named one
            Some(method) if method.kind() == "super" => return Ok(None),
            Some(method) => self.text(method)?.to_string(),
            // `recv.(args)` is sugar for `recv.call(args)`
            None if arguments_node.is_some() => "call".to_string(),
            None => return Err(TraversalError::at(node, "call without a method name")),
        };

        let qualifier = match node.child_by_field_name("receiver") {
            Some(receiver) => Some(self.text(receiver)?.to_string()),
            None => None,
        };

        let mut arguments = match arguments_node {
            Some(list) => self.argument_texts(list)?,
            None => None,
        };

        // An attached block is not part of the call's own extent
        let last = if node.child_by_field_name("block").is_some() {
            arguments_node.or(method_node).unwrap_or(node)
        } else {
            node
        };
        let mut span = SourceSpan::spanning(node, last, self.source);
        let mut source_text = self.span(node, last)?.to_string();

        if let Some(assignment) = node.parent().filter(|p| p.kind() == "assignment" && is_field(*p, "left", node)) {
            name.push('=');
            if let Some(value) = assignment.child_by_field_name("right") {
                arguments = Some(vec![self.text(value)?.to_string()]);
            }
            span = SourceSpan::of(assignment, self.source);
            source_text = self.text(assignment)?.to_string();
        }

        Ok(Some(CandidateReference {
            shape: ReferenceShape::Call,
            name,
            qualifier,
            arguments,
            span,
            source_text,
        }))
    }

    /// A bare name that is not a local variable is a call without receiver or arguments.
    fn process_identifier(
        &self,
        node: Node<'a>,
        scopes: &mut LocalScopes,
    ) -> Result<Option<CandidateReference>, TraversalError> {
        let name = self.text(node)?;
        match IdentifierRole::of(node) {
            IdentifierRole::Binding => {
                scopes.declare(name);
                Ok(None)
            }
            IdentifierRole::Name | IdentifierRole::Receiver => Ok(None),
            IdentifierRole::Read if scopes.is_bound(name) => Ok(None),
            IdentifierRole::Read => Ok(Some(CandidateReference {
                shape: ReferenceShape::Call,
                name: name.to_string(),
                qualifier: None,
                arguments: None,
                span: SourceSpan::of(node, self.source),
                source_text: name.to_string(),
            })),
        }
    }

    /// Backtick or `%x` literal; each interpolation becomes one argument.
    fn process_subshell(&self, node: Node<'a>) -> Result<CandidateReference, TraversalError> {
        let mut segments = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "interpolation" {
                segments.push(self.interpolation_text(child)?);
            }
        }

        Ok(CandidateReference {
            shape: ReferenceShape::InlineExecution,
            name: XSTRING_NAME.to_string(),
            qualifier: None,
            arguments: if segments.is_empty() { None } else { Some(segments) },
            span: SourceSpan::of(node, self.source),
            source_text: self.text(node)?.to_string(),
        })
    }

    fn argument_texts(&self, list: Node<'a>) -> Result<Option<Vec<String>>, TraversalError> {
        let args = named_children_without_comments(list);
        if args.is_empty() {
            return Ok(None);
        }
        args.into_iter()
            .map(|arg| self.text(arg).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Source of the expression inside `#{...}`, without the delimiters.
    fn interpolation_text(&self, node: Node<'a>) -> Result<String, TraversalError> {
        let inner = named_children_without_comments(node);
        match (inner.first(), inner.last()) {
            (Some(first), Some(last)) => self.span(*first, *last).map(str::to_string),
            _ => Ok(String::new()),
        }
    }

    fn text(&self, node: Node<'a>) -> Result<&'a str, TraversalError> {
        safe_node_text(node, self.source)
            .ok_or_else(|| TraversalError::at(node, format!("{} node is not valid UTF-8", node.kind())))
    }

    fn span(&self, first: Node<'a>, last: Node<'a>) -> Result<&'a str, TraversalError> {
        span_text(first, last, self.source)
            .ok_or_else(|| TraversalError::at(first, format!("{} node is not valid UTF-8", first.kind())))
    }
}
