use tree_sitter::Node;

/// Safe wrapper around node.utf8_text that handles encoding errors gracefully
pub fn safe_node_text<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
    node.utf8_text(source).ok()
}

/// Text of the bytes spanning `first` through `last` (inclusive of both nodes)
pub fn span_text<'a>(first: Node, last: Node, source: &'a [u8]) -> Option<&'a str> {
    let bytes = source.get(first.start_byte()..last.end_byte())?;
    std::str::from_utf8(bytes).ok()
}

/// Named children of a node, skipping comments
pub fn named_children_without_comments<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Find the first ERROR or MISSING node in document order
pub fn find_first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(find_first_error)
}

/// Get 1-indexed line range (start, end) for a node
pub fn get_line_range(node: Node) -> (usize, usize) {
    (node.start_position().row + 1, node.end_position().row + 1)
}

/// True when `child` is the node stored under `field_name` in `parent`
pub fn is_field(parent: Node, field_name: &str, child: Node) -> bool {
    parent.child_by_field_name(field_name) == Some(child)
}

/// Extract text content from a named field, falling back to empty string
pub fn extract_field_text(node: Node, field_name: &str, source: &[u8]) -> String {
    node.child_by_field_name(field_name)
        .and_then(|n| safe_node_text(n, source))
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_ruby::language()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_line_range_is_one_indexed() {
        let source = "\nputs(1)\n";
        let tree = parse(source);
        let call = tree.root_node().named_child(0).unwrap();
        assert_eq!(call.kind(), "call");
        assert_eq!(get_line_range(call), (2, 2));
    }

    #[test]
    fn test_comments_are_not_arguments() {
        let source = "foo(1, # first\n  2)\n";
        let tree = parse(source);
        let call = tree.root_node().named_child(0).unwrap();
        let args = call.child_by_field_name("arguments").unwrap();
        let texts: Vec<_> = named_children_without_comments(args)
            .into_iter()
            .map(|n| safe_node_text(n, source.as_bytes()).unwrap())
            .collect();
        assert_eq!(texts, vec!["1", "2"]);
    }

    #[test]
    fn test_find_first_error() {
        let valid = parse("def ok\n  1\nend\n");
        assert!(find_first_error(valid.root_node()).is_none());

        let broken = parse("def broken(\n  )))\n");
        let error = find_first_error(broken.root_node()).expect("should locate the syntax error");
        assert!(error.is_error() || error.is_missing());
    }

    #[test]
    fn test_is_field() {
        let tree = parse("x = y\n");
        let assignment = tree.root_node().named_child(0).unwrap();
        assert_eq!(assignment.kind(), "assignment");
        let left = assignment.child_by_field_name("left").unwrap();
        let right = assignment.child_by_field_name("right").unwrap();
        assert!(is_field(assignment, "left", left));
        assert!(!is_field(assignment, "left", right));
    }

    #[test]
    fn test_extract_field_text() {
        let source = "def greet(name)\nend\n";
        let tree = parse(source);
        let method = tree.root_node().named_child(0).unwrap();
        assert_eq!(method.kind(), "method");
        assert_eq!(extract_field_text(method, "name", source.as_bytes()), "greet");
        assert_eq!(extract_field_text(method, "no_such_field", source.as_bytes()), "");
    }
}
