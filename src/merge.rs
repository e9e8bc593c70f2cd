//! Reconciling two declaration lists for the same file.
//!
//! Used when a second extractor (for example a grammar-based parser) has
//! produced its own tree. The primary list wins every conflict; the secondary
//! only contributes what the primary lacks.

use crate::model::Declaration;

/// Merge `secondary` into `primary`.
///
/// Declarations are the same when kind and name match and their line ranges
/// overlap. Matched pairs merge their children recursively and take a
/// missing docstring and modifiers from the secondary. Unmatched secondary
/// declarations are appended. The primary's ranges are kept, so a secondary
/// child that falls outside its matched parent and matches none of that
/// parent's children is dropped. The result is ordered by start line, then
/// name.
pub fn merge_declarations(primary: Vec<Declaration>, secondary: Vec<Declaration>) -> Vec<Declaration> {
    let mut merged = primary;
    for other in secondary {
        match merged.iter_mut().find(|d| same_declaration(d, &other)) {
            Some(existing) => absorb(existing, other),
            None => merged.push(other),
        }
    }
    merged.sort_by(|a, b| a.start_line.cmp(&b.start_line).then_with(|| a.name.cmp(&b.name)));
    merged
}

fn same_declaration(a: &Declaration, b: &Declaration) -> bool {
    a.kind == b.kind && a.name == b.name && a.start_line <= b.end_line && b.start_line <= a.end_line
}

fn absorb(target: &mut Declaration, other: Declaration) {
    if target.docstring.is_none() {
        target.docstring = other.docstring;
    }
    target.modifiers.extend(other.modifiers);
    let children = std::mem::take(&mut target.children);
    let (start, end) = (target.start_line, target.end_line);
    let incoming: Vec<Declaration> = other
        .children
        .into_iter()
        .filter(|c| (start <= c.start_line && c.end_line <= end) || children.iter().any(|d| same_declaration(d, c)))
        .collect();
    target.children = merge_declarations(children, incoming);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeclarationKind;

    fn decl(kind: DeclarationKind, name: &str, start: usize, end: usize) -> Declaration {
        Declaration::new(kind, name, start, end).unwrap()
    }

    #[test]
    fn test_primary_wins_and_fills_gaps() {
        let primary = vec![decl(DeclarationKind::Function, "run", 3, 10)];
        let secondary = vec![decl(DeclarationKind::Function, "run", 3, 12)
            .with_docstring(Some("Run it.".to_string()))
            .with_modifiers(vec!["async".to_string()])];

        let merged = merge_declarations(primary, secondary);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].end_line, 10);
        assert_eq!(merged[0].docstring.as_deref(), Some("Run it."));
        assert!(merged[0].modifiers.contains("async"));
    }

    #[test]
    fn test_existing_docstring_is_kept() {
        let primary = vec![decl(DeclarationKind::Class, "A", 1, 5).with_docstring(Some("mine".to_string()))];
        let secondary = vec![decl(DeclarationKind::Class, "A", 1, 5).with_docstring(Some("theirs".to_string()))];
        let merged = merge_declarations(primary, secondary);
        assert_eq!(merged[0].docstring.as_deref(), Some("mine"));
    }

    #[test]
    fn test_unmatched_are_appended_in_order() {
        let primary = vec![
            decl(DeclarationKind::Function, "b", 10, 12),
            decl(DeclarationKind::Function, "a", 1, 3),
        ];
        let secondary = vec![
            // different kind
            decl(DeclarationKind::Method, "a", 1, 3),
            // same name, disjoint lines
            decl(DeclarationKind::Function, "b", 20, 22),
            decl(DeclarationKind::Constant, "LIMIT", 5, 5),
        ];
        let merged = merge_declarations(primary, secondary);
        let order: Vec<(&str, DeclarationKind, usize)> =
            merged.iter().map(|d| (d.name.as_str(), d.kind, d.start_line)).collect();
        assert_eq!(
            order,
            vec![
                ("a", DeclarationKind::Function, 1),
                ("a", DeclarationKind::Method, 1),
                ("LIMIT", DeclarationKind::Constant, 5),
                ("b", DeclarationKind::Function, 10),
                ("b", DeclarationKind::Function, 20),
            ]
        );
    }

    #[test]
    fn test_children_merge_recursively() {
        let mut class = decl(DeclarationKind::Class, "Shape", 1, 20);
        class.children = vec![decl(DeclarationKind::Method, "area", 5, 8)];

        let mut other = decl(DeclarationKind::Class, "Shape", 1, 20);
        other.children = vec![
            decl(DeclarationKind::Method, "area", 5, 8).with_docstring(Some("Area.".to_string())),
            decl(DeclarationKind::Method, "name", 2, 3),
        ];

        let merged = merge_declarations(vec![class], vec![other]);
        let children = &merged[0].children;
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "name");
        assert_eq!(children[1].name, "area");
        assert_eq!(children[1].docstring.as_deref(), Some("Area."));
    }

    #[test]
    fn test_children_stay_inside_the_primary_range() {
        let mut narrow = decl(DeclarationKind::Class, "A", 1, 5);
        narrow.children = vec![decl(DeclarationKind::Method, "early", 2, 4)];

        let mut wide = decl(DeclarationKind::Class, "A", 1, 20);
        wide.children = vec![
            decl(DeclarationKind::Method, "early", 2, 4).with_docstring(Some("Early.".to_string())),
            decl(DeclarationKind::Method, "inside", 3, 4),
            decl(DeclarationKind::Method, "late", 10, 12),
        ];

        let merged = merge_declarations(vec![narrow], vec![wide]);
        let parent = &merged[0];
        assert_eq!((parent.start_line, parent.end_line), (1, 5));
        let names: Vec<&str> = parent.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["early", "inside"]);
        assert_eq!(parent.children[0].docstring.as_deref(), Some("Early."));
        for child in &parent.children {
            assert!(parent.contains(child));
        }
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_declarations(Vec::new(), Vec::new()).is_empty());
        let only = vec![decl(DeclarationKind::Module, "m", 1, 1)];
        assert_eq!(merge_declarations(Vec::new(), only.clone()), only);
        assert_eq!(merge_declarations(only.clone(), Vec::new()), only);
    }
}
