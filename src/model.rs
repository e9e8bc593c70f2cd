//! Declaration records produced by every scanner.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lang::Language;

/// Kind of declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Function,
    Method,
    Class,
    Struct,
    Enum,
    Trait,
    Interface,
    Impl,
    Module,
    Namespace,
    Constant,
    Variable,
    Macro,
    Import,
    Property,
    Package,
    TypeAlias,
}

impl DeclarationKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Method => "method",
            DeclarationKind::Class => "class",
            DeclarationKind::Struct => "struct",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Trait => "trait",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Impl => "impl",
            DeclarationKind::Module => "module",
            DeclarationKind::Namespace => "namespace",
            DeclarationKind::Constant => "constant",
            DeclarationKind::Variable => "variable",
            DeclarationKind::Macro => "macro",
            DeclarationKind::Import => "import",
            DeclarationKind::Property => "property",
            DeclarationKind::Package => "package",
            DeclarationKind::TypeAlias => "type_alias",
        }
    }

    /// Parse a kind from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "function" => Some(DeclarationKind::Function),
            "method" => Some(DeclarationKind::Method),
            "class" => Some(DeclarationKind::Class),
            "struct" => Some(DeclarationKind::Struct),
            "enum" => Some(DeclarationKind::Enum),
            "trait" => Some(DeclarationKind::Trait),
            "interface" => Some(DeclarationKind::Interface),
            "impl" => Some(DeclarationKind::Impl),
            "module" => Some(DeclarationKind::Module),
            "namespace" => Some(DeclarationKind::Namespace),
            "constant" => Some(DeclarationKind::Constant),
            "variable" => Some(DeclarationKind::Variable),
            "macro" => Some(DeclarationKind::Macro),
            "import" => Some(DeclarationKind::Import),
            "property" => Some(DeclarationKind::Property),
            "package" => Some(DeclarationKind::Package),
            "type_alias" => Some(DeclarationKind::TypeAlias),
            _ => None,
        }
    }

    /// Check if this kind owns an interior that is scanned for children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Class
                | DeclarationKind::Struct
                | DeclarationKind::Enum
                | DeclarationKind::Trait
                | DeclarationKind::Interface
                | DeclarationKind::Impl
                | DeclarationKind::Module
                | DeclarationKind::Namespace
        )
    }

    /// Check if this is a callable (function or method).
    pub fn is_callable(&self) -> bool {
        matches!(self, DeclarationKind::Function | DeclarationKind::Method)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declaration extracted from source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// The kind of declaration.
    pub kind: DeclarationKind,
    /// The declaration name.
    pub name: String,
    /// First line (1-indexed).
    pub start_line: usize,
    /// Last line (1-indexed, inclusive).
    pub end_line: usize,
    /// Modifiers, attributes and decorators.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: BTreeSet<String>,
    /// Attached documentation comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Nested declarations, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Declaration>,
}

impl Declaration {
    /// Create a declaration.
    ///
    /// Returns `None` for a blank name. An `end_line` before `start_line` is
    /// raised to `start_line`.
    pub fn new(kind: DeclarationKind, name: &str, start_line: usize, end_line: usize) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let start_line = start_line.max(1);
        Some(Self {
            kind,
            name: name.to_string(),
            start_line,
            end_line: end_line.max(start_line),
            modifiers: BTreeSet::new(),
            docstring: None,
            children: Vec::new(),
        })
    }

    /// Set the docstring, ignoring blank text.
    pub fn with_docstring(mut self, docstring: Option<String>) -> Self {
        self.docstring = docstring.filter(|d| !d.trim().is_empty());
        self
    }

    /// Add modifiers.
    pub fn with_modifiers<I: IntoIterator<Item = String>>(mut self, modifiers: I) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    /// Number of lines covered.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// Check whether `other`'s range lies within this declaration's range.
    pub fn contains(&self, other: &Declaration) -> bool {
        other.start_line >= self.start_line && other.end_line <= self.end_line
    }

    /// Count this declaration and all of its descendants.
    pub fn total_count(&self) -> usize {
        1 + self.children.iter().map(Declaration::total_count).sum::<usize>()
    }

    /// Depth of the subtree rooted here (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Declaration::depth).max().unwrap_or(0)
    }

    /// Iterate over this declaration and all descendants, depth-first.
    pub fn walk(&self) -> Vec<&Declaration> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

/// All scan results for a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    /// File path as given by the caller.
    pub file_path: String,
    /// Language the file was scanned as.
    pub language: Language,
    /// Raw file content.
    #[serde(skip)]
    pub content: String,
    /// Top-level declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Referenced modules, deduplicated in first-seen order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Error reported for this file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Ceilings hit while scanning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ParsedFile {
    /// Create an empty result for a file.
    pub fn empty(file_path: &str, language: Language) -> Self {
        Self {
            file_path: file_path.to_string(),
            language,
            content: String::new(),
            declarations: Vec::new(),
            imports: Vec::new(),
            error: None,
            warnings: Vec::new(),
        }
    }

    /// Count all declarations including nested ones.
    pub fn total_declarations(&self) -> usize {
        self.declarations.iter().map(Declaration::total_count).sum()
    }

    /// Maximum nesting depth of the declaration tree.
    pub fn max_depth(&self) -> usize {
        self.declarations.iter().map(Declaration::depth).max().unwrap_or(0)
    }

    /// Find a declaration by name anywhere in the tree.
    pub fn find(&self, name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .flat_map(Declaration::walk)
            .find(|d| d.name == name)
    }

    /// Find declarations by kind anywhere in the tree.
    pub fn declarations_by_kind(&self, kind: DeclarationKind) -> Vec<&Declaration> {
        self.declarations
            .iter()
            .flat_map(Declaration::walk)
            .filter(|d| d.kind == kind)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_blank_name() {
        assert!(Declaration::new(DeclarationKind::Function, "  ", 1, 1).is_none());
    }

    #[test]
    fn test_new_clamps_end_line() {
        let decl = Declaration::new(DeclarationKind::Struct, "Point", 5, 2).unwrap();
        assert_eq!(decl.start_line, 5);
        assert_eq!(decl.end_line, 5);
        assert_eq!(decl.line_count(), 1);
    }

    #[test]
    fn test_kind_round_trip_names() {
        for kind in [
            DeclarationKind::Function,
            DeclarationKind::TypeAlias,
            DeclarationKind::Namespace,
        ] {
            assert_eq!(DeclarationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DeclarationKind::parse("closure"), None);
    }

    #[test]
    fn test_tree_counts() {
        let mut class = Declaration::new(DeclarationKind::Class, "Foo", 1, 10).unwrap();
        let mut inner = Declaration::new(DeclarationKind::Class, "Inner", 2, 8).unwrap();
        inner
            .children
            .push(Declaration::new(DeclarationKind::Function, "bar", 3, 4).unwrap());
        class.children.push(inner);

        assert_eq!(class.total_count(), 3);
        assert_eq!(class.depth(), 3);
        assert!(class.contains(&class.children[0]));

        let mut file = ParsedFile::empty("a.py", Language::Python);
        file.declarations.push(class);
        assert_eq!(file.total_declarations(), 3);
        assert_eq!(file.find("bar").map(|d| d.start_line), Some(3));
        assert_eq!(file.declarations_by_kind(DeclarationKind::Class).len(), 2);
    }
}
