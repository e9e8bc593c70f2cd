//! Go scanner configuration.
//!
//! Go has no doc-comment marker: the `//` lines directly above a declaration
//! are its documentation.

use lazy_static::lazy_static;
use phf::phf_set;

use crate::config::Limits;
use crate::lang::Language;
use crate::model::DeclarationKind;
use crate::parser::collector::{AttributeStyle, DocStyle};
use crate::parser::engine::{Body, DeclPattern, PatternScanner, ScannerConfig};
use crate::parser::imports;
use crate::parser::lexer::{StringRule, Syntax};
use crate::parser::resolver::{BlockStyle, Terminator};
use crate::parser::{Registry, Scanner};

static SYNTAX: Syntax = Syntax {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_comments: false,
    strings: &[
        StringRule::Quoted {
            open: "`",
            close: "`",
            escapes: false,
            multiline: true,
        },
        StringRule::Quoted {
            open: "\"",
            close: "\"",
            escapes: true,
            multiline: false,
        },
    ],
    char_literals: true,
    hash_attributes: false,
};

static MODIFIERS: phf::Set<&'static str> = phf_set! {};

static RESERVED: phf::Set<&'static str> = phf_set! {
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var", "_",
};

lazy_static! {
    /// Pattern order: method, function, struct, interface, other type,
    /// constant, variable, package, interface member.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(
            DeclarationKind::Method,
            r"^func\s*\([^)]*\)\s*(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Function,
            r"^func\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Struct,
            r"^\s*type\s+(?P<name>[A-Za-z_]\w*)(?:\[[^\]]*\])?\s+struct\b",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Interface,
            r"^\s*type\s+(?P<name>[A-Za-z_]\w*)(?:\[[^\]]*\])?\s+interface\b",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::TypeAlias,
            r"^\s*type\s+(?P<name>[A-Za-z_]\w*)",
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            r"^\s*const\s+(?P<name>[A-Za-z_]\w*)",
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Variable,
            r"^\s*var\s+(?P<name>[A-Za-z_]\w*)",
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Package,
            r"^package\s+(?P<name>[A-Za-z_]\w*)",
            Body::Line,
        ),
        DeclPattern::new(
            DeclarationKind::Method,
            r"^\s+(?P<name>[A-Za-z_]\w*)\s*\(",
            Body::Line,
        ),
    ];
}

/// Create a new Go scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::Go,
            syntax: &SYNTAX,
            block: BlockStyle::Braces { open: '{', close: '}' },
            terminator: Terminator::Newline,
            patterns: &PATTERNS,
            docs: DocStyle {
                line_prefixes: &["//"],
                block: None,
                body_string: false,
                preceding_string: false,
            },
            attributes: AttributeStyle::None,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: true,
            imports: imports::go,
        },
        limits,
    ))
}

/// Register the Go scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::Go, new_scanner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ScanOutput;

    fn scan(source: &str) -> ScanOutput {
        new_scanner(&Limits::default()).scan(source)
    }

    #[test]
    fn test_go_declarations() {
        let source = r#"// Package geo does geometry.
package geo

import (
    "fmt"
    "strings"
)

// Point is a location.
type Point struct {
    X, Y int
}

// Shape has an area.
type Shape interface {
    Area() float64
    Perimeter() float64
}

type Meters float64

const Pi = 3.14

var registry = map[string]int{
    "a": 1,
}

// Dist measures.
func (p *Point) Dist(q Point) float64 {
    s := "}"
    r := '}'
    return 0
}

func main() {
    fmt.Println(strings.ToUpper("x"))
}
"#;
        let out = scan(source);
        let spans: Vec<(&str, DeclarationKind, usize, usize)> = out
            .declarations
            .iter()
            .map(|d| (d.name.as_str(), d.kind, d.start_line, d.end_line))
            .collect();
        assert_eq!(
            spans,
            vec![
                ("geo", DeclarationKind::Package, 2, 2),
                ("Point", DeclarationKind::Struct, 10, 12),
                ("Shape", DeclarationKind::Interface, 15, 18),
                ("Meters", DeclarationKind::TypeAlias, 20, 20),
                ("Pi", DeclarationKind::Constant, 22, 22),
                ("registry", DeclarationKind::Variable, 24, 26),
                ("Dist", DeclarationKind::Method, 29, 33),
                ("main", DeclarationKind::Function, 35, 37),
            ]
        );

        assert_eq!(out.declarations[0].docstring.as_deref(), Some("Package geo does geometry."));
        assert_eq!(out.declarations[1].docstring.as_deref(), Some("Point is a location."));
        assert!(out.declarations[1].children.is_empty());

        let members: Vec<&str> = out.declarations[2].children.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(members, vec!["Area", "Perimeter"]);

        assert_eq!(out.declarations[6].docstring.as_deref(), Some("Dist measures."));
        assert_eq!(out.declarations[7].docstring, None);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_generic_types() {
        let out = scan("type Stack[T any] struct {\n    items []T\n}\n\ntype Number interface {\n    ~int | ~float64\n}\n");
        let names: Vec<&str> = out.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Stack", "Number"]);
        assert_eq!(out.declarations[0].end_line, 3);
        assert!(out.declarations[1].children.is_empty());
    }

    #[test]
    fn test_raw_string_hides_declarations() {
        let source = "var tmpl = `\nfunc fake() {\n}\n`\n\nfunc real() {}\n";
        let out = scan(source);
        let names: Vec<&str> = out.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["tmpl", "real"]);
        assert_eq!(out.declarations[0].end_line, 4);
    }
}
