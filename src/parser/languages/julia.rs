//! Julia scanner configuration.
//!
//! Bodies close with `end`. Documentation is the triple-quoted string placed
//! directly above a declaration.

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
    line_comments: &["#"],
    block_comment: Some(("#=", "=#")),
    nested_comments: true,
    strings: &[
        StringRule::Quoted {
            open: "\"\"\"",
            close: "\"\"\"",
            escapes: true,
            multiline: true,
        },
        StringRule::Quoted {
            open: "\"",
            close: "\"",
            escapes: true,
            multiline: true,
        },
    ],
    char_literals: true,
    hash_attributes: false,
};

static MODIFIERS: phf::Set<&'static str> = phf_set! {
    "mutable", "abstract", "primitive", "baremodule",
};

static RESERVED: phf::Set<&'static str> = phf_set! {
    "end", "if", "elseif", "else", "for", "while", "begin", "let", "return", "try", "catch",
    "do", "quote", "function", "macro", "struct", "module",
};

/// Leading macro calls such as `@inline` on the declaration line.
const MACROS: &str = r"(?:@[\w.]+\s+)*";

lazy_static! {
    /// Pattern order: module, struct, abstract type, primitive type, macro,
    /// function, short-form function, constant.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(
            DeclarationKind::Module,
            r"^\s*(?:bare)?module\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Struct,
            &format!(r"^\s*{}(?:mutable\s+)?struct\s+(?P<name>[A-Za-z_]\w*)", MACROS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::TypeAlias,
            r"^\s*abstract\s+type\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::TypeAlias,
            r"^\s*primitive\s+type\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Macro,
            r"^\s*macro\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Function,
            &format!(r"^\s*{}function\s+(?P<name>[A-Za-z_][\w.]*!?)", MACROS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Function,
            &format!(
                r"^\s*{}(?P<name>[A-Za-z_][\w.]*!?)\s*(?:\{{[^}}]*\}})?\([^=]*\)\s*(?:::\s*\S+\s*)?(?:where\s+.*)?=[^=>]",
                MACROS
            ),
            Body::Line,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            r"^\s*const\s+(?P<name>[A-Za-z_]\w*)",
            Body::Statement,
        ),
    ];
}

/// Create a new Julia scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::Julia,
            syntax: &SYNTAX,
            block: BlockStyle::Keyword,
            terminator: Terminator::Newline,
            patterns: &PATTERNS,
            docs: DocStyle {
                line_prefixes: &[],
                block: None,
                body_string: false,
                preceding_string: true,
            },
            attributes: AttributeStyle::At,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: true,
            imports: imports::julia,
        },
        limits,
    ))
}

/// Register the Julia scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::Julia, new_scanner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Declaration;
    use crate::parser::ScanOutput;

    fn scan(source: &str) -> ScanOutput {
        new_scanner(&Limits::default()).scan(source)
    }

    fn spans(decls: &[Declaration]) -> Vec<(&str, DeclarationKind, usize, usize)> {
        decls
            .iter()
            .map(|d| (d.name.as_str(), d.kind, d.start_line, d.end_line))
            .collect()
    }

    #[test]
    fn test_julia_declarations() {
        let source = r#"module Geometry

export area

const SCALE = 2.0

"""
    Point(x, y)

A point.
"""
mutable struct Point
    x::Float64
    y::Float64
end

abstract type Shape end

function area(p::Point)
    if p.x > 0
        return p.x * p.y
    end
    xs = [i for i in 1:3][end]
    return 0.0
end

norm(p::Point) = sqrt(p.x^2 + p.y^2)

macro twice(ex)
    quote
        $(esc(ex)); $(esc(ex))
    end
end

end # module
"#;
        let out = scan(source);
        assert_eq!(spans(&out.declarations), vec![("Geometry", DeclarationKind::Module, 1, 35)]);

        let module = &out.declarations[0];
        assert_eq!(
            spans(&module.children),
            vec![
                ("SCALE", DeclarationKind::Constant, 5, 5),
                ("Point", DeclarationKind::Struct, 12, 15),
                ("Shape", DeclarationKind::TypeAlias, 17, 17),
                ("area", DeclarationKind::Function, 19, 25),
                ("norm", DeclarationKind::Function, 27, 27),
                ("twice", DeclarationKind::Macro, 29, 33),
            ]
        );

        let point = &module.children[1];
        assert_eq!(point.docstring.as_deref(), Some("Point(x, y)\n\nA point."));
        assert!(point.modifiers.contains("mutable"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_comparison_is_not_a_definition() {
        let out = scan("f(x) == 3\ng(x) = x + 1\n");
        let names: Vec<&str> = out.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["g"]);
    }
}
