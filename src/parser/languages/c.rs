//! C scanner configuration.
//!
//! C declarations have no introducing keyword, so functions and variables
//! are recognized by a type followed by a name. The type prefix is checked
//! against statement keywords so that `return f(x);` is not a function.

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Captures;

use crate::config::Limits;
use crate::lang::Language;
use crate::model::DeclarationKind;
use crate::parser::collector::{AttributeStyle, DocStyle};
use crate::parser::engine::{name_group, Body, DeclPattern, PatternScanner, ScannerConfig};
use crate::parser::imports;
use crate::parser::lexer::{is_ident_char, StringRule, Syntax};
use crate::parser::resolver::{BlockStyle, Terminator};
use crate::parser::{Registry, Scanner};

static SYNTAX: Syntax = Syntax {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_comments: false,
    strings: &[StringRule::Quoted {
        open: "\"",
        close: "\"",
        escapes: true,
        multiline: false,
    }],
    char_literals: true,
    hash_attributes: false,
};

pub(super) const DOCS: DocStyle = DocStyle {
    line_prefixes: &["///"],
    block: Some(("/**", "*/")),
    body_string: false,
    preceding_string: false,
};

/// Words that start statements, never a declaration's type.
pub(super) static STATEMENT_WORDS: phf::Set<&'static str> = phf_set! {
    "return", "else", "case", "new", "delete", "throw", "goto", "sizeof", "typedef", "using",
    "co_return", "co_yield", "co_await", "if", "while", "for", "switch", "do", "yield", "await",
    "assert", "throws",
};

static MODIFIERS: phf::Set<&'static str> = phf_set! {
    "static", "inline", "extern", "const", "volatile", "register",
};

pub(super) static RESERVED: phf::Set<&'static str> = phf_set! {
    "if", "while", "for", "switch", "return", "sizeof", "do", "else", "case", "goto", "break",
    "continue", "default", "typedef", "struct", "union", "enum",
};

pub(super) const MACRO: &str = r"^\s*#\s*define\s+(?P<name>[A-Za-z_]\w*)";

pub(super) const TYPEDEF: &str = r"^\s*typedef\b(?P<body>[^;{]*);";

lazy_static! {
    /// Pattern order: macro, struct, union, enum, typedef, function,
    /// constant, variable.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(DeclarationKind::Macro, MACRO, Body::Line),
        DeclPattern::new(
            DeclarationKind::Struct,
            r"^\s*(?:typedef\s+)?struct\s+(?P<name>[A-Za-z_]\w*)\s*(?:\{|$)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Struct,
            r"^\s*(?:typedef\s+)?union\s+(?P<name>[A-Za-z_]\w*)\s*(?:\{|$)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Enum,
            r"^\s*(?:typedef\s+)?enum\s+(?P<name>[A-Za-z_]\w*)\s*(?:\{|$)",
            Body::Block,
        ),
        DeclPattern::new(DeclarationKind::TypeAlias, TYPEDEF, Body::Statement).with_extractor(typedef_name),
        DeclPattern::new(
            DeclarationKind::Function,
            r"^\s*(?P<ret>(?:[A-Za-z_]\w*[\s\*]+)+?)(?P<name>[A-Za-z_]\w*)\s*\(",
            Body::Block,
        )
        .with_extractor(typed_name),
        DeclPattern::new(
            DeclarationKind::Constant,
            r"^\s*(?P<ret>(?:[A-Za-z_]\w*[\s\*]+)*?const\b[\s\*]+(?:[A-Za-z_]\w*[\s\*]+)*?)(?P<name>[A-Za-z_]\w*)\s*(?:\[[^\]]*\]\s*)*=",
            Body::Statement,
        )
        .with_extractor(typed_name),
        DeclPattern::new(
            DeclarationKind::Variable,
            r"^\s*(?P<ret>(?:[A-Za-z_]\w*[\s\*]+)+?)(?P<name>[A-Za-z_]\w*)\s*(?:\[[^\]]*\]\s*)*[=;,]",
            Body::Statement,
        )
        .with_extractor(typed_name),
    ];
}

/// Accept a `ret name` match unless the type slot holds a statement keyword.
pub(super) fn typed_name(caps: &Captures) -> Option<String> {
    let ret = caps.name("ret").map(|m| m.as_str()).unwrap_or("");
    let first = ret.split(|c: char| !is_ident_char(c)).find(|w| !w.is_empty());
    if first.map(|w| STATEMENT_WORDS.contains(w)).unwrap_or(false) {
        return None;
    }
    name_group(caps)
}

/// Name declared by a one-line typedef: the identifier inside `(*name)` for
/// function pointers, otherwise the last identifier.
pub(super) fn typedef_name(caps: &Captures) -> Option<String> {
    let body = caps.name("body")?.as_str();
    let tail = match body.find("(*") {
        Some(pos) => {
            let rest = &body[pos + 2..];
            let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
            return Some(rest[..end].to_string()).filter(|n| !n.is_empty());
        }
        None => body.trim_end(),
    };
    let start = tail
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map(|(i, _)| i)?;
    Some(tail[start..].to_string())
}

/// Create a new C scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::C,
            syntax: &SYNTAX,
            block: BlockStyle::Braces { open: '{', close: '}' },
            terminator: Terminator::Semicolon,
            patterns: &PATTERNS,
            docs: DOCS,
            attributes: AttributeStyle::None,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: false,
            imports: imports::c_family,
        },
        limits,
    ))
}

/// Register the C scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::C, new_scanner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ScanOutput;

    fn scan(source: &str) -> ScanOutput {
        new_scanner(&Limits::default()).scan(source)
    }

    #[test]
    fn test_c_declarations() {
        let source = r#"#include <stdio.h>
#include "point.h"

#define MAX(a, b) ((a) > (b) ? (a) : (b))

/** A 2D point. */
struct point {
    int x;
    int y;
};

typedef unsigned long size_type;
typedef int (*compare_fn)(const void *, const void *);

enum color { RED, GREEN };

static const int limit = 10;

int area(struct point *p);

/// Entry point.
int main(int argc,
         char **argv)
{
    char c = '}';
    return area(NULL);
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
                ("MAX", DeclarationKind::Macro, 4, 4),
                ("point", DeclarationKind::Struct, 7, 10),
                ("size_type", DeclarationKind::TypeAlias, 12, 12),
                ("compare_fn", DeclarationKind::TypeAlias, 13, 13),
                ("color", DeclarationKind::Enum, 15, 15),
                ("limit", DeclarationKind::Constant, 17, 17),
                ("area", DeclarationKind::Function, 19, 19),
                ("main", DeclarationKind::Function, 22, 27),
            ]
        );

        let point = &out.declarations[1];
        assert_eq!(point.docstring.as_deref(), Some("A 2D point."));
        let fields: Vec<&str> = point.children.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(fields, vec!["x", "y"]);

        let limit = &out.declarations[5];
        assert!(limit.modifiers.contains("static"));
        assert!(limit.modifiers.contains("const"));

        assert_eq!(out.declarations[7].docstring.as_deref(), Some("Entry point."));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_statements_are_not_declarations() {
        let out = scan("struct s {\n    return x;\n    else y;\n    int z;\n};\n");
        let fields: Vec<&str> = out.declarations[0].children.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(fields, vec!["z"]);
    }
}
