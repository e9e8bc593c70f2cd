//! Python scanner configuration.
//!
//! Bodies are indentation-delimited. Decorators become modifiers and the
//! docstring is the string literal that opens a class or function body.

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
    block_comment: None,
    nested_comments: false,
    strings: &[
        StringRule::Quoted {
            open: "\"\"\"",
            close: "\"\"\"",
            escapes: true,
            multiline: true,
        },
        StringRule::Quoted {
            open: "'''",
            close: "'''",
            escapes: true,
            multiline: true,
        },
        StringRule::Quoted {
            open: "\"",
            close: "\"",
            escapes: true,
            multiline: false,
        },
        StringRule::Quoted {
            open: "'",
            close: "'",
            escapes: true,
            multiline: false,
        },
    ],
    char_literals: false,
    hash_attributes: false,
};

static MODIFIERS: phf::Set<&'static str> = phf_set! {
    "async",
};

static RESERVED: phf::Set<&'static str> = phf_set! {
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise",
    "return", "try", "while", "with", "yield", "self", "cls",
};

lazy_static! {
    /// Pattern order: class, function, constant, variable.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(
            DeclarationKind::Class,
            r"^\s*class\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Function,
            r"^\s*(?:async\s+)?def\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            r"^\s*(?P<name>[A-Z][A-Z0-9_]*)\s*(?::[^=]+)?=[^=]",
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Variable,
            r"^\s*(?P<name>[A-Za-z_]\w*)\s*(?::[^=]+)?=[^=]",
            Body::Statement,
        ),
    ];
}

/// Create a new Python scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::Python,
            syntax: &SYNTAX,
            block: BlockStyle::Indent,
            terminator: Terminator::Newline,
            patterns: &PATTERNS,
            docs: DocStyle {
                line_prefixes: &[],
                block: None,
                body_string: true,
                preceding_string: false,
            },
            attributes: AttributeStyle::At,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: true,
            imports: imports::python,
        },
        limits,
    ))
}

/// Register the Python scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::Python, new_scanner);
}
