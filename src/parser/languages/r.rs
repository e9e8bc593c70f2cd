//! R scanner configuration.
//!
//! R has no declaration keywords; functions and classes are assignments whose
//! right-hand side is `function(...)`, `setClass(...)` or an R6 generator.

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
            open: "\"",
            close: "\"",
            escapes: true,
            multiline: true,
        },
        StringRule::Quoted {
            open: "'",
            close: "'",
            escapes: true,
            multiline: true,
        },
        StringRule::Quoted {
            open: "`",
            close: "`",
            escapes: false,
            multiline: false,
        },
    ],
    char_literals: false,
    hash_attributes: false,
};

static MODIFIERS: phf::Set<&'static str> = phf_set! {};

static RESERVED: phf::Set<&'static str> = phf_set! {
    "if", "else", "repeat", "while", "function", "for", "next", "break", "in",
    "TRUE", "FALSE", "NULL", "Inf", "NaN", "NA",
};

/// An R identifier; dots are ordinary name characters.
const NAME: &str = r"[A-Za-z.][\w.]*";

lazy_static! {
    /// Pattern order: function, S4 class, R6 class, S4 generic, S4 method,
    /// constant, variable. Plain assignments are only taken at column zero.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(
            DeclarationKind::Function,
            &format!(r"^\s*(?P<name>{})\s*(?:<<?-|=)\s*(?:function|\\)\s*\(", NAME),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Class,
            &format!(r#"^\s*(?:{}\s*(?:<-|=)\s*)?set(?:Ref)?Class\s*\(\s*(?:Class\s*=\s*)?["'](?P<name>{})["']"#, NAME, NAME),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Class,
            &format!(r"^(?P<name>{})\s*(?:<-|=)\s*(?:R6::)?R6Class\s*\(", NAME),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Function,
            &format!(r#"^\s*setGeneric\s*\(\s*(?:name\s*=\s*)?["'](?P<name>{})["']"#, NAME),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Method,
            &format!(r#"^\s*setMethod\s*\(\s*(?:f\s*=\s*)?["'](?P<name>{})["']"#, NAME),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            r"^(?P<name>[A-Z][A-Z0-9_.]*)\s*(?:<<?-|=[^=])",
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Variable,
            &format!(r"^(?P<name>{})\s*(?:<<?-|=[^=])", NAME),
            Body::Statement,
        ),
    ];
}

/// Create a new R scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::R,
            syntax: &SYNTAX,
            block: BlockStyle::Braces { open: '{', close: '}' },
            terminator: Terminator::Newline,
            patterns: &PATTERNS,
            docs: DocStyle {
                line_prefixes: &["#'"],
                block: None,
                body_string: false,
                preceding_string: false,
            },
            attributes: AttributeStyle::None,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: true,
            imports: imports::r,
        },
        limits,
    ))
}

/// Register the R scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::R, new_scanner);
}
