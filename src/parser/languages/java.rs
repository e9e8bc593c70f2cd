//! Java scanner configuration.

use lazy_static::lazy_static;
use phf::phf_set;

use super::c::typed_name;
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
            open: "\"\"\"",
            close: "\"\"\"",
            escapes: true,
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

static MODIFIERS: phf::Set<&'static str> = phf_set! {
    "public", "private", "protected", "static", "final", "abstract", "synchronized", "native",
    "default", "sealed", "transient", "volatile", "strictfp",
};

static RESERVED: phf::Set<&'static str> = phf_set! {
    "if", "for", "while", "switch", "catch", "return", "new", "throw", "else", "do", "try",
    "synchronized", "super", "this", "case", "yield", "assert",
};

/// Leading annotations written on the declaration line.
const ANNOTATIONS: &str = r"(?:@[\w.]+(?:\([^)]*\))?\s+)*";

const MODS: &str = r"(?:(?:public|private|protected|static|final|abstract|sealed|non-sealed|strictfp|default|synchronized|native|transient|volatile)\s+)*";

/// A type: generic arguments, arrays and varargs included.
const TYPE: &str = r"[\w$][\w$<>\[\],.? ]*?";

lazy_static! {
    /// Pattern order: package, annotation type, class, interface, enum,
    /// record, constant, method, enum constant, constructor, field.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(
            DeclarationKind::Package,
            r"^\s*package\s+(?P<name>[\w.]+)",
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Interface,
            &format!(r"^\s*{}{}@interface\s+(?P<name>[A-Za-z_$][\w$]*)", ANNOTATIONS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Class,
            &format!(r"^\s*{}{}class\s+(?P<name>[A-Za-z_$][\w$]*)", ANNOTATIONS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Interface,
            &format!(r"^\s*{}{}interface\s+(?P<name>[A-Za-z_$][\w$]*)", ANNOTATIONS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Enum,
            &format!(r"^\s*{}{}enum\s+(?P<name>[A-Za-z_$][\w$]*)", ANNOTATIONS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Class,
            &format!(r"^\s*{}{}record\s+(?P<name>[A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\(", ANNOTATIONS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            &format!(
                r"^\s*{}(?:(?:public|private|protected)\s+)?(?:static\s+final|final\s+static)\s+(?P<ret>{})\s+(?P<name>[A-Za-z_$][\w$]*)\s*[=;]",
                ANNOTATIONS, TYPE
            ),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Method,
            &format!(
                r"^\s*{}{}(?:<[^>]*>\s+)?(?P<ret>{})\s+(?P<name>[A-Za-z_$][\w$]*)\s*\(",
                ANNOTATIONS, MODS, TYPE
            ),
            Body::Block,
        )
        .with_extractor(typed_name),
        DeclPattern::new(
            DeclarationKind::Constant,
            r"^\s+(?P<name>[A-Z][A-Z0-9_]*)\s*(?:\(|,|;|\{|$)",
            Body::Line,
        ),
        DeclPattern::new(
            DeclarationKind::Method,
            &format!(
                r"^\s+{}(?:(?:public|private|protected)\s+)?(?P<name>[A-Z][\w$]*)\s*\(",
                ANNOTATIONS
            ),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Property,
            &format!(
                r"^\s+{}{}(?P<ret>{})\s+(?P<name>[A-Za-z_$][\w$]*)\s*(?:\[\s*\]\s*)*[=;,]",
                ANNOTATIONS, MODS, TYPE
            ),
            Body::Statement,
        )
        .with_extractor(typed_name),
    ];
}

/// Create a new Java scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::Java,
            syntax: &SYNTAX,
            block: BlockStyle::Braces { open: '{', close: '}' },
            terminator: Terminator::Semicolon,
            patterns: &PATTERNS,
            docs: DocStyle {
                line_prefixes: &[],
                block: Some(("/**", "*/")),
                body_string: false,
                preceding_string: false,
            },
            attributes: AttributeStyle::At,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: false,
            imports: imports::java,
        },
        limits,
    ))
}

/// Register the Java scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::Java, new_scanner);
}
