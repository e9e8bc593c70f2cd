//! Swift scanner configuration.
//!
//! Protocols are reported as interfaces and extensions as impl blocks named
//! after the extended type.

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
    nested_comments: true,
    strings: &[
        StringRule::Hashed {
            prefixes: &[""],
            min_hashes: 1,
            triple: true,
        },
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
    char_literals: false,
    hash_attributes: false,
};

static MODIFIERS: phf::Set<&'static str> = phf_set! {
    "public", "private", "fileprivate", "internal", "open", "static", "class", "final",
    "override", "mutating", "nonmutating", "lazy", "weak", "unowned", "convenience",
    "required", "indirect", "nonisolated", "dynamic",
};

static RESERVED: phf::Set<&'static str> = phf_set! {
    "func", "var", "let", "if", "guard", "for", "while", "switch", "return", "case",
    "self", "Self", "super",
};

/// Inline attributes such as `@objc` or `@available(iOS 15, *)`.
const ATTRS: &str = r"(?:@\w+(?:\([^)]*\))?\s+)*";

const MODS: &str = r"(?:(?:public|private|fileprivate|internal|open|static|class|final|override|mutating|nonmutating|lazy|weak|unowned|convenience|required|indirect|nonisolated|dynamic)(?:\(set\))?\s+)*";

lazy_static! {
    /// Pattern order: class, actor, struct, enum, protocol, extension,
    /// function, initializer, subscript, type alias, enum case, constant,
    /// variable.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(
            DeclarationKind::Class,
            &format!(r"^\s*{}{}class\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Class,
            &format!(r"^\s*{}{}actor\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Struct,
            &format!(r"^\s*{}{}struct\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Enum,
            &format!(r"^\s*{}{}enum\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Interface,
            &format!(r"^\s*{}{}protocol\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Impl,
            &format!(r"^\s*{}{}extension\s+(?P<name>[A-Za-z_][\w.]*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Function,
            &format!(r"^\s*{}{}func\s+(?P<name>[A-Za-z_]\w*|[^\s(<\w]+)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Method,
            &format!(r"^\s*{}{}(?P<name>init|deinit)[?!]?\s*(?:<[^>]*>)?\s*[({{]", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Method,
            &format!(r"^\s*{}{}(?P<name>subscript)\s*[(<]", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::TypeAlias,
            &format!(r"^\s*{}{}typealias\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            r"^\s*(?:indirect\s+)?case\s+(?P<name>[A-Za-z_]\w*)",
            Body::Line,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            &format!(r"^\s*{}{}let\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Variable,
            &format!(r"^\s*{}{}var\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Statement,
        ),
    ];
}

/// Create a new Swift scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::Swift,
            syntax: &SYNTAX,
            block: BlockStyle::Braces { open: '{', close: '}' },
            terminator: Terminator::Newline,
            patterns: &PATTERNS,
            docs: DocStyle {
                line_prefixes: &["///"],
                block: Some(("/**", "*/")),
                body_string: false,
                preceding_string: false,
            },
            attributes: AttributeStyle::At,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: true,
            imports: imports::swift,
        },
        limits,
    ))
}

/// Register the Swift scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::Swift, new_scanner);
}
