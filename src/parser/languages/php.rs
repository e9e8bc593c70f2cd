//! PHP scanner configuration.

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
    line_comments: &["//", "#"],
    block_comment: Some(("/*", "*/")),
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
    ],
    char_literals: false,
    hash_attributes: true,
};

static MODIFIERS: phf::Set<&'static str> = phf_set! {
    "public", "private", "protected", "static", "abstract", "final", "readonly",
};

static RESERVED: phf::Set<&'static str> = phf_set! {
    "if", "for", "foreach", "while", "switch", "return", "new", "echo", "print", "list",
    "array", "isset", "unset", "empty", "fn",
};

lazy_static! {
    /// Pattern order: namespace, class, interface, trait, enum, method,
    /// function, constant, `define` constant, property.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(
            DeclarationKind::Namespace,
            r"^\s*namespace\s+(?P<name>[\w\\]+)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Class,
            r"^\s*(?:(?:abstract|final|readonly)\s+)*class\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Interface,
            r"^\s*interface\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Trait,
            r"^\s*trait\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Enum,
            r"^\s*enum\s+(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Method,
            r"^\s*(?:(?:public|private|protected|static|abstract|final)\s+)+function\s+&?(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Function,
            r"^\s*function\s+&?(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            r"^\s*(?:(?:public|private|protected|final)\s+)*const\s+(?:[\w?]+\s+)?(?P<name>[A-Za-z_]\w*)\s*=",
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            r#"^\s*define\s*\(\s*['"](?P<name>[A-Za-z_]\w*)['"]"#,
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Property,
            r"^\s*(?:(?:public|private|protected|static|readonly|var)\s+)+(?:\??[\w\\|]+\s+)?\$(?P<name>[A-Za-z_]\w*)",
            Body::Statement,
        ),
    ];
}

/// Create a new PHP scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::Php,
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
            attributes: AttributeStyle::Hash,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: false,
            imports: imports::php,
        },
        limits,
    ))
}

/// Register the PHP scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::Php, new_scanner);
}
