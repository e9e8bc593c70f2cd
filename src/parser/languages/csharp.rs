//! C# scanner configuration.

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
            escapes: false,
            multiline: true,
        },
        StringRule::Quoted {
            open: "$@\"",
            close: "\"",
            escapes: false,
            multiline: true,
        },
        StringRule::Quoted {
            open: "@$\"",
            close: "\"",
            escapes: false,
            multiline: true,
        },
        StringRule::Quoted {
            open: "@\"",
            close: "\"",
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

static MODIFIERS: phf::Set<&'static str> = phf_set! {
    "public", "private", "protected", "internal", "static", "readonly", "const", "abstract",
    "virtual", "override", "sealed", "async", "partial", "extern", "unsafe", "new", "volatile",
    "required", "file",
};

static RESERVED: phf::Set<&'static str> = phf_set! {
    "if", "for", "foreach", "while", "switch", "catch", "return", "new", "throw", "else", "do",
    "try", "using", "lock", "fixed", "base", "this", "get", "set", "init", "add", "remove",
    "where", "when", "case",
};

/// Attributes written on the declaration line.
const ATTRS: &str = r"(?:\[[^\]]*\]\s*)*";

const MODS: &str = r"(?:(?:public|private|protected|internal|static|readonly|abstract|virtual|override|sealed|async|partial|extern|unsafe|new|volatile|required|file)\s+)*";

const TYPE: &str = r"[\w<>\[\],.?]+(?:\s*[\w<>\[\],.?]+)*?";

lazy_static! {
    /// Pattern order: namespace, class, struct, interface, enum, record,
    /// constant, method, constructor, property, field.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(
            DeclarationKind::Namespace,
            r"^\s*namespace\s+(?P<name>[\w.]+)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Class,
            &format!(r"^\s*{}{}class\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Struct,
            &format!(r"^\s*{}{}(?:ref\s+)?(?:record\s+)?struct\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Interface,
            &format!(r"^\s*{}{}interface\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Enum,
            &format!(r"^\s*{}{}enum\s+(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Class,
            &format!(r"^\s*{}{}record\s+(?:class\s+)?(?P<name>[A-Za-z_]\w*)", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            &format!(r"^\s*{}{}const\s+(?P<ret>{})\s+(?P<name>[A-Za-z_]\w*)\s*=", ATTRS, MODS, TYPE),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Method,
            &format!(
                r"^\s*{}{}(?P<ret>{})\s+(?P<name>[A-Za-z_]\w*)\s*(?:<[^>]*>)?\s*\(",
                ATTRS, MODS, TYPE
            ),
            Body::Block,
        )
        .with_extractor(typed_name),
        DeclPattern::new(
            DeclarationKind::Method,
            &format!(r"^\s+{}{}(?P<name>~?[A-Z]\w*)\s*\(", ATTRS, MODS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Property,
            &format!(
                r"^\s*{}{}(?P<ret>{})\s+(?P<name>[A-Za-z_]\w*)\s*(?:\{{|=>|$)",
                ATTRS, MODS, TYPE
            ),
            Body::Block,
        )
        .with_extractor(typed_name),
        DeclPattern::new(
            DeclarationKind::Variable,
            &format!(r"^\s*{}{}(?P<ret>{})\s+(?P<name>[A-Za-z_]\w*)\s*[=;,]", ATTRS, MODS, TYPE),
            Body::Statement,
        )
        .with_extractor(typed_name),
    ];
}

/// Create a new C# scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::CSharp,
            syntax: &SYNTAX,
            block: BlockStyle::Braces { open: '{', close: '}' },
            terminator: Terminator::Semicolon,
            patterns: &PATTERNS,
            docs: DocStyle {
                line_prefixes: &["///"],
                block: Some(("/**", "*/")),
                body_string: false,
                preceding_string: false,
            },
            attributes: AttributeStyle::Bracket,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: false,
            imports: imports::csharp,
        },
        limits,
    ))
}

/// Register the C# scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::CSharp, new_scanner);
}
