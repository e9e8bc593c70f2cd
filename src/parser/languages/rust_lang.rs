//! Rust scanner configuration.

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Captures;

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
            prefixes: &["br", "cr", "r"],
            min_hashes: 0,
            triple: false,
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
    "pub", "async", "const", "unsafe", "extern", "default", "static", "mut",
};

static RESERVED: phf::Set<&'static str> = phf_set! {
    "self", "Self", "super", "crate",
};

/// Visibility prefix, e.g. `pub`, `pub(crate)`.
const VIS: &str = r"^\s*(?:pub(?:\s*\([^)]*\))?\s+)?";

lazy_static! {
    /// Pattern order: macro, module, struct, union, enum, trait, impl,
    /// function, type alias, constant, static.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(
            DeclarationKind::Macro,
            r"^\s*macro_rules!\s*(?P<name>[A-Za-z_]\w*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Module,
            &format!(r"{}mod\s+(?P<name>[A-Za-z_]\w*)", VIS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Struct,
            &format!(r"{}struct\s+(?P<name>[A-Za-z_]\w*)", VIS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Struct,
            &format!(r"{}union\s+(?P<name>[A-Za-z_]\w*)\s*[<{{]", VIS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Enum,
            &format!(r"{}enum\s+(?P<name>[A-Za-z_]\w*)", VIS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Trait,
            &format!(r"{}(?:unsafe\s+)?(?:auto\s+)?trait\s+(?P<name>[A-Za-z_]\w*)", VIS),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Impl,
            r"^\s*(?:default\s+)?(?:unsafe\s+)?impl\b(?P<rest>.*)",
            Body::Block,
        )
        .with_extractor(impl_name),
        DeclPattern::new(
            DeclarationKind::Function,
            &format!(
                r#"{}(?:default\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+(?:"[^"]*"\s+)?)?fn\s+(?P<name>[A-Za-z_]\w*)"#,
                VIS
            ),
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::TypeAlias,
            &format!(r"{}type\s+(?P<name>[A-Za-z_]\w*)", VIS),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Constant,
            &format!(r"{}const\s+(?P<name>[A-Za-z_]\w*)\s*:", VIS),
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Variable,
            &format!(r"{}static\s+(?:mut\s+)?(?P<name>[A-Za-z_]\w*)\s*:", VIS),
            Body::Statement,
        ),
    ];
}

/// Remove every balanced `<...>` group, leaving `->` arrows alone.
fn strip_generics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut prev = ' ';
    for c in text.chars() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' && depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
        prev = c;
    }
    out
}

/// Name an impl block after its header: `Point`, or `Display for Point`.
fn impl_name(caps: &Captures) -> Option<String> {
    let rest = caps.name("rest")?.as_str();
    // impl<T> headers start with their generic parameters
    let rest = strip_generics(rest);
    let header = rest
        .split('{')
        .next()
        .unwrap_or("")
        .split(" where ")
        .next()
        .unwrap_or("");
    let header = header.trim().trim_end_matches("where").trim();
    let name = header.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() || !name.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '!' || c == '&' || c == ':') {
        return None;
    }
    Some(name)
}

/// Create a new Rust scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::Rust,
            syntax: &SYNTAX,
            block: BlockStyle::Braces { open: '{', close: '}' },
            terminator: Terminator::Semicolon,
            patterns: &PATTERNS,
            docs: DocStyle {
                line_prefixes: &["///", "//!"],
                block: Some(("/**", "*/")),
                body_string: false,
                preceding_string: false,
            },
            attributes: AttributeStyle::Hash,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: false,
            imports: imports::rust,
        },
        limits,
    ))
}

/// Register the Rust scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::Rust, new_scanner);
}
