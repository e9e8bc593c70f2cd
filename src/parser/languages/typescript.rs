//! TypeScript scanner configuration.
//!
//! Extends the JavaScript tables with interfaces, type aliases, enums,
//! namespaces and typed class members.

use lazy_static::lazy_static;
use phf::phf_set;

use super::javascript::{ARROW, CLASS, CONSTANT, DOCS, FUNCTION, METHOD, RESERVED, SYNTAX, VARIABLE};
use crate::config::Limits;
use crate::lang::Language;
use crate::model::DeclarationKind;
use crate::parser::collector::AttributeStyle;
use crate::parser::engine::{Body, DeclPattern, PatternScanner, ScannerConfig};
use crate::parser::imports;
use crate::parser::resolver::{BlockStyle, Terminator};
use crate::parser::{Registry, Scanner};

static MODIFIERS: phf::Set<&'static str> = phf_set! {
    "export", "default", "async", "static", "get", "set", "public", "private", "protected",
    "readonly", "abstract", "declare", "override", "const",
};

lazy_static! {
    /// Pattern order: class, interface, enum, namespace, type alias,
    /// function, arrow function, method, constant, variable, property.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(DeclarationKind::Class, CLASS, Body::Block),
        DeclPattern::new(
            DeclarationKind::Interface,
            r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?interface\s+(?P<name>[A-Za-z_$][\w$]*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Enum,
            r"^\s*(?:export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+(?P<name>[A-Za-z_$][\w$]*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Namespace,
            r#"^\s*(?:export\s+)?(?:declare\s+)?(?:namespace|module)\s+(?P<name>[A-Za-z_$][\w$.]*|"[^"]*"|'[^']*')"#,
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::TypeAlias,
            r"^\s*(?:export\s+)?(?:declare\s+)?type\s+(?P<name>[A-Za-z_$][\w$]*)\s*(?:<[^=]*>)?\s*=",
            Body::Statement,
        ),
        DeclPattern::new(DeclarationKind::Function, FUNCTION, Body::Block),
        DeclPattern::new(DeclarationKind::Function, ARROW, Body::Block),
        DeclPattern::new(DeclarationKind::Method, METHOD, Body::Block),
        DeclPattern::new(DeclarationKind::Constant, CONSTANT, Body::Statement),
        DeclPattern::new(DeclarationKind::Variable, VARIABLE, Body::Statement),
        DeclPattern::new(
            DeclarationKind::Property,
            r"^\s+(?:(?:public|private|protected|readonly|static|declare|override|abstract)\s+)*(?P<name>#?[A-Za-z_$][\w$]*)[?!]?\s*:",
            Body::Statement,
        ),
    ];
}

/// Create a new TypeScript scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::TypeScript,
            syntax: &SYNTAX,
            block: BlockStyle::Braces { open: '{', close: '}' },
            terminator: Terminator::Newline,
            patterns: &PATTERNS,
            docs: DOCS,
            attributes: AttributeStyle::At,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: true,
            imports: imports::javascript,
        },
        limits,
    ))
}

/// Register the TypeScript scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::TypeScript, new_scanner);
}
