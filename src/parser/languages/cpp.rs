//! C++ scanner configuration.
//!
//! Builds on the C conventions and adds namespaces, classes, scoped enums,
//! `using` aliases, raw strings, `[[attributes]]` and qualified member
//! definitions such as `Shape::area()`.

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Captures;

use super::c::{typed_name, typedef_name, DOCS, MACRO, RESERVED, STATEMENT_WORDS, TYPEDEF};
use crate::config::Limits;
use crate::lang::Language;
use crate::model::DeclarationKind;
use crate::parser::collector::AttributeStyle;
use crate::parser::engine::{name_group, Body, DeclPattern, PatternScanner, ScannerConfig};
use crate::parser::imports;
use crate::parser::lexer::{StringRule, Syntax};
use crate::parser::resolver::{BlockStyle, Terminator};
use crate::parser::{Registry, Scanner};

static SYNTAX: Syntax = Syntax {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_comments: false,
    strings: &[
        StringRule::CppRaw,
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
    "static", "inline", "extern", "const", "volatile", "virtual", "explicit", "constexpr",
    "consteval", "friend", "mutable",
};

/// Optional leading `[[attribute]]` groups.
const ATTRS: &str = r"(?:\[\[[^\]]*\]\]\s*)*";

/// A type: possibly qualified, possibly templated, followed by pointer or
/// reference marks.
const TYPE: &str = r"[A-Za-z_][\w:]*(?:<[^()]*>)?[\s\*&]+";

lazy_static! {
    /// Pattern order: macro, namespace, class, struct, union, enum, typedef,
    /// using alias, qualified member definition, function, constructor or
    /// destructor, constant, variable.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(DeclarationKind::Macro, MACRO, Body::Line),
        DeclPattern::new(
            DeclarationKind::Namespace,
            r"^\s*(?:inline\s+)?namespace\s+(?P<name>[A-Za-z_][\w:]*)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Class,
            r"^\s*(?:template\s*<.*>\s*)?class\s+(?:alignas\([^)]*\)\s+)?(?P<name>[A-Za-z_]\w*)(?:\s+final)?\s*(?:[:{]|$)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Struct,
            r"^\s*(?:template\s*<.*>\s*)?(?:typedef\s+)?struct\s+(?:alignas\([^)]*\)\s+)?(?P<name>[A-Za-z_]\w*)(?:\s+final)?\s*(?:[:{]|$)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Struct,
            r"^\s*(?:typedef\s+)?union\s+(?P<name>[A-Za-z_]\w*)\s*(?:\{|$)",
            Body::Block,
        ),
        DeclPattern::new(
            DeclarationKind::Enum,
            r"^\s*(?:typedef\s+)?enum\s+(?:class\s+|struct\s+)?(?P<name>[A-Za-z_]\w*)\s*(?::\s*[\w:]+\s*)?(?:\{|$)",
            Body::Block,
        ),
        DeclPattern::new(DeclarationKind::TypeAlias, TYPEDEF, Body::Statement).with_extractor(typedef_name),
        DeclPattern::new(
            DeclarationKind::TypeAlias,
            r"^\s*(?:template\s*<.*>\s*)?using\s+(?P<name>[A-Za-z_]\w*)\s*=",
            Body::Statement,
        ),
        DeclPattern::new(
            DeclarationKind::Method,
            &format!(
                r"^\s*{}(?P<ret>(?:{})*?)(?P<name>(?:[A-Za-z_]\w*(?:<[^()]*>)?::)+~?[A-Za-z_]\w*)\s*\(",
                ATTRS, TYPE
            ),
            Body::Block,
        )
        .with_extractor(typed_name),
        DeclPattern::new(
            DeclarationKind::Function,
            &format!(
                r"^\s*(?:template\s*<.*>\s*)?{}(?P<ret>(?:{})+?)(?P<name>~?[A-Za-z_]\w*|operator\s*[^\s(]+)\s*\(",
                ATTRS, TYPE
            ),
            Body::Block,
        )
        .with_extractor(typed_name),
        DeclPattern::new(
            DeclarationKind::Function,
            r"^\s+(?:(?:explicit|virtual|inline|constexpr)\s+)*(?P<name>~?[A-Za-z_]\w*)\s*\(",
            Body::Block,
        )
        .with_extractor(member_name),
        DeclPattern::new(
            DeclarationKind::Constant,
            &format!(
                r"^\s*(?P<ret>(?:{t})*?(?:const|constexpr)\b[\s\*&]+(?:{t})*?)(?P<name>[A-Za-z_]\w*)\s*(?:\[[^\]]*\]\s*)*[={{]",
                t = TYPE
            ),
            Body::Statement,
        )
        .with_extractor(typed_name),
        DeclPattern::new(
            DeclarationKind::Variable,
            &format!(
                r"^\s*(?P<ret>(?:{})+?)(?P<name>[A-Za-z_]\w*)\s*(?:\[[^\]]*\]\s*)*[=;,{{]",
                TYPE
            ),
            Body::Statement,
        )
        .with_extractor(typed_name),
    ];
}

/// Constructors and destructors declared inside a class body, which carry no
/// return type.
fn member_name(caps: &Captures) -> Option<String> {
    let name = name_group(caps)?;
    if STATEMENT_WORDS.contains(name.trim_start_matches('~')) {
        return None;
    }
    Some(name)
}

/// Create a new C++ scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::Cpp,
            syntax: &SYNTAX,
            block: BlockStyle::Braces { open: '{', close: '}' },
            terminator: Terminator::Semicolon,
            patterns: &PATTERNS,
            docs: DOCS,
            attributes: AttributeStyle::Bracket,
            modifiers: &MODIFIERS,
            reserved: &RESERVED,
            bracket_continuations: false,
            imports: imports::c_family,
        },
        limits,
    ))
}

/// Register the C++ scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::Cpp, new_scanner);
}
