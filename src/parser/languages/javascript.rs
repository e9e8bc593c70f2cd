//! JavaScript scanner configuration.
//!
//! The syntax and the shared pattern sources are reused by the TypeScript
//! scanner, which layers its own declarations on top.

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

pub(super) static SYNTAX: Syntax = Syntax {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_comments: false,
    strings: &[
        StringRule::Quoted {
            open: "`",
            close: "`",
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

pub(super) const DOCS: DocStyle = DocStyle {
    line_prefixes: &[],
    block: Some(("/**", "*/")),
    body_string: false,
    preceding_string: false,
};

pub(super) const CLASS: &str =
    r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?class\s+(?P<name>[A-Za-z_$][\w$]*)";

pub(super) const FUNCTION: &str =
    r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:async\s+)?function\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)";

/// `const f = (a) => ...`, `let g = async function ...`
pub(super) const ARROW: &str = r"^\s*(?:export\s+)?(?:const|let|var)\s+(?P<name>[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^()]*\)\s*(?::[^=]+)?=>|[A-Za-z_$][\w$]*\s*=>)";

/// Class members. The parameter list must close on the line and be followed
/// by a body or a return type, which keeps plain calls out.
pub(super) const METHOD: &str = r"^\s*(?:(?:static|async|get|set|public|private|protected|readonly|override|abstract|declare)\s+)*\*?\s*(?P<name>#?[A-Za-z_$][\w$]*)\s*\??\s*(?:<[^>]*>)?\s*\([^()]*\)\s*(?:\{|:[^;{]*(?:\{|;?\s*$))";

pub(super) const CONSTANT: &str = r"^\s*(?:export\s+)?(?:declare\s+)?const\s+(?P<name>[A-Za-z_$][\w$]*)";

pub(super) const VARIABLE: &str = r"^\s*(?:export\s+)?(?:declare\s+)?(?:let|var)\s+(?P<name>[A-Za-z_$][\w$]*)";

static MODIFIERS: phf::Set<&'static str> = phf_set! {
    "export", "default", "async", "static", "get", "set",
};

pub(super) static RESERVED: phf::Set<&'static str> = phf_set! {
    "if", "for", "while", "switch", "catch", "return", "function", "class", "new", "typeof",
    "else", "do", "try", "with", "super", "this", "await", "yield", "delete", "void", "in",
    "of", "instanceof", "throw", "case", "default", "import", "export",
};

lazy_static! {
    /// Pattern order: class, function, arrow function, method, constant,
    /// variable.
    static ref PATTERNS: Vec<DeclPattern> = vec![
        DeclPattern::new(DeclarationKind::Class, CLASS, Body::Block),
        DeclPattern::new(DeclarationKind::Function, FUNCTION, Body::Block),
        DeclPattern::new(DeclarationKind::Function, ARROW, Body::Block),
        DeclPattern::new(DeclarationKind::Method, METHOD, Body::Block),
        DeclPattern::new(DeclarationKind::Constant, CONSTANT, Body::Statement),
        DeclPattern::new(DeclarationKind::Variable, VARIABLE, Body::Statement),
    ];
}

/// Create a new JavaScript scanner.
pub fn new_scanner(limits: &Limits) -> Box<dyn Scanner> {
    Box::new(PatternScanner::new(
        ScannerConfig {
            language: Language::JavaScript,
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

/// Register the JavaScript scanner.
pub fn register(registry: &mut Registry) {
    registry.register(Language::JavaScript, new_scanner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ScanOutput;

    fn scan(source: &str) -> ScanOutput {
        new_scanner(&Limits::default()).scan(source)
    }

    #[test]
    fn test_single_function() {
        let out = scan("function foo() { return 1; }");
        assert_eq!(out.declarations.len(), 1);
        let foo = &out.declarations[0];
        assert_eq!(foo.kind, DeclarationKind::Function);
        assert_eq!(foo.name, "foo");
        assert_eq!((foo.start_line, foo.end_line), (1, 1));
        assert!(foo.children.is_empty());
    }

    #[test]
    fn test_javascript_declarations() {
        let source = r#"import { readFile } from "fs";
const path = require("path");

/**
 * Build widgets.
 */
export class Widget extends Base {
    static create(opts) {
        return new Widget(opts);
    }

    get size() {
        return `${this.w}}`;
    }
}

export async function load(url) {
    if (!url) { throw new Error("}"); }
    return fetch(url);
}

const add = (a, b) => {
    return a + b;
};

let counter = 0;
main();
describe("widget", () => {
    const inner = 1;
});
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
                ("path", DeclarationKind::Constant, 2, 2),
                ("Widget", DeclarationKind::Class, 7, 15),
                ("load", DeclarationKind::Function, 17, 20),
                ("add", DeclarationKind::Function, 22, 24),
                ("counter", DeclarationKind::Variable, 26, 26),
            ]
        );

        let widget = &out.declarations[1];
        assert_eq!(widget.docstring.as_deref(), Some("Build widgets."));
        assert!(widget.modifiers.contains("export"));
        let methods: Vec<(&str, usize, usize)> = widget
            .children
            .iter()
            .map(|d| (d.name.as_str(), d.start_line, d.end_line))
            .collect();
        assert_eq!(methods, vec![("create", 8, 10), ("size", 12, 14)]);
        assert!(widget.children[0].modifiers.contains("static"));
        assert!(widget.children[1].modifiers.contains("get"));

        let load = &out.declarations[2];
        assert!(load.modifiers.contains("export"));
        assert!(load.modifiers.contains("async"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_control_flow_is_not_a_method() {
        let out = scan("class A {\n    run() {\n    }\n}\nif (ready) {\n    start();\n}\nfor (const x of xs) {\n}\n");
        assert_eq!(out.declarations.len(), 1);
        assert_eq!(out.declarations[0].children.len(), 1);
    }
}
