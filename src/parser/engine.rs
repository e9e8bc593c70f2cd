//! Pattern-table scanner.
//!
//! One scan loop drives every language. A language supplies a
//! `ScannerConfig`: an ordered table of declaration patterns plus its
//! comment, string, block and documentation conventions.

use std::borrow::Cow;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::config::Limits;
use crate::lang::Language;
use crate::model::{Declaration, DeclarationKind};

use super::collector::{body_docstring, collect_string_doc, keyword_modifiers, AttributeStyle, DocStyle, Pending};
use super::lexer::{Lexer, Syntax};
use super::resolver::{BlockStyle, Outcome, Resolution, Resolver, Terminator};
use super::{ScanOutput, Scanner};

/// How a matched declaration's end line is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    /// A delimited body, resolved by the block style.
    Block,
    /// A statement running to its terminator.
    Statement,
    /// The declaration line only.
    Line,
}

/// Pulls a declaration name out of a pattern match. Returning `None`
/// rejects the match so the next pattern is tried.
pub type NameExtractor = fn(&Captures) -> Option<String>;

/// Reads the `name` capture group.
pub fn name_group(caps: &Captures) -> Option<String> {
    caps.name("name").map(|m| m.as_str().to_string())
}

/// One row of a language's pattern table.
#[derive(Debug)]
pub struct DeclPattern {
    pub kind: DeclarationKind,
    pub regex: Regex,
    pub extract: NameExtractor,
    pub body: Body,
}

impl DeclPattern {
    /// Build a pattern that takes its name from the `name` group.
    ///
    /// Panics if `pattern` is not a valid regex; patterns are static tables
    /// exercised by each language's tests.
    pub fn new(kind: DeclarationKind, pattern: &str, body: Body) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).unwrap(),
            extract: name_group,
            body,
        }
    }

    /// Replace the name extractor.
    pub fn with_extractor(mut self, extract: NameExtractor) -> Self {
        self.extract = extract;
        self
    }
}

/// Everything that distinguishes one language's scanner from another.
#[derive(Clone, Copy)]
pub struct ScannerConfig {
    pub language: Language,
    pub syntax: &'static Syntax,
    pub block: BlockStyle,
    pub terminator: Terminator,
    /// Tried in order; the first accepted match wins.
    pub patterns: &'static [DeclPattern],
    pub docs: DocStyle,
    pub attributes: AttributeStyle,
    /// Keywords recorded as modifiers when they precede the name.
    pub modifiers: &'static phf::Set<&'static str>,
    /// Names that are never declarations.
    pub reserved: &'static phf::Set<&'static str>,
    /// Lines inside brackets left open by an unmatched line are not
    /// declaration candidates (keyword arguments, literals).
    pub bracket_continuations: bool,
    pub imports: fn(&str) -> Vec<String>,
}

/// Scanner working state for one `scan` call.
struct ScanContext<'a> {
    lines: Vec<&'a str>,
    emitted: usize,
    warnings: Vec<String>,
    budget_warned: bool,
    depth_warned: bool,
}

impl ScanContext<'_> {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Generic scanner configured per language.
pub struct PatternScanner {
    config: ScannerConfig,
    resolver: Resolver,
    limits: Limits,
}

impl PatternScanner {
    pub fn new(config: ScannerConfig, limits: &Limits) -> Self {
        Self {
            resolver: Resolver::new(config.syntax, config.block, config.terminator, *limits),
            config,
            limits: *limits,
        }
    }

    /// Scan lines `lo..=hi` and return the declarations found there.
    fn scan_range(&self, ctx: &mut ScanContext, lo: usize, hi: usize, depth: usize) -> Vec<Declaration> {
        let mut out = Vec::new();
        let mut lexer = Lexer::new(self.config.syntax);
        let mut pending = Pending::default();
        let docs = &self.config.docs;
        let mut open_brackets = 0i64;
        let mut idx = lo;

        while idx <= hi {
            if ctx.budget_warned {
                break;
            }

            let line = ctx.lines[idx];
            if !lexer.in_code() || open_brackets > 0 {
                self.advance(&mut lexer, line, &mut open_brackets);
                idx += 1;
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                idx += 1;
                continue;
            }
            let mut code_start = 0;
            if docs.starts_block_doc(trimmed) {
                match docs.code_after_block_doc(line) {
                    // `/** doc */ function f() {}`
                    Some(end) => {
                        let (text, _) = docs.collect_block_doc(&ctx.lines, idx, idx);
                        pending.push_doc(text);
                        code_start = end;
                    }
                    None => {
                        let (text, last) = docs.collect_block_doc(&ctx.lines, idx, hi);
                        pending.push_doc(text);
                        idx = last + 1;
                        continue;
                    }
                }
            } else if let Some(text) = docs.doc_line(trimmed) {
                pending.push_doc(text.to_string());
                idx += 1;
                continue;
            }
            if self.config.attributes.starts_attribute(trimmed) {
                let (text, last) = self.config.attributes.collect(&ctx.lines, idx, hi);
                pending.push_modifier(text);
                idx = last + 1;
                continue;
            }
            if docs.preceding_string && trimmed.starts_with("\"\"\"") {
                if let Some((text, last)) = collect_string_doc(&ctx.lines, idx, hi) {
                    pending.clear();
                    pending.push_doc(text);
                    idx = last + 1;
                    continue;
                }
            }

            if let Some((decl, end)) = self.match_declaration(ctx, idx, hi, depth, code_start, &mut pending) {
                out.push(decl);
                lexer.reset();
                open_brackets = 0;
                idx = end + 1;
                continue;
            }

            if code_start > 0 || !self.is_comment(trimmed) {
                pending.clear();
            }
            self.advance(&mut lexer, line, &mut open_brackets);
            idx += 1;
        }
        out
    }

    /// Lex a line that produced no declaration.
    fn advance(&self, lexer: &mut Lexer, line: &str, open_brackets: &mut i64) {
        let track = self.config.bracket_continuations;
        lexer.scan_line(line, |_, c| {
            if track {
                match c {
                    '(' | '[' | '{' => *open_brackets += 1,
                    ')' | ']' | '}' => *open_brackets -= 1,
                    _ => {}
                }
            }
        });
        *open_brackets = (*open_brackets).max(0);
    }

    fn is_comment(&self, trimmed: &str) -> bool {
        let syntax = self.config.syntax;
        if syntax.hash_attributes && trimmed.starts_with("#[") {
            return false;
        }
        syntax.line_comments.iter().any(|c| trimmed.starts_with(c))
            || syntax.block_comment.map(|(open, _)| trimmed.starts_with(open)).unwrap_or(false)
    }

    /// Try the pattern table against line `idx`, ignoring the first
    /// `code_start` bytes and any attributes after them. On success returns
    /// the declaration and the last line it covers.
    fn match_declaration(
        &self,
        ctx: &mut ScanContext,
        idx: usize,
        hi: usize,
        depth: usize,
        code_start: usize,
        pending: &mut Pending,
    ) -> Option<(Declaration, usize)> {
        let line = ctx.lines[idx];
        let attrs_end = code_start + self.config.attributes.leading_len(&line[code_start..]);
        let view = mask_prefix(line, attrs_end);
        let (pattern, name, name_start) = self.config.patterns.iter().find_map(|pattern| {
            let caps = pattern.regex.captures(&view)?;
            let name = (pattern.extract)(&caps)?;
            if name.is_empty() || self.config.reserved.contains(name.as_str()) {
                return None;
            }
            let name_start = caps
                .name("name")
                .map(|m| m.start())
                .or_else(|| view.find(name.as_str()))
                .unwrap_or(line.len());
            Some((pattern, name, name_start))
        })?;

        // The slot is taken before children are scanned, so nested
        // declarations can never push the total past the limit.
        if ctx.emitted >= self.limits.max_declarations {
            if !ctx.budget_warned {
                ctx.budget_warned = true;
                ctx.warn(format!(
                    "declaration limit of {} reached at line {}; remaining declarations skipped",
                    self.limits.max_declarations,
                    idx + 1
                ));
            }
            return None;
        }

        let resolution = match pattern.body {
            Body::Block => self.resolver.resolve_block(&ctx.lines, idx, hi),
            Body::Statement => self.resolver.statement_end(&ctx.lines, idx, hi),
            Body::Line => Resolution::single(idx),
        };
        if resolution.is_degraded() {
            let reason = match resolution.outcome {
                Outcome::CeilingHit => "exceeds the scan limits",
                _ => "is never closed",
            };
            ctx.warn(format!(
                "line {}: body of {} '{}' {}; assuming it ends at line {}",
                idx + 1,
                pattern.kind,
                name,
                reason,
                resolution.end + 1
            ));
        }

        let (pending_doc, mut modifiers) = pending.take();
        let name_start = name_start.max(attrs_end);
        modifiers.extend(self.config.attributes.inline(&line[code_start..name_start]));
        modifiers.extend(keyword_modifiers(&line[attrs_end..name_start], self.config.modifiers));

        let docstring = if self.config.docs.body_string {
            if resolution.has_interior() {
                body_docstring(&ctx.lines, resolution.header_end + 1, resolution.end)
            } else {
                None
            }
        } else {
            pending_doc
        };

        let mut decl = Declaration::new(pattern.kind, &name, idx + 1, resolution.end + 1)?
            .with_docstring(docstring)
            .with_modifiers(modifiers);
        ctx.emitted += 1;
        debug!(kind = %decl.kind, name = %decl.name, start = decl.start_line, end = decl.end_line, "declaration");

        if pattern.kind.is_container() && resolution.has_interior() {
            decl.children = self.scan_children(ctx, &resolution, depth, &decl);
        }
        Some((decl, resolution.end))
    }

    fn scan_children(
        &self,
        ctx: &mut ScanContext,
        resolution: &Resolution,
        depth: usize,
        parent: &Declaration,
    ) -> Vec<Declaration> {
        if depth + 1 >= self.limits.max_depth {
            if !ctx.depth_warned {
                ctx.depth_warned = true;
                ctx.warn(format!(
                    "line {}: nesting deeper than {} levels inside '{}' not scanned",
                    parent.start_line, self.limits.max_depth, parent.name
                ));
            }
            return Vec::new();
        }

        let lo = resolution.header_end + 1;
        let hi = match self.resolver.style() {
            BlockStyle::Indent => resolution.end,
            _ if resolution.is_degraded() => resolution.end,
            _ => resolution.end - 1,
        };
        if lo > hi {
            return Vec::new();
        }

        let mut children = self.scan_range(ctx, lo, hi, depth + 1);
        // Keep every child inside the parent's interior.
        for child in &mut children {
            child.start_line = child.start_line.clamp(lo + 1, hi + 1);
            child.end_line = child.end_line.clamp(child.start_line, hi + 1);
        }
        children
    }
}

/// `line` with its first `len` bytes blanked, so patterns anchored at the
/// line start see the code behind a leading doc comment or attribute.
fn mask_prefix(line: &str, len: usize) -> Cow<'_, str> {
    if len == 0 {
        return Cow::Borrowed(line);
    }
    let mut masked = " ".repeat(len);
    masked.push_str(&line[len..]);
    Cow::Owned(masked)
}

impl Scanner for PatternScanner {
    fn language(&self) -> Language {
        self.config.language
    }

    fn scan(&self, content: &str) -> ScanOutput {
        let lines: Vec<&str> = content.lines().collect();
        if lines.is_empty() {
            return ScanOutput::default();
        }
        let last = lines.len() - 1;
        let mut ctx = ScanContext {
            lines,
            emitted: 0,
            warnings: Vec::new(),
            budget_warned: false,
            depth_warned: false,
        };
        let declarations = self.scan_range(&mut ctx, 0, last, 0);
        ScanOutput {
            declarations,
            warnings: ctx.warnings,
        }
    }

    fn imports(&self, content: &str) -> Vec<String> {
        (self.config.imports)(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::StringRule;
    use lazy_static::lazy_static;
    use phf::phf_set;

    static SYNTAX: Syntax = Syntax {
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        nested_comments: false,
        strings: &[StringRule::Quoted {
            open: "\"",
            close: "\"",
            escapes: true,
            multiline: false,
        }],
        char_literals: false,
        hash_attributes: false,
    };

    static MODIFIERS: phf::Set<&'static str> = phf_set! {"export", "static"};
    static RESERVED: phf::Set<&'static str> = phf_set! {"if", "while"};

    lazy_static! {
        static ref PATTERNS: Vec<DeclPattern> = vec![
            DeclPattern::new(DeclarationKind::Class, r"^\s*(?:export\s+)?class\s+(?P<name>\w+)", Body::Block),
            DeclPattern::new(DeclarationKind::Function, r"^\s*(?:export\s+|static\s+)*function\s+(?P<name>\w+)", Body::Block),
            DeclPattern::new(DeclarationKind::Method, r"^\s*(?:static\s+)?(?P<name>\w+)\s*\([^)]*\)\s*\{", Body::Block),
            DeclPattern::new(DeclarationKind::Constant, r"^\s*const\s+(?P<name>\w+)", Body::Statement),
        ];
    }

    fn no_imports(_: &str) -> Vec<String> {
        Vec::new()
    }

    fn scanner(limits: Limits) -> PatternScanner {
        PatternScanner::new(
            ScannerConfig {
                language: Language::JavaScript,
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
                imports: no_imports,
            },
            &limits,
        )
    }

    #[test]
    fn test_single_line_function() {
        let out = scanner(Limits::default()).scan("function foo() { return 1; }");
        assert_eq!(out.declarations.len(), 1);
        let foo = &out.declarations[0];
        assert_eq!(foo.name, "foo");
        assert_eq!((foo.start_line, foo.end_line), (1, 1));
        assert!(foo.children.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_class_children_docs_and_modifiers() {
        let src = r#"/**
 * A widget.
 */
@sealed
export class Widget {
    static build(a) {
        if (a) { return 1; }
    }

    render() {
        return "}";
    }
}
const LIMIT = 3;
"#;
        let out = scanner(Limits::default()).scan(src);
        assert_eq!(out.declarations.len(), 2);

        let widget = &out.declarations[0];
        assert_eq!(widget.kind, DeclarationKind::Class);
        assert_eq!((widget.start_line, widget.end_line), (5, 13));
        assert_eq!(widget.docstring.as_deref(), Some("A widget."));
        assert!(widget.modifiers.contains("@sealed"));
        assert!(widget.modifiers.contains("export"));

        let names: Vec<&str> = widget.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["build", "render"]);
        assert!(widget.children[0].modifiers.contains("static"));
        assert_eq!((widget.children[1].start_line, widget.children[1].end_line), (10, 12));

        let limit = &out.declarations[1];
        assert_eq!(limit.kind, DeclarationKind::Constant);
        assert_eq!((limit.start_line, limit.end_line), (14, 14));
    }

    #[test]
    fn test_reserved_name_falls_through() {
        let out = scanner(Limits::default()).scan("if (x) {\n}\nwhile (y) {\n}\n");
        assert!(out.declarations.is_empty());
    }

    #[test]
    fn test_unterminated_block_is_bounded() {
        let src = "class Broken {\n  run() {\n    x();\n";
        let out = scanner(Limits::default()).scan(src);
        assert_eq!(out.declarations.len(), 1);
        let broken = &out.declarations[0];
        assert_eq!(broken.end_line, 3);
        assert!(!out.warnings.is_empty());
        for child in &broken.children {
            assert!(broken.contains(child));
        }
    }

    #[test]
    fn test_declaration_budget() {
        let src = "function a() {}\nfunction b() {}\nfunction c() {}\n";
        let limits = Limits {
            max_declarations: 2,
            ..Limits::default()
        };
        let out = scanner(limits).scan(src);
        assert_eq!(out.declarations.len(), 2);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_nested_declarations_respect_budget() {
        let src = "class A {\n  class B {\n    run() {\n    }\n    stop() {\n    }\n  }\n}\nfunction after() {}\n";
        let limits = Limits {
            max_declarations: 2,
            ..Limits::default()
        };
        let out = scanner(limits).scan(src);
        let total: usize = out.declarations.iter().map(|d| d.walk().len()).sum();
        assert_eq!(total, 2);
        assert_eq!(out.declarations[0].children[0].name, "B");
        assert!(out.declarations[0].children[0].children.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_budget_filled_exactly_has_no_warning() {
        let limits = Limits {
            max_declarations: 2,
            ..Limits::default()
        };
        let out = scanner(limits).scan("function a() {}\nfunction b() {}\n\n// done\n");
        assert_eq!(out.declarations.len(), 2);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_one_line_doc_before_code() {
        let src = "/** Builds it. */ function build() {\n  return 1;\n}\n/** Orphan. */ x = 1;\nfunction plain() {}\n";
        let out = scanner(Limits::default()).scan(src);
        let names: Vec<&str> = out.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["build", "plain"]);
        assert_eq!(out.declarations[0].docstring.as_deref(), Some("Builds it."));
        assert_eq!((out.declarations[0].start_line, out.declarations[0].end_line), (1, 3));
        assert_eq!(out.declarations[1].docstring, None);
    }

    #[test]
    fn test_depth_limit() {
        let src = "class A {\n  class B {\n    class C {\n    }\n  }\n}\n";
        let limits = Limits {
            max_depth: 2,
            ..Limits::default()
        };
        let out = scanner(limits).scan(src);
        let a = &out.declarations[0];
        assert_eq!(a.children.len(), 1);
        assert!(a.children[0].children.is_empty());
        assert!(out.warnings.iter().any(|w| w.contains("nesting")));
    }

    #[test]
    fn test_string_lines_are_skipped() {
        let src = "/* function hidden() {\n} */\nfunction shown() {}\n";
        let out = scanner(Limits::default()).scan(src);
        let names: Vec<&str> = out.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["shown"]);
    }
}
