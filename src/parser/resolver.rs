//! Block-boundary resolution.
//!
//! Given the line a declaration starts on, find the line its body ends on.
//! Every walk is bounded by `max_block_span` lines and `max_iterations`
//! characters; when neither a close nor EOF ends the walk cleanly the
//! resolver falls back to `start + fallback_span` and reports the outcome so
//! the caller can record a warning.

use crate::config::Limits;

use super::lexer::{is_ident_char, Lexer, Syntax};

/// How a language delimits bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    /// A delimiter pair such as `{` and `}`.
    Braces { open: char, close: char },
    /// Body is the run of lines indented deeper than the header.
    Indent,
    /// Opener keywords closed by `end`.
    Keyword,
}

/// How a block-less statement ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Semicolon,
    Newline,
}

/// How a resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The close was found.
    Matched,
    /// The construct opens and closes on its start line, or has no body.
    SingleLine,
    /// A statement terminator ended the construct before any body opened.
    Terminated,
    /// EOF arrived before the close.
    Unterminated,
    /// A span or iteration ceiling stopped the walk.
    CeilingHit,
}

/// Result of resolving a construct's extent. Line numbers are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Line on which the body opens (the opener line, or the header's last line).
    pub header_end: usize,
    /// Last line of the construct.
    pub end: usize,
    pub outcome: Outcome,
}

impl Resolution {
    pub fn single(line: usize) -> Self {
        Self {
            header_end: line,
            end: line,
            outcome: Outcome::SingleLine,
        }
    }

    /// True when the end line is a fallback guess.
    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, Outcome::Unterminated | Outcome::CeilingHit)
    }

    /// True when lines after `header_end` belong to the body.
    pub fn has_interior(&self) -> bool {
        !matches!(self.outcome, Outcome::SingleLine | Outcome::Terminated) && self.end > self.header_end
    }
}

/// Words that continue a signature onto the next line.
const CONTINUATIONS: &[&str] = &["where", "throws", "extends", "implements", "->", ":", ","];

/// Words that open a Julia block.
const KEYWORD_OPENERS: &[&str] = &[
    "function", "macro", "module", "baremodule", "struct", "begin", "if", "for", "while", "let", "try",
    "quote", "do",
];

/// Bounded block-end finder for one language.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    syntax: &'static Syntax,
    style: BlockStyle,
    terminator: Terminator,
    limits: Limits,
}

impl Resolver {
    pub fn new(syntax: &'static Syntax, style: BlockStyle, terminator: Terminator, limits: Limits) -> Self {
        Self {
            syntax,
            style,
            terminator,
            limits,
        }
    }

    pub fn style(&self) -> BlockStyle {
        self.style
    }

    fn fallback(&self, start: usize, last: usize, header_end: usize, outcome: Outcome) -> Resolution {
        Resolution {
            header_end,
            end: (start + self.limits.fallback_span).min(last).max(header_end),
            outcome,
        }
    }

    /// Resolve the body of the construct starting on `start`, never looking
    /// past line `last`.
    pub fn resolve_block(&self, lines: &[&str], start: usize, last: usize) -> Resolution {
        let last = last.min(lines.len().saturating_sub(1));
        if start > last {
            return Resolution::single(start);
        }
        match self.style {
            BlockStyle::Braces { open, close } => self.brace_block(lines, start, last, open, close),
            BlockStyle::Indent => self.indent_block(lines, start, last),
            BlockStyle::Keyword => self.keyword_block(lines, start, last),
        }
    }

    /// Find the matching close for an opener on `start`. The nesting counter
    /// starts from the net open count of the start line.
    pub fn find_block_end(&self, lines: &[&str], start: usize, last: usize) -> Resolution {
        let last = last.min(lines.len().saturating_sub(1));
        if start > last {
            return Resolution::single(start);
        }
        let (open, close) = match self.style {
            BlockStyle::Braces { open, close } => (open, close),
            _ => return self.resolve_block(lines, start, last),
        };
        let mut lexer = Lexer::new(self.syntax);
        let mut depth: i64 = 0;
        let mut seen_open = false;
        let mut iterations = lexer.scan_line(lines[start], |_, c| {
            if c == open {
                depth += 1;
                seen_open = true;
            } else if c == close {
                depth -= 1;
            }
        });
        if !seen_open || depth <= 0 {
            return Resolution::single(start);
        }
        self.count_to_close(lines, start, start, last, &mut lexer, depth, &mut iterations, open, close)
    }

    #[allow(clippy::too_many_arguments)]
    fn count_to_close(
        &self,
        lines: &[&str],
        start: usize,
        header_end: usize,
        last: usize,
        lexer: &mut Lexer,
        mut depth: i64,
        iterations: &mut usize,
        open: char,
        close: char,
    ) -> Resolution {
        let span_limit = start.saturating_add(self.limits.max_block_span);
        let mut idx = header_end + 1;
        while idx <= last {
            if idx > span_limit || *iterations > self.limits.max_iterations {
                return self.fallback(start, last, header_end, Outcome::CeilingHit);
            }
            let mut closed = false;
            *iterations += lexer.scan_line(lines[idx], |_, c| {
                if closed {
                    return;
                }
                if c == open {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        closed = true;
                    }
                }
            });
            if closed {
                return Resolution {
                    header_end,
                    end: idx,
                    outcome: Outcome::Matched,
                };
            }
            idx += 1;
        }
        self.fallback(start, last, header_end, Outcome::Unterminated)
    }

    /// Locate the body opener, which may sit on a continuation line, then
    /// find its close.
    fn brace_block(&self, lines: &[&str], start: usize, last: usize, open: char, close: char) -> Resolution {
        let mut lexer = Lexer::new(self.syntax);
        let mut iterations = 0usize;
        let lookahead_limit = start.saturating_add(self.limits.opener_lookahead).min(last);
        let mut idx = start;
        let mut paren_total: i64 = 0;

        loop {
            let mut parens: i64 = 0;
            let mut depth: i64 = 0;
            let mut opened = false;
            let mut terminated = false;
            iterations += lexer.scan_line(lines[idx], |_, c| {
                if terminated {
                    return;
                }
                if opened {
                    if c == open {
                        depth += 1;
                    } else if c == close {
                        depth -= 1;
                    }
                    return;
                }
                match c {
                    '(' | '[' => parens += 1,
                    ')' | ']' => parens -= 1,
                    ';' if parens + paren_total <= 0 && self.terminator == Terminator::Semicolon => {
                        terminated = true
                    }
                    c if c == open && parens + paren_total <= 0 => {
                        opened = true;
                        depth = 1;
                    }
                    _ => {}
                }
            });
            paren_total += parens;

            if terminated {
                return Resolution {
                    header_end: idx,
                    end: idx,
                    outcome: Outcome::Terminated,
                };
            }
            if opened {
                if depth <= 0 {
                    return Resolution {
                        header_end: idx,
                        end: idx,
                        outcome: if idx == start { Outcome::SingleLine } else { Outcome::Matched },
                    };
                }
                return self.count_to_close(lines, start, idx, last, &mut lexer, depth, &mut iterations, open, close);
            }

            if idx >= lookahead_limit || !self.header_continues(lines, idx, paren_total, open, &lexer) {
                return Resolution::single(start);
            }
            idx += 1;
        }
    }

    /// Whether the header on line `idx` carries on to the next line.
    fn header_continues(&self, lines: &[&str], idx: usize, open_parens: i64, open: char, lexer: &Lexer) -> bool {
        if !lexer.in_code() || open_parens > 0 {
            return true;
        }
        let current = lines[idx].trim();
        if current.ends_with(',') || current.ends_with("->") || current.ends_with(':') || current == "where" {
            return true;
        }
        let Some(next) = lines.get(idx + 1).map(|l| l.trim_start()) else {
            return false;
        };
        if next.starts_with(open) {
            return true;
        }
        CONTINUATIONS.iter().any(|word| {
            next.strip_prefix(word)
                .map(|tail| !word.chars().all(is_ident_char) || !tail.starts_with(is_ident_char))
                .unwrap_or(false)
        })
    }

    /// Indentation-delimited body. The header may span lines until its
    /// closing brackets balance.
    fn indent_block(&self, lines: &[&str], start: usize, last: usize) -> Resolution {
        let mut lexer = Lexer::new(self.syntax);
        let mut iterations = 0usize;
        let base = indent_width(lines[start]);

        let mut header_end = start;
        let mut brackets: i64 = 0;
        loop {
            iterations += lexer.scan_line(lines[header_end], |_, c| match c {
                '(' | '[' | '{' => brackets += 1,
                ')' | ']' | '}' => brackets -= 1,
                _ => {}
            });
            let balanced = brackets <= 0 && lexer.in_code();
            if balanced || header_end >= last || header_end - start >= self.limits.opener_lookahead {
                break;
            }
            header_end += 1;
        }
        lexer.reset();

        let span_limit = start.saturating_add(self.limits.max_block_span);
        let mut end = header_end;
        let mut idx = header_end + 1;
        while idx <= last {
            if idx > span_limit || iterations > self.limits.max_iterations {
                return self.fallback(start, last, header_end, Outcome::CeilingHit);
            }
            let line = lines[idx];
            let inside_string = !lexer.in_code();
            iterations += lexer.scan_line(line, |_, _| {});
            if inside_string {
                end = idx;
            } else {
                let trimmed = line.trim_start();
                let is_comment = self.syntax.line_comments.iter().any(|c| trimmed.starts_with(c));
                if trimmed.is_empty() || is_comment {
                    idx += 1;
                    continue;
                }
                if indent_width(line) <= base {
                    break;
                }
                end = idx;
            }
            idx += 1;
        }

        Resolution {
            header_end,
            end,
            outcome: if end == start { Outcome::SingleLine } else { Outcome::Matched },
        }
    }

    /// `end`-terminated body. Keywords inside brackets are ignored so that
    /// `a[end]` and comprehensions do not count.
    fn keyword_block(&self, lines: &[&str], start: usize, last: usize) -> Resolution {
        let mut lexer = Lexer::new(self.syntax);
        let mut iterations = 0usize;
        let mut depth: i64 = 0;
        let mut brackets: i64 = 0;
        let mut previous = String::new();
        let span_limit = start.saturating_add(self.limits.max_block_span);

        let mut idx = start;
        while idx <= last {
            if idx > span_limit || iterations > self.limits.max_iterations {
                return self.fallback(start, last, start, Outcome::CeilingHit);
            }
            let code = lexer.code_text(lines[idx]);
            iterations += code.len().max(1);

            let mut word = String::new();
            let mut field_access = false;
            let mut prev_char = ' ';
            let mut closed = false;
            for c in code.chars().chain(std::iter::once(' ')) {
                if is_ident_char(c) {
                    if word.is_empty() {
                        field_access = prev_char == '.';
                    }
                    word.push(c);
                    prev_char = c;
                    continue;
                }
                if !word.is_empty() {
                    if brackets == 0 && !field_access {
                        let opens = KEYWORD_OPENERS.contains(&word.as_str())
                            || (word == "type" && (previous == "abstract" || previous == "primitive"));
                        if opens {
                            depth += 1;
                        } else if word == "end" && depth > 0 {
                            depth -= 1;
                            if depth == 0 {
                                closed = true;
                            }
                        }
                    }
                    previous = std::mem::take(&mut word);
                    if closed {
                        break;
                    }
                }
                match c {
                    '(' | '[' | '{' => brackets += 1,
                    ')' | ']' | '}' => brackets = (brackets - 1).max(0),
                    _ => {}
                }
                if !c.is_whitespace() {
                    previous.clear();
                }
                prev_char = c;
            }

            if depth == 0 {
                return if idx == start {
                    Resolution::single(start)
                } else {
                    Resolution {
                        header_end: start,
                        end: idx,
                        outcome: Outcome::Matched,
                    }
                };
            }
            idx += 1;
        }
        self.fallback(start, last, start, Outcome::Unterminated)
    }

    /// Find the end of a block-less statement: the first `;` at bracket depth
    /// zero, or the first line end at bracket depth zero for newline
    /// terminated languages.
    pub fn statement_end(&self, lines: &[&str], start: usize, last: usize) -> Resolution {
        let last = last.min(lines.len().saturating_sub(1));
        if start > last {
            return Resolution::single(start);
        }
        let mut lexer = Lexer::new(self.syntax);
        let mut iterations = 0usize;
        let mut depth: i64 = 0;
        let span_limit = start.saturating_add(self.limits.max_block_span);

        let mut idx = start;
        while idx <= last {
            if idx > span_limit || iterations > self.limits.max_iterations {
                return self.fallback(start, last, start, Outcome::CeilingHit);
            }
            let mut terminated = false;
            iterations += lexer.scan_line(lines[idx], |_, c| {
                if terminated {
                    return;
                }
                match c {
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => depth -= 1,
                    ';' if depth <= 0 => terminated = true,
                    _ => {}
                }
            });
            let line_ends_statement = self.terminator == Terminator::Newline
                && depth <= 0
                && lexer.in_code()
                && !continues_expression(lines[idx]);
            if terminated || line_ends_statement {
                return Resolution {
                    header_end: start,
                    end: idx,
                    outcome: if idx == start { Outcome::SingleLine } else { Outcome::Terminated },
                };
            }
            idx += 1;
        }
        self.fallback(start, last, start, Outcome::Unterminated)
    }
}

/// A trailing operator or backslash continues an expression in newline
/// terminated languages.
fn continues_expression(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.ends_with('\\')
        || trimmed.ends_with('=')
        || trimmed.ends_with("=>")
        || trimmed.ends_with("&&")
        || trimmed.ends_with("||")
        || trimmed.ends_with("<-")
        || trimmed.ends_with("|>")
}

/// Width of a line's leading whitespace, with tabs advancing to the next
/// multiple of eight.
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::StringRule;

    static BRACES: Syntax = Syntax {
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        nested_comments: true,
        strings: &[
            StringRule::Hashed {
                prefixes: &["r"],
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

    static HASH: Syntax = Syntax {
        line_comments: &["#"],
        block_comment: None,
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
        char_literals: false,
        hash_attributes: false,
    };

    fn braces() -> Resolver {
        Resolver::new(
            &BRACES,
            BlockStyle::Braces { open: '{', close: '}' },
            Terminator::Semicolon,
            Limits::default(),
        )
    }

    fn split(src: &str) -> Vec<&str> {
        src.lines().collect()
    }

    #[test]
    fn test_matched_block() {
        let lines = split("fn a() {\n    if x { y(); }\n}\nfn b() {}");
        let res = braces().resolve_block(&lines, 0, lines.len() - 1);
        assert_eq!(res.end, 2);
        assert_eq!(res.outcome, Outcome::Matched);
        assert!(res.has_interior());
    }

    #[test]
    fn test_single_line_block() {
        let lines = split("struct Point { x: i32, y: i32 }\nfn main() {}");
        let res = braces().find_block_end(&lines, 0, 1);
        assert_eq!(res, Resolution::single(0));
        let res = braces().resolve_block(&lines, 0, 1);
        assert_eq!(res.outcome, Outcome::SingleLine);
        assert!(!res.has_interior());
    }

    #[test]
    fn test_braces_in_strings_and_comments_ignored() {
        let lines = split("fn a() {\n    let s = \"}}\";\n    // }\n    /* } */\n    let r = r#\"}\"#;\n}");
        let res = braces().resolve_block(&lines, 0, lines.len() - 1);
        assert_eq!(res.end, 5);
    }

    #[test]
    fn test_opener_on_continuation_line() {
        let lines = split("pub fn long(\n    a: u8,\n) -> u8\nwhere\n    T: Copy,\n{\n    a\n}");
        let res = braces().resolve_block(&lines, 0, lines.len() - 1);
        assert_eq!(res.header_end, 5);
        assert_eq!(res.end, 7);
    }

    #[test]
    fn test_terminated_declaration() {
        let lines = split("fn required(&self) -> u8;\nfn other() {}");
        let res = braces().resolve_block(&lines, 0, 1);
        assert_eq!(res.outcome, Outcome::Terminated);
        assert_eq!(res.end, 0);
    }

    #[test]
    fn test_unterminated_falls_back() {
        let mut src = String::from("fn broken() {\n");
        for i in 0..100 {
            src.push_str(&format!("    let x{} = 1;\n", i));
        }
        let lines = split(&src);
        let res = braces().resolve_block(&lines, 0, lines.len() - 1);
        assert_eq!(res.outcome, Outcome::Unterminated);
        assert_eq!(res.end, 50);
        assert!(res.is_degraded());
    }

    #[test]
    fn test_span_ceiling() {
        let limits = Limits {
            max_block_span: 3,
            ..Limits::default()
        };
        let resolver = Resolver::new(&BRACES, BlockStyle::Braces { open: '{', close: '}' }, Terminator::Semicolon, limits);
        let lines = split("fn a() {\n1\n2\n3\n4\n5\n}");
        let res = resolver.resolve_block(&lines, 0, lines.len() - 1);
        assert_eq!(res.outcome, Outcome::CeilingHit);
        assert_eq!(res.end, 6);
    }

    #[test]
    fn test_unterminated_string_does_not_hang() {
        let lines = split("fn a() {\n    let s = \"never closed {\n}\n}");
        let res = braces().resolve_block(&lines, 0, lines.len() - 1);
        assert!(res.end <= 3);
    }

    #[test]
    fn test_indent_block() {
        let resolver = Resolver::new(&HASH, BlockStyle::Indent, Terminator::Newline, Limits::default());
        let lines = split("class Foo:\n    def bar(self):\n        pass\n\n    # trailing\nx = 1");
        let res = resolver.resolve_block(&lines, 0, lines.len() - 1);
        assert_eq!(res.header_end, 0);
        assert_eq!(res.end, 2);

        let lines = split("def f(\n    a,\n    b,\n):\n    s = \"\"\"\ndoc at column zero\n\"\"\"\n    return s\ny = 2");
        let res = resolver.resolve_block(&lines, 0, lines.len() - 1);
        assert_eq!(res.header_end, 3);
        assert_eq!(res.end, 7);
    }

    #[test]
    fn test_keyword_block() {
        let resolver = Resolver::new(&HASH, BlockStyle::Keyword, Terminator::Newline, Limits::default());
        let lines = split("function f(x)\n    for i in 1:x\n        y = x[end]\n    end\n    [i for i in 1:3]\nend\nz = 1");
        let res = resolver.resolve_block(&lines, 0, lines.len() - 1);
        assert_eq!(res.end, 5);
        assert_eq!(res.outcome, Outcome::Matched);

        let lines = split("function g(x) x + 1 end");
        assert_eq!(resolver.resolve_block(&lines, 0, 0).outcome, Outcome::SingleLine);

        let lines = split("abstract type Shape end");
        assert_eq!(resolver.resolve_block(&lines, 0, 0).outcome, Outcome::SingleLine);
    }

    #[test]
    fn test_statement_end() {
        let resolver = braces();
        let lines = split("const TABLE: [u8; 3] = [\n    1, 2, 3,\n];\nfn x() {}");
        let res = resolver.statement_end(&lines, 0, lines.len() - 1);
        assert_eq!(res.end, 2);

        let newline = Resolver::new(&HASH, BlockStyle::Indent, Terminator::Newline, Limits::default());
        let lines = split("CONFIG = {\n    \"a\": 1,\n}\nOTHER = 2");
        assert_eq!(newline.statement_end(&lines, 0, lines.len() - 1).end, 2);
        assert_eq!(newline.statement_end(&lines, 3, 3).outcome, Outcome::SingleLine);
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("    x"), 4);
        assert_eq!(indent_width("\tx"), 8);
        assert_eq!(indent_width("  \tx"), 8);
        assert_eq!(indent_width("x"), 0);
    }
}
