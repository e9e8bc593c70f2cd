//! Line-oriented lexical state machine.
//!
//! Tracks whether the cursor is inside a string literal or a comment so that
//! delimiter counting only sees code characters. State carries across lines:
//! block comments and multi-line strings stay open until their terminator,
//! while line comments and single-line strings end with the line.

/// How a string literal opens and closes.
#[derive(Debug, Clone, Copy)]
pub enum StringRule {
    /// A literal with fixed open and close delimiters.
    Quoted {
        open: &'static str,
        close: &'static str,
        escapes: bool,
        multiline: bool,
    },
    /// A raw literal fenced by `#` marks: `r#"…"#`, `br"…"`, Swift `#"…"#`.
    Hashed {
        prefixes: &'static [&'static str],
        min_hashes: usize,
        triple: bool,
    },
    /// C++ raw string `R"delim(…)delim"`.
    CppRaw,
}

/// Comment and string syntax of a language.
#[derive(Debug, Clone, Copy)]
pub struct Syntax {
    pub line_comments: &'static [&'static str],
    pub block_comment: Option<(&'static str, &'static str)>,
    pub nested_comments: bool,
    /// Ordered; longer openers must come first.
    pub strings: &'static [StringRule],
    /// Treat `'x'` and `'\n'` as literals only when they close right away.
    pub char_literals: bool,
    /// `#[` opens an attribute even though `#` starts a line comment.
    pub hash_attributes: bool,
}

/// Where the cursor is between code characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LexState {
    #[default]
    Code,
    BlockComment {
        depth: usize,
    },
    Str {
        close: String,
        escapes: bool,
        multiline: bool,
    },
}

impl LexState {
    pub fn is_code(&self) -> bool {
        matches!(self, LexState::Code)
    }
}

/// Lexer over a sequence of lines.
#[derive(Debug, Clone)]
pub struct Lexer {
    syntax: &'static Syntax,
    state: LexState,
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Identifier run that ends right before byte `end`.
fn ident_before(line: &str, end: usize) -> &str {
    let head = &line[..end];
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(end);
    &head[start..]
}

impl Lexer {
    pub fn new(syntax: &'static Syntax) -> Self {
        Self {
            syntax,
            state: LexState::Code,
        }
    }

    pub fn state(&self) -> &LexState {
        &self.state
    }

    pub fn in_code(&self) -> bool {
        self.state.is_code()
    }

    pub fn reset(&mut self) {
        self.state = LexState::Code;
    }

    /// Lex one line, calling `on_code(byte_offset, ch)` for every character
    /// outside strings and comments. Returns the number of characters
    /// examined.
    pub fn scan_line<F: FnMut(usize, char)>(&mut self, line: &str, mut on_code: F) -> usize {
        let mut i = 0;
        let mut examined = 0;

        while i < line.len() {
            let Some(ch) = line[i..].chars().next() else {
                break;
            };
            examined += 1;
            let rest = &line[i..];

            match &mut self.state {
                LexState::Str { close, escapes, .. } => {
                    if *escapes && ch == '\\' {
                        i += ch.len_utf8();
                        if let Some(next) = line[i..].chars().next() {
                            i += next.len_utf8();
                        }
                        continue;
                    }
                    if rest.starts_with(close.as_str()) {
                        i += close.len();
                        self.state = LexState::Code;
                        continue;
                    }
                }
                LexState::BlockComment { depth } => {
                    if let Some((open, close)) = self.syntax.block_comment {
                        if rest.starts_with(close) {
                            i += close.len();
                            *depth -= 1;
                            if *depth == 0 {
                                self.state = LexState::Code;
                            }
                            continue;
                        }
                        if self.syntax.nested_comments && rest.starts_with(open) {
                            i += open.len();
                            *depth += 1;
                            continue;
                        }
                    } else {
                        self.state = LexState::Code;
                        continue;
                    }
                }
                LexState::Code => {
                    if let Some((open, _)) = self.syntax.block_comment {
                        if rest.starts_with(open) {
                            i += open.len();
                            self.state = LexState::BlockComment { depth: 1 };
                            continue;
                        }
                    }
                    let attribute = self.syntax.hash_attributes && rest.starts_with("#[");
                    if !attribute && self.syntax.line_comments.iter().any(|c| rest.starts_with(c)) {
                        break;
                    }
                    if let Some(consumed) = self.open_string(line, i) {
                        i += consumed;
                        continue;
                    }
                    if self.syntax.char_literals && ch == '\'' {
                        if let Some(len) = char_literal_len(rest) {
                            i += len;
                            continue;
                        }
                    }
                    on_code(i, ch);
                }
            }
            i += ch.len_utf8();
        }

        if let LexState::Str { multiline: false, .. } = self.state {
            self.state = LexState::Code;
        }
        examined
    }

    /// Return the code characters of a line, with strings and comments
    /// removed.
    pub fn code_text(&mut self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        self.scan_line(line, |_, c| out.push(c));
        out
    }

    /// Try to open a string at byte `i`. Returns bytes consumed.
    fn open_string(&mut self, line: &str, i: usize) -> Option<usize> {
        let rest = &line[i..];
        for rule in self.syntax.strings {
            match *rule {
                StringRule::Quoted {
                    open,
                    close,
                    escapes,
                    multiline,
                } => {
                    if rest.starts_with(open) {
                        self.state = LexState::Str {
                            close: close.to_string(),
                            escapes,
                            multiline,
                        };
                        return Some(open.len());
                    }
                }
                StringRule::Hashed {
                    prefixes,
                    min_hashes,
                    triple,
                } => {
                    if let Some(consumed) = self.open_hashed(line, i, prefixes, min_hashes, triple) {
                        return Some(consumed);
                    }
                }
                StringRule::CppRaw => {
                    if let Some(consumed) = self.open_cpp_raw(line, i) {
                        return Some(consumed);
                    }
                }
            }
        }
        None
    }

    fn open_hashed(
        &mut self,
        line: &str,
        i: usize,
        prefixes: &[&str],
        min_hashes: usize,
        triple: bool,
    ) -> Option<usize> {
        let rest = &line[i..];
        for prefix in prefixes {
            if !rest.starts_with(prefix) {
                continue;
            }
            if !prefix.is_empty() && !ident_before(line, i).is_empty() {
                continue;
            }
            let after = &rest[prefix.len()..];
            let hashes = after.chars().take_while(|c| *c == '#').count();
            if hashes < min_hashes {
                continue;
            }
            let body = &after[hashes..];
            let fence = "#".repeat(hashes);
            if triple && body.starts_with("\"\"\"") {
                self.state = LexState::Str {
                    close: format!("\"\"\"{}", fence),
                    escapes: false,
                    multiline: true,
                };
                return Some(prefix.len() + hashes + 3);
            }
            if body.starts_with('"') {
                self.state = LexState::Str {
                    close: format!("\"{}", fence),
                    escapes: false,
                    multiline: true,
                };
                return Some(prefix.len() + hashes + 1);
            }
        }
        None
    }

    fn open_cpp_raw(&mut self, line: &str, i: usize) -> Option<usize> {
        let rest = &line[i..];
        if !rest.starts_with("R\"") {
            return None;
        }
        if !matches!(ident_before(line, i), "" | "u8" | "L" | "u" | "U") {
            return None;
        }
        let after = &rest[2..];
        let paren = after.find('(')?;
        let delim = &after[..paren];
        if delim.len() > 16 || delim.contains(|c: char| c.is_whitespace() || c == ')' || c == '\\') {
            return None;
        }
        self.state = LexState::Str {
            close: format!("){}\"", delim),
            escapes: false,
            multiline: true,
        };
        Some(2 + paren + 1)
    }
}

/// Byte length of a character literal starting at `rest`, if it is one.
fn char_literal_len(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices().skip(1);
    let (_, first) = chars.next()?;
    if first == '\\' {
        // '\n', '\'', '\u{1F600}', '\x7f'
        for (offset, c) in rest.char_indices().skip(3).take(10) {
            if c == '\'' {
                return Some(offset + 1);
            }
        }
        return None;
    }
    if first == '\'' {
        return None;
    }
    match chars.next() {
        Some((offset, '\'')) => Some(offset + 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static C_LIKE: Syntax = Syntax {
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        nested_comments: false,
        strings: &[
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

    static RUSTY: Syntax = Syntax {
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        nested_comments: true,
        strings: &[
            StringRule::Hashed {
                prefixes: &["br", "r"],
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

    fn code(lexer: &mut Lexer, line: &str) -> String {
        lexer.code_text(line)
    }

    #[test]
    fn test_strings_and_comments_hidden() {
        let mut lexer = Lexer::new(&C_LIKE);
        assert_eq!(code(&mut lexer, r#"a("{", '}') // }"#), "a(, ) ");
        assert!(lexer.in_code());
    }

    #[test]
    fn test_escaped_quote() {
        let mut lexer = Lexer::new(&C_LIKE);
        assert_eq!(code(&mut lexer, r#"x = "a\"{"; {"#), "x = ; {");
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let mut lexer = Lexer::new(&C_LIKE);
        assert_eq!(code(&mut lexer, "a /* {"), "a ");
        assert!(!lexer.in_code());
        assert_eq!(code(&mut lexer, "} */ b"), " b");
        assert!(lexer.in_code());
    }

    #[test]
    fn test_single_line_string_resets() {
        let mut lexer = Lexer::new(&C_LIKE);
        code(&mut lexer, "x = \"unterminated {");
        assert!(lexer.in_code());
        assert_eq!(code(&mut lexer, "}"), "}");
    }

    #[test]
    fn test_nested_block_comments() {
        let mut lexer = Lexer::new(&RUSTY);
        assert_eq!(code(&mut lexer, "a /* x /* y */ still { */ b"), "a  b");
    }

    #[test]
    fn test_raw_string_with_hashes() {
        let mut lexer = Lexer::new(&RUSTY);
        assert_eq!(code(&mut lexer, r###"let s = r#"a "} quote"#;"###), "let s = ;");
        assert_eq!(code(&mut lexer, r#"let t = br"\"; {"#), "let t = ; {");
    }

    #[test]
    fn test_raw_prefix_needs_word_boundary() {
        let mut lexer = Lexer::new(&RUSTY);
        // `bar"` is an identifier followed by a normal string
        assert_eq!(code(&mut lexer, r#"bar"x{" y"#), "bar y");
    }

    #[test]
    fn test_char_literal_vs_lifetime() {
        let mut lexer = Lexer::new(&RUSTY);
        assert_eq!(code(&mut lexer, "let c = '{';"), "let c = ;");
        assert_eq!(code(&mut lexer, r"let c = '\'';"), "let c = ;");
        assert_eq!(code(&mut lexer, "fn f<'a>(x: &'a str) {"), "fn f<'a>(x: &'a str) {");
    }

    #[test]
    fn test_multiline_string_state() {
        let mut lexer = Lexer::new(&RUSTY);
        code(&mut lexer, "let s = \"line one {");
        assert!(matches!(lexer.state(), LexState::Str { .. }));
        assert_eq!(code(&mut lexer, "end\" }"), " }");
    }

    #[test]
    fn test_cpp_raw_string() {
        static CPP: Syntax = Syntax {
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
            char_literals: false,
            hash_attributes: false,
        };
        let mut lexer = Lexer::new(&CPP);
        assert_eq!(code(&mut lexer, r#"auto s = R"x( "{" )x"; {"#), "auto s = ; {");
        assert_eq!(code(&mut lexer, r#"auto t = u8R"(a)"; }"#), "auto t = u8; }");
    }
}
