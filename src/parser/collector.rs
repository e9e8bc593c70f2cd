//! Docstring and modifier collection.
//!
//! Doc comments and attribute lines that precede a declaration are buffered
//! in `Pending` until the next declaration claims them. Python-style
//! languages take their docstring from a string literal opening the body.

use lazy_static::lazy_static;
use regex::Regex;

use super::lexer::is_ident_char;

lazy_static! {
    static ref STRING_DOC_OPEN: Regex = Regex::new(r#"^(?:[rRuUbBfF]{1,2})?("""|'''|"|')"#).unwrap();
    static ref INLINE_AT: Regex = Regex::new(r"@[A-Za-z_][\w.]*(?:\([^)]*\))?").unwrap();
    static ref INLINE_BRACKET: Regex = Regex::new(r"\[\[?[A-Za-z_][^\]]*\]\]?").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Where a language keeps documentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocStyle {
    /// Line prefixes that mark doc comments, such as `///` or `#'`.
    pub line_prefixes: &'static [&'static str],
    /// Block doc comment delimiters, such as `/**` and `*/`.
    pub block: Option<(&'static str, &'static str)>,
    /// Docstring is the first string literal of the body.
    pub body_string: bool,
    /// A triple-quoted string right before a declaration documents it.
    pub preceding_string: bool,
}

/// How attribute, annotation and decorator lines look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeStyle {
    None,
    /// `#[derive(Debug)]`
    Hash,
    /// `@decorator(args)`
    At,
    /// `[Serializable]`, `[[nodiscard]]`
    Bracket,
}

/// Doc text and modifiers waiting for the next declaration.
#[derive(Debug, Default, Clone)]
pub struct Pending {
    doc: Vec<String>,
    modifiers: Vec<String>,
}

impl Pending {
    pub fn push_doc(&mut self, text: String) {
        self.doc.push(text);
    }

    pub fn push_modifier(&mut self, text: String) {
        self.modifiers.push(text);
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_empty() && self.modifiers.is_empty()
    }

    pub fn clear(&mut self) {
        self.doc.clear();
        self.modifiers.clear();
    }

    /// Drain both buffers.
    pub fn take(&mut self) -> (Option<String>, Vec<String>) {
        let doc = if self.doc.is_empty() {
            None
        } else {
            let joined = self.doc.join("\n");
            let trimmed = joined.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        self.doc.clear();
        (doc, std::mem::take(&mut self.modifiers))
    }
}

impl DocStyle {
    /// Text of a single-line doc comment, without its marker.
    pub fn doc_line<'a>(&self, trimmed: &'a str) -> Option<&'a str> {
        self.line_prefixes.iter().find_map(|prefix| {
            let rest = trimmed.strip_prefix(prefix)?;
            // `////` and `//!!` are ordinary comments
            if prefix.len() >= 3 && rest.starts_with(prefix.chars().last().unwrap_or(' ')) {
                return None;
            }
            Some(rest.strip_prefix(' ').unwrap_or(rest).trim_end())
        })
    }

    /// Whether the line opens a block doc comment.
    pub fn starts_block_doc(&self, trimmed: &str) -> bool {
        match self.block {
            Some((open, close)) => {
                trimmed.starts_with(open) && !trimmed.starts_with(&format!("{}{}", open, &close[close.len() - 1..]))
            }
            None => false,
        }
    }

    /// Byte offset where code resumes after a block doc that opens and
    /// closes on `line`, when code follows it.
    pub fn code_after_block_doc(&self, line: &str) -> Option<usize> {
        let (open, close) = self.block?;
        let start = line.find(open)? + open.len();
        let end = start + line[start..].find(close)? + close.len();
        (!line[end..].trim().is_empty()).then_some(end)
    }

    /// Collect a block doc comment starting on `start`. Returns the cleaned
    /// text and the index of its last line.
    pub fn collect_block_doc(&self, lines: &[&str], start: usize, last: usize) -> (String, usize) {
        let Some((open, close)) = self.block else {
            return (String::new(), start);
        };
        let mut parts = Vec::new();
        let mut idx = start;
        while idx <= last {
            let mut text = lines[idx].trim();
            if idx == start {
                text = text.strip_prefix(open).unwrap_or(text);
            }
            let closes = text.find(close);
            if let Some(pos) = closes {
                text = &text[..pos];
            }
            let text = text.trim_start();
            let text = text.strip_prefix('*').map(|t| t.strip_prefix(' ').unwrap_or(t)).unwrap_or(text);
            parts.push(text.trim_end().to_string());
            if closes.is_some() {
                break;
            }
            idx += 1;
        }
        (clean_lines(&parts), idx.min(last))
    }
}

/// Collect a string literal that starts on line `start`, as used for body
/// docstrings and Julia's preceding doc strings. Returns the text and the
/// index of the line that closes it.
pub fn collect_string_doc(lines: &[&str], start: usize, last: usize) -> Option<(String, usize)> {
    let first = lines.get(start)?.trim_start();
    let quote = STRING_DOC_OPEN.captures(first)?.get(1)?;
    let delim = quote.as_str();
    let body = &first[quote.end()..];

    if let Some(pos) = body.find(delim) {
        return Some((body[..pos].trim().to_string(), start));
    }
    if delim.len() == 1 {
        return None;
    }

    let mut parts = vec![body.to_string()];
    for idx in start + 1..=last.min(lines.len().saturating_sub(1)) {
        let line = lines[idx];
        if let Some(pos) = line.find(delim) {
            parts.push(line[..pos].to_string());
            return Some((clean_lines(&parts), idx));
        }
        parts.push(line.to_string());
    }
    None
}

/// Locate and collect a docstring at the top of a body spanning
/// `from..=to`.
pub fn body_docstring(lines: &[&str], from: usize, to: usize) -> Option<String> {
    let to = to.min(lines.len().saturating_sub(1));
    let first = (from..=to).find(|&idx| !lines[idx].trim().is_empty())?;
    collect_string_doc(lines, first, to)
        .map(|(text, _)| text)
        .filter(|text| !text.is_empty())
}

/// Trim each line, drop leading and trailing blank lines, and join.
fn clean_lines(parts: &[String]) -> String {
    let trimmed: Vec<&str> = parts.iter().map(|p| p.trim()).collect();
    let start = trimmed.iter().position(|l| !l.is_empty()).unwrap_or(trimmed.len());
    let end = trimmed.iter().rposition(|l| !l.is_empty()).map(|i| i + 1).unwrap_or(start);
    trimmed[start..end.max(start)].join("\n")
}

impl AttributeStyle {
    /// Whether a trimmed line opens a standalone attribute.
    pub fn starts_attribute(&self, trimmed: &str) -> bool {
        match self {
            AttributeStyle::None => false,
            AttributeStyle::Hash => {
                if !trimmed.starts_with("#[") {
                    return false;
                }
                // `#[test] fn check() {}` carries its declaration
                let end = hash_attribute_spans(trimmed).last().map(|&(_, end)| end).unwrap_or(0);
                let rest = trimmed[end..].trim();
                rest.is_empty() || rest.starts_with("#[")
            }
            AttributeStyle::At => {
                let Some(rest) = trimmed.strip_prefix('@') else {
                    return false;
                };
                if !rest.starts_with(|c: char| c.is_alphabetic() || c == '_') || rest.starts_with("interface") {
                    return false;
                }
                // `@Override public void run()` carries its declaration
                let name_end = rest.find(|c: char| !(is_ident_char(c) || c == '.')).unwrap_or(rest.len());
                let tail = rest[name_end..].trim_start();
                tail.is_empty() || (tail.starts_with('(') && closing_paren_ends_line(tail))
            }
            AttributeStyle::Bracket => {
                let rest = trimmed.trim_start_matches('[');
                trimmed.starts_with('[')
                    && rest.starts_with(|c: char| c.is_alphabetic() || c == '_')
                    && (trimmed.ends_with(']') || bracket_balance(trimmed) > 0)
            }
        }
    }

    /// Collect an attribute starting on `start`, joining continuation lines
    /// while brackets stay open. Returns the normalized text and the index
    /// of the last line consumed.
    pub fn collect(&self, lines: &[&str], start: usize, last: usize) -> (String, usize) {
        let mut text = lines[start].trim().to_string();
        let mut idx = start;
        let limit = last.min(start + 20);
        while bracket_balance(&text) > 0 && idx < limit {
            idx += 1;
            text.push(' ');
            text.push_str(lines[idx].trim());
        }
        (normalize(&text), idx)
    }

    /// Byte length of the `#[...]` attributes that open `text` ahead of
    /// other code on the same line, including the whitespace after them.
    pub fn leading_len(&self, text: &str) -> usize {
        if *self != AttributeStyle::Hash {
            return 0;
        }
        match hash_attribute_spans(text).last() {
            Some(&(_, end)) if !text[end..].trim().is_empty() => text.len() - text[end..].trim_start().len(),
            _ => 0,
        }
    }

    /// Attributes written on the declaration line itself.
    pub fn inline(&self, prefix: &str) -> Vec<String> {
        let re: &Regex = match self {
            AttributeStyle::At => &INLINE_AT,
            AttributeStyle::Bracket => &INLINE_BRACKET,
            AttributeStyle::Hash => {
                return hash_attribute_spans(prefix)
                    .into_iter()
                    .map(|(start, end)| normalize(&prefix[start..end]))
                    .collect();
            }
            AttributeStyle::None => return Vec::new(),
        };
        re.find_iter(prefix)
            .map(|m| m.as_str())
            .filter(|m| !m.starts_with("@interface"))
            .map(normalize)
            .collect()
    }
}

fn closing_paren_ends_line(tail: &str) -> bool {
    match matching_close(tail, '(', ')') {
        Some(pos) => tail[pos + 1..].trim().is_empty(),
        None => true,
    }
}

/// Byte offset of the delimiter closing the `open` that starts `text`.
fn matching_close(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Byte ranges of the complete `#[...]` attributes at the start of `text`.
fn hash_attribute_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut pos = text.len() - text.trim_start().len();
    while text[pos..].starts_with("#[") {
        let Some(close) = matching_close(&text[pos + 1..], '[', ']') else {
            break;
        };
        let end = pos + close + 2;
        spans.push((pos, end));
        pos = text.len() - text[end..].trim_start().len();
    }
    spans
}

/// Open parentheses and square brackets. Braces are left out so a body
/// opened after an attribute is never joined into it.
fn bracket_balance(text: &str) -> i32 {
    text.chars().fold(0, |acc, c| match c {
        '(' | '[' => acc + 1,
        ')' | ']' => acc - 1,
        _ => acc,
    })
}

fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Keywords from `set` that appear as words in `text`.
pub fn keyword_modifiers(text: &str, set: &phf::Set<&'static str>) -> Vec<String> {
    text.split(|c: char| !is_ident_char(c))
        .filter(|word| set.contains(*word))
        .map(str::to_string)
        .collect()
}
