//! Import extraction.
//!
//! Each language gets a narrow line-based matcher that returns referenced
//! module names, deduplicated in first-seen order. Grouped imports expand to
//! one entry per member.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

/// Lines a single Rust `use` statement may span.
const MAX_USE_LINES: usize = 200;

/// Ordered, deduplicated import names.
#[derive(Debug, Default)]
struct ImportList {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl ImportList {
    fn add(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() && self.seen.insert(name.to_string()) {
            self.names.push(name.to_string());
        }
    }

    fn finish(self) -> Vec<String> {
        self.names
    }
}

/// Split on commas that are not nested inside braces.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Expand a grouped path such as `std::{fs, io::{Read, Write}}`.
///
/// `sep` is the path separator (`::` for Rust, `\` for PHP). `self` names
/// the group's prefix and `as` aliases are dropped.
fn expand_group(prefix: &str, tree: &str, sep: &str, out: &mut Vec<String>) {
    let tree = tree.trim();
    if tree.is_empty() {
        return;
    }
    let join = |head: &str| -> String {
        let head = head.trim().trim_end_matches(sep);
        match (prefix.is_empty(), head.is_empty()) {
            (true, _) => head.to_string(),
            (false, true) => prefix.to_string(),
            (false, false) => format!("{}{}{}", prefix, sep, head),
        }
    };

    if let Some(open) = tree.find('{') {
        let Some(close) = tree.rfind('}') else {
            return;
        };
        if close < open {
            return;
        }
        let base = join(&tree[..open]);
        for item in split_top_level(&tree[open + 1..close]) {
            expand_group(&base, item, sep, out);
        }
        return;
    }

    let item = tree.split(" as ").next().unwrap_or(tree).trim();
    if item == "self" {
        if !prefix.is_empty() {
            out.push(prefix.to_string());
        }
    } else {
        out.push(join(item));
    }
}

/// Rust `use` trees (joined across lines up to `;`) and `extern crate`.
pub fn rust(content: &str) -> Vec<String> {
    lazy_static! {
        static ref USE_RE: Regex = Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?use\s+(.*)$").unwrap();
        static ref EXTERN_CRATE_RE: Regex = Regex::new(r"^extern\s+crate\s+([A-Za-z_]\w*)").unwrap();
    }

    let mut imports = ImportList::default();
    let lines: Vec<&str> = content.lines().collect();
    let mut idx = 0;
    while idx < lines.len() {
        let trimmed = lines[idx].trim();
        idx += 1;
        if trimmed.starts_with("//") {
            continue;
        }
        if let Some(caps) = EXTERN_CRATE_RE.captures(trimmed) {
            imports.add(&caps[1]);
            continue;
        }
        let Some(caps) = USE_RE.captures(trimmed) else {
            continue;
        };
        let mut statement = caps[1].to_string();
        let first = idx;
        while !statement.contains(';') && idx < lines.len() && idx - first < MAX_USE_LINES {
            statement.push(' ');
            statement.push_str(lines[idx].trim());
            idx += 1;
        }
        let tree = statement.split(';').next().unwrap_or("");
        let tree = tree.trim().trim_start_matches("::");
        let mut expanded = Vec::new();
        expand_group("", tree, "::", &mut expanded);
        for name in &expanded {
            imports.add(name);
        }
    }
    imports.finish()
}

/// Go single imports and import blocks, with optional aliases.
pub fn go(content: &str) -> Vec<String> {
    lazy_static! {
        static ref SINGLE_RE: Regex = Regex::new(r#"^import\s+(?:[\w.]+\s+)?"([^"]+)""#).unwrap();
        static ref BLOCK_ITEM_RE: Regex = Regex::new(r#"^(?:[\w.]+\s+)?"([^"]+)""#).unwrap();
    }

    let mut imports = ImportList::default();
    let mut in_block = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if in_block {
            if trimmed.starts_with(')') {
                in_block = false;
            } else if let Some(caps) = BLOCK_ITEM_RE.captures(trimmed) {
                imports.add(&caps[1]);
            }
            continue;
        }
        if trimmed.starts_with("import") && trimmed[6..].trim_start().starts_with('(') {
            in_block = !trimmed.ends_with(')');
            // import ( "fmt" )
            for caps in BLOCK_ITEM_RE.captures_iter(trimmed[6..].trim_start().trim_start_matches('(').trim()) {
                imports.add(&caps[1]);
            }
            continue;
        }
        if let Some(caps) = SINGLE_RE.captures(trimmed) {
            imports.add(&caps[1]);
        }
    }
    imports.finish()
}

/// Python `import a.b, c as d` and `from x import y` (module only).
pub fn python(content: &str) -> Vec<String> {
    lazy_static! {
        static ref IMPORT_RE: Regex = Regex::new(r"^import\s+(.+)$").unwrap();
        static ref FROM_IMPORT_RE: Regex = Regex::new(r"^from\s+(\.*[\w.]*)\s+import\b").unwrap();
    }

    let mut imports = ImportList::default();
    let mut docstring: Option<&str> = None;

    for line in content.lines() {
        let trimmed = line.trim();

        // Skip triple-quoted string bodies
        if let Some(delim) = docstring {
            if trimmed.contains(delim) {
                docstring = None;
            }
            continue;
        }
        for delim in ["\"\"\"", "'''"] {
            if trimmed.starts_with(delim) && !trimmed[3..].contains(delim) {
                docstring = Some(delim);
            }
        }
        if docstring.is_some() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(caps) = FROM_IMPORT_RE.captures(trimmed) {
            imports.add(&caps[1]);
        } else if let Some(caps) = IMPORT_RE.captures(trimmed) {
            let names = caps[1].split('#').next().unwrap_or("");
            for item in names.split(',') {
                let module = item.split_whitespace().next().unwrap_or("");
                imports.add(module.trim_matches(|c| c == '(' || c == ')'));
            }
        }
    }
    imports.finish()
}

/// Blank out JS/TS comment lines so their contents are not matched.
fn strip_js_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_block = false;
    for line in content.lines() {
        let trimmed = line.trim_start();
        let is_comment = in_block || trimmed.starts_with("//") || trimmed.starts_with("/*");
        if trimmed.starts_with("/*") {
            in_block = true;
        }
        if in_block && line.contains("*/") {
            in_block = false;
        }
        if !is_comment {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// JavaScript and TypeScript: ES imports, re-exports, `require` and
/// dynamic `import()`.
pub fn javascript(content: &str) -> Vec<String> {
    lazy_static! {
        static ref FROM_RE: Regex = Regex::new(r#"(?m)^\s*(?:import|export)\b[^'";]*?\bfrom\s*['"]([^'"]+)['"]"#).unwrap();
        static ref BARE_RE: Regex = Regex::new(r#"(?m)^\s*import\s*['"]([^'"]+)['"]"#).unwrap();
        static ref REQUIRE_RE: Regex = Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();
        static ref DYNAMIC_RE: Regex = Regex::new(r#"\bimport\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();
    }

    let code = strip_js_comments(content);
    let mut found: Vec<(usize, &str)> = Vec::new();
    for re in [&*FROM_RE, &*BARE_RE, &*REQUIRE_RE, &*DYNAMIC_RE] {
        for caps in re.captures_iter(&code) {
            if let Some(m) = caps.get(1) {
                found.push((m.start(), m.as_str()));
            }
        }
    }
    found.sort_by_key(|(pos, _)| *pos);

    let mut imports = ImportList::default();
    for (_, name) in found {
        imports.add(name);
    }
    imports.finish()
}

/// Java `import` and `import static`.
pub fn java(content: &str) -> Vec<String> {
    lazy_static! {
        static ref IMPORT_RE: Regex = Regex::new(r"^\s*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;").unwrap();
    }
    collect_line_matches(content, &IMPORT_RE)
}

/// C# `using` directives, including `global`, `static` and aliases.
pub fn csharp(content: &str) -> Vec<String> {
    lazy_static! {
        static ref USING_RE: Regex =
            Regex::new(r"^\s*(?:global\s+)?using\s+(?:static\s+)?(?:\w+\s*=\s*)?([\w.]+)\s*;").unwrap();
    }
    collect_line_matches(content, &USING_RE)
}

/// C and C++ `#include`.
pub fn c_family(content: &str) -> Vec<String> {
    lazy_static! {
        static ref INCLUDE_RE: Regex = Regex::new(r#"^\s*#\s*include\s*[<"]([^>"]+)[>"]"#).unwrap();
    }
    collect_line_matches(content, &INCLUDE_RE)
}

/// Swift `import`, including kind-qualified imports.
pub fn swift(content: &str) -> Vec<String> {
    lazy_static! {
        static ref IMPORT_RE: Regex = Regex::new(
            r"^\s*(?:@\w+\s+)*import\s+(?:(?:typealias|struct|class|enum|protocol|let|var|func)\s+)?([\w.]+)"
        )
        .unwrap();
    }
    collect_line_matches(content, &IMPORT_RE)
}

/// PHP namespace `use` (with group expansion) and `require`/`include`.
pub fn php(content: &str) -> Vec<String> {
    lazy_static! {
        static ref USE_RE: Regex = Regex::new(r"^use\s+(?:function\s+|const\s+)?([^;]+);").unwrap();
        static ref REQUIRE_RE: Regex =
            Regex::new(r#"\b(?:require|include)(?:_once)?\s*\(?\s*['"]([^'"]+)['"]"#).unwrap();
    }

    let mut imports = ImportList::default();
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with('*') {
            continue;
        }
        // Only top-level `use`; indented `use` inside a class imports traits
        if let Some(caps) = USE_RE.captures(line) {
            let mut expanded = Vec::new();
            for item in split_top_level(&caps[1]) {
                expand_group("", item.trim().trim_start_matches('\\'), "\\", &mut expanded);
            }
            for name in &expanded {
                imports.add(name);
            }
        }
        for caps in REQUIRE_RE.captures_iter(line) {
            imports.add(&caps[1]);
        }
    }
    imports.finish()
}

/// Julia `using`/`import` lists; `using A: x, y` references `A`.
pub fn julia(content: &str) -> Vec<String> {
    lazy_static! {
        static ref USING_RE: Regex = Regex::new(r"^\s*(?:using|import)\s+(.+)$").unwrap();
    }

    let mut imports = ImportList::default();
    for line in content.lines() {
        let Some(caps) = USING_RE.captures(line) else {
            continue;
        };
        let list = caps[1].split('#').next().unwrap_or("");
        if let Some((module, _)) = list.split_once(':') {
            imports.add(module);
            continue;
        }
        for item in list.split(',') {
            imports.add(item.split(" as ").next().unwrap_or(item));
        }
    }
    imports.finish()
}

/// R `library`, `require`, `requireNamespace` and `source`.
pub fn r(content: &str) -> Vec<String> {
    lazy_static! {
        static ref LIBRARY_RE: Regex =
            Regex::new(r#"\b(?:library|require|requireNamespace)\s*\(\s*['"]?([\w.]+)['"]?"#).unwrap();
        static ref SOURCE_RE: Regex = Regex::new(r#"\bsource\s*\(\s*['"]([^'"]+)['"]"#).unwrap();
    }

    let mut imports = ImportList::default();
    for line in content.lines() {
        let code = line.split('#').next().unwrap_or("");
        let mut found: Vec<(usize, &str)> = LIBRARY_RE
            .captures_iter(code)
            .chain(SOURCE_RE.captures_iter(code))
            .filter_map(|caps| caps.get(1).map(|m| (m.start(), m.as_str())))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);
        for (_, name) in found {
            imports.add(name);
        }
    }
    imports.finish()
}

fn collect_line_matches(content: &str, re: &Regex) -> Vec<String> {
    let mut imports = ImportList::default();
    for line in content.lines() {
        if let Some(caps) = re.captures(line) {
            imports.add(&caps[1]);
        }
    }
    imports.finish()
}
