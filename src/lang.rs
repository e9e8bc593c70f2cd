//! Language tags and extension lookup.

use std::fmt;
use std::path::Path;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// A source language with a scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Rust,
    Go,
    JavaScript,
    TypeScript,
    C,
    Cpp,
    Java,
    CSharp,
    Php,
    Swift,
    Julia,
    R,
}

static EXTENSIONS: phf::Map<&'static str, Language> = phf_map! {
    "py" => Language::Python,
    "pyi" => Language::Python,
    "rs" => Language::Rust,
    "go" => Language::Go,
    "js" => Language::JavaScript,
    "jsx" => Language::JavaScript,
    "mjs" => Language::JavaScript,
    "cjs" => Language::JavaScript,
    "ts" => Language::TypeScript,
    "tsx" => Language::TypeScript,
    "mts" => Language::TypeScript,
    "cts" => Language::TypeScript,
    "c" => Language::C,
    "h" => Language::C,
    "cpp" => Language::Cpp,
    "cc" => Language::Cpp,
    "cxx" => Language::Cpp,
    "hpp" => Language::Cpp,
    "hxx" => Language::Cpp,
    "hh" => Language::Cpp,
    "java" => Language::Java,
    "cs" => Language::CSharp,
    "php" => Language::Php,
    "swift" => Language::Swift,
    "jl" => Language::Julia,
    "r" => Language::R,
};

impl Language {
    /// Every supported language, in display order.
    pub const ALL: [Language; 13] = [
        Language::Python,
        Language::Rust,
        Language::Go,
        Language::JavaScript,
        Language::TypeScript,
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::CSharp,
        Language::Php,
        Language::Swift,
        Language::Julia,
        Language::R,
    ];

    /// Look up a language by file extension (with or without the leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        EXTENSIONS.get(ext.as_str()).copied()
    }

    /// Look up a language from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ScanError::UnsupportedLanguage {
                path: path.display().to_string(),
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
    }

    /// Parse a language tag such as `"rust"` or `"c++"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "python" => Some(Language::Python),
            "rust" => Some(Language::Rust),
            "go" | "golang" => Some(Language::Go),
            "javascript" | "js" => Some(Language::JavaScript),
            "typescript" | "ts" => Some(Language::TypeScript),
            "c" => Some(Language::C),
            "cpp" | "c++" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            "csharp" | "c#" => Some(Language::CSharp),
            "php" => Some(Language::Php),
            "swift" => Some(Language::Swift),
            "julia" => Some(Language::Julia),
            "r" => Some(Language::R),
            _ => None,
        }
    }

    /// Canonical tag.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Julia => "julia",
            Language::R => "r",
        }
    }

    /// Extensions mapped to this language.
    pub fn extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = EXTENSIONS
            .entries()
            .filter(|(_, lang)| *lang == self)
            .map(|(ext, _)| *ext)
            .collect();
        exts.sort_unstable();
        exts
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
