//! Language-agnostic scanning interface for declaration extraction.
//!
//! This module provides:
//! - `Scanner` trait: Abstract interface for language scanners
//! - `Registry`: Factory-based scanner lookup by language and file extension
//! - The shared machinery every scanner is built from (lexer, resolver,
//!   collector, pattern engine)

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use once_cell::sync::OnceCell;

use crate::config::{Limits, ScanConfig};
use crate::error::{Result, ScanError};
use crate::lang::Language;
use crate::model::{Declaration, ParsedFile};

pub mod collector;
pub mod engine;
pub mod imports;
pub mod languages;
pub mod lexer;
pub mod resolver;

/// Declarations and degradation notes from one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub declarations: Vec<Declaration>,
    pub warnings: Vec<String>,
}

/// Scanner trait for extracting declarations and imports.
pub trait Scanner: Send + Sync {
    /// Return the language this scanner handles.
    fn language(&self) -> Language;

    /// Extract the declaration tree from source text.
    fn scan(&self, content: &str) -> ScanOutput;

    /// Extract referenced module names, deduplicated in first-seen order.
    fn imports(&self, content: &str) -> Vec<String>;

    /// Scan a file's content into a `ParsedFile`.
    fn parse(&self, file_path: &str, content: &str, with_imports: bool) -> ParsedFile {
        let output = self.scan(content);
        let mut parsed = ParsedFile::empty(file_path, self.language());
        parsed.content = content.to_string();
        parsed.declarations = output.declarations;
        parsed.warnings = output.warnings;
        if with_imports {
            parsed.imports = self.imports(content);
        }
        parsed
    }
}

/// Factory function type for creating scanner instances.
pub type ScannerFactory = fn(&Limits) -> Box<dyn Scanner>;

/// Maps extensions to languages and languages to scanners.
///
/// Scanners are built on first use and shared afterwards.
pub struct Registry {
    limits: Limits,
    overrides: BTreeMap<String, Language>,
    factories: HashMap<Language, ScannerFactory>,
    scanners: HashMap<Language, OnceCell<Box<dyn Scanner>>>,
}

impl Registry {
    /// Create a registry with every built-in language.
    pub fn new(config: &ScanConfig) -> Self {
        let mut registry = Self::empty(config);
        languages::register_all(&mut registry);
        registry
    }

    /// Create a registry with no languages.
    pub fn empty(config: &ScanConfig) -> Self {
        Self {
            limits: config.limits,
            overrides: config
                .extension_overrides
                .iter()
                .map(|(ext, lang)| (ext.trim_start_matches('.').to_lowercase(), *lang))
                .collect(),
            factories: HashMap::new(),
            scanners: HashMap::new(),
        }
    }

    /// Register (or replace) the scanner factory for a language.
    pub fn register(&mut self, language: Language, factory: ScannerFactory) {
        self.factories.insert(language, factory);
        self.scanners.insert(language, OnceCell::new());
    }

    /// Languages with a registered scanner.
    pub fn languages(&self) -> Vec<Language> {
        let mut langs: Vec<Language> = self.factories.keys().copied().collect();
        langs.sort();
        langs
    }

    /// Resolve the language of a path from its extension.
    pub fn language_for_path(&self, path: &Path) -> Result<Language> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        self.overrides
            .get(&ext)
            .copied()
            .or_else(|| Language::from_extension(&ext))
            .filter(|lang| self.factories.contains_key(lang))
            .ok_or_else(|| ScanError::UnsupportedLanguage {
                path: path.display().to_string(),
                extension: ext,
            })
    }

    /// Get the scanner for a language, building it on first use.
    pub fn scanner(&self, language: Language) -> Option<&dyn Scanner> {
        let factory = self.factories.get(&language)?;
        let cell = self.scanners.get(&language)?;
        Some(cell.get_or_init(|| factory(&self.limits)).as_ref())
    }

    /// Get the scanner for a path's extension.
    pub fn scanner_for_path(&self, path: &Path) -> Result<&dyn Scanner> {
        let language = self.language_for_path(path)?;
        self.scanner(language).ok_or_else(|| ScanError::UnsupportedLanguage {
            path: path.display().to_string(),
            extension: language.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeclarationKind;

    struct MockScanner;

    impl Scanner for MockScanner {
        fn language(&self) -> Language {
            Language::R
        }

        fn scan(&self, _content: &str) -> ScanOutput {
            ScanOutput {
                declarations: vec![Declaration::new(DeclarationKind::Function, "mock", 1, 1).unwrap()],
                warnings: Vec::new(),
            }
        }

        fn imports(&self, _content: &str) -> Vec<String> {
            vec!["stats".to_string()]
        }
    }

    fn mock_factory(_limits: &Limits) -> Box<dyn Scanner> {
        Box::new(MockScanner)
    }

    #[test]
    fn test_registry() {
        let mut registry = Registry::new(&ScanConfig::default());
        registry.register(Language::R, mock_factory);

        let scanner = registry.scanner_for_path(Path::new("analysis.R")).unwrap();
        assert_eq!(scanner.language(), Language::R);

        let parsed = scanner.parse("analysis.R", "x <- 1", true);
        assert_eq!(parsed.declarations.len(), 1);
        assert_eq!(parsed.imports, vec!["stats".to_string()]);
    }

    #[test]
    fn test_all_languages_registered() {
        let registry = Registry::new(&ScanConfig::default());
        assert_eq!(registry.languages(), Language::ALL.to_vec());
        for lang in Language::ALL {
            let scanner = registry.scanner(lang).unwrap();
            assert_eq!(scanner.language(), lang);
        }
    }

    #[test]
    fn test_scanner_is_memoized() {
        let registry = Registry::new(&ScanConfig::default());
        let a = registry.scanner(Language::Rust).unwrap() as *const dyn Scanner as *const ();
        let b = registry.scanner(Language::Rust).unwrap() as *const dyn Scanner as *const ();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_extension() {
        let registry = Registry::new(&ScanConfig::default());
        let err = registry.language_for_path(Path::new("data.csv")).unwrap_err();
        assert_eq!(err.kind(), "unsupported_language");

        let empty = Registry::empty(&ScanConfig::default());
        assert!(empty.scanner_for_path(Path::new("main.rs")).is_err());
    }

    #[test]
    fn test_extension_override() {
        let mut config = ScanConfig::default();
        config.extension_overrides.insert(".inc".to_string(), Language::Php);
        let registry = Registry::new(&config);
        assert_eq!(registry.language_for_path(Path::new("header.INC")).unwrap(), Language::Php);
    }
}
