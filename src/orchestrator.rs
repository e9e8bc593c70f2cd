//! Parallel batch scanning.
//!
//! The orchestrator fans files out over a bounded rayon pool. Every input
//! yields exactly one outcome: a `ParsedFile` or a file-scoped `ScanError`.
//! A failure in one file, including a panic inside a scanner, never aborts
//! its siblings.

use std::collections::HashMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::lang::Language;
use crate::model::ParsedFile;
use crate::parser::Registry;

/// One input to a batch: raw bytes plus an optional language tag.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub bytes: Vec<u8>,
    /// Explicit language; when absent it is resolved from the extension.
    pub language: Option<Language>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Read a file from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let bytes = fs::read(path).map_err(|e| ScanError::io(display.clone(), e))?;
        Ok(Self::new(display, bytes))
    }
}

/// Outcomes of a batch scan. Order is unspecified until `sort_by_path`.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub files: Vec<ParsedFile>,
    pub errors: Vec<ScanError>,
}

impl BatchResult {
    /// Order files and errors by path.
    pub fn sort_by_path(&mut self) {
        self.files.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        self.errors
            .sort_by(|a, b| a.path().unwrap_or("").cmp(b.path().unwrap_or("")));
    }

    /// Number of inputs the batch accounted for.
    pub fn total(&self) -> usize {
        self.files.len() + self.errors.len()
    }

    pub fn total_declarations(&self) -> usize {
        self.files.iter().map(|f| f.total_declarations()).sum()
    }

    /// Whether any file scanned with degraded results.
    pub fn has_warnings(&self) -> bool {
        self.files.iter().any(|f| !f.warnings.is_empty())
    }
}

type Cache = RwLock<HashMap<(String, Language), ParsedFile>>;

/// Routes files to scanners on a bounded worker pool.
pub struct Orchestrator {
    config: ScanConfig,
    registry: Registry,
    pool: rayon::ThreadPool,
    cache: Option<Cache>,
}

impl Orchestrator {
    /// Create an orchestrator with every built-in scanner.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let registry = Registry::new(&config);
        Self::with_registry(config, registry)
    }

    /// Create an orchestrator around an existing registry.
    pub fn with_registry(config: ScanConfig, registry: Registry) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("declscan-worker-{}", i))
            .build()
            .map_err(|e| ScanError::config(format!("cannot start worker pool: {}", e)))?;
        let cache = config.cache.then(|| RwLock::new(HashMap::new()));
        Ok(Self {
            config,
            registry,
            pool,
            cache,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Read and scan files from disk.
    pub fn scan_paths(&self, paths: &[PathBuf]) -> BatchResult {
        let progress = self.progress_bar(paths.len());
        let outcomes: Vec<Result<ParsedFile>> = self.pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let outcome = SourceFile::read(path).and_then(|source| self.scan_source(&source));
                    progress.inc(1);
                    outcome
                })
                .collect()
        });
        progress.finish_and_clear();
        collect_outcomes(outcomes)
    }

    /// Scan in-memory sources.
    pub fn scan_sources(&self, sources: Vec<SourceFile>) -> BatchResult {
        let progress = self.progress_bar(sources.len());
        let outcomes: Vec<Result<ParsedFile>> = self.pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    let outcome = self.scan_source(source);
                    progress.inc(1);
                    outcome
                })
                .collect()
        });
        progress.finish_and_clear();
        collect_outcomes(outcomes)
    }

    /// Scan a single source on the calling thread.
    pub fn scan_source(&self, source: &SourceFile) -> Result<ParsedFile> {
        let outcome = self.try_scan(source);
        if let Err(e) = &outcome {
            warn!(kind = e.kind(), "{}", e);
        }
        outcome
    }

    fn try_scan(&self, source: &SourceFile) -> Result<ParsedFile> {
        let path = source.path.as_str();
        let content = std::str::from_utf8(&source.bytes).map_err(|e| ScanError::Decode {
            path: path.to_string(),
            offset: e.valid_up_to(),
        })?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let language = match source.language {
            Some(language) => language,
            None => self.registry.language_for_path(Path::new(path))?,
        };

        let key = (path.to_string(), language);
        if let Some(hit) = self.cached(&key) {
            debug!(path, "cache hit");
            return Ok(hit);
        }

        // Scanner construction runs inside the guard too; a faulty factory
        // fails only this file.
        let with_imports = self.config.extract_imports;
        let parsed = panic::catch_unwind(AssertUnwindSafe(|| {
            self.registry
                .scanner(language)
                .map(|scanner| scanner.parse(path, content, with_imports))
        }))
        .map_err(|payload| ScanError::Internal {
            path: path.to_string(),
            message: panic_message(payload.as_ref()),
        })?
        .ok_or_else(|| ScanError::UnsupportedLanguage {
            path: path.to_string(),
            extension: language.name().to_string(),
        })?;

        for warning in &parsed.warnings {
            warn!(path, "{}", warning);
        }
        debug!(
            path,
            language = %language,
            declarations = parsed.total_declarations(),
            "scanned"
        );

        Ok(self.remember(key, parsed))
    }

    fn cached(&self, key: &(String, Language)) -> Option<ParsedFile> {
        let cache = self.cache.as_ref()?;
        let guard = cache.read().unwrap_or_else(|e| e.into_inner());
        guard.get(key).cloned()
    }

    /// Insert if absent; a concurrent scan of the same key keeps the first
    /// stored result.
    fn remember(&self, key: (String, Language), parsed: ParsedFile) -> ParsedFile {
        match &self.cache {
            Some(cache) => {
                let mut guard = cache.write().unwrap_or_else(|e| e.into_inner());
                guard.entry(key).or_insert(parsed).clone()
            }
            None => parsed,
        }
    }

    /// Number of memoized results.
    pub fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .map(|c| c.read().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} files") {
            bar.set_style(style);
        }
        bar
    }
}

fn collect_outcomes(outcomes: Vec<Result<ParsedFile>>) -> BatchResult {
    let mut batch = BatchResult::default();
    for outcome in outcomes {
        match outcome {
            Ok(file) => batch.files.push(file),
            Err(e) => batch.errors.push(e),
        }
    }
    batch
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scanner panicked".to_string()
    }
}
