//! Integration tests for batch scanning.
//!
//! These tests run the orchestrator over real files on disk and check that
//! per-file failures stay isolated.

use std::fs;
use std::path::PathBuf;

use declscan::cli::collect_files;
use declscan::report::json_report;
use declscan::{
    merge_declarations, Language, Limits, Orchestrator, Registry, ScanConfig, ScanOutput, Scanner, SourceFile,
};
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

#[test]
fn test_invalid_encoding_fails_only_that_file() {
    let dir = TempDir::new().unwrap();
    let mut paths = Vec::new();
    for i in 0..5 {
        let path = dir.path().join(format!("mod{}.py", i));
        fs::write(&path, format!("def handler_{}():\n    return {}\n", i, i)).unwrap();
        paths.push(path);
    }
    let bad = dir.path().join("bad.go");
    fs::write(&bad, [b'p', b'a', b'c', 0xc3, 0x28, b'\n']).unwrap();
    paths.push(bad);

    let orchestrator = Orchestrator::new(ScanConfig::default()).unwrap();
    let mut batch = orchestrator.scan_paths(&paths);
    batch.sort_by_path();

    assert_eq!(batch.files.len(), 5);
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].kind(), "decode_error");
    assert!(batch.errors[0].path().unwrap().ends_with("bad.go"));

    for (i, file) in batch.files.iter().enumerate() {
        assert_eq!(file.language, Language::Python);
        assert_eq!(file.declarations.len(), 1);
        assert_eq!(file.declarations[0].name, format!("handler_{}", i));
    }
}

#[test]
fn test_single_worker_matches_many() {
    let files: Vec<PathBuf> = fs::read_dir(testdata_path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();

    let serial = Orchestrator::new(ScanConfig {
        workers: 1,
        ..ScanConfig::default()
    })
    .unwrap();
    let parallel = Orchestrator::new(ScanConfig {
        workers: 8,
        ..ScanConfig::default()
    })
    .unwrap();

    let mut a = serial.scan_paths(&files);
    let mut b = parallel.scan_paths(&files);
    a.sort_by_path();
    b.sort_by_path();

    assert!(a.errors.is_empty(), "{:?}", a.errors);
    assert_eq!(a.files.len(), files.len());
    for (x, y) in a.files.iter().zip(&b.files) {
        assert_eq!(x.file_path, y.file_path);
        assert_eq!(x.declarations, y.declarations);
        assert_eq!(x.imports, y.imports);
    }
}

#[test]
fn test_project_walk() {
    let root = testdata_path().join("project");
    let config = ScanConfig::default();
    let files = collect_files(&root, &config).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["src/helper.py", "src/latin1.rs", "src/main.rs"]);

    let orchestrator = Orchestrator::new(config).unwrap();
    let mut batch = orchestrator.scan_paths(&files);
    batch.sort_by_path();
    assert_eq!(batch.files.len(), 2);
    assert_eq!(batch.errors.len(), 1);

    let report = json_report(&root.to_string_lossy(), &batch);
    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.files[0].file_path, "src/helper.py");
    assert_eq!(report.files[1].file_path, "src/main.rs");
    assert_eq!(report.errors[0].file, "src/latin1.rs");
    assert_eq!(report.errors[0].kind, "decode_error");
}

#[test]
fn test_unsupported_extension_is_reported() {
    let orchestrator = Orchestrator::new(ScanConfig::default()).unwrap();
    let batch = orchestrator.scan_sources(vec![
        SourceFile::new("data.csv", "a,b\n1,2\n"),
        SourceFile::new("app.ts", "export function run(): void {}\n"),
    ]);
    assert_eq!(batch.files.len(), 1);
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].kind(), "unsupported_language");
}

struct ExplodingScanner;

impl Scanner for ExplodingScanner {
    fn language(&self) -> Language {
        Language::Php
    }

    fn scan(&self, content: &str) -> ScanOutput {
        if content.contains("explode") {
            panic!("scanner exploded");
        }
        ScanOutput::default()
    }

    fn imports(&self, _content: &str) -> Vec<String> {
        Vec::new()
    }
}

fn exploding_factory(_limits: &Limits) -> Box<dyn Scanner> {
    Box::new(ExplodingScanner)
}

#[test]
fn test_scanner_panic_is_isolated() {
    let config = ScanConfig {
        workers: 2,
        ..ScanConfig::default()
    };
    let mut registry = Registry::new(&config);
    registry.register(Language::Php, exploding_factory);
    let orchestrator = Orchestrator::with_registry(config, registry).unwrap();

    let mut sources = vec![SourceFile::new("a.php", "<?php explode();")];
    for i in 0..6 {
        sources.push(SourceFile::new(format!("ok{}.php", i), "<?php echo 1;"));
        sources.push(SourceFile::new(format!("ok{}.rs", i), "fn ok() {}\n"));
    }

    let batch = orchestrator.scan_sources(sources);
    assert_eq!(batch.total(), 13);
    assert_eq!(batch.files.len(), 12);
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].kind(), "internal_scanner_error");
    assert_eq!(batch.errors[0].path(), Some("a.php"));
}

#[test]
fn test_merge_with_second_scan() {
    // A second extractor that only knows about one method, with a docstring
    let registry = Registry::new(&ScanConfig::default());
    let source = "class Greeter {\n  hello() {\n    return 1;\n  }\n}\n";
    let primary = registry.scanner(Language::JavaScript).unwrap().scan(source).declarations;

    let mut secondary = primary.clone();
    secondary[0].children[0].docstring = Some("Say hello.".to_string());
    secondary[0].children[0].children.clear();

    let merged = merge_declarations(primary.clone(), secondary);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].children.len(), primary[0].children.len());
    assert_eq!(merged[0].children[0].docstring.as_deref(), Some("Say hello."));
}
