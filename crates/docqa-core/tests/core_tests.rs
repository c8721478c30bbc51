use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

use docqa_core::config::{resolve_with_base, Config, EmbeddingProvider, Settings};
use docqa_core::loader::{load_document, TextLoader};
use docqa_core::traits::DocumentLoader;
use docqa_core::types::Document;
use docqa_core::Error;

#[test]
fn text_loader_splits_pages_on_form_feed() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("doc.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    write!(f, "page one\u{0c}page two\u{0c}page three\u{0c}").unwrap();

    let pages = TextLoader::new().load(&file_path).expect("load");

    assert_eq!(pages, vec!["page one", "page two", "page three"], "trailing form feed adds no page");
}

#[test]
fn text_loader_single_page_without_form_feed() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("a.txt");
    fs::write(&file_path, "Short text").unwrap();

    let doc = load_document(&TextLoader::new(), &file_path).expect("load");

    assert_eq!(doc.page_count, 1);
    assert_eq!(doc.text, "Short text");
    assert!(doc.source.ends_with("a.txt"));
}

#[test]
fn text_loader_missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = TextLoader::new().load(&tmp.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
}

#[test]
fn text_loader_tolerates_invalid_utf8() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("bin.txt");
    fs::write(&file_path, [b'o', b'k', 0xff, b'!']).unwrap();

    let pages = TextLoader::new().load(&file_path).expect("lossy load");

    assert_eq!(pages.len(), 1);
    assert!(pages[0].starts_with("ok"));
    assert!(pages[0].ends_with('!'));
}

#[test]
fn text_loader_rejects_pdf_files() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("report.pdf");
    fs::write(&file_path, b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<< /Type /Catalog >>\nendobj\n").unwrap();

    let err = load_document(&TextLoader::new(), &file_path).unwrap_err();

    match err {
        Error::InvalidInput(msg) => assert!(msg.contains("PDF"), "got {msg}"),
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn text_loader_rejects_binary_content() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("notes.txt");
    fs::write(&file_path, [b'a', b'b', 0, 0, 1, 2, b'c']).unwrap();

    let err = TextLoader::new().load(&file_path).unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)), "got {err:?}");
}

#[test]
fn document_from_pages_joins_with_paragraph_break() {
    let doc = Document::from_pages("mem", &["alpha", "bravo", "charlie"]);
    assert_eq!(doc.text, "alpha\n\nbravo\n\ncharlie");
    assert_eq!(doc.page_count, 3);
    assert!(!doc.is_blank());
    assert!(Document::new("mem", " \n\t").is_blank());
}

#[test]
fn settings_defaults_without_config_files() {
    let tmp = TempDir::new().unwrap();
    let settings = Config::load_from(tmp.path(), "none").unwrap().settings().expect("defaults");

    assert_eq!(settings.chunking.chunk_size, 1000);
    assert_eq!(settings.chunking.chunk_overlap, 200);
    assert_eq!(settings.retrieval.k, 4);
    assert_eq!(settings.generation.model, "gpt-4o-mini");
    assert_eq!(settings.embedding.provider, EmbeddingProvider::Openai);
    assert_eq!(settings.retry.max_attempts, 3);
}

#[test]
fn env_specific_file_overrides_base_file() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "config.toml", "[retrieval]\nk = 6\n[chunking]\nchunk_size = 500\nchunk_overlap = 50\n");
    write_config(tmp.path(), "config.test.toml", "[retrieval]\nk = 8\n[embedding]\nprovider = \"hash\"\n");

    let config = Config::load_from(tmp.path(), "test").unwrap();
    let settings = config.settings().expect("settings");

    assert_eq!(settings.retrieval.k, 8, "env file wins over base file");
    assert_eq!(settings.chunking.chunk_size, 500, "base file wins over defaults");
    assert_eq!(settings.chunking.chunk_overlap, 50);
    assert_eq!(settings.embedding.provider, EmbeddingProvider::Hash);
    assert_eq!(config.get::<usize>("retrieval.k").unwrap(), 8);
}

#[test]
fn invalid_chunking_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "config.toml", "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n");

    let err = Config::load_from(tmp.path(), "none").unwrap().settings().unwrap_err();

    assert!(matches!(err, Error::InvalidConfig(_)), "got {err:?}");
}

#[test]
fn settings_validate_rejects_zero_attempts() {
    let mut settings = Settings::default();
    settings.retry.max_attempts = 0;
    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn resolve_with_base_keeps_absolute_paths() {
    let base = Path::new("/srv/docs");
    assert_eq!(resolve_with_base(base, "manual.txt"), base.join("manual.txt"));
    assert_eq!(resolve_with_base(base, "/tmp/x.txt"), Path::new("/tmp/x.txt"));
}

#[test]
fn status_mapping_matches_retry_semantics() {
    assert!(matches!(Error::from_status(429, "slow down"), Error::RateLimited(_)));
    assert!(Error::from_status(429, "").is_transient());
    assert!(Error::from_status(503, "").is_transient());
    assert!(!Error::from_status(401, "bad key").is_transient());
    assert!(matches!(Error::from_status(400, "too long"), Error::InvalidInput(_)));
}

#[test]
fn root_cause_looks_through_phase_wrappers() {
    let err = Error::query_failed(Error::DimensionMismatch { expected: 3, actual: 2 });
    assert!(matches!(err.root_cause(), Error::DimensionMismatch { .. }));
    assert!(err.is_fatal());
    assert!(!Error::query_failed(Error::RateLimited(String::new())).is_fatal());
}

fn write_config(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}
