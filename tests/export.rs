//! Integration tests for annot2md.
//!
//! Every test runs inside its own temporary directory, passed as the working
//! directory to `export_in`, so relative PDF paths and page links are
//! deterministic regardless of where `cargo test` is launched from.
//!
//! Run with:
//!   cargo test --test export -- --nocapture

use annot2md::{
    export_in, export_json, load_config_file, parse_annotations, AnnotMdError, ExportConfig,
    ExportJob, LinkStyle,
};
use std::fs;
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("annot2md=debug")
        .with_test_writer()
        .try_init();
}

/// Write a fake extracted image and return its path.
fn scratch_image(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let tmp = dir.join("tmp");
    fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn image_json(path: &Path) -> String {
    format!(
        r#"[{{"type": "image", "imagePath": {}}}]"#,
        serde_json::to_string(path).unwrap()
    )
}

fn run(
    dir: &Path,
    job: &ExportJob,
    json: &str,
    config: &ExportConfig,
) -> Result<annot2md::ExportReport, AnnotMdError> {
    init_tracing();
    let annotations = parse_annotations(json)?;
    export_in(dir, job, &annotations, config)
}

// ── Text annotations ─────────────────────────────────────────────────────────

#[test]
fn heading_highlight_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let job = ExportJob::new("paper.pdf", 3).with_output_path("paper.md");
    let json = r####"[{"type": "highlight", "annotatedText": "Key idea", "comment": "###"}]"####;

    let report = run(dir.path(), &job, json, &ExportConfig::default()).unwrap();
    assert!(report.appended);
    assert_eq!(
        fs::read_to_string(dir.path().join("paper.md")).unwrap(),
        "### Key idea\n\n"
    );
}

#[test]
fn page_link_is_relative_to_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let job = ExportJob::new(dir.path().join("docs/paper.pdf"), 5)
        .with_output_path(dir.path().join("notes.md"));
    let json = r#"[{"type": "text", "comment": "See [](lnk) for context"}]"#;

    run(dir.path(), &job, json, &ExportConfig::default()).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.md")).unwrap(),
        "See [p5](docs/paper.pdf#page=5) for context\n\n"
    );
}

#[test]
fn only_first_placeholder_is_resolved() {
    let dir = tempfile::tempdir().unwrap();
    let job = ExportJob::new("paper.pdf", 2).with_output_path("paper.md");
    let json = r#"[{"type": "text", "comment": "[](lnk) and [](lnk)"}]"#;

    run(dir.path(), &job, json, &ExportConfig::default()).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("paper.md")).unwrap(),
        "[p2](paper.pdf#page=2) and [](lnk)\n\n"
    );
}

#[test]
fn mixed_batch_keeps_input_order_and_skips_unknown_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let job = ExportJob::new("paper.pdf", 1).with_output_path("paper.md");
    let json = r###"[
        {"type": "highlight", "annotatedText": "Results", "comment": "##"},
        {"type": "ink", "points": [[0, 0], [1, 1]]},
        {"type": "highlight", "annotatedText": "p < 0.05", "comment": "weak\\\\effect"},
        {"type": "text", "comment": "Check “table 2”"}
    ]"###;

    let report = run(dir.path(), &job, json, &ExportConfig::default()).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("paper.md")).unwrap(),
        "## Results\n\np < 0.05\n\nweak<br>effect\n\nCheck table 2\n\n"
    );
    assert_eq!(report.output.stats.ignored, 1);
    assert_eq!(report.output.stats.highlights, 2);
    assert_eq!(report.output.stats.notes, 1);
}

#[test]
fn odd_records_do_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let job = ExportJob::new("paper.pdf", 1).with_output_path("paper.md");
    let json = r#"[
        {"type": "ink", "comment": {"rich": true}},
        {"type": 5},
        {"type": "text", "kind": "image", "comment": "kept", "annotatedText": 7}
    ]"#;

    let report = run(dir.path(), &job, json, &ExportConfig::default()).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("paper.md")).unwrap(),
        "kept\n\n"
    );
    assert_eq!(report.output.stats.ignored, 2);
}

// ── Append semantics ─────────────────────────────────────────────────────────

#[test]
fn existing_content_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("paper.md");
    fs::write(&out, "# Paper\n\n").unwrap();
    let job = ExportJob::new("paper.pdf", 1).with_output_path(&out);

    run(
        dir.path(),
        &job,
        r#"[{"type": "text", "comment": "first"}]"#,
        &ExportConfig::default(),
    )
    .unwrap();
    run(
        dir.path(),
        &job,
        r#"[{"type": "text", "comment": "second"}]"#,
        &ExportConfig::default(),
    )
    .unwrap();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "# Paper\n\nfirst\n\nsecond\n\n"
    );
}

#[test]
fn empty_batch_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let job = ExportJob::new("paper.pdf", 1).with_output_path("paper.md");

    let report = run(dir.path(), &job, "[]", &ExportConfig::default()).unwrap();
    assert!(!report.appended);
    assert!(!dir.path().join("paper.md").exists());
}

#[test]
fn default_output_sits_next_to_pdf() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("library")).unwrap();
    let job = ExportJob::new("library/paper.pdf", 1);

    run(
        dir.path(),
        &job,
        r#"[{"type": "text", "comment": "note"}]"#,
        &ExportConfig::default(),
    )
    .unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("library/paper.md")).unwrap(),
        "note\n\n"
    );
}

#[test]
fn output_dirs_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let job = ExportJob::new("paper.pdf", 1).with_output_path("vault/notes/paper.md");

    run(
        dir.path(),
        &job,
        r#"[{"type": "text", "comment": "note"}]"#,
        &ExportConfig::default(),
    )
    .unwrap();
    assert!(dir.path().join("vault/notes/paper.md").is_file());
}

// ── Images ───────────────────────────────────────────────────────────────────

#[test]
fn image_is_moved_and_linked() {
    let dir = tempfile::tempdir().unwrap();
    let src = scratch_image(dir.path(), "img0.png", b"\x89PNG pixels");
    let assets = dir.path().join("vault/assets");
    fs::create_dir_all(&assets).unwrap();
    let job = ExportJob::new("notes.pdf", 2)
        .with_output_path(dir.path().join("vault/notes.md"))
        .with_image_dir(&assets);

    let report = run(dir.path(), &job, &image_json(&src), &ExportConfig::default()).unwrap();

    let dest = assets.join("notes2p1.png");
    assert!(!src.exists(), "source image must be consumed");
    assert_eq!(fs::read(&dest).unwrap(), b"\x89PNG pixels");
    assert_eq!(
        fs::read_to_string(dir.path().join("vault/notes.md")).unwrap(),
        "![img](assets/notes2p1.png)\n\n"
    );
    assert_eq!(report.output.fragments[0].image.as_deref(), Some(dest.as_path()));
}

#[test]
fn obsidian_links_use_bare_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let src = scratch_image(dir.path(), "img0.png", b"x");
    let assets = dir.path().join("vault/assets");
    fs::create_dir_all(&assets).unwrap();
    let job = ExportJob::new("notes.pdf", 2)
        .with_output_path(dir.path().join("vault/notes.md"))
        .with_image_dir(&assets);
    let config = ExportConfig::builder()
        .link_style(LinkStyle::Obsidian)
        .build()
        .unwrap();

    run(dir.path(), &job, &image_json(&src), &config).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("vault/notes.md")).unwrap(),
        "![[notes2p1.png]]\n\n"
    );
}

#[test]
fn staged_output_links_relative_to_final_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = scratch_image(dir.path(), "img0.jpg", b"x");
    let assets = dir.path().join("vault/assets");
    fs::create_dir_all(&assets).unwrap();
    let job = ExportJob::new("notes.pdf", 4)
        .with_output_path(dir.path().join("stage/notes.md"))
        .with_image_dir(&assets)
        .with_final_output_path(dir.path().join("vault/notes/notes.md"));

    run(dir.path(), &job, &image_json(&src), &ExportConfig::default()).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("stage/notes.md")).unwrap(),
        "![img](../assets/notes4p1.jpg)\n\n"
    );
}

#[test]
fn image_counter_is_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let a = scratch_image(dir.path(), "a.png", b"a");
    let b = scratch_image(dir.path(), "b.png", b"b");
    let job = ExportJob::new("notes.pdf", 7).with_output_path(dir.path().join("notes.md"));
    let json = format!(
        r#"[{{"type": "image", "imagePath": {}}}, {{"type": "image", "imagePath": {}}}]"#,
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );

    run(dir.path(), &job, &json, &ExportConfig::default()).unwrap();
    assert_eq!(fs::read(dir.path().join("notes7p1.png")).unwrap(), b"a");
    assert_eq!(fs::read(dir.path().join("notes7p2.png")).unwrap(), b"b");

    // A fresh run starts counting from 1 again.
    let c = scratch_image(dir.path(), "c.png", b"c");
    let job = ExportJob::new("notes.pdf", 8).with_output_path(dir.path().join("notes.md"));
    run(dir.path(), &job, &image_json(&c), &ExportConfig::default()).unwrap();
    assert!(dir.path().join("notes8p1.png").exists());
}

#[test]
fn rerunning_a_batch_fails_on_consumed_image() {
    let dir = tempfile::tempdir().unwrap();
    let src = scratch_image(dir.path(), "img0.png", b"x");
    let job = ExportJob::new("notes.pdf", 2).with_output_path(dir.path().join("notes.md"));
    let json = image_json(&src);

    run(dir.path(), &job, &json, &ExportConfig::default()).unwrap();
    let before = fs::read_to_string(dir.path().join("notes.md")).unwrap();

    let err = run(dir.path(), &job, &json, &ExportConfig::default()).unwrap_err();
    assert!(matches!(err, AnnotMdError::ImageNotFound { .. }));
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.md")).unwrap(),
        before,
        "failed run must not append"
    );
}

#[test]
fn missing_image_dir_is_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let src = scratch_image(dir.path(), "img0.png", b"x");
    let job = ExportJob::new("notes.pdf", 2)
        .with_output_path(dir.path().join("notes.md"))
        .with_image_dir(dir.path().join("no/such/dir"));

    let err = run(dir.path(), &job, &image_json(&src), &ExportConfig::default()).unwrap_err();
    assert!(matches!(err, AnnotMdError::ImageDirMissing { .. }));
    assert!(src.exists());
    assert!(!dir.path().join("no").exists());
}

// ── Config & parsing ─────────────────────────────────────────────────────────

#[test]
fn config_file_overrides_link_style() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("annot2md.conf");
    fs::write(&cfg, "# vault settings\nlink_style = obsidian\nlink_style = markdown\n").unwrap();
    let overrides = load_config_file(&cfg).unwrap();

    let config = ExportConfig::builder()
        .link_style(LinkStyle::Markdown)
        .overrides(&overrides)
        .build()
        .unwrap();
    assert_eq!(config.link_style, LinkStyle::Obsidian);

    let src = scratch_image(dir.path(), "img0.png", b"x");
    let job = ExportJob::new("notes.pdf", 1).with_output_path(dir.path().join("notes.md"));
    run(dir.path(), &job, &image_json(&src), &config).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.md")).unwrap(),
        "![[notes1p1.png]]\n\n"
    );
}

#[test]
fn missing_config_file_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = load_config_file(&dir.path().join("absent.conf")).unwrap();
    assert!(overrides.is_empty());
}

#[test]
fn malformed_json_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let src = scratch_image(dir.path(), "img0.png", b"x");
    let out = dir.path().join("notes.md");
    let job = ExportJob::new(dir.path().join("notes.pdf"), 1).with_output_path(&out);
    let json = format!(
        r#"[{{"type": "image", "imagePath": {}}}"#,
        serde_json::to_string(&src).unwrap()
    );

    let err = export_json(&job, &json, &ExportConfig::default()).unwrap_err();
    assert!(matches!(err, AnnotMdError::InvalidAnnotations { .. }));
    assert!(src.exists());
    assert!(!out.exists());
}

#[test]
fn report_serialises_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let job = ExportJob::new("paper.pdf", 9).with_output_path("paper.md");
    let report = run(
        dir.path(),
        &job,
        r#"[{"type": "text", "comment": "hi"}]"#,
        &ExportConfig::default(),
    )
    .unwrap();

    let value: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["page"], 9);
    assert_eq!(value["appended"], true);
    assert_eq!(value["output"]["markdown"], "hi\n\n");
    assert_eq!(value["output"]["stats"]["notes"], 1);
}
