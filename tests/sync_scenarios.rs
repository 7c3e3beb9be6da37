use serde_json::json;

use mcp_sync_lib::{
    backup_path_for, default_targets, load_source, read_document, restore_record, run, AppError,
    ChangeKind, MergeMode, SyncReport, TargetStatus,
};

#[path = "support.rs"]
mod support;
use support::{TestHome, CLAUDE, CODEX, GEMINI, VSCODE, VSCODE_REMOTE};

fn memory_source(home: &TestHome) -> std::path::PathBuf {
    home.write_json(
        "src/mcp.json",
        &json!({
            "mcpServers": {
                "memory": {"type": "stdio", "command": "npx", "args": ["-y", "pkg"], "env": {}}
            }
        }),
    )
}

fn status<'a>(report: &'a SyncReport, id: &str) -> &'a TargetStatus {
    &report.target(id).expect("target in report").status
}

#[test]
fn empty_target_gets_source_record_verbatim() {
    let home = TestHome::new();
    let source = memory_source(&home);

    let report = run(&home.options(&source)).expect("sync");

    let claude = home.read_json(CLAUDE);
    assert_eq!(
        claude["mcpServers"]["memory"],
        json!({"type": "stdio", "command": "npx", "args": ["-y", "pkg"], "env": {}})
    );
    assert!(!home.join(".claude.json.backup").exists());
    assert_eq!(*status(&report, "claude"), TargetStatus::Written { backup: None });
}

#[test]
fn existing_target_keeps_other_entries_and_is_backed_up() {
    let home = TestHome::new();
    let source = memory_source(&home);
    let before = home.write_json(
        CLAUDE,
        &json!({
            "numStartups": 12,
            "mcpServers": {
                "other": {"command": "other-server", "args": ["--flag"]},
                "memory": {"type": "stdio", "command": "old"}
            }
        }),
    );
    let original_text = home.read(CLAUDE);

    let report = run(&home.options(&source)).expect("sync");

    let claude = home.read_json(CLAUDE);
    assert_eq!(claude["numStartups"], json!(12));
    assert_eq!(
        claude["mcpServers"]["other"],
        json!({"command": "other-server", "args": ["--flag"]})
    );
    assert_eq!(claude["mcpServers"]["memory"]["command"], json!("npx"));

    let backup = backup_path_for(&before);
    assert_eq!(
        std::fs::read_to_string(&backup).expect("backup exists"),
        original_text
    );
    let claude_report = report.target("claude").expect("claude");
    assert_eq!(claude_report.change("memory"), Some(ChangeKind::Updated));
    assert_eq!(claude_report.change("other"), Some(ChangeKind::Preserved));
    assert_eq!(claude_report.counts().preserved, 1);
}

#[test]
fn prune_drops_entries_missing_from_source() {
    let home = TestHome::new();
    let source = memory_source(&home);
    home.write_json(
        CLAUDE,
        &json!({
            "mcpServers": {
                "other": {"command": "other-server"},
                "memory": {"type": "stdio", "command": "old"}
            }
        }),
    );

    let mut opts = home.options(&source);
    opts.mode = MergeMode::Prune;
    let report = run(&opts).expect("sync");

    let servers = home.read_json(CLAUDE)["mcpServers"].clone();
    assert_eq!(
        servers,
        json!({"memory": {"type": "stdio", "command": "npx", "args": ["-y", "pkg"], "env": {}}})
    );
    let claude = report.target("claude").expect("claude");
    assert_eq!(claude.change("other"), Some(ChangeKind::Removed));
    assert!(home.join(".claude.json.backup").exists());
}

#[test]
fn second_run_changes_nothing() {
    let home = TestHome::new();
    let source = home.write_json(
        "mcp.json",
        &json!({
            "mcpServers": {
                "memory": {"command": "npx", "args": ["-y", "pkg"], "env": {"DEBUG": "1"}},
                "api": {"type": "http", "url": "https://mcp.example.com/mcp",
                        "headers": {"Authorization": "Bearer t"}}
            }
        }),
    );

    run(&home.options(&source)).expect("first sync");
    let snapshot: Vec<String> = [CLAUDE, GEMINI, VSCODE, VSCODE_REMOTE, CODEX]
        .iter()
        .map(|rel| home.read(rel))
        .collect();

    let report = run(&home.options(&source)).expect("second sync");
    for target in &report.targets {
        assert_eq!(target.status, TargetStatus::UpToDate, "{}", target.id);
        assert!(target
            .changes
            .iter()
            .all(|c| c.kind == ChangeKind::Unchanged));
    }
    for (rel, before) in [CLAUDE, GEMINI, VSCODE, VSCODE_REMOTE, CODEX]
        .iter()
        .zip(snapshot)
    {
        assert_eq!(home.read(rel), before, "{rel} was rewritten");
        assert!(!backup_path_for(&home.join(rel)).exists(), "{rel} backed up");
    }
}

#[test]
fn per_target_shapes() {
    let home = TestHome::new();
    let source = home.write_json(
        "mcp.json",
        &json!({
            "mcpServers": {
                "fs": {"command": "npx", "args": ["-y", "fs"], "env": {"ROOT": "/tmp"}},
                "api": {"type": "http", "url": "https://mcp.example.com/mcp"},
                "events": {"type": "sse", "url": "https://mcp.example.com/sse"}
            }
        }),
    );

    let report = run(&home.options(&source)).expect("sync");

    let gemini = home.read_json(GEMINI);
    assert_eq!(
        gemini["mcpServers"]["api"],
        json!({"type": "http", "httpUrl": "https://mcp.example.com/mcp"})
    );
    assert_eq!(
        gemini["mcpServers"]["events"]["url"],
        json!("https://mcp.example.com/sse")
    );

    let vscode = home.read_json(VSCODE);
    assert!(vscode.get("mcpServers").is_none());
    assert_eq!(vscode["servers"]["fs"]["env"]["ROOT"], json!("/tmp"));
    let remote = home.read_json(VSCODE_REMOTE);
    assert_eq!(remote["servers"], vscode["servers"]);

    let codex = home.read_toml(CODEX);
    let servers = codex["mcp_servers"].as_table().expect("mcp_servers table");
    assert_eq!(servers.keys().collect::<Vec<_>>(), ["fs"]);
    assert_eq!(servers["fs"]["command"].as_str(), Some("npx"));
    assert_eq!(servers["fs"]["env"]["ROOT"].as_str(), Some("/tmp"));

    let skipped: Vec<&str> = report
        .target("codex")
        .expect("codex")
        .skipped
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(skipped, ["api", "events"]);
    assert!(report.target("claude").expect("claude").skipped.is_empty());
}

#[test]
fn malformed_target_is_isolated() {
    let home = TestHome::new();
    let source = memory_source(&home);
    home.write(GEMINI, "{\"mcpServers\": ");
    home.write(CODEX, "mcp_servers = [1, 2]\n");

    let report = run(&home.options(&source)).expect("sync");

    for id in ["gemini", "codex"] {
        match status(&report, id) {
            TargetStatus::Failed { kind, .. } => assert_eq!(kind, "format-parse-error"),
            other => panic!("{id}: expected failure, got {other:?}"),
        }
    }
    assert_eq!(home.read(GEMINI), "{\"mcpServers\": ");
    assert_eq!(home.read(CODEX), "mcp_servers = [1, 2]\n");
    for id in ["claude", "vscode", "vscode-remote"] {
        assert!(
            matches!(status(&report, id), TargetStatus::Written { .. }),
            "{id}"
        );
    }
}

#[test]
fn source_that_is_a_target_is_never_touched() {
    let home = TestHome::new();
    let source = home.write_json(
        CLAUDE,
        &json!({
            "mcpServers": {"memory": {"command": "npx"}},
            "projects": {"/repo": {"mcpServers": {"local": {"command": "l"}}}}
        }),
    );
    let before = home.read(CLAUDE);

    let report = run(&home.options(&source)).expect("sync");

    assert_eq!(*status(&report, "claude"), TargetStatus::SkippedSelfReference);
    assert_eq!(home.read(CLAUDE), before);
    assert!(!home.join(".claude.json.backup").exists());

    // project-scoped servers never leave the source
    let gemini = home.read_json(GEMINI);
    assert_eq!(
        gemini["mcpServers"].as_object().expect("servers").len(),
        1
    );
    assert!(gemini["mcpServers"].get("local").is_none());
}

#[test]
fn codex_file_keeps_unrelated_settings() {
    let home = TestHome::new();
    let source = memory_source(&home);
    home.write(
        CODEX,
        r#"# model settings
model = "o3"

[mcp_servers.docs]
# keep me
command = "docs-server"
args = ["--port", "3000"]
"#,
    );

    run(&home.options(&source)).expect("sync");

    let text = home.read(CODEX);
    assert!(text.starts_with("# model settings\nmodel = \"o3\""));
    assert!(text.contains("# keep me"));
    let codex = home.read_toml(CODEX);
    let servers = codex["mcp_servers"].as_table().expect("table");
    assert_eq!(servers.keys().collect::<Vec<_>>(), ["docs", "memory"]);
    assert_eq!(servers["memory"]["args"].as_array().map(Vec::len), Some(2));
    assert!(home.join(".codex/config.toml.backup").exists());
}

#[test]
fn invalid_source_entries_are_reported_and_skipped() {
    let home = TestHome::new();
    let source = home.write_json(
        "mcp.json",
        &json!({
            "mcpServers": {
                "good": {"command": "npx"},
                "no-command": {"type": "stdio"},
                "weird": {"type": "websocket", "url": "ws://h"}
            }
        }),
    );

    let report = run(&home.options(&source)).expect("sync");

    assert_eq!(report.servers, ["good"]);
    let invalid: Vec<&str> = report.invalid.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(invalid, ["no-command", "weird"]);
    let claude = home.read_json(CLAUDE);
    assert_eq!(
        claude["mcpServers"].as_object().expect("servers").len(),
        1
    );
}

#[test]
fn unreadable_source_aborts_before_any_target() {
    let home = TestHome::new();

    let err = run(&home.options(&home.join("missing.json"))).expect_err("missing source");
    assert!(matches!(err, AppError::SourceNotFound(_)));
    assert!(err.is_fatal());

    let broken = home.write("broken.json", "{ nope");
    let err = run(&home.options(&broken)).expect_err("broken source");
    assert_eq!(err.kind(), "source-parse-error");
    assert!(!home.join(CLAUDE).exists());
}

#[test]
fn only_filter_limits_targets() {
    let home = TestHome::new();
    let source = memory_source(&home);

    let mut opts = home.options(&source);
    opts.only = vec!["Codex".into(), " gemini ".into()];
    let report = run(&opts).expect("sync");
    let ids: Vec<&str> = report.targets.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["gemini", "codex"]);
    assert!(!home.join(CLAUDE).exists());

    opts.only = vec!["cursor".into()];
    let err = run(&opts).expect_err("unknown target");
    assert_eq!(err.kind(), "invalid-input");
}

#[test]
fn written_entries_restore_to_source_records() {
    let home = TestHome::new();
    let source = home.write_json(
        "mcp.json",
        &json!({
            "mcpServers": {
                "fs": {"command": "npx", "args": ["-y", "fs"], "env": {"ROOT": "/tmp"}},
                "api": {"type": "http", "url": "https://mcp.example.com/mcp",
                        "headers": {"X-Key": "k"}}
            }
        }),
    );
    let opts = home.options(&source);
    run(&opts).expect("sync");

    let loaded = load_source(&source).expect("source");
    for spec in default_targets(home.path(), "Code") {
        let doc = read_document(spec.format, &spec.path, spec.top_level_key)
            .expect("readable")
            .expect("written");
        for record in loaded.servers() {
            let Some(native) = doc.entries().get(record.name()) else {
                assert_eq!(spec.id, "codex", "{} missing from {}", record.name(), spec.id);
                continue;
            };
            let restored = restore_record(record.name(), native, &spec).expect("restore");
            assert_eq!(&restored, record, "{} in {}", record.name(), spec.id);
        }
    }
}

#[test]
fn codex_inline_section_keeps_target_only_servers() {
    let home = TestHome::new();
    let source = memory_source(&home);
    home.write(
        CODEX,
        "model = \"o3\"\nmcp_servers = { docs = { command = \"docs-server\", args = [\"--port\", \"3000\"] } }\n",
    );

    let report = run(&home.options(&source)).expect("sync");

    let codex = report.target("codex").expect("codex");
    assert!(matches!(codex.status, TargetStatus::Written { backup: Some(_) }));
    assert_eq!(codex.change("docs"), Some(ChangeKind::Preserved));
    assert_eq!(codex.change("memory"), Some(ChangeKind::Added));

    let table = home.read_toml(CODEX);
    assert_eq!(table["model"].as_str(), Some("o3"));
    let servers = table["mcp_servers"].as_table().expect("mcp_servers table");
    assert_eq!(servers.keys().collect::<Vec<_>>(), ["docs", "memory"]);
    assert_eq!(servers["docs"]["command"].as_str(), Some("docs-server"));
    assert_eq!(servers["docs"]["args"].as_array().map(Vec::len), Some(2));

    let again = run(&home.options(&source)).expect("second sync");
    assert_eq!(
        again.target("codex").expect("codex").status,
        TargetStatus::UpToDate
    );
}
