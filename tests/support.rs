#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use mcp_sync_lib::SyncOptions;

/// Throwaway home directory that every target path is resolved against.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp home"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, text: &str) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, text).expect("write test file");
        path
    }

    pub fn write_json(&self, rel: &str, value: &Value) -> PathBuf {
        let text = serde_json::to_string_pretty(value).expect("serialize json");
        self.write(rel, &text)
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.join(rel)).expect("read test file")
    }

    pub fn read_json(&self, rel: &str) -> Value {
        serde_json::from_str(&self.read(rel)).expect("parse json")
    }

    pub fn read_toml(&self, rel: &str) -> toml::Table {
        toml::from_str(&self.read(rel)).expect("parse toml")
    }

    /// Options for a run against `source`, confined to this home
    pub fn options(&self, source: &Path) -> SyncOptions {
        let mut opts = SyncOptions::new(source);
        opts.home = Some(self.path().to_path_buf());
        opts
    }
}

pub const CLAUDE: &str = ".claude.json";
pub const GEMINI: &str = ".gemini/settings.json";
pub const VSCODE: &str = ".config/Code/User/mcp.json";
pub const VSCODE_REMOTE: &str = ".vscode-server/data/User/mcp.json";
pub const CODEX: &str = ".codex/config.toml";
