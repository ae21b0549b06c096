//! Test helper module for E2E tests
//!
//! Provides `TestFixture`: a temp project with source files, fake cscope
//! indexes, and a fake `cscope` program that replays canned answers.

#![allow(dead_code)] // Test helpers may not be used in all test modules
#![allow(deprecated)] // cargo_bin() deprecation

pub mod mcp;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Shell script standing in for cscope. For `-dL -f <index> -0 <tag>` it
/// prints `<index>.<tag>` when that file exists, and fails when the index
/// itself is missing, like the real tool.
const FAKE_CSCOPE: &str = r#"#!/bin/sh
index="$3"
tag="$5"
if [ ! -f "$index" ]; then
  echo "cscope: cannot open file $index" >&2
  exit 1
fi
if [ -f "$index.$tag" ]; then
  cat "$index.$tag"
fi
"#;

pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let fix = Self {
            dir: TempDir::new().unwrap(),
        };
        fix.write_fake_cscope();
        fix
    }

    /// Canonical root, so paths printed by csnav compare equal on every platform.
    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    fn write_fake_cscope(&self) {
        let script = self.dir.child("bin/cscope");
        script.write_str(FAKE_CSCOPE).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(script.path()).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(script.path(), perms).unwrap();
        }
    }

    pub fn fake_cscope(&self) -> PathBuf {
        self.path("bin/cscope")
    }

    // ============ File Operations ============

    /// Add a source file with content (creates parent dirs automatically)
    pub fn add_file(&self, path: &str, content: &str) -> &Self {
        self.dir.child(path).write_str(content).unwrap();
        self
    }

    /// Add an (empty) index file plus the lines the fake tool prints for `tag`.
    pub fn add_index(&self, index: &str, tag: &str, lines: &[&str]) -> &Self {
        self.dir.child(index).write_str("").unwrap();
        let mut body = lines.join("\n");
        body.push('\n');
        self.dir
            .child(format!("{index}.{tag}"))
            .write_str(&body)
            .unwrap();
        self
    }

    /// Write a config file and return its path.
    pub fn add_config(&self, content: &str) -> PathBuf {
        self.add_file("csnav.toml", content);
        self.path("csnav.toml")
    }

    /// Replace the fixture root with `[ROOT]` for stable snapshots.
    pub fn redact(&self, text: &str) -> String {
        text.replace(&self.root().display().to_string(), "[ROOT]")
    }

    // ============ csnav CLI ============

    /// `csnav` isolated from the user's own config, using the fake cscope.
    pub fn csnav(&self) -> Command {
        let mut cmd = Command::cargo_bin("csnav").unwrap();
        cmd.current_dir(self.root())
            .env("XDG_CONFIG_HOME", self.path("xdg"))
            .env("HOME", self.root())
            .env("CSNAV_CSCOPE", self.fake_cscope())
            .env_remove("CSNAV_TIMEOUT_MS")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn output_of(&self, args: &[&str]) -> String {
        let output = self.csnav().args(args).output().expect("csnav failed");
        assert!(
            output.status.success(),
            "csnav {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn display(path: &Path) -> String {
    path.display().to_string()
}
