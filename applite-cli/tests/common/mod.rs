#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch provisioning layout: images/, templates/, config/, out/.
pub struct TestContext {
    pub dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        for sub in ["images", "templates", "config", "out"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        for name in [
            "manager-zcloud.xml.tmpl",
            "controller-zcloud.xml.tmpl",
            "validator-zcloud.xml.tmpl",
        ] {
            fs::write(
                dir.path().join("templates").join(name),
                "<host-name>{{ hostname }}</host-name>",
            )
            .unwrap();
        }
        Self { dir }
    }

    pub fn add_image(&self, name: &str) {
        fs::write(self.images_dir().join(name), b"qcow2").unwrap();
    }

    pub fn images_dir(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.dir.path().join("templates")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn bootstrap_config(&self) -> PathBuf {
        self.output_dir().join("bootstrap_config.yaml")
    }

    pub fn network_config(&self) -> PathBuf {
        self.output_dir().join("network_config.yaml")
    }

    pub fn cmd(&self) -> Command {
        Command::new(env!("CARGO_BIN_EXE_applite"))
    }

    /// `seed` invocation redirected into this scratch layout.
    pub fn seed_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("seed")
            .arg("--skip-media")
            .arg("--images-dir")
            .arg(self.images_dir())
            .arg("--template-dir")
            .arg(self.templates_dir())
            .arg("--user-config")
            .arg(self.dir.path().join("config/cloud-init.yaml"))
            .arg("--persona-config")
            .arg(self.dir.path().join("config/zcloud.xml"))
            .arg("--output-dir")
            .arg(self.output_dir());
        cmd.env_remove("ADD_DISK");
        cmd
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }
}
