#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Recorded GDX/NUGT market shipped with the crate.
pub fn demo_snapshot() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/gdx_nugt.json")
}

/// A GDX/NUGT 1:3 config, optionally pointing at a snapshot.
pub fn pair_config(snapshot: Option<&Path>) -> String {
    let mut toml = String::from(concat!(
        "[pair]\n",
        "unlevered = \"GDX\"\n",
        "levered = \"NUGT\"\n",
        "levered_ratio = 3.0\n",
        "\n",
        "[logging]\n",
        "level = \"warn\"\n",
    ));
    if let Some(path) = snapshot {
        toml.push_str(&format!(
            "\n[data]\nsnapshot = {:?}\n",
            path.display().to_string()
        ));
    }
    toml
}

pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("smilearb-test-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes())
        .expect("write temp config");
    file
}
