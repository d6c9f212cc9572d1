use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;

use crate::loader::{DataLayout, SHARED_FILES};
use crate::node::NodeRegistry;
use crate::presets::{check_presets, PresetIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Missing,
    Invalid,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileCheck {
    pub path: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of checking a data directory (for `outfit verify --json`).
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub data_dir: String,
    pub pass: bool,
    pub categories: Vec<String>,
    pub files: Vec<FileCheck>,
    pub preset_issues: Vec<PresetIssue>,
}

/// Check that the required files exist, every JSON file parses and presets
/// point at real options.
///
/// Preset issues are reported but do not fail the check.
pub fn verify(root: &Path) -> Result<VerifyReport> {
    if !root.is_dir() {
        bail!("data directory {} not found", root.display());
    }
    let layout = DataLayout::new(root);
    let mut files = Vec::new();

    for shared in &SHARED_FILES {
        let path = layout.shared_path(shared);
        if !path.exists() {
            files.push(missing(root, &path));
        }
    }
    let outfit = layout.outfit_dir();
    if !outfit.is_dir() {
        files.push(missing(root, &outfit));
    }

    let mut json_files = json_files_in(root);
    if outfit.is_dir() {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&outfit)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();
        for dir in dirs {
            json_files.extend(json_files_in(&dir));
        }
    }
    for path in json_files {
        files.push(parse_check(root, &path));
    }

    let registry = NodeRegistry::discover(root);
    let preset_issues: Vec<PresetIssue> = registry
        .iter()
        .flat_map(|node| check_presets(node.table(), node.presets()))
        .collect();

    let pass = files.iter().all(|f| f.status == FileStatus::Ok);
    Ok(VerifyReport {
        data_dir: root.display().to_string(),
        pass,
        categories: registry.categories().iter().map(|c| c.to_string()).collect(),
        files,
        preset_issues,
    })
}

fn json_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    paths
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn missing(root: &Path, path: &Path) -> FileCheck {
    FileCheck {
        path: relative(root, path),
        status: FileStatus::Missing,
        message: None,
    }
}

fn parse_check(root: &Path, path: &Path) -> FileCheck {
    let result = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| {
            serde_json::from_str::<Value>(&content)
                .map(|_| ())
                .map_err(|e| e.to_string())
        });
    match result {
        Ok(()) => FileCheck {
            path: relative(root, path),
            status: FileStatus::Ok,
            message: None,
        },
        Err(message) => FileCheck {
            path: relative(root, path),
            status: FileStatus::Invalid,
            message: Some(message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn good_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("backgrounds.json"), r#"{"backgrounds": ["forest"]}"#).unwrap();
        fs::write(root.join("race.json"), r#"{"races": ["elf"]}"#).unwrap();
        fs::write(root.join("age_groups.json"), r#"{"age_groups": ["adult"]}"#).unwrap();
        fs::create_dir_all(root.join("outfit/female")).unwrap();
        fs::write(
            root.join("outfit/female/torso.json"),
            r#"{"attire": [{"type": "blouse"}]}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn good_tree_passes() {
        let dir = good_tree();
        let report = verify(dir.path()).unwrap();
        assert!(report.pass);
        assert_eq!(report.categories, ["female"]);
        assert_eq!(report.files.len(), 4);
        assert!(report.preset_issues.is_empty());
    }

    #[test]
    fn missing_and_invalid_fail() {
        let dir = good_tree();
        fs::remove_file(dir.path().join("race.json")).unwrap();
        fs::write(dir.path().join("outfit/female/legs.json"), "{oops").unwrap();

        let report = verify(dir.path()).unwrap();
        assert!(!report.pass);
        let missing: Vec<_> = report
            .files
            .iter()
            .filter(|f| f.status == FileStatus::Missing)
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(missing, ["race.json"]);
        let invalid = report
            .files
            .iter()
            .find(|f| f.status == FileStatus::Invalid)
            .unwrap();
        assert!(invalid.path.ends_with("legs.json"));
        assert!(invalid.message.is_some());
    }

    #[test]
    fn preset_issues_do_not_fail() {
        let dir = good_tree();
        fs::write(
            dir.path().join("presets.json"),
            r#"{"female": {"Office": {"torso": "blazer", "mood": "calm"}}}"#,
        )
        .unwrap();
        let report = verify(dir.path()).unwrap();
        assert!(report.pass);
        assert_eq!(report.preset_issues.len(), 1);
        assert_eq!(report.preset_issues[0].field, "torso");
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(verify(&dir.path().join("nope")).is_err());
    }
}
