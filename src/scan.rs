use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use serde_sarif::sarif::{Artifact, ArtifactLocation, ArtifactRoles};
use tracing::debug;
use zip::ZipArchive;

use crate::ir::{Class, ProgramModel};
use crate::schema::ModelValidator;

/// Snapshot of loaded model documents and the classes they declare.
pub(crate) struct ScanOutput {
    pub(crate) artifacts: Vec<Artifact>,
    pub(crate) classes: Vec<Class>,
}

struct Scanner {
    validator: ModelValidator,
    artifacts: Vec<Artifact>,
    classes: Vec<Class>,
}

pub(crate) fn scan_inputs(input: &Path, classpath: &[PathBuf]) -> Result<ScanOutput> {
    let mut scanner = Scanner {
        validator: ModelValidator::new()?,
        artifacts: Vec::new(),
        classes: Vec::new(),
    };

    scanner.scan_path(input, true, true)?;

    // Keep deterministic ordering by sorting classpath entries and directory listings.
    let mut classpath_entries = classpath.to_vec();
    classpath_entries.sort_by(|a, b| path_key(a).cmp(&path_key(b)));

    for entry in classpath_entries {
        scanner.scan_path(&entry, false, true)?;
    }

    Ok(ScanOutput {
        artifacts: scanner.artifacts,
        classes: scanner.classes,
    })
}

impl Scanner {
    fn scan_path(&mut self, path: &Path, is_input: bool, strict: bool) -> Result<()> {
        if path.is_dir() {
            return self.scan_dir(path, is_input);
        }

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        match extension {
            "json" => self.scan_model_file(path, is_input),
            "zip" | "jar" => self.scan_archive(path, is_input),
            _ => {
                if strict {
                    anyhow::bail!("unsupported input file: {}", path.display())
                } else {
                    Ok(())
                }
            }
        }
    }

    fn scan_dir(&mut self, path: &Path, is_input: bool) -> Result<()> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)
            .with_context(|| format!("failed to read directory {}", path.display()))?
        {
            let entry =
                entry.with_context(|| format!("failed to read entry under {}", path.display()))?;
            entries.push(entry.path());
        }

        entries.sort_by(|a, b| path_key(a).cmp(&path_key(b)));

        for entry in entries {
            if entry.is_dir() {
                self.scan_dir(&entry, is_input)?;
            } else {
                self.scan_path(&entry, is_input, false)?;
            }
        }

        Ok(())
    }

    fn scan_model_file(&mut self, path: &Path, is_input: bool) -> Result<()> {
        let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let classes = self
            .parse_model(&data)
            .with_context(|| format!("failed to load {}", path.display()))?;

        let index = self.push_artifact(path_to_uri(path), data.len() as u64, None, is_input);
        self.push_classes(classes, index, is_input);
        Ok(())
    }

    fn scan_archive(&mut self, path: &Path, is_input: bool) -> Result<()> {
        let file =
            fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let mut archive =
            ZipArchive::new(file).with_context(|| format!("failed to read {}", path.display()))?;

        let archive_len = fs::metadata(path)
            .with_context(|| format!("failed to read {}", path.display()))?
            .len();
        let archive_index = self.push_artifact(path_to_uri(path), archive_len, None, is_input);

        let mut entry_names = Vec::new();
        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .with_context(|| format!("failed to read {}", path.display()))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            if name.ends_with(".json") {
                entry_names.push(name);
            }
        }

        entry_names.sort();

        for name in entry_names {
            let mut entry = archive
                .by_name(&name)
                .with_context(|| format!("failed to read {}:{}", path.display(), name))?;
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .with_context(|| format!("failed to read {}:{}", path.display(), name))?;
            let classes = self
                .parse_model(&data)
                .with_context(|| format!("failed to load {}:{}", path.display(), name))?;

            let entry_uri = archive_entry_uri(path, &name);
            let index = self.push_artifact(entry_uri, entry.size(), Some(archive_index), false);
            self.push_classes(classes, index, is_input);
        }

        Ok(())
    }

    fn parse_model(&self, data: &[u8]) -> Result<Vec<Class>> {
        let document: Value = serde_json::from_slice(data).context("invalid JSON")?;
        self.validator.validate(&document)?;
        let model: ProgramModel =
            serde_json::from_value(document).context("invalid program model")?;
        Ok(model.classes)
    }

    fn push_classes(&mut self, classes: Vec<Class>, artifact_index: i64, is_input: bool) {
        debug!(
            artifact = artifact_index,
            classes = classes.len(),
            is_input,
            "loaded program model document"
        );
        self.classes.extend(classes.into_iter().map(|mut class| {
            class.artifact_index = artifact_index;
            class.is_analysis_target = is_input;
            class
        }));
    }

    /// Push an artifact and return its index for parent linkage (e.g., archive entries).
    fn push_artifact(
        &mut self,
        uri: String,
        len: u64,
        parent_index: Option<i64>,
        is_input: bool,
    ) -> i64 {
        let location = ArtifactLocation::builder().uri(uri).build();
        let roles = is_input.then(|| {
            vec![
                serde_json::to_value(ArtifactRoles::AnalysisTarget)
                    .unwrap_or_else(|_| Value::String("analysisTarget".to_string())),
            ]
        });
        let artifact = match (parent_index, roles) {
            (Some(parent_index), Some(roles)) => Artifact::builder()
                .location(location)
                .length(len as i64)
                .parent_index(parent_index)
                .roles(roles)
                .build(),
            (Some(parent_index), None) => Artifact::builder()
                .location(location)
                .length(len as i64)
                .parent_index(parent_index)
                .build(),
            (None, Some(roles)) => Artifact::builder()
                .location(location)
                .length(len as i64)
                .roles(roles)
                .build(),
            (None, None) => Artifact::builder()
                .location(location)
                .length(len as i64)
                .build(),
        };
        let index = self.artifacts.len() as i64;
        self.artifacts.push(artifact);
        index
    }
}

fn path_to_uri(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn archive_entry_uri(archive_path: &Path, entry_name: &str) -> String {
    format!("jar:{}!/{}", archive_path.to_string_lossy(), entry_name)
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
