// crates/http-fixtures-cli/src/fixtures.rs
// ============================================================================
// Module: Fixture Inspection
// Description: Read-only inspection and verification of fixture files.
// Purpose: Back the `fixture inspect` and `fixture verify` commands.
// Dependencies: http-fixtures-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Inspection summarizes one fixture file: the test identities it holds,
//! sorted lexically rather than in file order, and a stable key per recorded
//! request. Verification walks a source tree, parses
//! every fixture file found under a fixture folder, and reports files the
//! lifecycle engine would never have written: malformed JSON, empty objects,
//! and entries without interactions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use http_fixtures_core::FIXTURE_EXTENSION;
use http_fixtures_core::FixtureStore;
use http_fixtures_core::Interaction;
use http_fixtures_core::LoadStatus;
use http_fixtures_core::fixture_file_stem;
use serde::Serialize;
use serde_json::Value;

use crate::CliError;
use crate::CliResult;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Largest fixture file verification will read.
pub(crate) const MAX_FIXTURE_FILE_BYTES: u64 = 64 * 1024 * 1024;
/// Maximum directory depth walked during verification.
pub(crate) const MAX_WALK_DEPTH: usize = 64;
/// Directory names never descended into.
const SKIPPED_DIRS: [&str; 3] = [".git", "target", "node_modules"];

// ============================================================================
// SECTION: Inspection
// ============================================================================

/// State of an inspected fixture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FileStatus {
    /// No file exists at the fixture path.
    Missing,
    /// The file parsed.
    Loaded,
    /// The file exists but does not parse.
    Corrupt,
}

/// Summary of one fixture file.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct InspectReport {
    /// Fixture file path.
    pub(crate) fixture_path: String,
    /// File state.
    pub(crate) status: FileStatus,
    /// Parser diagnostic for corrupt files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
    /// Entries sorted by identity; the file keeps declaration order instead.
    pub(crate) entries: Vec<EntrySummary>,
}

/// Summary of one test entry.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct EntrySummary {
    /// Test identity key.
    pub(crate) identity: String,
    /// Number of recorded interactions.
    pub(crate) count: usize,
    /// Recorded interactions in replay order.
    pub(crate) interactions: Vec<InteractionSummary>,
}

/// Summary of one recorded interaction.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct InteractionSummary {
    /// HTTP method.
    pub(crate) method: String,
    /// Request URL.
    pub(crate) href: String,
    /// Recorded response status.
    pub(crate) status: u16,
    /// Stable key derived from the request.
    pub(crate) key: String,
}

/// Request fields that identify an interaction.
#[derive(Serialize)]
struct RequestKey<'a> {
    /// HTTP method.
    method: &'a str,
    /// Request URL.
    href: &'a str,
    /// Request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a Value>,
}

/// Inspects the fixture file at `path`.
pub(crate) fn inspect_fixture(path: &Path) -> CliResult<InspectReport> {
    let (store, status) = FixtureStore::load(path)
        .map_err(|err| CliError::new(format!("failed to read fixture file: {err}")))?;
    let fixture_path = path.display().to_string();
    let report = match status {
        LoadStatus::Missing => InspectReport {
            fixture_path,
            status: FileStatus::Missing,
            reason: None,
            entries: Vec::new(),
        },
        LoadStatus::Corrupt {
            reason,
        } => InspectReport {
            fixture_path,
            status: FileStatus::Corrupt,
            reason: Some(reason),
            entries: Vec::new(),
        },
        LoadStatus::Loaded {
            ..
        } => InspectReport {
            fixture_path,
            status: FileStatus::Loaded,
            reason: None,
            entries: summarize(&store)?,
        },
    };
    Ok(report)
}

/// Summarizes every entry in a store.
fn summarize(store: &FixtureStore) -> CliResult<Vec<EntrySummary>> {
    store
        .keys()
        .map(|identity| {
            let interactions = store
                .get(identity)
                .iter()
                .map(summarize_interaction)
                .collect::<CliResult<Vec<_>>>()?;
            Ok(EntrySummary {
                identity: identity.to_string(),
                count: interactions.len(),
                interactions,
            })
        })
        .collect()
}

/// Summarizes one interaction, deriving its stable key from the request.
fn summarize_interaction(interaction: &Interaction) -> CliResult<InteractionSummary> {
    let request = RequestKey {
        method: &interaction.method,
        href: &interaction.href,
        body: interaction.body.as_ref(),
    };
    let key = fixture_file_stem(&interaction.href, &request)
        .map_err(|err| CliError::new(format!("failed to derive interaction key: {err}")))?;
    Ok(InteractionSummary {
        method: interaction.method.clone(),
        href: interaction.href.clone(),
        status: interaction.response.status,
        key,
    })
}

/// Renders an inspection report as text.
pub(crate) fn render_inspect_text(report: &InspectReport) -> String {
    let mut lines = vec![format!("fixture: {}", report.fixture_path)];
    match report.status {
        FileStatus::Missing => lines.push("status: missing (no fixtures recorded)".to_string()),
        FileStatus::Corrupt => lines.push(format!(
            "status: corrupt ({})",
            report.reason.as_deref().unwrap_or("unparseable")
        )),
        FileStatus::Loaded => {
            lines.push(format!(
                "status: loaded ({} entries, sorted by identity)",
                report.entries.len()
            ));
            for entry in &report.entries {
                lines.push(format!("{} ({} interactions)", entry.identity, entry.count));
                for interaction in &entry.interactions {
                    lines.push(format!(
                        "  {} {} -> {} [{}]",
                        interaction.method, interaction.href, interaction.status, interaction.key
                    ));
                }
            }
        }
    }
    lines.join("\n")
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Kind of problem found in a fixture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ProblemKind {
    /// The file could not be read.
    Unreadable,
    /// The file is not a fixture object.
    Corrupt,
    /// The file holds an empty object.
    EmptyFile,
    /// An entry holds no interactions.
    EmptyEntry,
}

/// One verification finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Problem {
    /// Fixture file path.
    pub(crate) path: String,
    /// Problem kind.
    pub(crate) kind: ProblemKind,
    /// Human-readable detail.
    pub(crate) detail: String,
}

/// Result of verifying a source tree.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct VerifyReport {
    /// Root that was walked.
    pub(crate) root: String,
    /// Fixture folder matched during the walk.
    pub(crate) folder: String,
    /// Number of fixture files parsed.
    pub(crate) files_checked: usize,
    /// Findings in path order.
    pub(crate) problems: Vec<Problem>,
}

impl VerifyReport {
    /// Returns true when no problems were found.
    pub(crate) const fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Verifies every fixture file under `root` whose directory ends with `folder`.
pub(crate) fn verify_tree(root: &Path, folder: &str) -> CliResult<VerifyReport> {
    if !root.is_dir() {
        return Err(CliError::new(format!("not a directory: {}", root.display())));
    }
    let files = collect_fixture_files(root, Path::new(folder))?;
    let mut problems = Vec::new();
    for file in &files {
        check_fixture_file(file, &mut problems);
    }
    Ok(VerifyReport {
        root: root.display().to_string(),
        folder: folder.to_string(),
        files_checked: files.len(),
        problems,
    })
}

/// Walks `root` and returns fixture files in sorted order.
fn collect_fixture_files(root: &Path, folder: &Path) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![(root.to_path_buf(), 0_usize)];
    while let Some((dir, depth)) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .map_err(|err| CliError::new(format!("failed to read {}: {err}", dir.display())))?;
        let in_fixture_folder = dir.ends_with(folder);
        for entry in entries {
            let entry = entry
                .map_err(|err| CliError::new(format!("failed to read {}: {err}", dir.display())))?;
            let file_type = entry.file_type().map_err(|err| {
                CliError::new(format!("failed to stat {}: {err}", entry.path().display()))
            })?;
            let path = entry.path();
            if file_type.is_dir() {
                let skipped = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name));
                if !skipped && depth < MAX_WALK_DEPTH {
                    pending.push((path, depth + 1));
                }
            } else if file_type.is_file()
                && in_fixture_folder
                && path.extension().is_some_and(|ext| ext == FIXTURE_EXTENSION)
            {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Parses one fixture file and records any problems.
fn check_fixture_file(path: &Path, problems: &mut Vec<Problem>) {
    let mut report = |kind, detail: String| {
        problems.push(Problem {
            path: path.display().to_string(),
            kind,
            detail,
        });
    };
    match fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_FIXTURE_FILE_BYTES => {
            report(ProblemKind::Unreadable, "fixture file exceeds size limit".to_string());
            return;
        }
        Ok(_) => {}
        Err(err) => {
            report(ProblemKind::Unreadable, err.to_string());
            return;
        }
    }
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            report(ProblemKind::Unreadable, err.to_string());
            return;
        }
    };
    let store = match FixtureStore::from_json_slice(&bytes) {
        Ok(store) => store,
        Err(reason) => {
            report(ProblemKind::Corrupt, reason);
            return;
        }
    };
    if store.is_empty() {
        report(ProblemKind::EmptyFile, "fixture file holds an empty object".to_string());
        return;
    }
    for identity in store.keys() {
        if store.get(identity).is_empty() {
            report(ProblemKind::EmptyEntry, format!("entry `{identity}` has no interactions"));
        }
    }
}

/// Renders a verification report as text.
pub(crate) fn render_verify_text(report: &VerifyReport) -> String {
    let mut lines: Vec<String> = report
        .problems
        .iter()
        .map(|problem| {
            format!("{}: {}: {}", problem.path, problem_label(problem.kind), problem.detail)
        })
        .collect();
    lines.push(format!(
        "checked {} fixture files under {}: {} problems",
        report.files_checked,
        report.root,
        report.problems.len()
    ));
    lines.join("\n")
}

/// Returns the text label for a problem kind.
const fn problem_label(kind: ProblemKind) -> &'static str {
    match kind {
        ProblemKind::Unreadable => "unreadable",
        ProblemKind::Corrupt => "corrupt",
        ProblemKind::EmptyFile => "empty file",
        ProblemKind::EmptyEntry => "empty entry",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
