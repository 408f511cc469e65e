//! Workspace activity analysis.
//!
//! Counts the files touched on a given day per work area and lists the most
//! recent session transcripts. Independent of the session-based report.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate, Utc};
use walkdir::WalkDir;

use crate::model::activity::area_progress;
use crate::model::{ActivityReport, FileActivity, SessionFileInfo, WorkArea};

pub const RECENT_SESSION_LIMIT: usize = 5;
pub const ANALYSIS_SOURCE: &str = "real_session_files";

// ============================================================================
// FUNCTIONAL CORE
// ============================================================================

/// Per-area completion for a set of touched files. Every area is present.
pub fn area_breakdown(files: &[FileActivity]) -> BTreeMap<WorkArea, u8> {
    let mut counts: BTreeMap<WorkArea, usize> =
        WorkArea::ALL.into_iter().map(|area| (area, 0)).collect();

    for file in files {
        if let Some(area) = WorkArea::classify(&file.file) {
            *counts.entry(area).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(area, count)| (area, area_progress(count)))
        .collect()
}

pub fn build_activity_report(
    completed_work: Vec<FileActivity>,
    session_count: usize,
    recent_sessions: Vec<SessionFileInfo>,
    now: DateTime<Utc>,
) -> ActivityReport {
    ActivityReport {
        real_progress: area_breakdown(&completed_work),
        total_files_created: completed_work.len(),
        completed_work,
        active_sessions: session_count,
        recent_sessions,
        last_updated: now,
        analysis_source: ANALYSIS_SOURCE.to_string(),
    }
}

// ============================================================================
// IMPERATIVE SHELL
// ============================================================================

/// Regular files under `workspace` whose local modification date is `day`.
/// Paths are relative to `workspace` and sorted. Symlinks are not followed;
/// unreadable entries are skipped.
pub fn files_modified_on(workspace: &Path, day: NaiveDate) -> Vec<FileActivity> {
    let mut found: Vec<FileActivity> = WalkDir::new(workspace)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let meta = entry.metadata().ok()?;
            let modified = modified_local(meta.modified())?;
            if modified.date_naive() != day {
                return None;
            }
            let rel = entry.path().strip_prefix(workspace).unwrap_or(entry.path());
            Some(FileActivity {
                file: rel.display().to_string(),
                modified,
                size: meta.len(),
            })
        })
        .collect();

    found.sort_by(|a, b| a.file.cmp(&b.file));
    found
}

/// Count of `*.jsonl` session files in `dir` and the newest `limit` of them.
/// A missing directory yields `(0, [])`.
pub fn recent_session_files(dir: &Path, limit: usize) -> (usize, Vec<SessionFileInfo>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return (0, Vec::new()),
    };

    let mut sessions: Vec<SessionFileInfo> = entries
        .flatten()
        .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some("jsonl"))
        .filter_map(|entry| {
            let meta = entry.metadata().ok()?;
            Some(SessionFileInfo {
                file: entry.file_name().to_string_lossy().into_owned(),
                modified: modified_local(meta.modified())?,
                size: meta.len(),
            })
        })
        .collect();

    let count = sessions.len();
    sessions.sort_by(|a, b| b.modified.cmp(&a.modified));
    sessions.truncate(limit);
    (count, sessions)
}

/// Full analysis for `day`, stamped with `now`.
pub fn analyze(workspace: &Path, sessions_dir: &Path, day: NaiveDate, now: DateTime<Utc>) -> ActivityReport {
    let completed = files_modified_on(workspace, day);
    let (session_count, recent) = recent_session_files(sessions_dir, RECENT_SESSION_LIMIT);

    tracing::info!(
        workspace = %workspace.display(),
        files = completed.len(),
        sessions = session_count,
        "workspace activity analysed"
    );
    build_activity_report(completed, session_count, recent, now)
}

fn modified_local(modified: std::io::Result<SystemTime>) -> Option<DateTime<Local>> {
    modified.ok().map(DateTime::<Local>::from)
}
