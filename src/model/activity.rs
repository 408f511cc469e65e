use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of files per area that counts as a finished area.
pub const FILES_PER_AREA: usize = 20;

/// Work area a touched file is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkArea {
    Dashboard,
    Crm,
    Linkedin,
    Marketing,
    Sales,
    Deployment,
    Qa,
}

impl WorkArea {
    /// Evaluation order for [`WorkArea::classify`].
    pub const ALL: [WorkArea; 7] = [
        WorkArea::Dashboard,
        WorkArea::Crm,
        WorkArea::Linkedin,
        WorkArea::Marketing,
        WorkArea::Sales,
        WorkArea::Deployment,
        WorkArea::Qa,
    ];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            WorkArea::Dashboard => &["dashboard"],
            WorkArea::Crm => &["crm"],
            WorkArea::Linkedin => &["linkedin"],
            WorkArea::Marketing => &["market"],
            WorkArea::Sales => &["sales"],
            WorkArea::Deployment => &["deploy", "docker"],
            WorkArea::Qa => &["qa", "test"],
        }
    }

    /// First area whose keyword occurs in the lower-cased path.
    pub fn classify(path: &str) -> Option<WorkArea> {
        let lower = path.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|area| area.keywords().iter().any(|kw| lower.contains(kw)))
    }
}

/// A workspace file modified on the analysed day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileActivity {
    pub file: String,
    pub modified: DateTime<Local>,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFileInfo {
    pub file: String,
    pub modified: DateTime<Local>,
    pub size: u64,
}

/// Output of the workspace activity analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub completed_work: Vec<FileActivity>,
    pub real_progress: BTreeMap<WorkArea, u8>,
    pub total_files_created: usize,
    pub active_sessions: usize,
    pub recent_sessions: Vec<SessionFileInfo>,
    pub last_updated: DateTime<Utc>,
    pub analysis_source: String,
}

/// Per-area completion: `min(100, floor(count / FILES_PER_AREA * 100))`.
pub fn area_progress(count: usize) -> u8 {
    (count * 100 / FILES_PER_AREA).min(100) as u8
}
