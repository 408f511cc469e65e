//! Quality and test metrics per agent.
//!
//! There is no QA system wired in yet. [`SimulatedQuality`] draws placeholder
//! numbers and must not be read as real measurements; [`FileQuality`] reads
//! measured figures exported by an external QA job.

use crate::error::{ParseError, SourceError};
use crate::model::{AgentId, QualityMetrics};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Figures used when a provider has nothing for an agent. A perfect score so
/// that missing data never raises a quality alert.
pub const UNMEASURED: QualityMetrics = QualityMetrics {
    score: 100,
    tests_passed: 0,
    bugs_found: 0,
    code_quality: 100,
};

pub trait QualityProvider: Send + Sync {
    /// Metrics for one agent, `None` when the provider knows nothing about it.
    fn metrics(&self, agent_id: &AgentId) -> Option<QualityMetrics>;

    /// Provenance tag recorded in the report.
    fn tag(&self) -> &str;
}

/// Uniformly random placeholder metrics. Not for production decisions.
pub struct SimulatedQuality {
    rng: Mutex<StdRng>,
}

impl SimulatedQuality {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic sequence, for tests and reproducible demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SimulatedQuality {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityProvider for SimulatedQuality {
    fn metrics(&self, _agent_id: &AgentId) -> Option<QualityMetrics> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Some(QualityMetrics {
            score: rng.random_range(70..=100),
            tests_passed: rng.random_range(5..=10),
            bugs_found: rng.random_range(0..=3),
            code_quality: rng.random_range(80..=100),
        })
    }

    fn tag(&self) -> &str {
        "simulated_quality"
    }
}

/// Metrics read from a JSON file keyed by agent id:
///
/// ```json
/// { "developer": { "quality_score": 82, "tests_passed": 40, "bugs_found": 2, "code_quality": 90 } }
/// ```
#[derive(Debug, Clone)]
pub struct FileQuality {
    path: PathBuf,
    metrics: BTreeMap<AgentId, QualityMetrics>,
}

impl FileQuality {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let metrics = parse_quality_file(&content).map_err(|error| SourceError::Parse {
            origin: path.display().to_string(),
            error,
        })?;

        tracing::debug!(path = %path.display(), agents = metrics.len(), "loaded quality metrics");
        Ok(Self {
            path: path.to_path_buf(),
            metrics,
        })
    }

    pub fn from_map(metrics: BTreeMap<AgentId, QualityMetrics>) -> Self {
        Self {
            path: PathBuf::new(),
            metrics,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QualityProvider for FileQuality {
    fn metrics(&self, agent_id: &AgentId) -> Option<QualityMetrics> {
        self.metrics.get(agent_id).copied()
    }

    fn tag(&self) -> &str {
        "quality_file"
    }
}

/// Pure parser for the quality export format.
pub fn parse_quality_file(content: &str) -> Result<BTreeMap<AgentId, QualityMetrics>, ParseError> {
    serde_json::from_str(content).map_err(|e| ParseError::Json(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_metrics_stay_in_range() {
        let provider = SimulatedQuality::seeded(7);
        let id = AgentId::main();
        for _ in 0..500 {
            let m = provider.metrics(&id).unwrap();
            assert!((70..=100).contains(&m.score));
            assert!((5..=10).contains(&m.tests_passed));
            assert!(m.bugs_found <= 3);
            assert!((80..=100).contains(&m.code_quality));
        }
    }

    #[test]
    fn seeded_providers_repeat() {
        let a = SimulatedQuality::seeded(42);
        let b = SimulatedQuality::seeded(42);
        let id = AgentId::new("designer");
        for _ in 0..10 {
            assert_eq!(a.metrics(&id), b.metrics(&id));
        }
    }

    #[test]
    fn quality_file_lookup() {
        let parsed = parse_quality_file(
            r#"{"developer": {"quality_score": 64, "tests_passed": 12, "bugs_found": 5, "code_quality": 77}}"#,
        )
        .unwrap();
        let provider = FileQuality::from_map(parsed);

        let dev = provider.metrics(&AgentId::new("developer")).unwrap();
        assert_eq!(dev.score, 64);
        assert_eq!(dev.bugs_found, 5);
        assert!(provider.metrics(&AgentId::new("designer")).is_none());
    }

    #[test]
    fn quality_file_rejects_garbage() {
        assert!(parse_quality_file("[1,2,3]").is_err());
    }
}
