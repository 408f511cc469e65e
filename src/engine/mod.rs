pub mod aggregator;
pub mod alerts;
pub mod classifier;
pub mod eta;
pub mod progress;
pub mod quality;

pub use aggregator::{build_agents, record_for_session, Aggregator, EngineOptions, RunOutcome};
pub use alerts::check_alerts;
pub use classifier::{default_rules, Classification, Classifier, ClassifierRule};
pub use eta::{estimate_eta, remaining_hours, ASSUMED_ELAPSED_HOURS};
pub use progress::{baseline, estimate_progress, PROGRESS_CAP};
pub use quality::{FileQuality, QualityProvider, SimulatedQuality, UNMEASURED};
