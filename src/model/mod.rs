pub mod activity;
pub mod agent;
pub mod ids;
pub mod registry;
pub mod report;
pub mod session;

pub use activity::{ActivityReport, FileActivity, SessionFileInfo, WorkArea};
pub use agent::{AgentRecord, AgentStatus, QualityMetrics, NOT_AVAILABLE, NO_SESSION};
pub use ids::AgentId;
pub use registry::{Registry, RegistryEntry};
pub use report::{Alert, AlertKind, Report};
pub use session::{parse_age_hours, SessionRecord, TokenUsage};
