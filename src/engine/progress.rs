use crate::model::SessionRecord;

/// Ceiling for inferred progress. 100 is reserved for explicit completion.
pub const PROGRESS_CAP: u8 = 95;

pub const SUBAGENT_BASELINE: u8 = 70;
pub const SYSTEM_BASELINE: u8 = 85;
pub const DEFAULT_BASELINE: u8 = 40;

/// Role baseline: subagent, then system-flagged, then everything else.
pub fn baseline(session: &SessionRecord) -> u8 {
    if session.is_subagent() {
        SUBAGENT_BASELINE
    } else if session.has_system_flag() {
        SYSTEM_BASELINE
    } else {
        DEFAULT_BASELINE
    }
}

/// Progress estimate in `0..=PROGRESS_CAP`.
///
/// Token usage can only raise the role baseline. Unparseable token strings
/// leave the baseline untouched.
pub fn estimate_progress(session: &SessionRecord) -> u8 {
    let base = baseline(session);
    let value = match session.token_usage() {
        Some(usage) => base.max(usage.percent()),
        None => base,
    };
    value.min(PROGRESS_CAP)
}
