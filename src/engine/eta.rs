/// Elapsed time assumed for every session. No progress history is kept, so
/// the estimate extrapolates from this single point.
pub const ASSUMED_ELAPSED_HOURS: f64 = 1.0;

pub const ETA_UNKNOWN: &str = "N/A";

/// Hours left if `progress` percent took `elapsed_hours`.
///
/// `None` when there is no progress to extrapolate from.
pub fn remaining_hours(progress: u8, elapsed_hours: f64) -> Option<f64> {
    if progress == 0 {
        return None;
    }
    let total = elapsed_hours * (100.0 / f64::from(progress));
    Some(total - elapsed_hours)
}

/// Coarse remaining-time label for a progress value.
pub fn estimate_eta(progress: u8, elapsed_hours: f64) -> String {
    let Some(remaining) = remaining_hours(progress, elapsed_hours) else {
        return ETA_UNKNOWN.to_string();
    };

    if remaining < 0.5 {
        "<30 min".to_string()
    } else if remaining < 1.0 {
        "~1 hour".to_string()
    } else if remaining < 24.0 {
        match remaining.trunc() as u64 {
            1 => "~1 hour".to_string(),
            hours => format!("~{hours} hours"),
        }
    } else {
        format!("~{:.1} days", remaining / 24.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eta(progress: u8) -> String {
        estimate_eta(progress, ASSUMED_ELAPSED_HOURS)
    }

    #[test]
    fn zero_progress_has_no_eta() {
        assert_eq!(eta(0), "N/A");
    }

    #[test]
    fn bands() {
        // 95% -> remaining ~0.05h
        assert_eq!(eta(95), "<30 min");
        // 67% -> remaining ~0.49h
        assert_eq!(eta(67), "<30 min");
        // 66% -> remaining ~0.515h
        assert_eq!(eta(66), "~1 hour");
        // 50% -> remaining exactly 1h
        assert_eq!(eta(50), "~1 hour");
        // 40% -> remaining 1.5h, truncated
        assert_eq!(eta(40), "~1 hour");
        assert_eq!(eta(30), "~2 hours");
        assert_eq!(eta(10), "~9 hours");
        // 4% -> remaining 24h
        assert_eq!(eta(4), "~1.0 days");
        assert_eq!(eta(2), "~2.0 days");
    }

    #[test]
    fn elapsed_time_scales_estimate() {
        assert_eq!(estimate_eta(50, 3.0), "~3 hours");
        assert_eq!(remaining_hours(25, 2.0), Some(6.0));
    }
}
