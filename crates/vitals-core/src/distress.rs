//! Distress classification from the latest vitals sample.

/// Pulse rate above which a sample contributes to distress (bpm, exclusive).
pub const PULSE_DISTRESS_THRESHOLD_BPM: i32 = 100;

/// Breathing rate above which a sample contributes to distress
/// (breaths/min, exclusive).
pub const BREATHING_DISTRESS_THRESHOLD_BPM: i32 = 20;

/// Whether a vitals sample indicates distress.
///
/// True iff both rates strictly exceed their thresholds. Evaluated fresh on
/// every sample with no memory of prior samples. This is a documented
/// simplification, not a validated clinical rule.
pub fn is_distressed(pulse_bpm: i32, breathing_bpm: i32) -> bool {
    pulse_bpm > PULSE_DISTRESS_THRESHOLD_BPM && breathing_bpm > BREATHING_DISTRESS_THRESHOLD_BPM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_above_thresholds_is_distressed() {
        assert!(is_distressed(101, 21));
        assert!(is_distressed(102, 22));
        assert!(is_distressed(180, 40));
    }

    #[test]
    fn pulse_boundary_is_not_distressed() {
        assert!(!is_distressed(100, 25));
    }

    #[test]
    fn breathing_boundary_is_not_distressed() {
        assert!(!is_distressed(120, 20));
    }

    #[test]
    fn both_boundaries_not_distressed() {
        assert!(!is_distressed(100, 20));
    }

    #[test]
    fn only_pulse_elevated_is_not_distressed() {
        assert!(!is_distressed(130, 12));
    }

    #[test]
    fn only_breathing_elevated_is_not_distressed() {
        assert!(!is_distressed(70, 30));
    }

    #[test]
    fn resting_vitals_not_distressed() {
        assert!(!is_distressed(65, 14));
    }

    #[test]
    fn zero_values_not_distressed() {
        assert!(!is_distressed(0, 0));
    }
}
