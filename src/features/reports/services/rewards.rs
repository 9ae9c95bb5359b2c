//! Reward computation for accepted submissions.

use crate::features::ml::co2_factor;
use crate::shared::constants::POINTS_BASE;

/// Rewards locked in when a report is created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewards {
    pub points: i64,
    pub co2_saved: f64,
}

/// Flat base plus one point per tenth of confidence. Confidence lives in
/// 0.65..=0.99, so awarded points land in 16..=19.
pub fn points_for(confidence: f64) -> i64 {
    POINTS_BASE + (confidence * 10.0) as i64
}

pub fn compute(category: &str, confidence: f64) -> Rewards {
    Rewards {
        points: points_for(confidence),
        co2_saved: co2_factor(category),
    }
}

// ==================== rewards tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_boundaries() {
        assert_eq!(points_for(0.65), 16);
        assert_eq!(points_for(0.99), 19);
    }

    #[test]
    fn test_points_interior_values() {
        assert_eq!(points_for(0.70), 17);
        assert_eq!(points_for(0.76), 17);
        assert_eq!(points_for(0.85), 18);
        assert_eq!(points_for(0.90), 19);
    }

    #[test]
    fn test_compute_uses_category_factor() {
        let rewards = compute("Battery", 0.85);
        assert_eq!(rewards.points, 18);
        assert_eq!(rewards.co2_saved, 2.5);

        let rewards = compute("Something Else", 0.65);
        assert_eq!(rewards.points, 16);
        assert_eq!(rewards.co2_saved, 1.2);
    }
}
