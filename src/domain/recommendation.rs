//! Advisory text per risk category.

use super::risk::RiskLevel;

const HIGH: [&str; 3] = [
    "Immediate cardiology consultation recommended",
    "Consider stress echocardiography or coronary angiography",
    "Initiate appropriate medical therapy and lifestyle modifications",
];

const MODERATE: [&str; 3] = [
    "Schedule follow-up with primary care physician",
    "Consider additional cardiac screening tests",
    "Focus on risk factor modification (diet, exercise, smoking cessation)",
];

const LOW: [&str; 3] = [
    "Continue routine cardiovascular monitoring",
    "Maintain healthy lifestyle practices",
    "Annual cardiovascular risk assessment recommended",
];

/// Fixed recommendation list for a category, most urgent first.
#[must_use]
pub fn recommendations(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::High => &HIGH,
        RiskLevel::Moderate => &MODERATE,
        RiskLevel::Low => &LOW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_starts_with_referral() {
        let list = recommendations(RiskLevel::High);
        assert_eq!(list.len(), 3);
        assert!(list[0].starts_with("Immediate cardiology consultation"));
    }

    #[test]
    fn test_lists_are_distinct() {
        assert_ne!(recommendations(RiskLevel::Low), recommendations(RiskLevel::Moderate));
        assert!(recommendations(RiskLevel::Low)[2].contains("Annual"));
        assert!(recommendations(RiskLevel::Moderate)[0].contains("follow-up"));
    }
}
