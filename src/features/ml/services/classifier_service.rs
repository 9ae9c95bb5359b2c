use sha2::{Digest, Sha256};

use crate::shared::constants::DEFAULT_CO2_FACTOR;

/// Category table in fixed order: the digest index picks a row, so the order
/// is part of the classification contract and must not be rearranged.
const CATEGORIES: [(&str, &str); 5] = [
    ("Battery", "Take to a recycling center; avoid general trash."),
    ("Circuit Board", "Handle carefully; recycle at e-waste facility."),
    ("Plastic Casing", "Separate and recycle if local rules allow."),
    ("Metal Scrap", "Can be melted and reused; recycle."),
    ("Display Panel", "Contains hazardous materials; recycle safely."),
];

/// CO2 savings in kilograms credited for recycling one item of a category
pub fn co2_factor(category: &str) -> f64 {
    match category {
        "Battery" => 2.5,
        "Circuit Board" => 1.8,
        "Plastic Casing" => 0.8,
        "Metal Scrap" => 1.5,
        "Display Panel" => 3.0,
        _ => DEFAULT_CO2_FACTOR,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub category: String,
    pub confidence: f64,
    pub suggestion: String,
}

/// Service for assigning a waste category to an upload.
///
/// The prediction is derived from the SHA-256 digest of the filename alone;
/// image bytes are never inspected. The same name therefore always maps to
/// the same category and confidence, which keeps reward computation
/// reproducible across retries and environments.
pub struct ClassifierService;

impl ClassifierService {
    pub fn new() -> Self {
        Self
    }

    pub fn predict(&self, filename: &str) -> Prediction {
        let digest = Sha256::digest(filename.as_bytes());

        let idx = digest_mod(&digest, CATEGORIES.len() as u64) as usize;
        let confidence = 0.65 + digest_mod(&digest, 35) as f64 / 100.0;
        let confidence = round2(f64::min(confidence, 0.99));

        let (category, suggestion) = CATEGORIES[idx];
        Prediction {
            category: category.to_string(),
            confidence,
            suggestion: suggestion.to_string(),
        }
    }
}

impl Default for ClassifierService {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduce a digest modulo `m`, treating the bytes as one big-endian integer.
/// Folding byte by byte keeps the arithmetic in u64 regardless of digest
/// width: (a*256 + b) mod m distributes over the modulus.
fn digest_mod(digest: &[u8], m: u64) -> u64 {
    digest
        .iter()
        .fold(0u64, |acc, &byte| (acc * 256 + byte as u64) % m)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ==================== classifier tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_is_deterministic() {
        let classifier = ClassifierService::new();
        let first = classifier.predict("phone1.jpg");
        let second = classifier.predict("phone1.jpg");
        assert_eq!(first, second);
    }

    #[test]
    fn test_predict_known_filenames() {
        let classifier = ClassifierService::new();

        let prediction = classifier.predict("phone1.jpg");
        assert_eq!(prediction.category, "Circuit Board");
        assert_eq!(prediction.confidence, 0.76);
        assert_eq!(
            prediction.suggestion,
            "Handle carefully; recycle at e-waste facility."
        );

        let prediction = classifier.predict("router.png");
        assert_eq!(prediction.category, "Battery");
        assert_eq!(prediction.confidence, 0.65);

        let prediction = classifier.predict("cable-pile.jpg");
        assert_eq!(prediction.category, "Display Panel");
        assert_eq!(prediction.confidence, 0.99);

        let prediction = classifier.predict("widget.bin");
        assert_eq!(prediction.category, "Plastic Casing");
        assert_eq!(prediction.confidence, 0.82);
    }

    #[test]
    fn test_predict_fallback_name() {
        // The pipeline substitutes "unknown" when an upload has no filename
        let prediction = ClassifierService::new().predict("unknown");
        assert_eq!(prediction.category, "Metal Scrap");
        assert_eq!(prediction.confidence, 0.98);
    }

    #[test]
    fn test_confidence_stays_in_range_with_two_decimals() {
        let classifier = ClassifierService::new();
        let long_name = "x".repeat(300);
        for name in [
            "a",
            "b.jpg",
            "IMG_20240101_120000.jpg",
            "Schrödinger's cat.png",
            "",
            long_name.as_str(),
        ] {
            let prediction = classifier.predict(name);
            assert!(
                (0.65..=0.99).contains(&prediction.confidence),
                "confidence {} out of range for {:?}",
                prediction.confidence,
                name
            );
            let scaled = prediction.confidence * 100.0;
            assert!(
                (scaled - scaled.round()).abs() < 1e-9,
                "confidence {} not rounded to two decimals",
                prediction.confidence
            );
        }
    }

    #[test]
    fn test_digest_mod_matches_wide_integer_arithmetic() {
        // 0x0102 = 258; 258 % 7 == 6, 258 % 100 == 58
        assert_eq!(digest_mod(&[0x01, 0x02], 7), 6);
        assert_eq!(digest_mod(&[0x01, 0x02], 100), 58);
        assert_eq!(digest_mod(&[], 5), 0);
    }

    #[test]
    fn test_co2_factor_table() {
        assert_eq!(co2_factor("Battery"), 2.5);
        assert_eq!(co2_factor("Circuit Board"), 1.8);
        assert_eq!(co2_factor("Plastic Casing"), 0.8);
        assert_eq!(co2_factor("Metal Scrap"), 1.5);
        assert_eq!(co2_factor("Display Panel"), 3.0);
        assert_eq!(co2_factor("Unknown Category"), DEFAULT_CO2_FACTOR);
    }
}
