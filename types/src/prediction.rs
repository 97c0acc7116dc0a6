//! Classifier output: a probability distribution over the ten digit classes.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Number of digit classes reported by the classifier.
pub const DIGIT_CLASSES: usize = 10;

// Softmax output can land a hair outside [0, 1] after float32 rounding.
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// A single decimal digit, 0 through 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digit(u8);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("digit out of range: {0}")]
pub struct DigitRangeError(pub i64);

impl Digit {
    pub fn new(value: u8) -> Result<Self, DigitRangeError> {
        Self::try_from(i64::from(value))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Digit {
    type Error = DigitRangeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v) if usize::from(v) < DIGIT_CLASSES => Ok(Self(v)),
            _ => Err(DigitRangeError(value)),
        }
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response body exactly as the endpoint sends it.
///
/// Unknown keys (the reference server also sends `message`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    pub probabilities: Option<Vec<f64>>,
    pub prediction: Option<i64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum PredictionShapeError {
    #[error("response has no probabilities")]
    MissingProbabilities,
    #[error("expected {DIGIT_CLASSES} probabilities, got {0}")]
    WrongLength(usize),
    #[error("probability for class {index} is not in [0, 1]: {value}")]
    OutOfRange { index: usize, value: f64 },
    #[error(transparent)]
    Digit(#[from] DigitRangeError),
}

/// Validated prediction shown by the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    probabilities: [f64; DIGIT_CLASSES],
    prediction: Option<Digit>,
}

impl PredictionResult {
    /// All-zero distribution with no top prediction.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            probabilities: [0.0; DIGIT_CLASSES],
            prediction: None,
        }
    }

    pub fn new(
        probabilities: [f64; DIGIT_CLASSES],
        prediction: Option<Digit>,
    ) -> Result<Self, PredictionShapeError> {
        let mut checked = probabilities;
        for (index, value) in checked.iter_mut().enumerate() {
            if !value.is_finite()
                || *value < -PROBABILITY_TOLERANCE
                || *value > 1.0 + PROBABILITY_TOLERANCE
            {
                return Err(PredictionShapeError::OutOfRange {
                    index,
                    value: *value,
                });
            }
            *value = value.clamp(0.0, 1.0);
        }
        Ok(Self {
            probabilities: checked,
            prediction,
        })
    }

    #[must_use]
    pub fn probabilities(&self) -> &[f64; DIGIT_CLASSES] {
        &self.probabilities
    }

    #[must_use]
    pub fn prediction(&self) -> Option<Digit> {
        self.prediction
    }

    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.prediction.is_none() && self.probabilities.iter().all(|p| *p == 0.0)
    }

    /// Top prediction for display, or `-` when absent.
    #[must_use]
    pub fn prediction_label(&self) -> String {
        self.prediction
            .map_or_else(|| "-".to_string(), |digit| digit.to_string())
    }
}

impl Default for PredictionResult {
    fn default() -> Self {
        Self::neutral()
    }
}

impl TryFrom<RawPrediction> for PredictionResult {
    type Error = PredictionShapeError;

    fn try_from(raw: RawPrediction) -> Result<Self, Self::Error> {
        let values = raw
            .probabilities
            .ok_or(PredictionShapeError::MissingProbabilities)?;
        let probabilities: [f64; DIGIT_CLASSES] = values
            .as_slice()
            .try_into()
            .map_err(|_| PredictionShapeError::WrongLength(values.len()))?;
        let prediction = raw.prediction.map(Digit::try_from).transpose()?;
        Self::new(probabilities, prediction)
    }
}

/// Render a probability as a percentage with two decimals, e.g. `95.00%`.
#[must_use]
pub fn format_percentage(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawPrediction {
        serde_json::from_str(json).expect("valid json")
    }

    #[test]
    fn digit_accepts_zero_through_nine() {
        for value in 0_i64..10 {
            assert_eq!(i64::from(Digit::try_from(value).unwrap().get()), value);
        }
        assert_eq!(Digit::try_from(10_i64), Err(DigitRangeError(10)));
        assert_eq!(Digit::try_from(-1_i64), Err(DigitRangeError(-1)));
    }

    #[test]
    fn parses_reference_response() {
        let body = r#"{
            "message": "Prediction successful",
            "prediction": 8,
            "probabilities": [0.01, 0, 0, 0, 0, 0, 0, 0, 0.95, 0.04]
        }"#;
        let result = PredictionResult::try_from(raw(body)).unwrap();
        assert_eq!(result.prediction(), Some(Digit::new(8).unwrap()));
        assert_eq!(result.prediction_label(), "8");
        assert_eq!(format_percentage(result.probabilities()[8]), "95.00%");
        assert_eq!(format_percentage(result.probabilities()[0]), "1.00%");
    }

    #[test]
    fn error_body_without_probabilities_is_rejected() {
        let result = PredictionResult::try_from(raw(r#"{"message": "An error occurred"}"#));
        assert_eq!(result, Err(PredictionShapeError::MissingProbabilities));
    }

    #[test]
    fn wrong_length_is_rejected() {
        let result = PredictionResult::try_from(raw(r#"{"probabilities": [0.5, 0.5]}"#));
        assert_eq!(result, Err(PredictionShapeError::WrongLength(2)));
    }

    #[test]
    fn out_of_range_prediction_is_rejected() {
        let body = r#"{"probabilities": [0,0,0,0,0,0,0,0,0,1], "prediction": 12}"#;
        let result = PredictionResult::try_from(raw(body));
        assert_eq!(
            result,
            Err(PredictionShapeError::Digit(DigitRangeError(12)))
        );
    }

    #[test]
    fn absent_prediction_is_allowed() {
        let body = r#"{"probabilities": [0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1]}"#;
        let result = PredictionResult::try_from(raw(body)).unwrap();
        assert_eq!(result.prediction_label(), "-");
        assert!(!result.is_neutral());
    }

    #[test]
    fn negative_probability_is_rejected() {
        let mut values = [0.0; DIGIT_CLASSES];
        values[3] = -0.5;
        assert!(matches!(
            PredictionResult::new(values, None),
            Err(PredictionShapeError::OutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn rounding_noise_is_clamped() {
        let mut values = [0.0; DIGIT_CLASSES];
        values[1] = 1.000_000_1;
        let result = PredictionResult::new(values, None).unwrap();
        assert!((result.probabilities()[1] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn neutral_is_all_zero_without_prediction() {
        let neutral = PredictionResult::neutral();
        assert!(neutral.is_neutral());
        assert_eq!(neutral.prediction_label(), "-");
        assert_eq!(format_percentage(neutral.probabilities()[0]), "0.00%");
    }

    #[test]
    fn percentage_has_two_decimals() {
        assert_eq!(format_percentage(0.123_456), "12.35%");
        assert_eq!(format_percentage(1.0), "100.00%");
    }
}
