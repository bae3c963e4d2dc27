use crate::error::{InputError, ModelError};
use crate::ml::Prediction;

pub const MODEL_NOT_LOADED: &str = "Model not loaded. Please check the model file.";
pub const INPUT_ERROR_PREFIX: &str = "Error processing the input:";

/// CSS class of the result block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStyle {
    Survived,
    NotSurvived,
}

impl ResultStyle {
    pub fn css_class(&self) -> &'static str {
        match self {
            ResultStyle::Survived => "survived",
            ResultStyle::NotSurvived => "not-survived",
        }
    }
}

/// Text, style and icon shown under the form after a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub text: String,
    pub style: ResultStyle,
    pub icon: &'static str,
}

impl Outcome {
    pub fn from_prediction(prediction: &Prediction) -> Self {
        if prediction.survived() {
            Self {
                text: "Survived".to_string(),
                style: ResultStyle::Survived,
                icon: "✅",
            }
        } else {
            Self {
                text: "Not Survived".to_string(),
                style: ResultStyle::NotSurvived,
                icon: "❌",
            }
        }
    }

    pub fn model_not_loaded() -> Self {
        Self {
            text: MODEL_NOT_LOADED.to_string(),
            style: ResultStyle::NotSurvived,
            icon: "⚠️",
        }
    }

    pub fn input_error(reason: impl std::fmt::Display) -> Self {
        Self {
            text: format!("{INPUT_ERROR_PREFIX} {reason}"),
            style: ResultStyle::NotSurvived,
            icon: "❌",
        }
    }
}

impl From<InputError> for Outcome {
    fn from(err: InputError) -> Self {
        Outcome::input_error(err)
    }
}

impl From<ModelError> for Outcome {
    fn from(err: ModelError) -> Self {
        Outcome::input_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_one_is_survived() {
        let outcome = Outcome::from_prediction(&Prediction::from_label(1));
        assert_eq!(outcome.text, "Survived");
        assert_eq!(outcome.style.css_class(), "survived");
        assert_eq!(outcome.icon, "✅");
    }

    #[test]
    fn test_other_labels_are_not_survived() {
        for label in [0, 2, 7] {
            let outcome = Outcome::from_prediction(&Prediction::from_label(label));
            assert_eq!(outcome.text, "Not Survived");
            assert_eq!(outcome.style, ResultStyle::NotSurvived);
            assert_eq!(outcome.icon, "❌");
        }
    }

    #[test]
    fn test_model_not_loaded_is_a_warning() {
        let outcome = Outcome::model_not_loaded();
        assert_eq!(outcome.text, MODEL_NOT_LOADED);
        assert_eq!(outcome.style.css_class(), "not-survived");
        assert_eq!(outcome.icon, "⚠️");
    }

    #[test]
    fn test_input_error_text() {
        let outcome: Outcome = InputError::Missing("age").into();
        assert_eq!(
            outcome.text,
            "Error processing the input: missing field 'age'"
        );
        assert_eq!(outcome.icon, "❌");
    }
}
