//! Pre-trained survival classifiers
//!
//! The model artifact is a `linfa` classifier serialized either as JSON or as a
//! fory-wrapped MessagePack payload. It is loaded once at startup and shared
//! read-only between requests.

use crate::error::ModelError;
use crate::passenger::{FEATURE_COUNT, PassengerRecord};
use linfa::composing::MultiClassModel;
use linfa::prelude::Pr;
use linfa::{DatasetBase, traits::Predict};
use linfa_bayes::GaussianNb;
use linfa_svm::Svm;
use linfa_trees::DecisionTree;
use ndarray::{Array2, arr2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Capability of answering "did this passenger survive" for a single row.
pub trait Classifier: Send + Sync {
    fn predict(&self, record: &PassengerRecord) -> Result<Prediction, ModelError>;
}

/// Output of a single-row prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted class index as returned by the model
    pub label: usize,
    /// Class name, when the artifact carries a class mapping
    pub class: Option<String>,
}

impl Prediction {
    pub fn from_label(label: usize) -> Self {
        Self { label, class: None }
    }

    /// Whether the prediction is the positive (survived) label `1`.
    pub fn survived(&self) -> bool {
        match &self.class {
            Some(class) => {
                let class = class.trim();
                class == "1" || class.parse::<f64>().map(|v| v == 1.0).unwrap_or(false)
            }
            None => self.label == 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ClassEntry {
    id: usize,
    name: String,
}

/// Serializes the class mapping as a list of `{id, name}` entries.
mod vec_as_map {
    use super::ClassEntry;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S>(
        map_opt: &Option<HashMap<usize, String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match map_opt {
            Some(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by_key(|(id, _)| **id);
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for (id, name) in entries {
                    seq.serialize_element(&ClassEntry {
                        id: *id,
                        name: name.clone(),
                    })?;
                }
                seq.end()
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<HashMap<usize, String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt_vec: Option<Vec<ClassEntry>> = Option::deserialize(deserializer)?;
        Ok(opt_vec.map(|v| v.into_iter().map(|e| (e.id, e.name)).collect()))
    }
}

/// A fitted linfa model plus an optional class index → name mapping.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelWithMeta<M> {
    pub model: M,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(with = "vec_as_map")]
    pub classes: Option<HashMap<usize, String>>,
}

impl<M> ModelWithMeta<M> {
    fn prediction(&self, label: usize) -> Result<Prediction, ModelError> {
        let class = match &self.classes {
            Some(classes) => Some(
                classes
                    .get(&label)
                    .cloned()
                    .ok_or(ModelError::UnknownClass(label))?,
            ),
            None => None,
        };
        Ok(Prediction { label, class })
    }
}

/// Classifier families accepted as survival model artifacts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurvivalModel {
    DecisionTree(ModelWithMeta<DecisionTree<f64, usize>>),
    GaussianNaiveBayes(ModelWithMeta<GaussianNb<f64, usize>>),
    SVMMultiClass(ModelWithMeta<Vec<(usize, Svm<f64, Pr>)>>),
}

impl fmt::Display for SurvivalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurvivalModel::DecisionTree(_) => write!(f, "Decision Tree Classification"),
            SurvivalModel::GaussianNaiveBayes(_) => {
                write!(f, "Gaussian Naive Bayes Classification")
            }
            SurvivalModel::SVMMultiClass(_) => {
                write!(f, "SVM Classification (Multiple Classes)")
            }
        }
    }
}

#[derive(fory::ForyObject)]
struct ModelEnvelope {
    version: u8,
    model_type: String,
    msgpack_payload: Vec<u8>,
}

const ENVELOPE_VERSION: u8 = 1;

fn envelope_codec() -> Result<fory::Fory, ModelError> {
    let mut fory = fory::Fory::default().compatible(true);
    fory.register::<ModelEnvelope>(1)
        .map_err(|e| ModelError::Binary(format!("failed to register envelope: {e}")))?;
    Ok(fory)
}

impl SurvivalModel {
    /// Load an artifact from disk. `.json` files are read as JSON, anything
    /// else as the binary envelope.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_slice(&bytes)
        } else {
            Self::from_fory_slice(&bytes)
        }
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let model: SurvivalModel = serde_json::from_slice(bytes)?;
        model.check_compatible()?;
        Ok(model)
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>, ModelError> {
        Ok(serde_json::to_vec(self)?)
    }

    fn kind(&self) -> &'static str {
        match self {
            SurvivalModel::DecisionTree(_) => "DecisionTree",
            SurvivalModel::GaussianNaiveBayes(_) => "GaussianNaiveBayes",
            SurvivalModel::SVMMultiClass(_) => "SVMMultiClass",
        }
    }

    /// Serialize to the binary envelope: MessagePack inside a versioned fory
    /// wrapper.
    pub fn to_fory_vec(&self) -> Result<Vec<u8>, ModelError> {
        let msgpack_payload = rmp_serde::to_vec(self)
            .map_err(|e| ModelError::Binary(format!("MessagePack serialization failed: {e}")))?;
        let envelope = ModelEnvelope {
            version: ENVELOPE_VERSION,
            model_type: self.kind().to_string(),
            msgpack_payload,
        };
        envelope_codec()?
            .serialize(&envelope)
            .map_err(|e| ModelError::Binary(format!("Fory serialization failed: {e}")))
    }

    pub fn from_fory_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let envelope: ModelEnvelope = envelope_codec()?
            .deserialize(bytes)
            .map_err(|e| ModelError::Binary(format!("Fory deserialization failed: {e}")))?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(ModelError::UnsupportedVersion(envelope.version));
        }
        let model: SurvivalModel = rmp_serde::from_slice(&envelope.msgpack_payload)
            .map_err(|e| ModelError::Binary(format!("MessagePack deserialization failed: {e}")))?;
        if model.kind() != envelope.model_type {
            tracing::warn!(
                envelope = %envelope.model_type,
                payload = model.kind(),
                "Model envelope type does not match payload"
            );
        }
        model.check_compatible()?;
        Ok(model)
    }
}

/// Representative third-class passenger used to check an artifact can
/// predict on records of our width.
const CHECK_ROW: [f64; FEATURE_COUNT] = [3.0, 1.0, 30.0, 8.05, 0.0, 0.0];

fn single_row(features: [f64; FEATURE_COUNT]) -> Array2<f64> {
    arr2(&[features])
}

/// Run a model call, turning a panic inside linfa into a [`ModelError`].
fn guarded<T>(f: impl FnOnce() -> Result<T, ModelError>) -> Result<T, ModelError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(ModelError::Panicked(reason))
    })
}

impl SurvivalModel {
    /// Reject artifacts fitted on a different column layout.
    ///
    /// Trees are checked against the feature indices they split on; every
    /// model must also predict on a sample row without panicking.
    pub fn check_compatible(&self) -> Result<(), ModelError> {
        if let SurvivalModel::DecisionTree(model) = self {
            if let Some(index) = model
                .model
                .features()
                .into_iter()
                .find(|&index| index >= FEATURE_COUNT)
            {
                return Err(ModelError::FeatureOutOfRange {
                    index,
                    columns: FEATURE_COUNT,
                });
            }
        }
        match guarded(|| self.predict_row(single_row(CHECK_ROW))) {
            Err(ModelError::Panicked(reason)) => Err(ModelError::Incompatible {
                columns: FEATURE_COUNT,
                reason,
            }),
            // An incomplete class mapping only affects some rows, so it is
            // reported per request instead.
            _ => Ok(()),
        }
    }

    fn predict_row(&self, row: Array2<f64>) -> Result<Prediction, ModelError> {
        let dataset = DatasetBase::from(row);
        match self {
            SurvivalModel::DecisionTree(model) => {
                let predictions = model.model.predict(&dataset);
                let label = *predictions.first().ok_or(ModelError::EmptyPrediction)?;
                model.prediction(label)
            }
            SurvivalModel::GaussianNaiveBayes(model) => {
                let predictions = model.model.predict(&dataset);
                let label = *predictions.first().ok_or(ModelError::EmptyPrediction)?;
                model.prediction(label)
            }
            SurvivalModel::SVMMultiClass(model) => {
                let mult_class = MultiClassModel::from_iter(model.model.clone());
                let predictions = mult_class.predict(&dataset);
                let label = *predictions.first().ok_or(ModelError::EmptyPrediction)?;
                model.prediction(label)
            }
        }
    }
}

impl Classifier for SurvivalModel {
    fn predict(&self, record: &PassengerRecord) -> Result<Prediction, ModelError> {
        let row = single_row(record.features());
        guarded(|| self.predict_row(row))
    }
}
