//! Titanic Survival Predictor
//!
//! A single-page web form that collects passenger attributes, runs them
//! through a pre-trained `linfa` classifier and renders the verdict.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use titanic_predictor::{load_model, predictor_router, PredictorState};
//!
//! let model = load_model("titanic_survival_model.json");
//! let state = PredictorState::new(model)?;
//! let app = predictor_router(state);
//! ```

pub mod error;
pub mod ml;
pub mod outcome;
pub mod page;
pub mod passenger;
pub mod router;


pub use error::{InputError, ModelError};
pub use ml::{Classifier, Prediction, SurvivalModel};
pub use outcome::{Outcome, ResultStyle};
pub use passenger::{PassengerForm, PassengerRecord};
pub use router::{PredictorState, predictor_router};

use std::path::Path;
use std::sync::Arc;

/// Load the model artifact, logging instead of failing when it is unusable.
///
/// The service keeps running without a model; predictions then answer with
/// the "model not loaded" warning.
pub fn load_model(path: impl AsRef<Path>) -> Option<Arc<dyn Classifier>> {
    let path = path.as_ref();
    match SurvivalModel::load(path) {
        Ok(model) => {
            tracing::info!(path = %path.display(), "Model loaded successfully: {}", model);
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error loading model");
            None
        }
    }
}
