//! Axum routes for the prediction form
//!
//! `GET /` serves the empty form, `POST /` validates the submitted passenger,
//! runs the model and renders the same page with a result block. Input and
//! model problems are rendered inline, so both routes answer 200.

use crate::ml::Classifier;
use crate::outcome::Outcome;
use crate::page::Page;
use crate::passenger::{PassengerForm, PassengerRecord};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared, read-only request state
#[derive(Clone)]
pub struct PredictorState {
    /// `None` when the artifact failed to load at startup
    pub model: Option<Arc<dyn Classifier>>,
    pub page: Arc<Page>,
}

impl PredictorState {
    pub fn new(model: Option<Arc<dyn Classifier>>) -> Result<Self, minijinja::Error> {
        Ok(Self {
            model,
            page: Arc::new(Page::new()?),
        })
    }

    /// Validate the form and run the model, turning every failure into an
    /// inline outcome.
    pub fn evaluate(&self, form: &PassengerForm) -> Outcome {
        let record = match PassengerRecord::try_from(form) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected passenger input");
                return e.into();
            }
        };
        tracing::debug!(passenger = %record, "Predicting survival");

        let Some(model) = &self.model else {
            return Outcome::model_not_loaded();
        };

        match model.predict(&record) {
            Ok(prediction) => {
                tracing::debug!(label = prediction.label, class = ?prediction.class, "Prediction done");
                Outcome::from_prediction(&prediction)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Model prediction failed");
                e.into()
            }
        }
    }
}

/// Construct the router serving the form at `/`
pub fn predictor_router(state: PredictorState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type PageResult = Result<Html<String>, (StatusCode, String)>;

fn render(page: &Page, outcome: Option<&Outcome>) -> PageResult {
    page.render(outcome).map(Html).map_err(|e| {
        tracing::error!(error = %e, "Failed to render page");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

/// GET /
async fn show_form(State(state): State<PredictorState>) -> PageResult {
    render(&state.page, None)
}

/// POST /
async fn submit_form(
    State(state): State<PredictorState>,
    form: Result<Form<PassengerForm>, FormRejection>,
) -> PageResult {
    let outcome = match form {
        Ok(Form(form)) => state.evaluate(&form),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable form submission");
            Outcome::input_error(rejection.body_text())
        }
    };
    render(&state.page, Some(&outcome))
}
