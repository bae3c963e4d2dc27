#[cfg(not(any(all(target_os = "macos", target_arch = "aarch64"), target_os = "ios")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use dotenv::dotenv;
use titanic_predictor::{PredictorState, load_model, predictor_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Titanic Survival Prediction server");

    let config = config::Config::from_env()?;
    tracing::info!(
        "Loaded configuration: addr={}, model_path={}",
        config.addr(),
        config.model_path.display()
    );

    // A missing or broken artifact is logged and the form keeps working.
    let model = load_model(&config.model_path);
    if model.is_none() {
        tracing::warn!("Serving without a model; predictions will report it as not loaded");
    }

    let state = PredictorState::new(model)?;
    let app = predictor_router(state);

    let addr = config.addr();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
