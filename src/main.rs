use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use capability_evidence::app::{AppError, AppState};
use capability_evidence::cli::{CliArgs, USAGE};
use capability_evidence::model::Config;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing; stdout is reserved for the status record
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::from_env()?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = Config::from_env()?;
    let state = AppState::new(config)?;

    // A missing --pdf_path surfaces as a document read failure
    let pdf_path = args.pdf_path.unwrap_or_default();
    let (status, _extraction) = state.pipeline.run_evaluation(&pdf_path).await?;

    match serde_json::to_string(&status) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "Failed to serialize run status"),
    }

    Ok(())
}
