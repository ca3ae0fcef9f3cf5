use std::path::PathBuf;
use std::sync::Arc;

use api_rest::AppState;
use clinic_core::config::core_config_from_env_values;
use clinic_core::seed::{apply_seed, load_seed};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the clinic scheduling backend
///
/// Serves the REST API (with Swagger UI at `/swagger-ui`) from in-memory repositories,
/// optionally pre-populated from a YAML seed file.
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `API_KEY`: shared key every request must present in `x-api-key` (required)
/// - `CLINIC_SEED_FILE`: YAML file of users to register before serving
/// - `CLINIC_MAX_ID_ATTEMPTS`: identifier collision retries (default: 32)
/// - `CLINIC_DEFAULT_PAGE_SIZE`: page size when a listing omits `size` (default: 10)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let api_key = match std::env::var("API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => anyhow::bail!("API_KEY must be set"),
    };

    let cfg = Arc::new(core_config_from_env_values(
        std::env::var("CLINIC_MAX_ID_ATTEMPTS").ok(),
        std::env::var("CLINIC_DEFAULT_PAGE_SIZE").ok(),
    )?);
    let state = AppState::in_memory(cfg, api_key);

    if let Ok(seed_path) = std::env::var("CLINIC_SEED_FILE") {
        let seed_path = PathBuf::from(seed_path);
        let seed = load_seed(&seed_path)?;
        let count = apply_seed(&state.users, seed)?;
        tracing::info!("Seeded {} users from {}", count, seed_path.display());
    }

    tracing::info!("++ Starting clinic REST on {}", rest_addr);
    api_rest::serve(&rest_addr, state).await?;

    Ok(())
}
