use anyhow::{Context, Result};
use hyphen_toggle::{
    models::{GetOptions, ToggleOptions},
    Toggle, ERROR_EVENT,
};
use tracing::{event, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let public_api_key =
        std::env::var("HYPHEN_PUBLIC_API_KEY").context("HYPHEN_PUBLIC_API_KEY must be set")?;
    let application_id =
        std::env::var("HYPHEN_APPLICATION_ID").context("HYPHEN_APPLICATION_ID must be set")?;
    let toggle_key = std::env::args()
        .nth(1)
        .context("usage: hyphen-toggle <toggle-key>")?;

    let toggle = Toggle::new(ToggleOptions {
        public_api_key: Some(public_api_key),
        application_id: Some(application_id),
        environment: std::env::var("HYPHEN_ENVIRONMENT").ok(),
        ..Default::default()
    });
    toggle.on(ERROR_EVENT, |err| {
        event!(Level::WARN, "Toggle evaluation failed: {}", err);
    });

    event!(
        Level::INFO,
        "Evaluating {} against {:?}",
        toggle_key,
        toggle.horizon_urls()
    );
    let value: serde_json::Value = toggle
        .get(&toggle_key, serde_json::Value::Null, GetOptions::default())
        .await;
    println!("{}", value);

    Ok(())
}
