//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; setup/login is delegated to AuthFlow.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tg_digest::adapters::ai::GeminiAdapter;
use tg_digest::adapters::persistence::JsonConfigStore;
use tg_digest::adapters::telegram::GrammersChatBackend;
use tg_digest::adapters::ui::{self, tui::TuiInputPort};
use tg_digest::domain::ConfigKey;
use tg_digest::ports::{ChatBackend, ConfigStore, InputPort, SummarizerPort};
use tg_digest::shared::config::AppConfig;
use tg_digest::usecases::SummarizationPipeline;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    // Prompts share the terminal, so only warnings by default.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid settings, using defaults");
        AppConfig::default()
    });

    ui::init_ui();

    // --- Credentials store + Telegram backend (client is built lazily from the store) ---
    let config_path = cfg.config_path_or_default();
    info!(path = %config_path, "credentials file");
    let config: Arc<dyn ConfigStore> = Arc::new(JsonConfigStore::new(&config_path));
    let backend: Arc<dyn ChatBackend> = Arc::new(GrammersChatBackend::new(
        Arc::clone(&config),
        cfg.session_path_or_default(),
    ));

    // --- Setup / login (runs inside the runtime, so the reconnect happens on the live loop) ---
    let mut auth = ui::setup::start(Arc::clone(&config), Arc::clone(&backend)).await;
    if !ui::setup::run(&mut auth)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?
    {
        return Ok(());
    }

    // --- Summarizer (key is guaranteed by the setup flow) ---
    let gemini_key = config
        .get(ConfigKey::GeminiKey)
        .await
        .ok_or_else(|| anyhow::anyhow!("Gemini API key missing after setup"))?;
    let relay_url = cfg.relay_url();
    info!(
        model = %cfg.gemini_model_or_default(),
        relayed = relay_url.is_some(),
        "Gemini summarizer ready"
    );
    let summarizer: Arc<dyn SummarizerPort> = Arc::new(GeminiAdapter::new(
        cfg.gemini_api_base_or_default(),
        cfg.gemini_model_or_default(),
        gemini_key,
        relay_url,
    ));

    let pipeline = SummarizationPipeline::new(
        Arc::clone(&backend),
        summarizer,
        cfg.context_messages_or_default(),
    );

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        backend,
        pipeline,
        cfg.dialog_limit_or_default(),
        cfg.data_dir_or_default(),
    ));

    // --- Run (chat list -> analyze -> results) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
