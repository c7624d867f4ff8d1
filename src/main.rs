use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use leadtriage::config::AppConfig;
use leadtriage::handlers;
use leadtriage::models::ScoringRules;
use leadtriage::services::ai::groq::GroqProvider;
use leadtriage::services::ai::ollama::OllamaProvider;
use leadtriage::services::ai::LlmProvider;
use leadtriage::services::triage::Triage;
use leadtriage::state::AppState;

fn build_llm(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn LlmProvider>>> {
    let llm: Option<Arc<dyn LlmProvider>> = match config.llm_provider.as_str() {
        "groq" => {
            anyhow::ensure!(
                !config.groq_api_key.is_empty(),
                "GROQ_API_KEY must be set when LLM_PROVIDER=groq"
            );
            tracing::info!("using Groq LLM provider (model: {})", config.groq_model);
            Some(Arc::new(GroqProvider::new(
                config.groq_api_key.clone(),
                config.groq_model.clone(),
            )))
        }
        "ollama" => {
            tracing::info!("using Ollama LLM provider (url: {})", config.ollama_url);
            Some(Arc::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            )))
        }
        "none" | "" => {
            tracing::info!("no LLM provider configured, classifying with rules only");
            None
        }
        other => anyhow::bail!("unknown LLM_PROVIDER: {other}"),
    };
    Ok(llm)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let rules = ScoringRules::load(config.scoring_table_path.as_deref().map(Path::new))?;
    let policy = config.blend_policy()?;
    let mut triage = Triage::new(rules, policy);
    if let Some(llm) = build_llm(&config)? {
        triage = triage.with_llm(llm, config.llm_timeout());
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        triage,
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
