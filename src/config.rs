use std::env;
use std::time::Duration;

use crate::errors::AppError;
use crate::services::blender::BlendPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub llm_provider: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub llm_timeout_ms: u64,
    pub blend_rule_weight: f64,
    pub blend_llm_weight: f64,
    pub scoring_table_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            llm_provider: env::var("LLM_PROVIDER")
                .map(|v| v.to_lowercase())
                .unwrap_or_else(|_| "none".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            groq_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
            llm_timeout_ms: env::var("LLM_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            blend_rule_weight: env::var("BLEND_RULE_WEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.55),
            blend_llm_weight: env::var("BLEND_LLM_WEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.45),
            scoring_table_path: env::var("SCORING_TABLE_PATH")
                .ok()
                .filter(|p| !p.is_empty()),
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_timeout_ms)
    }

    pub fn blend_policy(&self) -> Result<BlendPolicy, AppError> {
        let (wr, wl) = (self.blend_rule_weight, self.blend_llm_weight);
        if !wr.is_finite() || !wl.is_finite() || wr < 0.0 || wl < 0.0 || wr + wl <= 0.0 {
            return Err(AppError::Config(format!(
                "blend weights must be non-negative and not both zero (rules {wr}, llm {wl})"
            )));
        }
        Ok(BlendPolicy::with_weights(wr, wl))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            llm_provider: "none".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            groq_api_key: String::new(),
            groq_model: "llama-3.1-8b-instant".to_string(),
            llm_timeout_ms: 8000,
            blend_rule_weight: 0.55,
            blend_llm_weight: 0.45,
            scoring_table_path: None,
        }
    }
}
