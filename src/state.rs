use crate::config::AppConfig;
use crate::services::triage::Triage;

pub struct AppState {
    pub config: AppConfig,
    pub triage: Triage,
}
