//! Serde default helpers for config fields.

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_name() -> String {
    "Corredor".to_string()
}

pub(super) fn default_data_dir() -> String {
    "~/.corredor".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_deny_message() -> String {
    "Lo siento, no estás autorizado para usar este servicio.".to_string()
}

pub(super) fn default_db_path() -> String {
    "~/.corredor/data/corredor.db".to_string()
}

pub(super) fn default_fallback_tab() -> String {
    "Propiedades".to_string()
}

pub(super) fn default_uf_rate() -> u64 {
    37_000
}

pub(super) fn default_usd_rate() -> u64 {
    950
}

pub(super) fn default_followup_poll() -> u64 {
    3_600
}

pub(super) fn default_provider() -> String {
    "gemini".to_string()
}

pub(super) fn default_gemini_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

pub(super) fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

pub(super) fn default_bridge_url() -> String {
    "http://127.0.0.1:3100".to_string()
}
