use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub key: String,
    pub secret: String,
}

/// Settings for one entity worker loop.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Ledger file for this entity.
    pub data_path: String,
    /// Seconds between polling cycles.
    pub update_freq_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyConfig {
    /// Report file, fully rewritten on every scan.
    pub data_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: WorkerConfig,
    pub station: WorkerConfig,
    pub alarm: WorkerConfig,
    pub anomaly: AnomalyConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("SYNC_CONFIG").unwrap_or_else(|_| "sync-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml_src = r#"
            [api]
            base_url = "https://gateway.example.com/cp"
            key = "k"
            secret = "s"

            [session]
            data_path = "data/sessions.csv"
            update_freq_secs = 3600
            max_retries = 3
            retry_backoff_ms = 5000

            [station]
            data_path = "data/stations.csv"
            update_freq_secs = 86400
            max_retries = 3
            retry_backoff_ms = 5000

            [alarm]
            data_path = "data/alarms.csv"
            update_freq_secs = 3600
            max_retries = 3
            retry_backoff_ms = 5000

            [anomaly]
            data_path = "data/anomalies.csv"

            [metrics]
            bind_addr = "127.0.0.1:9102"
        "#;

        let cfg: AppConfig = toml::from_str(toml_src).expect("config should parse");
        assert_eq!(cfg.session.update_freq_secs, 3600);
        assert_eq!(cfg.alarm.data_path, "data/alarms.csv");
        assert_eq!(cfg.metrics.expect("metrics section").bind_addr, "127.0.0.1:9102");
    }

    #[test]
    fn metrics_section_is_optional() {
        let toml_src = r#"
            [api]
            base_url = "https://gateway.example.com/cp"
            key = "k"
            secret = "s"

            [session]
            data_path = "data/sessions.csv"
            update_freq_secs = 60
            max_retries = 1
            retry_backoff_ms = 100

            [station]
            data_path = "data/stations.csv"
            update_freq_secs = 60
            max_retries = 1
            retry_backoff_ms = 100

            [alarm]
            data_path = "data/alarms.csv"
            update_freq_secs = 60
            max_retries = 1
            retry_backoff_ms = 100

            [anomaly]
            data_path = "data/anomalies.csv"
        "#;

        let cfg: AppConfig = toml::from_str(toml_src).expect("config should parse");
        assert!(cfg.metrics.is_none());
    }
}
