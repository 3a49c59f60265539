use crate::core::schedule::Schedule;
use crate::providers::util::RetryPolicy;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BinanceProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub binance: Option<BinanceProviderConfig>,
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            binance: Some(BinanceProviderConfig {
                base_url: "https://api.binance.com".to_string(),
            }),
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    /// Extra attempts after the first failed request.
    pub retries: usize,
    pub retry_delay_ms: u64,
    /// Multiplier applied to the delay after every failed attempt.
    pub backoff_factor: u32,
    pub timeout_secs: u64,
    /// Pause between two sampled dates.
    pub request_delay_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            retries: 3,
            retry_delay_ms: 500,
            backoff_factor: 2,
            timeout_secs: 10,
            request_delay_ms: 100,
        }
    }
}

impl NetworkConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            delay_ms: self.retry_delay_ms,
            backoff_factor: self.backoff_factor,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub schedule: Schedule,
    pub years_back: u32,
    /// TRY invested every period.
    pub contribution: f64,
    /// Last day of the simulation, today when unset.
    pub end_date: Option<NaiveDate>,
    pub output_dir: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "dcareport", "dcareport")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_output_dir(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.output_dir {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "dcareport", "dcareport")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("reports"))
    }

    pub fn end_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(today)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.contribution.is_finite() || self.contribution <= 0.0 {
            bail!("contribution must be positive, got {}", self.contribution);
        }
        if self.years_back == 0 {
            bail!("years_back must be at least 1");
        }
        self.schedule.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
schedule:
  mode: fixed_interval
  interval_days: 14
years_back: 3
contribution: 2500.5
end_date: 2024-03-26
output_dir: "/tmp/reports"
providers:
  binance:
    base_url: "http://example.com/binance"
  yahoo:
    base_url: "http://example.com/yahoo"
network:
  retries: 1
  timeout_secs: 5
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.schedule, Schedule::FixedInterval { interval_days: 14 });
        assert_eq!(config.years_back, 3);
        assert_eq!(config.contribution, 2500.5);
        assert_eq!(
            config.end_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 26).unwrap())
        );
        assert_eq!(
            config.default_output_dir().unwrap(),
            PathBuf::from("/tmp/reports")
        );
        assert_eq!(
            config.providers.binance.as_ref().unwrap().base_url,
            "http://example.com/binance"
        );
        assert_eq!(
            config.providers.yahoo.as_ref().unwrap().base_url,
            "http://example.com/yahoo"
        );

        // Unset network keys keep their defaults.
        assert_eq!(config.network.retries, 1);
        assert_eq!(config.network.timeout(), Duration::from_secs(5));
        assert_eq!(config.network.retry_delay_ms, 500);
        assert_eq!(config.network.backoff_factor, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("years_back: 2\ncontribution: 10000").unwrap();

        assert_eq!(config.schedule, Schedule::FixedDay { investment_day: 26 });
        assert!(config.end_date.is_none());
        assert_eq!(
            config.providers.binance.as_ref().unwrap().base_url,
            "https://api.binance.com"
        );
        assert_eq!(
            config.providers.yahoo.as_ref().unwrap().base_url,
            "https://query1.finance.yahoo.com"
        );
        assert_eq!(config.network.request_delay(), Duration::from_millis(100));

        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(config.end_date_or(today), today);
    }

    #[test]
    fn test_config_requires_contribution() {
        let result = serde_yaml::from_str::<AppConfig>("years_back: 2");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config: AppConfig =
            serde_yaml::from_str("years_back: 2\ncontribution: 100").unwrap();
        assert!(config.validate().is_ok());

        config.contribution = 0.0;
        assert!(config.validate().unwrap_err().to_string().contains("contribution"));

        config.contribution = 100.0;
        config.years_back = 0;
        assert!(config.validate().unwrap_err().to_string().contains("years_back"));

        config.years_back = 1;
        config.schedule = Schedule::FixedDay { investment_day: 40 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_path_rejects_invalid_config() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "years_back: 2\ncontribution: -5").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }
}
