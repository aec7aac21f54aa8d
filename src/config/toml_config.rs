use crate::utils::error::{HarnessError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional overrides loaded from `--config <file>`.
///
/// Every section and key is optional; anything left out keeps the built-in default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub servers: Option<ServersConfig>,
    pub http: Option<HttpConfig>,
    pub retry: Option<RetryConfig>,
    pub sampling: Option<SamplingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServersConfig {
    pub old: Option<String>,
    pub new: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: Option<f64>,
    pub read_timeout_secs: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryConfig {
    pub total: Option<u32>,
    pub backoff_factor: Option<f64>,
    pub backoff_max_secs: Option<f64>,
    pub status_forcelist: Option<Vec<u16>>,
    pub respect_retry_after: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub list_path: Option<String>,
    pub workers: Option<usize>,
    pub seed: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(HarnessError::ConfigError {
                message: format!("config file not found: {}", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        let config: TomlConfig = toml::from_str(&processed_content)?;
        Ok(config)
    }

    /// 替換環境變數 (例如 ${OLD_SERVER_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HarnessError::ConfigError {
            message: format!("invalid env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(servers) = &self.servers {
            if let Some(old) = &servers.old {
                validation::validate_url("servers.old", old)?;
            }
            if let Some(new) = &servers.new {
                validation::validate_url("servers.new", new)?;
            }
        }

        if let Some(http) = &self.http {
            if let Some(secs) = http.connect_timeout_secs {
                validation::validate_duration_secs("http.connect_timeout_secs", secs)?;
            }
            if let Some(secs) = http.read_timeout_secs {
                validation::validate_duration_secs("http.read_timeout_secs", secs)?;
            }
        }

        if let Some(retry) = &self.retry {
            if let Some(factor) = retry.backoff_factor {
                if !factor.is_finite() || factor < 0.0 {
                    return Err(HarnessError::InvalidConfigValueError {
                        field: "retry.backoff_factor".to_string(),
                        value: factor.to_string(),
                        reason: "Backoff factor must be a finite, non-negative number".to_string(),
                    });
                }
            }
            if let Some(secs) = retry.backoff_max_secs {
                if !secs.is_finite() || secs < 0.0 {
                    return Err(HarnessError::InvalidConfigValueError {
                        field: "retry.backoff_max_secs".to_string(),
                        value: secs.to_string(),
                        reason: "Backoff cap must be a finite, non-negative number".to_string(),
                    });
                }
            }
            if let Some(codes) = &retry.status_forcelist {
                validation::validate_status_codes("retry.status_forcelist", codes)?;
            }
        }

        if let Some(sampling) = &self.sampling {
            if let Some(path) = &sampling.list_path {
                validation::validate_path("sampling.list_path", path)?;
            }
            if let Some(workers) = sampling.workers {
                validation::validate_positive_number("sampling.workers", workers, 1)?;
            }
        }

        Ok(())
    }
}
