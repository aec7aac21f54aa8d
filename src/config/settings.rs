use crate::config::toml_config::TomlConfig;
use crate::domain::model::Mode;
use crate::utils::error::{HarnessError, Result};
use crate::utils::validation::{self, Validate};
use backoff::backoff::Backoff;
use std::time::Duration;

pub const DEFAULT_SAMPLE_RATE: f64 = 0.001;
pub const DEFAULT_LIST_PATH: &str = "integration/cpe.txt";
pub const DEFAULT_OLD_URL: &str = "http://127.0.0.1:1325";
pub const DEFAULT_NEW_URL: &str = "http://127.0.0.1:1326";

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs_f64(2.0),
            read_timeout: Duration::from_secs_f64(30.0),
        }
    }
}

/// Status-based retry with exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub total: u32,
    pub backoff_factor: f64,
    pub backoff_max: Duration,
    pub status_forcelist: Vec<u16>,
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            total: 5,
            backoff_factor: 1.0,
            backoff_max: Duration::from_secs(120),
            status_forcelist: vec![503, 504],
            respect_retry_after: true,
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn disabled() -> Self {
        Self {
            total: 0,
            ..Self::default()
        }
    }

    pub fn should_retry(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Sleep before the `retry`-th retry (1-based).
    ///
    /// The first retry goes out immediately, then `factor * 2^(retry - 1)` seconds,
    /// capped at `backoff_max`.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exponent = (retry - 1).min(63) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        let capped = secs.min(self.backoff_max.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// A server-supplied `Retry-After`, capped at `backoff_max`, or `None` when ignored.
    pub fn retry_after_delay(&self, retry_after: Option<Duration>) -> Option<Duration> {
        retry_after
            .filter(|_| self.respect_retry_after)
            .map(|delay| delay.min(self.backoff_max))
    }

    pub fn schedule(&self) -> RetrySchedule {
        RetrySchedule {
            policy: self.clone(),
            retries: 0,
        }
    }
}

/// Walks the [`RetryPolicy`] backoff sequence, giving up after `total` retries.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    policy: RetryPolicy,
    retries: u32,
}

impl Backoff for RetrySchedule {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries >= self.policy.total {
            return None;
        }
        self.retries += 1;
        Some(self.policy.backoff(self.retries))
    }

    fn reset(&mut self) {
        self.retries = 0;
    }
}

fn default_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(32)
}

/// Fully resolved configuration passed explicitly through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessSettings {
    pub mode: Mode,
    pub sample_rate: f64,
    pub debug: bool,
    pub list_path: String,
    pub old_url: String,
    pub new_url: String,
    pub workers: usize,
    pub seed: Option<u64>,
    pub http: HttpSettings,
    pub retry: RetryPolicy,
}

impl HarnessSettings {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            sample_rate: DEFAULT_SAMPLE_RATE,
            debug: false,
            list_path: DEFAULT_LIST_PATH.to_string(),
            old_url: DEFAULT_OLD_URL.to_string(),
            new_url: DEFAULT_NEW_URL.to_string(),
            workers: default_workers(),
            seed: None,
            http: HttpSettings::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Layer values from a config file over the current ones.
    pub fn apply_file(&mut self, file: &TomlConfig) -> Result<()> {
        if let Some(servers) = &file.servers {
            if let Some(old) = &servers.old {
                self.old_url = old.clone();
            }
            if let Some(new) = &servers.new {
                self.new_url = new.clone();
            }
        }

        if let Some(http) = &file.http {
            if let Some(secs) = http.connect_timeout_secs {
                self.http.connect_timeout = duration_from_secs("http.connect_timeout_secs", secs)?;
            }
            if let Some(secs) = http.read_timeout_secs {
                self.http.read_timeout = duration_from_secs("http.read_timeout_secs", secs)?;
            }
        }

        if let Some(retry) = &file.retry {
            if let Some(total) = retry.total {
                self.retry.total = total;
            }
            if let Some(factor) = retry.backoff_factor {
                self.retry.backoff_factor = factor;
            }
            if let Some(secs) = retry.backoff_max_secs {
                self.retry.backoff_max = duration_from_secs("retry.backoff_max_secs", secs)?;
            }
            if let Some(codes) = &retry.status_forcelist {
                self.retry.status_forcelist = codes.clone();
            }
            if let Some(respect) = retry.respect_retry_after {
                self.retry.respect_retry_after = respect;
            }
        }

        if let Some(sampling) = &file.sampling {
            if let Some(path) = &sampling.list_path {
                self.list_path = path.clone();
            }
            if let Some(workers) = sampling.workers {
                self.workers = workers;
            }
            if sampling.seed.is_some() {
                self.seed = sampling.seed;
            }
        }

        Ok(())
    }
}

fn duration_from_secs(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| HarnessError::InvalidConfigValueError {
        field: field.to_string(),
        value: secs.to_string(),
        reason: e.to_string(),
    })
}

impl Validate for HarnessSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_fraction("sample_rate", self.sample_rate)?;
        validation::validate_path("list_path", &self.list_path)?;
        validation::validate_url("old_url", &self.old_url)?;
        validation::validate_url("new_url", &self.new_url)?;
        validation::validate_positive_number("workers", self.workers, 1)?;
        validation::validate_duration_secs(
            "http.connect_timeout_secs",
            self.http.connect_timeout.as_secs_f64(),
        )?;
        validation::validate_duration_secs(
            "http.read_timeout_secs",
            self.http.read_timeout.as_secs_f64(),
        )?;
        validation::validate_status_codes("retry.status_forcelist", &self.retry.status_forcelist)?;
        Ok(())
    }
}
