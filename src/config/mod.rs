pub mod settings;
pub mod toml_config;

pub use settings::{HarnessSettings, HttpSettings, RetryPolicy};

#[cfg(feature = "cli")]
use crate::domain::model::Mode;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "server-mode-diff")]
#[command(about = "Compare JSON responses of an old and a new lookup server")]
pub struct CliConfig {
    #[arg(value_enum, help = "Specify the mode to test.")]
    pub mode: Mode,

    #[arg(
        long = "sample_rate",
        visible_alias = "sample-rate",
        default_value_t = settings::DEFAULT_SAMPLE_RATE,
        help = "Adjust the rate of data used for testing (len(test_data) * sample_rate)"
    )]
    pub sample_rate: f64,

    #[arg(long, overrides_with = "no_debug", help = "print debug message")]
    pub debug: bool,

    #[arg(long, overrides_with = "debug", hide = true)]
    pub no_debug: bool,

    #[arg(long, help = "Path to the `vendor|product` list [default: integration/cpe.txt]")]
    pub list_path: Option<String>,

    #[arg(long, help = "Base URL of the old server [default: http://127.0.0.1:1325]")]
    pub old_url: Option<String>,

    #[arg(long, help = "Base URL of the new server [default: http://127.0.0.1:1326]")]
    pub new_url: Option<String>,

    #[arg(long, help = "Number of concurrent comparisons [default: min(32, cpus + 4)]")]
    pub workers: Option<usize>,

    #[arg(long, help = "Seed for a reproducible sample")]
    pub seed: Option<u64>,

    #[arg(short, long, help = "TOML file with server, timeout and retry settings")]
    pub config: Option<String>,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Resolve defaults, then the config file, then command-line flags.
    pub fn into_settings(self) -> Result<HarnessSettings> {
        let mut settings = HarnessSettings::new(self.mode);

        if let Some(path) = &self.config {
            let file = toml_config::TomlConfig::from_file(path)?;
            file.validate()?;
            settings.apply_file(&file)?;
        }

        settings.sample_rate = self.sample_rate;
        settings.debug = self.debug && !self.no_debug;
        if let Some(path) = self.list_path {
            settings.list_path = path;
        }
        if let Some(url) = self.old_url {
            settings.old_url = url;
        }
        if let Some(url) = self.new_url {
            settings.new_url = url;
        }
        if let Some(workers) = self.workers {
            settings.workers = workers;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }

        settings.validate()?;
        Ok(settings)
    }
}
