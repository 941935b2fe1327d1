use reward_claims::models::settings::DEFAULT_LOOKBACK_ERAS;
use reward_claims::{PayoutSettings, Validator};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path, path::PathBuf, time::Duration};

use crate::commands::Error;

/// Configuration for the payout CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Node websocket URL
    pub node_url: String,
    /// Token symbol used when printing balances
    pub denom: String,
    /// Decimal places of the chain's native token
    pub decimal_places: u32,
    /// Validator stash addresses, processed in this order
    pub validators: Vec<String>,
    /// Number of past eras inspected for unclaimed rewards
    pub lookback_eras: u32,
    /// Polkadot-JS account export of the signing account
    pub account_json: PathBuf,
    /// Split payouts into batches of at most this many calls
    pub max_calls_per_batch: Option<usize>,
    /// Concurrent claimed-era lookups
    pub query_concurrency: usize,
    /// Overall deadline for one payout run
    pub run_timeout_secs: Option<u64>,
    /// Explorer link template, `{hash}` is replaced by the extrinsic hash
    pub explorer_tx_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_url: "ws://127.0.0.1:9944".to_string(),
            denom: "UNIT".to_string(),
            decimal_places: 12,
            validators: Vec::new(),
            lookback_eras: DEFAULT_LOOKBACK_ERAS,
            account_json: PathBuf::from("./account.json"),
            max_calls_per_batch: None,
            query_concurrency: 1,
            run_timeout_secs: None,
            explorer_tx_url: None,
        }
    }
}

impl Config {
    /// `<config dir>/peochain/payout/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join("peochain")
            .join("payout")
            .join("config.toml")
    }

    /// Load configuration from `path`, or from the default location.
    /// A default file is written when none exists yet.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save(&config_path)?;
            return Ok(default_config);
        }

        let config_str = fs::read_to_string(&config_path)?;
        let config = toml::from_str::<Config>(&config_str)?;

        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(config_dir) = path.parent() {
            fs::create_dir_all(config_dir)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.node_url.trim().is_empty() {
            return Err(Error::InvalidConfig("node_url is empty".to_string()));
        }
        if self.validators.is_empty() {
            return Err(Error::InvalidConfig("no validators configured".to_string()));
        }
        if self.query_concurrency == 0 {
            return Err(Error::InvalidConfig(
                "query_concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_calls_per_batch == Some(0) {
            return Err(Error::InvalidConfig(
                "max_calls_per_batch must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for address in &self.validators {
            if !seen.insert(address.trim()) {
                return Err(Error::InvalidConfig(format!(
                    "validator {} is listed more than once",
                    address.trim()
                )));
            }
        }
        Ok(())
    }

    pub fn payout_settings(&self) -> PayoutSettings {
        let validators = self
            .validators
            .iter()
            .map(|address| Validator::new(address.trim()))
            .collect();

        PayoutSettings::new(validators)
            .with_lookback(self.lookback_eras)
            .with_max_calls_per_batch(self.max_calls_per_batch)
            .with_query_concurrency(self.query_concurrency)
            .with_run_timeout(self.run_timeout_secs.map(Duration::from_secs))
    }

    pub fn explorer_link(&self, tx_hash: &str) -> Option<String> {
        self.explorer_tx_url
            .as_ref()
            .map(|template| template.replace("{hash}", tx_hash))
    }
}
