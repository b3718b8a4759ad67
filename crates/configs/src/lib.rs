use {
    anyhow::{Context, anyhow, ensure},
    serde::{Deserialize, Serialize},
    std::path::Path,
};

pub mod exchange;
pub mod logging;
pub mod whitelist;

pub use {exchange::Exchange, logging::Logging, whitelist::Whitelist};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    pub exchange: Exchange,

    /// Present when a whitelist gate is deployed in front of the exchange.
    #[serde(default)]
    pub whitelist: Option<Whitelist>,

    #[serde(default)]
    pub logging: Logging,
}

impl Configuration {
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config at {}", path.as_ref().display()))?;
        match toml::from_str(&content) {
            Ok(self_) => Ok(self_),
            Err(err) if std::env::var("TOML_TRACE_ERROR").is_ok_and(|v| v == "1") => Err(anyhow!(
                "failed to parse TOML config at {}: {err:#?}",
                path.as_ref().display()
            )),
            Err(_) => Err(anyhow!(
                "failed to parse TOML config at: {}. Set TOML_TRACE_ERROR=1 to print parsing \
                 error but this may leak secrets.",
                path.as_ref().display()
            )),
        }
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        Ok(std::fs::write(path, toml::to_string_pretty(self)?)?)
    }

    pub fn validate(self) -> anyhow::Result<Self> {
        ensure!(
            !self.exchange.verifying_contract.is_zero(),
            "exchange verifying contract must not be the zero address"
        );
        ensure!(
            !self.exchange.administrator.is_zero(),
            "exchange administrator must not be the zero address"
        );
        ensure!(
            !self.exchange.fee_token.is_zero(),
            "fee token must not be the zero address"
        );
        if let Some(whitelist) = &self.whitelist {
            ensure!(
                !whitelist.owner.is_zero(),
                "whitelist owner must not be the zero address"
            );
        }
        Ok(self)
    }
}
