use crate::config::LedgerConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by merging built-in defaults, `config/Config.toml`,
    /// `LEDGER_`-prefixed environment variables and `config/Config.json`.
    ///
    /// Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or variable cannot be parsed.
    pub fn load() -> Result<LedgerConfig> {
        Self::load_from("config/Config.toml")
    }

    /// Same as [`ConfigLoader::load`] with an explicit TOML path.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or variable cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<LedgerConfig> {
        Self::extract(Self::figment(path.as_ref(), None))
    }

    /// Loads configuration with a profile overlay (`config/Config.{profile}.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or variable cannot be parsed.
    pub fn load_with_profile(profile: &str) -> Result<LedgerConfig> {
        Self::extract(Self::figment(Path::new("config/Config.toml"), Some(profile)))
    }

    fn extract(figment: Figment) -> Result<LedgerConfig> {
        let config: LedgerConfig = figment.extract()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Defaults, then the base TOML, then the optional profile overlay, then
    /// environment, with `Config.json` filling only unset keys.
    fn figment(path: &Path, profile: Option<&str>) -> Figment {
        let mut figment =
            Figment::from(Serialized::defaults(LedgerConfig::default())).merge(Toml::file(path));
        if let Some(profile) = profile {
            figment = figment.merge(Toml::file(format!("config/Config.{profile}.toml")));
        }
        figment
            .merge(Env::prefixed("LEDGER_").split("__"))
            .join(Json::file("config/Config.json"))
    }
}
