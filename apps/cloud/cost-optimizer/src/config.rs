use core_config::{
    AppInfo, FromEnv, app_info, env_optional, env_or_default, env_parse_or, server::ServerConfig,
};
use domain_cost_optimizer::{
    ApiKey, CredentialProvider, CredentialSource, FileStore, GeminiConfig, SupersededResults,
    ValidationMode,
};
use std::path::PathBuf;
use std::sync::Arc;

pub use core_config::Environment;

pub const DEFAULT_PREFERENCES_PATH: &str = ".cost-optimizer/preferences.json";

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub credential_source: CredentialSource,
    /// `GEMINI_API_KEY`, only consulted under the environment source
    pub env_api_key: Option<ApiKey>,
    pub preferences_path: PathBuf,
    pub validation: ValidationMode,
    pub superseded: SupersededResults,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let gemini = GeminiConfig::from_env()?;

        let credential_source = env_parse_or("CREDENTIAL_SOURCE", CredentialSource::default())?;
        let strict = env_parse_or("STRICT_INPUT_VALIDATION", false)?;
        let superseded = env_parse_or("SUPERSEDED_RESULTS", SupersededResults::default())?;

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            gemini,
            credential_source,
            env_api_key: env_optional("GEMINI_API_KEY").and_then(ApiKey::new),
            preferences_path: PathBuf::from(env_or_default(
                "PREFERENCES_PATH",
                DEFAULT_PREFERENCES_PATH,
            )),
            validation: if strict {
                ValidationMode::Strict
            } else {
                ValidationMode::Permissive
            },
            superseded,
        })
    }

    /// Resolve the credential once, according to the configured source
    pub fn credentials(&self) -> eyre::Result<CredentialProvider> {
        let provider = match self.credential_source {
            CredentialSource::Preference => {
                let store = Arc::new(FileStore::new(&self.preferences_path));
                CredentialProvider::from_preference(store)?
            }
            CredentialSource::Environment => CredentialProvider::from_environment(
                self.env_api_key.as_ref().map(|k| k.expose().to_string()),
            ),
        };

        Ok(provider)
    }
}
