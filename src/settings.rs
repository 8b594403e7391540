use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, File};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_uri: Option<String>,
    pub token: Option<String>,
    pub token_file: Option<String>,
    #[serde(default)]
    pub propagate_ttl: bool,
}

impl Settings {
    pub fn new() -> Result<Self, SettingsError> {
        Self::load(Config::builder()
            .add_source(File::with_name("namedrop").required(false))
            .add_source(File::with_name("/etc/namedrop/config").required(false))
            .add_source(config::Environment::with_prefix("NAMEDROP")))
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Resolves the bearer token, preferring an inline `token` over `token_file`.
    pub fn token(&self) -> Result<String, SettingsError> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(token.to_owned());
        }

        let path = self.token_file.as_deref().ok_or(SettingsError::MissingToken)?;
        let path = shellexpand::full(path)?;
        let token = std::fs::read_to_string(&*path)
            .map_err(|e| SettingsError::TokenFile(path.into_owned(), e))?;

        match token.trim() {
            "" => Err(SettingsError::MissingToken),
            token => Ok(token.to_owned()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no token or token_file configured")]
    MissingToken,
    #[error(transparent)]
    Expand(#[from] shellexpand::LookupError<std::env::VarError>),
    #[error("failed to read token file {0}: {1}")]
    TokenFile(String, #[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings(token: Option<&str>, token_file: Option<&str>) -> Settings {
        Settings {
            server_uri: None,
            token: token.map(ToOwned::to_owned),
            token_file: token_file.map(ToOwned::to_owned),
            propagate_ttl: false,
        }
    }

    #[test]
    fn inline_token_wins() {
        let s = settings(Some("inline"), Some("/does/not/exist"));
        assert_eq!(s.token().unwrap(), "inline");
    }

    #[test]
    fn token_file_is_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  from-file  ").unwrap();

        let s = settings(None, file.path().to_str());
        assert_eq!(s.token().unwrap(), "from-file");
    }

    #[test]
    fn missing_token() {
        assert!(matches!(settings(None, None).token(), Err(SettingsError::MissingToken)));
        assert!(matches!(settings(Some(""), None).token(), Err(SettingsError::MissingToken)));
    }

    #[test]
    fn unreadable_token_file() {
        let err = settings(None, Some("/does/not/exist/token")).token().unwrap_err();
        assert!(matches!(err, SettingsError::TokenFile(ref p, _) if p == "/does/not/exist/token"));
    }

    fn toml(src: &str) -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(src, config::FileFormat::Toml))
    }

    #[test]
    fn deserializes_from_toml() {
        let s = Settings::load(toml(
            "server_uri = \"http://localhost/namedrop\"\ntoken = \"abc\"\npropagate_ttl = true",
        )).unwrap();

        assert_eq!(s.server_uri.as_deref(), Some("http://localhost/namedrop"));
        assert_eq!(s.token.as_deref(), Some("abc"));
        assert!(s.token_file.is_none());
        assert!(s.propagate_ttl);
    }

    #[test]
    fn invalid_config_is_reported() {
        let err = Settings::load(toml("propagate_ttl = \"sometimes\"")).unwrap_err();
        assert!(matches!(err, SettingsError::Config(_)));
    }
}
