use std::path::Path;

use serde::Deserialize;

use crate::commands::PresetArg;

/// `.sqlcraft.toml` in the current directory. Only a `[format]` table is
/// recognized today; unknown tables/keys are ignored rather than rejected so
/// the file can grow without breaking older binaries reading a newer config.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub format: FormatConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatConfig {
    pub preset: Option<PresetArg>,
}

impl Config {
    /// Reads `.sqlcraft.toml` from the current directory. Missing file is not
    /// an error and yields defaults; a present-but-unparseable file is.
    pub fn load() -> Result<Config, String> {
        Self::load_from(Path::new(".sqlcraft.toml"))
    }

    fn load_from(path: &Path) -> Result<Config, String> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).map_err(|err| format!("failed to parse {}: {err}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(format!("failed to read {}: {err}", path.display())),
        }
    }

    /// An explicit CLI flag always wins over the config file.
    pub fn resolve_preset(&self, cli_flag: Option<PresetArg>) -> PresetArg {
        cli_flag.or(self.format.preset).unwrap_or(PresetArg::Generic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_from(Path::new("does-not-exist.toml")).unwrap();
        assert!(config.format.preset.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = std::env::temp_dir().join("sqlcraft-config-malformed-test");
        std::fs::write(&dir, "not valid toml [[[").unwrap();
        let result = Config::load_from(&dir);
        std::fs::remove_file(&dir).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn cli_flag_wins_over_config_file() {
        let config = Config { format: FormatConfig { preset: Some(PresetArg::Postgres) } };
        assert!(matches!(config.resolve_preset(Some(PresetArg::Generic)), PresetArg::Generic));
    }

    #[test]
    fn config_file_wins_over_default() {
        let config = Config { format: FormatConfig { preset: Some(PresetArg::Postgres) } };
        assert!(matches!(config.resolve_preset(None), PresetArg::Postgres));
    }

    #[test]
    fn default_is_generic() {
        let config = Config::default();
        assert!(matches!(config.resolve_preset(None), PresetArg::Generic));
    }
}
