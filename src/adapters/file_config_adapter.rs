//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
path = /var/lib/tidesim/klines

[backtest]
symbols = BTCUSDC, ETHUSDC
initial_balance = 1000.0
risk_per_trade = 0.1
ordering = exits_first

[strategy]
rsi_period = 14
oversold = 30
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("/var/lib/tidesim/klines".to_string())
        );
        assert_eq!(
            adapter.get_string("backtest", "ordering"),
            Some("exits_first".to_string())
        );
    }

    #[test]
    fn from_file_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_int("strategy", "rsi_period", 0), 14);
    }

    #[test]
    fn missing_key_is_none() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn numeric_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_double("backtest", "risk_per_trade", 0.0), 0.1);
        assert_eq!(adapter.get_double("backtest", "absent", 0.25), 0.25);
        assert_eq!(adapter.get_int("strategy", "oversold", 0), 30);
        assert_eq!(adapter.get_int("strategy", "absent", 7), 7);
    }

    #[test]
    fn non_numeric_falls_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_balance = lots\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_balance", 9.0), 9.0);
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[flags]\na = true\nb = Yes\nc = 0\nd = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("flags", "a", false));
        assert!(adapter.get_bool("flags", "b", false));
        assert!(!adapter.get_bool("flags", "c", true));
        assert!(adapter.get_bool("flags", "d", true));
    }

    #[test]
    fn invalid_ini_is_an_error() {
        assert!(FileConfigAdapter::from_string("[unclosed\nkey value").is_err());
    }
}
