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
        match value.trim().to_lowercase().as_str() {
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

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[backtest]
initial_equity = 10000
fee_rate = 0.001

[strategy]
name = ema_cross
fast = 9
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("strategy", "name"),
            Some("ema_cross".to_string())
        );
        assert_eq!(adapter.get_int("strategy", "fast", 0), 9);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nfee_rate = 0.001\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nslow = abc\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "fast", 20), 20);
        assert_eq!(adapter.get_int("strategy", "slow", 50), 50);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nfee_rate = 0.0005\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "fee_rate", 0.0), 0.0005);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_equity = lots\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_equity", 99.9), 99.9);
        assert_eq!(adapter.get_double("backtest", "missing", 1.5), 1.5);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\n",
        )
        .unwrap();
        for key in ["a", "b", "c"] {
            assert!(adapter.get_bool("backtest", key, false));
        }
        for key in ["d", "e", "f"] {
            assert!(!adapter.get_bool("backtest", key, true));
        }
    }

    #[test]
    fn get_bool_returns_default_for_missing_or_unknown() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nallow_shorting = perhaps\n").unwrap();
        assert!(adapter.get_bool("backtest", "missing", true));
        assert!(!adapter.get_bool("backtest", "allow_shorting", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[data]\npath = /data/xrp_1h.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("/data/xrp_1h.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }

    #[test]
    fn handles_all_config_sections() {
        let content = r#"
[backtest]
initial_equity = 10000
allow_shorting = true
timeframe = 4h

[strategy]
name = trend_structure

[data]
path = bars.csv

[sweep]
fast_periods = 5, 10
objective = sharpe
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();

        assert_eq!(adapter.get_double("backtest", "initial_equity", 0.0), 10000.0);
        assert!(adapter.get_bool("backtest", "allow_shorting", false));
        assert_eq!(adapter.get_string("backtest", "timeframe"), Some("4h".to_string()));
        assert_eq!(
            adapter.get_string("strategy", "name"),
            Some("trend_structure".to_string())
        );
        assert_eq!(adapter.get_string("data", "path"), Some("bars.csv".to_string()));
        assert_eq!(
            adapter.get_string("sweep", "fast_periods"),
            Some("5, 10".to_string())
        );
        assert_eq!(adapter.get_string("sweep", "objective"), Some("sharpe".to_string()));
    }
}
