//! Console configuration, read from an optional JSON file. Every key is optional
//! and falls back to the coordinator defaults.
//!
//! ```json
//! {
//!     "wbs_enabled": true,
//!     "auto_answer_waiting_call": true,
//!     "release_audio_on_hold_end": false,
//!     "log_level": "debug"
//! }
//! ```

use bluetooth_hfp::hfp::CoordinatorConfig;
use log::LevelFilter;
use serde_json::Value;
use std::path::Path;

/// Everything the console reads from its config file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConsoleConfig {
    pub coordinator: CoordinatorConfig,
    pub log_level: Option<LevelFilter>,
}

pub fn read_config(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

/// Parses a config file's content. Malformed content yields the defaults.
pub fn parse_config(config: String) -> ConsoleConfig {
    let defaults = CoordinatorConfig::default();
    let flag = |key: &str, default: bool| get_bool_internal(&config, key).unwrap_or(default);

    ConsoleConfig {
        coordinator: CoordinatorConfig {
            wbs_enabled: flag("wbs_enabled", defaults.wbs_enabled),
            auto_answer_waiting_call: flag(
                "auto_answer_waiting_call",
                defaults.auto_answer_waiting_call,
            ),
            release_audio_on_hold_end: flag(
                "release_audio_on_hold_end",
                defaults.release_audio_on_hold_end,
            ),
        },
        log_level: get_log_level_internal(config.clone()),
    }
}

fn get_log_level_internal(config: String) -> Option<LevelFilter> {
    serde_json::from_str::<Value>(config.as_str())
        .ok()?
        .get("log_level")?
        .as_str()?
        .parse::<LevelFilter>()
        .ok()
}

fn get_bool_internal(config: &str, key: &str) -> Option<bool> {
    serde_json::from_str::<Value>(config).ok()?.get(key)?.as_bool()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_log_level() {
        assert_eq!(
            get_log_level_internal("{\"log_level\": \"error\"}".to_string()).unwrap(),
            LevelFilter::Error
        );
        assert_eq!(
            get_log_level_internal("{\"log_level\": \"debug\"}".to_string()).unwrap(),
            LevelFilter::Debug
        );
        assert_eq!(
            get_log_level_internal("{\"log_level\": \"trace\"}".to_string()).unwrap(),
            LevelFilter::Trace
        );
        assert_eq!(get_log_level_internal("{\"log_level\": \"loud\"}".to_string()), None);
        assert_eq!(get_log_level_internal("{\"log_level\": 3}".to_string()), None);
    }

    #[test]
    fn parse_flags() {
        let config = parse_config(
            "{\"wbs_enabled\": false, \"release_audio_on_hold_end\": false}".to_string(),
        );

        assert!(!config.coordinator.wbs_enabled);
        assert!(config.coordinator.auto_answer_waiting_call);
        assert!(!config.coordinator.release_audio_on_hold_end);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn wrongly_typed_flag_keeps_default() {
        let config = parse_config("{\"wbs_enabled\": \"no\"}".to_string());

        assert!(config.coordinator.wbs_enabled);
    }

    #[test]
    fn malformed_config_gives_defaults() {
        assert_eq!(parse_config("{ wbs_enabled".to_string()), ConsoleConfig::default());
        assert_eq!(parse_config("".to_string()), ConsoleConfig::default());
    }
}
