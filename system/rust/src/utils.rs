//! Utilities that are not specific to a particular module

/// Inits logging for host. Level is taken from `RUST_LOG`; calling it twice is harmless.
pub fn init_logging() {
    env_logger::Builder::new().parse_default_env().try_init().ok();
}

/// Inits logging with an explicit level, used when the level comes from a config file.
pub fn init_logging_with_level(level: log::LevelFilter) {
    env_logger::Builder::new().filter_level(level).parse_default_env().try_init().ok();
}
