use planstore_config::StoreConfig;

/// Initialize env_logger at the configured level; `RUST_LOG` takes precedence
pub fn init(config: &StoreConfig) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(config.log_level_filter())
        .format_timestamp_millis()
        .parse_default_env();

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialized: {}", e);
    }
}
