#[derive(Debug, Clone)]
pub struct Config {
    /// Filters spans and events based on a set of filter directives
    /// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    pub(crate) env_filter: String,
    /// Output log events as JSON
    pub(crate) use_json_format: bool,
}

impl Config {
    pub fn new(env_filter: &str, use_json_format: bool) -> Self {
        Self {
            env_filter: env_filter.into(),
            use_json_format,
        }
    }

    /// Create a Config with JSON format enabled
    pub fn with_json_format(mut self) -> Self {
        self.use_json_format = true;
        self
    }

    pub fn with_env_filter(mut self, env_filter: &str) -> Self {
        self.env_filter = env_filter.to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_filter: "info".to_string(),
            use_json_format: false,
        }
    }
}

impl From<&configs::Logging> for Config {
    fn from(logging: &configs::Logging) -> Self {
        Self::new(&logging.env_filter, logging.use_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_logging_config() {
        let config = Config::from(&configs::Logging {
            env_filter: "debug".to_string(),
            use_json: true,
        });
        assert_eq!(config.env_filter, "debug");
        assert!(config.use_json_format);

        let config = Config::default().with_env_filter("warn");
        assert_eq!(config.env_filter, "warn");
        assert!(!config.use_json_format);
        assert!(config.with_json_format().use_json_format);
    }
}
