use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Logging {
    /// Filters spans and events based on a set of filter directives
    /// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    #[serde(default = "default_env_filter")]
    pub env_filter: String,

    /// Output log events as JSON.
    #[serde(default)]
    pub use_json: bool,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            env_filter: default_env_filter(),
            use_json: false,
        }
    }
}

fn default_env_filter() -> String {
    "info".to_string()
}
