use {
    alloy::primitives::Address,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Whitelist {
    /// Account allowed to change whitelist entries.
    pub owner: Address,
}
