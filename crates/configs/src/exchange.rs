use {
    alloy::primitives::Address,
    serde::{Deserialize, Serialize},
};

/// Deployment parameters of one exchange instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Exchange {
    /// Address signed orders and transactions are bound to through the
    /// EIP-712 domain.
    pub verifying_contract: Address,

    /// Account allowed to authorize delegates.
    pub administrator: Address,

    /// ERC20 token in which maker and taker fees are paid.
    pub fee_token: Address,
}
