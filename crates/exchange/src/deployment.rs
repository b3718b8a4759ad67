use {
    alloy::primitives::Address,
    model::{DomainSeparator, asset::AssetData},
};

/// Static parameters of an exchange instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Deployment {
    pub verifying_contract: Address,
    pub administrator: Address,
    pub fee_token: Address,
}

impl Deployment {
    pub fn domain(&self) -> DomainSeparator {
        DomainSeparator::new(self.verifying_contract)
    }

    pub fn fee_asset(&self) -> AssetData {
        AssetData::erc20(self.fee_token)
    }
}

impl From<&configs::Exchange> for Deployment {
    fn from(config: &configs::Exchange) -> Self {
        Self {
            verifying_contract: config.verifying_contract,
            administrator: config.administrator,
            fee_token: config.fee_token,
        }
    }
}
