//! Fill amount computation.

use {
    crate::{math::partial_amount_floor, transfer::Transfer},
    alloy::primitives::{Address, B256, U256},
    model::{asset::AssetData, order::OrderData},
    serde::Serialize,
};

/// Amounts moved by a single fill.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillResults {
    pub maker_asset_filled_amount: U256,
    pub taker_asset_filled_amount: U256,
    pub maker_fee_paid: U256,
    pub taker_fee_paid: U256,
}

impl FillResults {
    /// Computes the fill of `order` for up to `requested` units of the taker
    /// asset given that `filled` units were already filled.
    ///
    /// Maker amount and fees are proportional to the taker fill and rounded
    /// down. Fees scale with the maker side of the fill.
    pub fn compute(order: &OrderData, filled: U256, requested: U256) -> Self {
        let remaining = order.taker_asset_amount.saturating_sub(filled);
        let taker_asset_filled_amount = requested.min(remaining);
        let maker_asset_filled_amount = partial_amount_floor(
            taker_asset_filled_amount,
            order.taker_asset_amount,
            order.maker_asset_amount,
        );
        Self {
            maker_asset_filled_amount,
            taker_asset_filled_amount,
            maker_fee_paid: partial_amount_floor(
                maker_asset_filled_amount,
                order.maker_asset_amount,
                order.maker_fee,
            ),
            taker_fee_paid: partial_amount_floor(
                maker_asset_filled_amount,
                order.maker_asset_amount,
                order.taker_fee,
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.taker_asset_filled_amount.is_zero()
    }

    /// The four asset movements settling this fill.
    pub fn transfers(
        &self,
        order: &OrderData,
        taker: Address,
        fee_asset: AssetData,
    ) -> [Transfer; 4] {
        [
            Transfer {
                asset: order.maker_asset,
                from: order.maker,
                to: taker,
                amount: self.maker_asset_filled_amount,
            },
            Transfer {
                asset: order.taker_asset,
                from: taker,
                to: order.maker,
                amount: self.taker_asset_filled_amount,
            },
            Transfer {
                asset: fee_asset,
                from: order.maker,
                to: order.fee_recipient,
                amount: self.maker_fee_paid,
            },
            Transfer {
                asset: fee_asset,
                from: taker,
                to: order.fee_recipient,
                amount: self.taker_fee_paid,
            },
        ]
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    InvalidMakerAssetAmount,
    InvalidTakerAssetAmount,
    Fillable,
    Expired,
    FullyFilled,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub status: OrderStatus,
    pub hash: B256,
    pub taker_asset_filled_amount: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(maker_amount: u64, taker_amount: u64, maker_fee: u64, taker_fee: u64) -> OrderData {
        OrderData {
            maker: Address::repeat_byte(1),
            fee_recipient: Address::repeat_byte(3),
            maker_asset: AssetData::erc20(Address::repeat_byte(0xaa)),
            taker_asset: AssetData::erc20(Address::repeat_byte(0xbb)),
            maker_asset_amount: U256::from(maker_amount),
            taker_asset_amount: U256::from(taker_amount),
            maker_fee: U256::from(maker_fee),
            taker_fee: U256::from(taker_fee),
            ..Default::default()
        }
    }

    #[test]
    fn proportional_fill() {
        let results = FillResults::compute(&order(200, 100, 10, 10), U256::ZERO, U256::from(50));
        assert_eq!(
            results,
            FillResults {
                maker_asset_filled_amount: U256::from(100),
                taker_asset_filled_amount: U256::from(50),
                maker_fee_paid: U256::from(5),
                taker_fee_paid: U256::from(5),
            }
        );
    }

    #[test]
    fn fill_is_capped_by_remaining() {
        let results =
            FillResults::compute(&order(200, 100, 10, 10), U256::from(80), U256::from(50));
        assert_eq!(results.taker_asset_filled_amount, U256::from(20));
        assert_eq!(results.maker_asset_filled_amount, U256::from(40));
        assert_eq!(results.maker_fee_paid, U256::from(2));

        let results =
            FillResults::compute(&order(200, 100, 10, 10), U256::from(100), U256::from(1));
        assert!(results.is_empty());
        assert_eq!(results, FillResults::default());
    }

    #[test]
    fn amounts_round_down() {
        // 1 of 3 taker units buys 3.33.. maker units; fees 1/10 of that.
        let results = FillResults::compute(&order(10, 3, 7, 3), U256::ZERO, U256::from(1));
        assert_eq!(results.maker_asset_filled_amount, U256::from(3));
        assert_eq!(results.maker_fee_paid, U256::from(2));
        assert_eq!(results.taker_fee_paid, U256::ZERO);
    }

    #[test]
    fn fees_never_exceed_proportional_share() {
        let order = order(997, 991, 13, 17);
        for requested in [1u64, 2, 3, 100, 500, 990, 991] {
            let results = FillResults::compute(&order, U256::ZERO, U256::from(requested));
            // fee * maker_amount <= maker_fee * maker_filled
            assert!(
                results.maker_fee_paid * order.maker_asset_amount
                    <= order.maker_fee * results.maker_asset_filled_amount
            );
            assert!(
                results.taker_fee_paid * order.maker_asset_amount
                    <= order.taker_fee * results.maker_asset_filled_amount
            );
            assert!(
                results.maker_asset_filled_amount * order.taker_asset_amount
                    <= order.maker_asset_amount * results.taker_asset_filled_amount
            );
        }
    }

    #[test]
    fn handles_full_width_amounts() {
        let order = OrderData {
            maker_asset_amount: U256::MAX,
            taker_asset_amount: U256::MAX,
            maker_fee: U256::MAX,
            taker_fee: U256::from(1),
            ..Default::default()
        };
        let results = FillResults::compute(&order, U256::ZERO, U256::MAX);
        assert_eq!(results.maker_asset_filled_amount, U256::MAX);
        assert_eq!(results.maker_fee_paid, U256::MAX);
        assert_eq!(results.taker_fee_paid, U256::from(1));
    }

    #[test]
    fn transfers_cover_both_sides_and_fees() {
        let order = order(200, 100, 10, 10);
        let taker = Address::repeat_byte(2);
        let fee_asset = AssetData::erc20(Address::repeat_byte(0xcc));
        let results = FillResults::compute(&order, U256::ZERO, U256::from(50));
        let [maker_leg, taker_leg, maker_fee, taker_fee] =
            results.transfers(&order, taker, fee_asset);

        assert_eq!((maker_leg.from, maker_leg.to), (order.maker, taker));
        assert_eq!(maker_leg.asset, order.maker_asset);
        assert_eq!(maker_leg.amount, U256::from(100));
        assert_eq!((taker_leg.from, taker_leg.to), (taker, order.maker));
        assert_eq!(taker_leg.asset, order.taker_asset);
        assert_eq!(taker_leg.amount, U256::from(50));
        assert_eq!((maker_fee.from, maker_fee.to), (order.maker, order.fee_recipient));
        assert_eq!((taker_fee.from, taker_fee.to), (taker, order.fee_recipient));
        assert_eq!(maker_fee.asset, fee_asset);
        assert_eq!(taker_fee.asset, fee_asset);
    }
}
