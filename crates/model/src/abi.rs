//! Solidity ABI of the exchange entry points that can be embedded in a
//! meta-transaction.

alloy::sol! {
    interface IExchange {
        struct Order {
            address makerAddress;
            address takerAddress;
            address feeRecipientAddress;
            address senderAddress;
            uint256 makerAssetAmount;
            uint256 takerAssetAmount;
            uint256 makerFee;
            uint256 takerFee;
            uint256 expirationTimeSeconds;
            uint256 salt;
            bytes makerAssetData;
            bytes takerAssetData;
        }

        function fillOrder(Order order, uint256 takerAssetFillAmount, bytes signature);
        function fillOrKillOrder(Order order, uint256 takerAssetFillAmount, bytes signature);
        function cancelOrder(Order order);
        function cancelOrdersUpTo(uint256 targetOrderEpoch);
    }
}
