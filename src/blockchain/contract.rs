//! Bank contract ABI.

use alloy::sol;

sol! {
    /// Read/write surface of the bank contract.
    #[derive(Debug, PartialEq, Eq)]
    interface IBank {
        function bankName() external view returns (bytes32);
        function setBankName(bytes32 name) external;
        function bankOwner() external view returns (address);
        function getCustomerBalance() external view returns (uint256);
        function depositMoney() external payable;
        function withdrawMoney(address to, uint256 amount) external;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use alloy::sol_types::{SolCall, SolInterface};

    #[test]
    fn test_withdraw_call_encoding() {
        let call = IBank::withdrawMoneyCall {
            to: Address::ZERO,
            amount: U256::from(5u64),
        };
        let encoded = call.abi_encode();
        // selector + two 32-byte words
        assert_eq!(encoded.len(), 4 + 64);
        assert_eq!(&encoded[..4], IBank::withdrawMoneyCall::SELECTOR.as_slice());
    }

    #[test]
    fn test_calls_decode_by_selector() {
        let encoded = IBank::depositMoneyCall {}.abi_encode();
        let decoded = IBank::IBankCalls::abi_decode(&encoded).unwrap();
        assert!(matches!(decoded, IBank::IBankCalls::depositMoney(_)));
    }
}
