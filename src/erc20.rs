//! ERC-20 and wrapped-native token calldata

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::{Error, Result};

sol! {
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    interface IWETH {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
    }
}

pub fn encode_balance_of(owner: Address) -> Bytes {
    IERC20::balanceOfCall { owner }.abi_encode().into()
}

pub fn encode_allowance(owner: Address, spender: Address) -> Bytes {
    IERC20::allowanceCall { owner, spender }.abi_encode().into()
}

pub fn encode_transfer(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

pub fn encode_transfer_from(from: Address, to: Address, amount: U256) -> Bytes {
    IERC20::transferFromCall { from, to, amount }
        .abi_encode()
        .into()
}

pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

pub fn encode_deposit() -> Bytes {
    IWETH::depositCall {}.abi_encode().into()
}

pub fn encode_withdraw(wad: U256) -> Bytes {
    IWETH::withdrawCall { wad }.abi_encode().into()
}

/// Decode the single `uint256` returned by `balanceOf` / `allowance`
pub fn decode_uint256(data: &[u8]) -> Result<U256> {
    if data.len() < 32 {
        return Err(Error::Rpc(format!(
            "expected at least 32 bytes for uint256, got {}",
            data.len()
        )));
    }
    Ok(U256::from_be_slice(&data[..32]))
}
