//! Well-known addresses and endpoints
//!
//! This module centralizes the SushiSwap contract addresses and hosted-service
//! endpoints used throughout the sushidata crate.

use alloy_primitives::{address, Address};

/// SushiBar (xSUSHI) contract
pub const BAR_ADDRESS: Address = address!("8798249c2e607446efb7ad49ec89dd1865ff4272");

/// SushiMaker contract, as recorded by the maker subgraph
pub const MAKER_ADDRESS: Address = address!("95c69c3220b31b843f1cf20bee5c53fcde7fc12e");

/// Exchange account holding the liquidity positions the maker has yet to serve
pub const MAKER_EXCHANGE_ACCOUNT: Address =
    address!("280ac711bb99de7c73fb70fb6de29846d5e4207f");

/// MasterChef contract
pub const CHEF_ADDRESS: Address = address!("c2edad668740f1aa35e4d8f227fb8e17dca888cd");

/// SUSHI token contract
pub const SUSHI_ADDRESS: Address = address!("6b3595068778dd592e39a122f4f5a5cf09c90fe2");

/// Hosted-service subgraph endpoints
pub mod endpoints {
    /// HTTP query endpoints
    pub mod http {
        pub const MASTERCHEF: &str = "https://api.thegraph.com/subgraphs/name/sushiswap/master-chef";
        pub const BAR: &str = "https://api.thegraph.com/subgraphs/name/sushiswap/sushi-bar";
        pub const TIMELOCK: &str =
            "https://api.thegraph.com/subgraphs/name/sushiswap/sushi-timelock";
        pub const MAKER: &str = "https://api.thegraph.com/subgraphs/name/sushiswap/sushi-maker";
        pub const EXCHANGE: &str = "https://api.thegraph.com/subgraphs/name/sushiswap/exchange";
        pub const EXCHANGE_V1: &str =
            "https://api.thegraph.com/subgraphs/name/jiro-ono/sushiswap-v1-exchange";
        pub const BLOCKLYTICS: &str =
            "https://api.thegraph.com/subgraphs/name/blocklytics/ethereum-blocks";
        pub const LOCKUP: &str = "https://api.thegraph.com/subgraphs/name/matthewlilley/lockup";
    }

    /// WebSocket live-query endpoints
    pub mod ws {
        pub const BAR: &str = "wss://api.thegraph.com/subgraphs/name/sushiswap/sushi-bar";
        pub const EXCHANGE: &str = "wss://api.thegraph.com/subgraphs/name/sushiswap/exchange";
        pub const BLOCKLYTICS: &str =
            "wss://api.thegraph.com/subgraphs/name/blocklytics/ethereum-blocks";
    }
}

/// Lower-case `0x`-prefixed hex, the form subgraph ids use
pub fn subgraph_id(address: Address) -> String {
    format!("{address:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maker_address() {
        assert_eq!(
            subgraph_id(MAKER_ADDRESS),
            "0x95c69c3220b31b843f1cf20bee5c53fcde7fc12e"
        );
    }

    #[test]
    fn test_subgraph_id_is_lowercase() {
        let id = subgraph_id(SUSHI_ADDRESS);
        assert_eq!(id, id.to_lowercase());
        assert!(id.starts_with("0x"));
        assert_eq!(id.len(), 42);
    }
}
