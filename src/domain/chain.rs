//! 链标识与资产注册表
//!
//! 企业级实现：所有支持的结算网络和资产范围集中定义，
//! 路由和校验逻辑统一从这里解析，避免各模块各自硬编码

use std::fmt;

use serde::{Deserialize, Serialize};

/// 结算网络标识
///
/// 每条链有独立的地址格式和原生资产
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChainId {
    Btc,
    Eth,
    Sol,
    Sui,
}

impl ChainId {
    /// 链的原生资产符号
    pub fn native_asset(&self) -> &'static str {
        match self {
            ChainId::Btc => "BTC",
            ChainId::Eth => "ETH",
            ChainId::Sol => "SOL",
            ChainId::Sui => "SUI",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChainId::Btc => "BTC",
            ChainId::Eth => "ETH",
            ChainId::Sol => "SOL",
            ChainId::Sui => "SUI",
        };
        write!(f, "{}", s)
    }
}

/// 平台结算资产（所有内部账本以USDC/SOL计价）
pub const SETTLEMENT_ASSET: &str = "USDC";

/// 平台结算链
pub const SETTLEMENT_CHAIN: ChainId = ChainId::Sol;

/// 加密资产范围（buy/sell可交易）
pub const CRYPTO_ASSETS: &[&str] = &["BTC", "ETH", "SOL", "SUI", "USDC"];

/// 代币化实物资产范围（invest专用，buy也可购买）
pub const TOKENIZED_ASSETS: &[&str] = &["PAXG", "XAUT", "MAG7", "SPX", "REIT"];

/// 资产的原生结算链
///
/// - 主流加密资产 → 各自主链
/// - USDC与所有代币化资产 → SOL（平台账本链）
/// - 未知资产 → None
pub fn native_chain_of(asset: &str) -> Option<ChainId> {
    let upper = asset.trim().to_uppercase();
    match upper.as_str() {
        "BTC" => Some(ChainId::Btc),
        "ETH" => Some(ChainId::Eth),
        "SOL" => Some(ChainId::Sol),
        "SUI" => Some(ChainId::Sui),
        "USDC" => Some(ChainId::Sol),
        _ if TOKENIZED_ASSETS.contains(&upper.as_str()) => Some(ChainId::Sol),
        _ => None,
    }
}

/// 是否属于加密资产范围
pub fn is_crypto_asset(asset: &str) -> bool {
    let upper = asset.trim().to_uppercase();
    CRYPTO_ASSETS.contains(&upper.as_str())
}

/// 是否属于代币化资产范围
pub fn is_tokenized_asset(asset: &str) -> bool {
    let upper = asset.trim().to_uppercase();
    TOKENIZED_ASSETS.contains(&upper.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_chain_resolution() {
        assert_eq!(native_chain_of("BTC"), Some(ChainId::Btc));
        assert_eq!(native_chain_of("eth"), Some(ChainId::Eth));
        assert_eq!(native_chain_of("SUI"), Some(ChainId::Sui));
        // USDC和代币化资产都落在平台链上
        assert_eq!(native_chain_of("USDC"), Some(ChainId::Sol));
        assert_eq!(native_chain_of("PAXG"), Some(ChainId::Sol));
        assert_eq!(native_chain_of("SPX"), Some(ChainId::Sol));
        // 未知资产
        assert_eq!(native_chain_of("DOGE"), None);
        assert_eq!(native_chain_of(""), None);
    }

    #[test]
    fn test_asset_universes_disjoint_for_invest() {
        // invest资产范围与加密资产范围不重叠
        for asset in TOKENIZED_ASSETS {
            assert!(!is_crypto_asset(asset), "{} should not be a crypto asset", asset);
        }
        for asset in CRYPTO_ASSETS {
            assert!(!is_tokenized_asset(asset), "{} should not be tokenized", asset);
        }
    }

    #[test]
    fn test_chain_display() {
        assert_eq!(ChainId::Btc.to_string(), "BTC");
        assert_eq!(ChainId::Sol.to_string(), "SOL");
        assert_eq!(ChainId::Sol.native_asset(), "SOL");
    }
}
