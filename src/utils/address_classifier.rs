//! 地址分类模块
//!
//! 将地址字符串按格式匹配到结算网络。规则自上而下依次判定，
//! 顺序是有约束的：ETH必须在SUI之前（两者共享`0x`前缀，长度是
//! 唯一判别量），BTC和XRP必须在SOL之前（Base58字符集和长度区间
//! 有重叠，解码字节长度才能区分）
//!
//! 纯函数、确定性，不做任何I/O

use serde::{Deserialize, Serialize};

use crate::domain::chain::ChainId;

/// Base58字符集（不含 0、O、I、l）
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Bech32数据部分字符集
const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// 地址分类结果
///
/// 每次调用即时计算，从不持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressClassification {
    pub chain: Option<ChainId>,
    pub is_valid: bool,
    pub is_supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AddressClassification {
    fn supported(chain: ChainId) -> Self {
        Self {
            chain: Some(chain),
            is_valid: true,
            is_supported: true,
            reason: None,
        }
    }

    /// 可识别但平台未接入的网络
    fn unsupported(network: &str) -> Self {
        Self {
            chain: None,
            is_valid: true,
            is_supported: false,
            reason: Some(format!("{} addresses are not currently supported", network)),
        }
    }

    /// 空地址：视为缺省而非错误，不携带原因
    fn absent() -> Self {
        Self {
            chain: None,
            is_valid: false,
            is_supported: false,
            reason: None,
        }
    }

    fn invalid() -> Self {
        Self {
            chain: None,
            is_valid: false,
            is_supported: false,
            reason: Some("Invalid wallet address format".to_string()),
        }
    }
}

/// 地址分类器
pub struct AddressClassifier;

impl AddressClassifier {
    /// 地址 → 链标识
    ///
    /// 先去除首尾空白再匹配；`classify(trim(x)) == classify(x)`
    pub fn classify(address: &str) -> AddressClassification {
        let addr = address.trim();

        if addr.is_empty() {
            return AddressClassification::absent();
        }

        // 1. Bitcoin：P2PKH/P2SH（Base58）或Bech32
        if Self::is_btc_legacy(addr) || Self::is_btc_bech32(addr) {
            return AddressClassification::supported(ChainId::Btc);
        }

        // 2/3. `0x`前缀族：ETH（40位hex）在SUI（64位hex）之前判定
        if let Some(hex_part) = addr.strip_prefix("0x") {
            if hex_part.len() == 40 && Self::is_hex(hex_part) {
                return AddressClassification::supported(ChainId::Eth);
            }
            if hex_part.len() == 64 && Self::is_hex(hex_part) {
                return AddressClassification::supported(ChainId::Sui);
            }
            return AddressClassification::invalid();
        }

        // 4. 可识别但未接入的网络
        if Self::is_xrp(addr) {
            return AddressClassification::unsupported("XRP");
        }
        if Self::is_ada(addr) {
            return AddressClassification::unsupported("ADA");
        }
        if Self::is_ton(addr) {
            return AddressClassification::unsupported("TON");
        }

        // 5. Solana：Base58编码的32字节公钥，典型32-44字符
        if Self::is_sol(addr) {
            return AddressClassification::supported(ChainId::Sol);
        }

        AddressClassification::invalid()
    }

    fn is_base58(s: &str) -> bool {
        !s.is_empty() && s.chars().all(|c| BASE58_ALPHABET.contains(c))
    }

    fn is_hex(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Legacy P2PKH（1开头）/ P2SH（3开头），26-35字符，
    /// 解码后至少25字节（20字节哈希+版本+checksum）
    fn is_btc_legacy(addr: &str) -> bool {
        if !(addr.starts_with('1') || addr.starts_with('3')) {
            return false;
        }
        if addr.len() < 26 || addr.len() > 35 || !Self::is_base58(addr) {
            return false;
        }
        matches!(bs58::decode(addr).into_vec(), Ok(decoded) if decoded.len() >= 25)
    }

    /// Bech32 SegWit地址：bc1开头，42-62字符
    fn is_btc_bech32(addr: &str) -> bool {
        let lower = addr.to_lowercase();
        if !lower.starts_with("bc1") {
            return false;
        }
        if lower.len() < 42 || lower.len() > 62 {
            return false;
        }
        lower[3..].chars().all(|c| BECH32_CHARSET.contains(c))
    }

    /// XRP经典地址：r开头，25-35字符Base58，解码为25字节
    /// （SOL公钥解码为32字节，凭此区分r开头的SOL地址）
    fn is_xrp(addr: &str) -> bool {
        if !addr.starts_with('r') || addr.len() < 25 || addr.len() > 35 {
            return false;
        }
        if !Self::is_base58(addr) {
            return false;
        }
        !matches!(bs58::decode(addr).into_vec(), Ok(decoded) if decoded.len() == 32)
    }

    /// Cardano Shelley地址：addr1前缀
    fn is_ada(addr: &str) -> bool {
        addr.starts_with("addr1") && addr.len() >= 58
    }

    /// TON user-friendly地址：EQ/UQ开头，48字符Base64url
    fn is_ton(addr: &str) -> bool {
        (addr.starts_with("EQ") || addr.starts_with("UQ"))
            && addr.len() == 48
            && addr
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+' || c == '/')
    }

    fn is_sol(addr: &str) -> bool {
        if addr.len() < 32 || addr.len() > 44 || !Self::is_base58(addr) {
            return false;
        }
        matches!(bs58::decode(addr).into_vec(), Ok(decoded) if decoded.len() == 32)
    }
}
