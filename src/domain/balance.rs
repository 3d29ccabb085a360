//! 统一余额模型
//!
//! 用户在所有链/资产上的资金统一视图，分为可用余额和投资余额。
//! 引擎只读取调用方提供的快照，从不修改；余额变更由外部余额
//! 管理服务通过已校验的交易完成

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 单一资产持仓
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetBalance {
    /// 持有数量（资产原生单位）
    pub amount: f64,
    /// 美元估值
    pub usd_value: f64,
}

/// 统一余额快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedBalance {
    /// 可用于消费的余额（USD计价）
    pub available_for_spending: f64,
    /// 已投资余额（USD计价）
    pub invested_amount: f64,
    /// 按资产细分的持仓
    #[serde(default)]
    pub per_asset: HashMap<String, AssetBalance>,
}

impl UnifiedBalance {
    pub fn new(available_for_spending: f64, invested_amount: f64) -> Self {
        Self {
            available_for_spending,
            invested_amount,
            per_asset: HashMap::new(),
        }
    }

    /// 测试和构造辅助：追加一项资产持仓
    pub fn with_asset(mut self, asset: impl Into<String>, amount: f64, usd_value: f64) -> Self {
        self.per_asset
            .insert(asset.into(), AssetBalance { amount, usd_value });
        self
    }

    /// 某资产的美元估值，缺失项视为0
    pub fn asset_usd_value(&self, asset: &str) -> f64 {
        self.per_asset
            .get(asset)
            .map(|b| b.usd_value)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

impl Default for UnifiedBalance {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
