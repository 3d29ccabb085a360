//! 交易计划模型
//!
//! 引擎的输出类型：路由计划、费用明细、校验结果和最终的交易计划。
//! 交易计划可序列化，交由外部执行层消费，引擎自身不保存任何计划

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{chain::ChainId, transaction::TransactionRequest},
    error::EngineError,
    utils::address_classifier::AddressClassification,
};

/// 浮点费用比较容差
pub const FEE_EPSILON: f64 = 1e-9;

/// 路由计划
///
/// `from_chain`/`to_chain` 为 `None` 表示该侧是传统支付轨道
/// （入金/出金的法币一侧），不产生链上网络费
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingPlan {
    pub feasible: bool,
    pub from_chain: Option<ChainId>,
    pub to_chain: Option<ChainId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_asset: Option<String>,
    /// 是否需要跨链路由（桥接）
    pub needs_routing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoutingPlan {
    /// 不可行路由，携带可直接展示给用户的原因
    pub fn infeasible(reason: impl Into<String>) -> Self {
        Self {
            feasible: false,
            from_chain: None,
            to_chain: None,
            from_asset: None,
            to_asset: None,
            needs_routing: false,
            error: Some(reason.into()),
        }
    }

    /// 路由是否全程停留在平台链上
    pub fn stays_on_chain(&self, chain: ChainId) -> bool {
        self.from_chain.map_or(true, |c| c == chain) && self.to_chain.map_or(true, |c| c == chain)
    }

    /// 去重后的链上航段（网络费按此汇总）
    pub fn distinct_chains(&self) -> Vec<ChainId> {
        let mut chains = Vec::with_capacity(2);
        for chain in [self.from_chain, self.to_chain].into_iter().flatten() {
            if !chains.contains(&chain) {
                chains.push(chain);
            }
        }
        chains
    }
}

/// 费用明细
///
/// 不变量：total等于五项分量之和（容差内），任何分量不为负、不为NaN。
/// 内部累加不做舍入，只有展示层调用 `rounded` 舍入
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// 平台服务费
    pub diboas: f64,
    /// 链上网络费
    pub network: f64,
    /// 支付服务商费（仅入金/传统轨道出金）
    pub provider: f64,
    /// DEX/桥接换币费
    pub dex: f64,
    /// 跨链路由费
    pub routing: f64,
    pub total: f64,
}

impl FeeBreakdown {
    pub fn zero() -> Self {
        Self {
            diboas: 0.0,
            network: 0.0,
            provider: 0.0,
            dex: 0.0,
            routing: 0.0,
            total: 0.0,
        }
    }

    /// 由五项分量构造，total为精确和
    pub fn from_components(diboas: f64, network: f64, provider: f64, dex: f64, routing: f64) -> Self {
        Self {
            diboas,
            network,
            provider,
            dex,
            routing,
            total: diboas + network + provider + dex + routing,
        }
    }

    /// 校验费用不变量；违反视为内部缺陷，绝不静默修复
    pub fn validate(&self) -> Result<(), EngineError> {
        let components = [
            ("diboas", self.diboas),
            ("network", self.network),
            ("provider", self.provider),
            ("dex", self.dex),
            ("routing", self.routing),
            ("total", self.total),
        ];
        for (name, value) in components {
            if !value.is_finite() {
                return Err(EngineError::invariant(format!(
                    "fee component '{}' is not a finite number",
                    name
                )));
            }
            if value < 0.0 {
                return Err(EngineError::invariant(format!(
                    "fee component '{}' is negative",
                    name
                )));
            }
        }
        let sum = self.diboas + self.network + self.provider + self.dex + self.routing;
        if (sum - self.total).abs() > FEE_EPSILON {
            return Err(EngineError::invariant(
                "fee total does not equal the sum of its components",
            ));
        }
        Ok(())
    }

    /// 展示层舍入（内部计算从不调用）
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        let round = |v: f64| (v * factor).round() / factor;
        Self {
            diboas: round(self.diboas),
            network: round(self.network),
            provider: round(self.provider),
            dex: round(self.dex),
            routing: round(self.routing),
            total: round(self.total),
        }
    }
}

/// 校验结果
///
/// 预期中的业务规则失败以数据形式返回，不抛出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(reason.into()),
        }
    }
}

/// 交易计划
///
/// 每次请求产出一份；所有权随引擎返回交给调用方
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPlan {
    pub plan_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub request: TransactionRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<AddressClassification>,
    pub routing_plan: RoutingPlan,
    pub fee_breakdown: FeeBreakdown,
    pub validation: ValidationOutcome,
}
