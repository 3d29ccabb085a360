//! 路由规划服务
//!
//! 解析每笔交易的源/目标链与资产，判断是否需要跨链路由，并对照
//! 统一余额快照检查资金充足性。余额可见性只在这一层——校验器
//! 刻意不做余额检查。
//!
//! 对快照只读；不可行的路由返回带用户可读原因的计划并中止流水线
//! （费用计算绝不在不可行路由上运行）

use crate::{
    domain::{
        balance::UnifiedBalance,
        chain::{native_chain_of, ChainId, SETTLEMENT_ASSET, SETTLEMENT_CHAIN},
        plan::RoutingPlan,
        transaction::{TransactionRequest, TransactionType},
    },
    utils::address_classifier::AddressClassifier,
};

/// 法币轨道一侧的资产标记
const FIAT_ASSET: &str = "USD";

/// 路由规划器
pub struct RoutingPlanner;

impl RoutingPlanner {
    pub fn new() -> Self {
        Self
    }

    /// 按交易类型解析路由；纯函数，快照不被修改
    pub fn plan_routing(
        &self,
        user_id: &str,
        request: &TransactionRequest,
        balance: &UnifiedBalance,
    ) -> RoutingPlan {
        let plan = match request.tx_type() {
            TransactionType::Add => self.plan_add(),
            TransactionType::Withdraw => self.plan_withdraw(request, balance),
            TransactionType::Send | TransactionType::Receive => {
                self.plan_p2p(request, balance)
            }
            TransactionType::Transfer => self.plan_transfer(request, balance),
            TransactionType::Buy | TransactionType::Invest => self.plan_buy(request, balance),
            TransactionType::Sell => self.plan_sell(request, balance),
        };

        tracing::debug!(
            user_id = %user_id,
            tx_type = %request.tx_type(),
            feasible = plan.feasible,
            needs_routing = plan.needs_routing,
            "routing planned"
        );
        plan
    }

    /// 入金：外部支付轨道 → 平台链USDC，永远可行
    fn plan_add(&self) -> RoutingPlan {
        RoutingPlan {
            feasible: true,
            from_chain: None,
            to_chain: Some(SETTLEMENT_CHAIN),
            from_asset: Some(FIAT_ASSET.to_string()),
            to_asset: Some(SETTLEMENT_ASSET.to_string()),
            needs_routing: false,
            error: None,
        }
    }

    /// 出金：平台链USDC → 传统轨道或外部钱包地址
    fn plan_withdraw(&self, request: &TransactionRequest, balance: &UnifiedBalance) -> RoutingPlan {
        let (to_chain, to_asset) = if request.uses_external_wallet() {
            let classification = AddressClassifier::classify(request.recipient().unwrap_or(""));
            match classification.chain {
                Some(chain) => (Some(chain), chain.native_asset().to_string()),
                None => {
                    let reason = classification
                        .reason
                        .unwrap_or_else(|| "Recipient address is not supported".to_string());
                    return RoutingPlan::infeasible(reason);
                }
            }
        } else {
            (None, FIAT_ASSET.to_string())
        };

        if request.amount() > balance.available_for_spending {
            return RoutingPlan::infeasible("Insufficient balance");
        }

        RoutingPlan {
            feasible: true,
            from_chain: Some(SETTLEMENT_CHAIN),
            to_chain,
            from_asset: Some(SETTLEMENT_ASSET.to_string()),
            to_asset: Some(to_asset),
            needs_routing: to_chain.map_or(false, |c| c != SETTLEMENT_CHAIN),
            error: None,
        }
    }

    /// 平台内转账：两端都在平台账本（SOL/USDC）
    fn plan_p2p(&self, request: &TransactionRequest, balance: &UnifiedBalance) -> RoutingPlan {
        if request.amount() > balance.available_for_spending {
            return RoutingPlan::infeasible("Insufficient balance");
        }

        RoutingPlan {
            feasible: true,
            from_chain: Some(SETTLEMENT_CHAIN),
            to_chain: Some(SETTLEMENT_CHAIN),
            from_asset: Some(SETTLEMENT_ASSET.to_string()),
            to_asset: Some(SETTLEMENT_ASSET.to_string()),
            needs_routing: false,
            error: None,
        }
    }

    /// 外转：平台链USDC → 收款地址所在链
    fn plan_transfer(&self, request: &TransactionRequest, balance: &UnifiedBalance) -> RoutingPlan {
        let classification = AddressClassifier::classify(request.recipient().unwrap_or(""));
        let to_chain = match classification.chain {
            Some(chain) => chain,
            None => {
                let reason = classification
                    .reason
                    .unwrap_or_else(|| "Recipient address is not supported".to_string());
                return RoutingPlan::infeasible(reason);
            }
        };

        if request.amount() > balance.available_for_spending {
            return RoutingPlan::infeasible("Insufficient balance");
        }

        RoutingPlan {
            feasible: true,
            from_chain: Some(SETTLEMENT_CHAIN),
            to_chain: Some(to_chain),
            from_asset: Some(SETTLEMENT_ASSET.to_string()),
            to_asset: Some(to_chain.native_asset().to_string()),
            needs_routing: to_chain != SETTLEMENT_CHAIN,
            error: None,
        }
    }

    /// 购买/投资：平台链USDC → 资产原生链
    ///
    /// 余额只在用平台钱包支付时检查；外部支付方式带来新资金，
    /// 规划阶段总是可行
    fn plan_buy(&self, request: &TransactionRequest, balance: &UnifiedBalance) -> RoutingPlan {
        let asset = request.asset().unwrap_or("").trim().to_uppercase();
        let to_chain = match native_chain_of(&asset) {
            Some(chain) => chain,
            None => return RoutingPlan::infeasible(format!("Unsupported asset: {}", asset)),
        };

        if request.pays_from_platform_wallet()
            && request.amount() > balance.available_for_spending
        {
            return RoutingPlan::infeasible("Insufficient balance");
        }

        RoutingPlan {
            feasible: true,
            from_chain: Some(SETTLEMENT_CHAIN),
            to_chain: Some(to_chain),
            from_asset: Some(SETTLEMENT_ASSET.to_string()),
            to_asset: Some(asset),
            needs_routing: to_chain != SETTLEMENT_CHAIN,
            error: None,
        }
    }

    /// 卖出：资产原生链 → 平台链USDC；对照持仓美元估值检查
    fn plan_sell(&self, request: &TransactionRequest, balance: &UnifiedBalance) -> RoutingPlan {
        let asset = request.asset().unwrap_or("").trim().to_uppercase();
        let from_chain = match native_chain_of(&asset) {
            Some(chain) => chain,
            None => return RoutingPlan::infeasible(format!("Unsupported asset: {}", asset)),
        };

        if request.amount() > balance.asset_usd_value(&asset) {
            return RoutingPlan::infeasible("Insufficient balance");
        }

        RoutingPlan {
            feasible: true,
            from_chain: Some(from_chain),
            to_chain: Some(SETTLEMENT_CHAIN),
            from_asset: Some(asset),
            to_asset: Some(SETTLEMENT_ASSET.to_string()),
            needs_routing: from_chain != SETTLEMENT_CHAIN,
            error: None,
        }
    }
}

impl Default for RoutingPlanner {
    fn default() -> Self {
        Self::new()
    }
}
