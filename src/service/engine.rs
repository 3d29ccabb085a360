//! 交易引擎门面
//!
//! 编排 校验 → 路由 → 计费 的严格顺序流水线，产出可序列化的
//! 交易计划。顺序是显式不变量：结构非法的请求不进入路由，
//! 不可行的路由不进入计费。
//!
//! 引擎跨调用不持有任何可变状态；每次调用独立产出一份计划，
//! 余额快照只读。同一用户并发交易的双花防护归外部余额管理
//! 服务（乐观锁或单写队列），不在本核心

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{
        plan::TransactionPlan,
        transaction::{TransactionRequest, TransactionType},
    },
    error::EngineError,
    service::{
        fee_calculator::FeeCalculator,
        providers::{BalanceProvider, FeeRateProvider, RoutingFeeEstimator},
        routing_planner::RoutingPlanner,
        transaction_validator::TransactionValidator,
    },
    utils::address_classifier::AddressClassifier,
};

/// 交易引擎
pub struct TransactionEngine {
    validator: TransactionValidator,
    planner: RoutingPlanner,
    fee_calculator: FeeCalculator,
    balance_provider: Arc<dyn BalanceProvider>,
}

impl TransactionEngine {
    pub fn new(
        rate_provider: Arc<dyn FeeRateProvider>,
        routing_estimator: Arc<dyn RoutingFeeEstimator>,
        balance_provider: Arc<dyn BalanceProvider>,
    ) -> Self {
        Self {
            validator: TransactionValidator::new(),
            planner: RoutingPlanner::new(),
            fee_calculator: FeeCalculator::new(rate_provider, routing_estimator),
            balance_provider,
        }
    }

    /// 把一笔原始请求变成已定价、可路由的交易计划
    ///
    /// 阶段严格有序，前一阶段失败立即返回：
    /// 1. 校验 → `EngineError::Validation`
    /// 2. 取余额快照 → `EngineError::ProviderUnavailable`
    /// 3. 路由规划 → `EngineError::RoutingInfeasible`
    /// 4. 计费 → 组装计划
    pub async fn process_transaction(
        &self,
        user_id: &str,
        request: &TransactionRequest,
    ) -> Result<TransactionPlan, EngineError> {
        // 1. 校验；失败快速返回，后续provider一概不触达
        let validation = self.validator.validate(user_id, request);
        if !validation.is_valid {
            let message = validation
                .error
                .unwrap_or_else(|| "Validation failed".to_string());
            tracing::info!(user_id = %user_id, tx_type = %request.tx_type(), %message, "request rejected by validation");
            return Err(EngineError::validation(message));
        }

        // 2. 余额快照（只读），每次调用一次尝试
        let balance = self
            .balance_provider
            .get_unified_balance(user_id)
            .await
            .map_err(|e| {
                tracing::warn!(error = ?e, user_id = %user_id, "balance snapshot fetch failed");
                EngineError::provider_unavailable(
                    "balance_provider",
                    "Balance information is temporarily unavailable. Please try again",
                )
            })?;

        // 3. 路由；不可行的路由在此中止，计费不运行
        let routing_plan = self.planner.plan_routing(user_id, request, &balance);
        if !routing_plan.feasible {
            let message = routing_plan
                .error
                .unwrap_or_else(|| "Route is not feasible".to_string());
            tracing::info!(user_id = %user_id, tx_type = %request.tx_type(), %message, "route infeasible");
            return Err(EngineError::routing_infeasible(message));
        }

        // 4. 计费（费率每次重新获取）
        let fee_breakdown = self
            .fee_calculator
            .calculate_fees(request, &routing_plan)
            .await?;

        // 收款方地址的分类结果随计划一并返回（仅地址型收款方有意义，
        // 用户名收款方不产生分类）
        let classification = match request.tx_type() {
            TransactionType::Transfer => request.recipient().map(AddressClassifier::classify),
            TransactionType::Withdraw if request.uses_external_wallet() => {
                request.recipient().map(AddressClassifier::classify)
            }
            _ => None,
        };

        let plan = TransactionPlan {
            plan_id: Uuid::new_v4(),
            created_at: Utc::now(),
            request: request.clone(),
            classification,
            routing_plan,
            fee_breakdown,
            validation,
        };

        tracing::info!(
            user_id = %user_id,
            plan_id = %plan.plan_id,
            tx_type = %request.tx_type(),
            amount = request.amount(),
            total_fee = plan.fee_breakdown.total,
            needs_routing = plan.routing_plan.needs_routing,
            "transaction plan assembled"
        );
        Ok(plan)
    }
}
