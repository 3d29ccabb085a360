//! 费用计算服务
//!
//! 把费率表和交易参数合成五维费用明细：平台服务费、链上网络费、
//! 支付服务商费、DEX换币费、跨链路由费。
//!
//! 纯投影：从不修改余额。费率每次计算都从provider重新获取，
//! 核心不做缓存（产品要求）。内部累加不舍入，只有展示层舍入。
//!
//! 数值口径：缺失/未定义的费率项按0处理；NaN绝不向下传播；
//! 负的费用分量是内部缺陷，直接中止请求而不是静默修复

use std::sync::Arc;

use crate::{
    domain::{
        chain::SETTLEMENT_CHAIN,
        plan::{FeeBreakdown, RoutingPlan},
        transaction::{TransactionRequest, TransactionType},
    },
    error::EngineError,
    service::providers::{FeeRateProvider, RampDirection, RoutingFeeEstimator},
};

/// 费率缺失/NaN按0处理（来自动态费率源的脏数据不能进入累加）
fn sanitize_rate(rate: Option<f64>) -> f64 {
    match rate {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// 费用计算器
pub struct FeeCalculator {
    rate_provider: Arc<dyn FeeRateProvider>,
    routing_estimator: Arc<dyn RoutingFeeEstimator>,
}

impl FeeCalculator {
    pub fn new(
        rate_provider: Arc<dyn FeeRateProvider>,
        routing_estimator: Arc<dyn RoutingFeeEstimator>,
    ) -> Self {
        Self {
            rate_provider,
            routing_estimator,
        }
    }

    /// 计算一笔可行路由的完整费用明细
    ///
    /// 调用前提：请求已通过校验、路由已判定可行。在不可行路由上
    /// 计费属于流水线缺陷，按内部不变量违反处理
    pub async fn calculate_fees(
        &self,
        request: &TransactionRequest,
        plan: &RoutingPlan,
    ) -> Result<FeeBreakdown, EngineError> {
        if !plan.feasible {
            return Err(EngineError::invariant(
                "fee calculation attempted on an infeasible route",
            ));
        }
        let amount = request.amount();
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::invariant(format!(
                "fee calculation received invalid amount {}",
                amount
            )));
        }

        let diboas = self.diboas_fee(request).await?;
        let network = self.network_fee(amount, plan).await?;
        let provider = self.provider_fee(request).await?;
        let dex = self.dex_fee(request, plan).await?;
        let routing = self.routing_fee(amount, plan).await?;

        let breakdown = FeeBreakdown::from_components(diboas, network, provider, dex, routing);
        breakdown.validate()?;

        tracing::debug!(
            tx_type = %request.tx_type(),
            amount,
            diboas = breakdown.diboas,
            network = breakdown.network,
            provider = breakdown.provider,
            dex = breakdown.dex,
            routing = breakdown.routing,
            total = breakdown.total,
            "fees calculated"
        );
        Ok(breakdown)
    }

    /// 平台服务费：金额 × 类型费率
    async fn diboas_fee(&self, request: &TransactionRequest) -> Result<f64, EngineError> {
        let rates = self.rate_provider.get_diboas_fees().await.map_err(|e| {
            tracing::warn!(error = ?e, "diboas fee rates fetch failed");
            EngineError::provider_unavailable(
                "fee_rates",
                "Fee rates are temporarily unavailable. Please try again",
            )
        })?;
        let rate = sanitize_rate(rates.get(&request.tx_type()).copied());
        Ok(request.amount() * rate)
    }

    /// 网络费：金额 × 路由中每条去重后链的费率之和；
    /// 法币轨道一侧不产生链上网络费
    async fn network_fee(&self, amount: f64, plan: &RoutingPlan) -> Result<f64, EngineError> {
        let rates = self.rate_provider.get_network_fees().await.map_err(|e| {
            tracing::warn!(error = ?e, "network fee rates fetch failed");
            EngineError::provider_unavailable(
                "fee_rates",
                "Fee rates are temporarily unavailable. Please try again",
            )
        })?;

        let mut fee = 0.0;
        for chain in plan.distinct_chains() {
            fee += amount * sanitize_rate(rates.get(&chain).copied());
        }
        Ok(fee)
    }

    /// 支付服务商费：仅入金（on-ramp）和传统轨道出金（off-ramp）；
    /// P2P和外部钱包出金为0（后者收DEX费）
    async fn provider_fee(&self, request: &TransactionRequest) -> Result<f64, EngineError> {
        let direction = match request.tx_type() {
            TransactionType::Add => RampDirection::OnRamp,
            TransactionType::Withdraw
                if request.payment_method().map_or(false, |m| m.is_traditional_rail()) =>
            {
                RampDirection::OffRamp
            }
            _ => return Ok(0.0),
        };
        let Some(method) = request.payment_method() else {
            // 支付方式缺省按0处理
            return Ok(0.0);
        };

        let rates = self
            .rate_provider
            .get_payment_provider_fees()
            .await
            .map_err(|e| {
                tracing::warn!(error = ?e, "payment provider fee rates fetch failed");
                EngineError::provider_unavailable(
                    "fee_rates",
                    "Fee rates are temporarily unavailable. Please try again",
                )
            })?;
        let rate = sanitize_rate(Some(rates.rate(direction, method)));
        Ok(request.amount() * rate)
    }

    /// DEX换币费：所有transfer、外部钱包出金、平台钱包买入和所有
    /// sell；路由全程停留在平台链（SOL）时费率为0
    async fn dex_fee(
        &self,
        request: &TransactionRequest,
        plan: &RoutingPlan,
    ) -> Result<f64, EngineError> {
        let applies = match request.tx_type() {
            TransactionType::Transfer | TransactionType::Sell => true,
            TransactionType::Withdraw => request.uses_external_wallet(),
            TransactionType::Buy => request.pays_from_platform_wallet(),
            _ => false,
        };
        if !applies || plan.stays_on_chain(SETTLEMENT_CHAIN) {
            return Ok(0.0);
        }

        let rates = self.rate_provider.get_dex_fees().await.map_err(|e| {
            tracing::warn!(error = ?e, "dex fee rates fetch failed");
            EngineError::provider_unavailable(
                "fee_rates",
                "Fee rates are temporarily unavailable. Please try again",
            )
        })?;
        let rate = sanitize_rate(Some(rates.standard_rate));
        Ok(request.amount() * rate)
    }

    /// 跨链路由费：仅needs_routing时向外部估算器询价
    async fn routing_fee(&self, amount: f64, plan: &RoutingPlan) -> Result<f64, EngineError> {
        if !plan.needs_routing {
            return Ok(0.0);
        }
        let (Some(from), Some(to)) = (plan.from_chain, plan.to_chain) else {
            return Ok(0.0);
        };

        let quote = self
            .routing_estimator
            .estimate_routing_fees(from, to, amount)
            .await
            .map_err(|e| {
                tracing::warn!(error = ?e, %from, %to, "routing fee estimate failed");
                EngineError::provider_unavailable(
                    "routing_fee_estimator",
                    "Routing fees are temporarily unavailable. Please try again",
                )
            })?;
        Ok(sanitize_rate(Some(quote.total)))
    }
}
