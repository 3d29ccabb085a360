//! 集成测试公共设施：可注入的mock数据源
//!
//! CountingFeeRateProvider 用来验证流水线顺序不变量
//! （校验失败/路由不可行时，费率源一次都不能被触达）

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use anyhow::Result;
use async_trait::async_trait;

use diboas_core::{
    domain::{balance::UnifiedBalance, chain::ChainId},
    service::providers::{
        BalanceProvider, DexFeeRates, DiboasFeeRates, FeeRateProvider, NetworkFeeRates,
        PaymentProviderRates, RoutingFeeEstimator, RoutingFeeQuote, StaticFeeRateProvider,
    },
};

/// 记录调用次数的费率provider，内部委托静态默认费率表
pub struct CountingFeeRateProvider {
    inner: StaticFeeRateProvider,
    calls: AtomicUsize,
}

impl CountingFeeRateProvider {
    pub fn new() -> Self {
        Self {
            inner: StaticFeeRateProvider::default(),
            calls: AtomicUsize::new(0),
        }
    }

    /// 四个费率接口的累计调用次数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeeRateProvider for CountingFeeRateProvider {
    async fn get_diboas_fees(&self) -> Result<DiboasFeeRates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_diboas_fees().await
    }

    async fn get_network_fees(&self) -> Result<NetworkFeeRates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_network_fees().await
    }

    async fn get_payment_provider_fees(&self) -> Result<PaymentProviderRates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_payment_provider_fees().await
    }

    async fn get_dex_fees(&self) -> Result<DexFeeRates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_dex_fees().await
    }
}

/// 内存余额快照provider
pub struct InMemoryBalanceProvider {
    balances: HashMap<String, UnifiedBalance>,
}

impl InMemoryBalanceProvider {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    pub fn with_balance(mut self, user_id: impl Into<String>, balance: UnifiedBalance) -> Self {
        self.balances.insert(user_id.into(), balance);
        self
    }
}

#[async_trait]
impl BalanceProvider for InMemoryBalanceProvider {
    async fn get_unified_balance(&self, user_id: &str) -> Result<UnifiedBalance> {
        Ok(self
            .balances
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// 永远失败的余额provider（模拟外部数据源故障）
pub struct FailingBalanceProvider;

#[async_trait]
impl BalanceProvider for FailingBalanceProvider {
    async fn get_unified_balance(&self, _user_id: &str) -> Result<UnifiedBalance> {
        anyhow::bail!("balance-service.internal:9090 connection timed out")
    }
}

/// 固定报价的路由费估算器
pub struct FixedRoutingFeeEstimator {
    pub total: f64,
}

#[async_trait]
impl RoutingFeeEstimator for FixedRoutingFeeEstimator {
    async fn estimate_routing_fees(
        &self,
        _from_chain: ChainId,
        _to_chain: ChainId,
        _amount: f64,
    ) -> Result<RoutingFeeQuote> {
        Ok(RoutingFeeQuote { total: self.total })
    }
}
