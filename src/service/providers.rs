//! 外部数据源接口
//!
//! 费率、路由费估算和余额数据都通过注入的provider获取，
//! 引擎不做内部缓存——费率每次调用都重新拉取（产品要求）。
//! provider可以是异步远程源；失败不重试，重试策略归调用方

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    config::FeeConfig,
    domain::{
        balance::UnifiedBalance,
        chain::ChainId,
        transaction::{PaymentMethod, TransactionType},
    },
};

/// 出入金方向（provider费查询键的一半）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RampDirection {
    OnRamp,
    OffRamp,
}

/// 平台服务费率表：交易类型 → 费率
pub type DiboasFeeRates = HashMap<TransactionType, f64>;

/// 网络费率表：链 → 费率
pub type NetworkFeeRates = HashMap<ChainId, f64>;

/// 支付服务商费率表，按（方向, 支付方式）查询
#[derive(Debug, Clone, Default)]
pub struct PaymentProviderRates {
    pub onramp: HashMap<PaymentMethod, f64>,
    pub offramp: HashMap<PaymentMethod, f64>,
}

impl PaymentProviderRates {
    /// 查表；缺失项视为0
    pub fn rate(&self, direction: RampDirection, method: PaymentMethod) -> f64 {
        let table = match direction {
            RampDirection::OnRamp => &self.onramp,
            RampDirection::OffRamp => &self.offramp,
        };
        table.get(&method).copied().unwrap_or(0.0)
    }
}

/// DEX换币费率
#[derive(Debug, Clone, Copy)]
pub struct DexFeeRates {
    /// 跨链/换币标准费率；全程SOL的路由不收
    pub standard_rate: f64,
}

/// 跨链路由费报价
#[derive(Debug, Clone, Copy)]
pub struct RoutingFeeQuote {
    pub total: f64,
}

/// 费率数据源
///
/// 核心不缓存任何费率，每次计算重新获取
#[async_trait]
pub trait FeeRateProvider: Send + Sync {
    async fn get_diboas_fees(&self) -> Result<DiboasFeeRates>;
    async fn get_network_fees(&self) -> Result<NetworkFeeRates>;
    async fn get_payment_provider_fees(&self) -> Result<PaymentProviderRates>;
    async fn get_dex_fees(&self) -> Result<DexFeeRates>;
}

/// 跨链路由费估算器，按（源链, 目标链, 金额）报价
#[async_trait]
pub trait RoutingFeeEstimator: Send + Sync {
    async fn estimate_routing_fees(
        &self,
        from_chain: ChainId,
        to_chain: ChainId,
        amount: f64,
    ) -> Result<RoutingFeeQuote>;
}

/// 统一余额数据源（只读快照）
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    async fn get_unified_balance(&self, user_id: &str) -> Result<UnifiedBalance>;
}

/// 静态费率表provider
///
/// 从FeeConfig播种产品默认费率，测试和降级场景注入使用
pub struct StaticFeeRateProvider {
    config: FeeConfig,
}

impl StaticFeeRateProvider {
    pub fn new(config: FeeConfig) -> Self {
        Self { config }
    }
}

impl Default for StaticFeeRateProvider {
    fn default() -> Self {
        Self::new(FeeConfig::default())
    }
}

#[async_trait]
impl FeeRateProvider for StaticFeeRateProvider {
    async fn get_diboas_fees(&self) -> Result<DiboasFeeRates> {
        let mut rates = HashMap::new();
        for tx_type in TransactionType::ALL {
            let rate = match tx_type {
                // 出金和外转走更高费率
                TransactionType::Withdraw | TransactionType::Transfer => {
                    self.config.platform_exit_rate
                }
                _ => self.config.platform_standard_rate,
            };
            rates.insert(*tx_type, rate);
        }
        Ok(rates)
    }

    async fn get_network_fees(&self) -> Result<NetworkFeeRates> {
        let mut rates = HashMap::new();
        rates.insert(ChainId::Btc, 0.01);
        rates.insert(ChainId::Eth, 0.005);
        rates.insert(ChainId::Sol, 0.000001);
        rates.insert(ChainId::Sui, 0.000003);
        Ok(rates)
    }

    async fn get_payment_provider_fees(&self) -> Result<PaymentProviderRates> {
        let mut onramp = HashMap::new();
        onramp.insert(PaymentMethod::ApplePay, 0.005);
        onramp.insert(PaymentMethod::GooglePay, 0.005);
        onramp.insert(PaymentMethod::CreditDebitCard, 0.01);
        onramp.insert(PaymentMethod::BankAccount, 0.01);
        onramp.insert(PaymentMethod::PayPal, 0.03);

        let mut offramp = HashMap::new();
        offramp.insert(PaymentMethod::ApplePay, 0.01);
        offramp.insert(PaymentMethod::GooglePay, 0.01);
        offramp.insert(PaymentMethod::CreditDebitCard, 0.02);
        offramp.insert(PaymentMethod::BankAccount, 0.02);
        offramp.insert(PaymentMethod::PayPal, 0.04);

        // P2P和外部钱包不经支付服务商，费率为0（外部钱包收DEX费）
        Ok(PaymentProviderRates { onramp, offramp })
    }

    async fn get_dex_fees(&self) -> Result<DexFeeRates> {
        Ok(DexFeeRates {
            standard_rate: self.config.dex_fee_rate,
        })
    }
}

/// 按目标链分档的固定路由费估算器
///
/// 真实部署替换为外部桥接聚合器的报价客户端
pub struct FlatRoutingFeeEstimator {
    rates: HashMap<ChainId, f64>,
    base_rate: f64,
}

impl FlatRoutingFeeEstimator {
    pub fn new(base_rate: f64) -> Self {
        Self {
            rates: HashMap::new(),
            base_rate,
        }
    }

    pub fn with_corridor_rate(mut self, to_chain: ChainId, rate: f64) -> Self {
        self.rates.insert(to_chain, rate);
        self
    }
}

impl Default for FlatRoutingFeeEstimator {
    /// 产品默认：0.05%基准，BTC通道0.1%（结算更慢、流动性更贵）
    fn default() -> Self {
        Self::new(0.0005).with_corridor_rate(ChainId::Btc, 0.001)
    }
}

#[async_trait]
impl RoutingFeeEstimator for FlatRoutingFeeEstimator {
    async fn estimate_routing_fees(
        &self,
        _from_chain: ChainId,
        to_chain: ChainId,
        amount: f64,
    ) -> Result<RoutingFeeQuote> {
        let rate = self.rates.get(&to_chain).copied().unwrap_or(self.base_rate);
        Ok(RoutingFeeQuote {
            total: amount * rate,
        })
    }
}
