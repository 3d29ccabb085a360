//! diBoaS Core - 多资产交易处理核心决策引擎
//!
//! 校验交易请求、按五个独立维度计算费用、跨异构结算网络规划
//! 路由。输出可序列化的交易计划，交由外部执行层消费；引擎自身
//! 不做签名、不上链、不持久化

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use error::EngineError;
pub use service::engine::TransactionEngine;

// 统一模块导出
pub mod prelude {
    pub use crate::{
        config::{Config, FeeConfig},
        domain::{
            ChainId, FeeBreakdown, PaymentMethod, RoutingPlan, TransactionPlan,
            TransactionRequest, TransactionType, UnifiedBalance, ValidationOutcome,
        },
        error::EngineError,
        service::{
            engine::TransactionEngine,
            providers::{
                BalanceProvider, FeeRateProvider, FlatRoutingFeeEstimator, RoutingFeeEstimator,
                StaticFeeRateProvider,
            },
        },
        utils::address_classifier::{AddressClassification, AddressClassifier},
    };
}
