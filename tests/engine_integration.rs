//! 交易引擎集成测试套件
//!
//! 测试覆盖：
//! - 校验 → 路由 → 计费 的严格流水线顺序
//! - 各交易类型的端到端计划产出
//! - 费用不变量（total=分量和、SOL路由零DEX费）
//! - 外部数据源故障分级
//!
//! 运行方式：
//! ```bash
//! cargo test --test engine_integration
//! ```

mod common;

use std::sync::Arc;

use diboas_core::{
    domain::{
        balance::UnifiedBalance,
        chain::ChainId,
        plan::FEE_EPSILON,
        transaction::{PaymentMethod, TransactionRequest, TransactionType},
    },
    service::providers::FlatRoutingFeeEstimator,
    TransactionEngine,
};

use common::{
    CountingFeeRateProvider, FailingBalanceProvider, FixedRoutingFeeEstimator,
    InMemoryBalanceProvider,
};

// ============ 测试辅助函数 ============

fn engine_with(
    rates: Arc<CountingFeeRateProvider>,
    balances: InMemoryBalanceProvider,
) -> TransactionEngine {
    TransactionEngine::new(
        rates,
        Arc::new(FlatRoutingFeeEstimator::default()),
        Arc::new(balances),
    )
}

fn default_engine(balance: UnifiedBalance) -> TransactionEngine {
    engine_with(
        Arc::new(CountingFeeRateProvider::new()),
        InMemoryBalanceProvider::new().with_balance("user-1", balance),
    )
}

// ============ 流水线顺序不变量 ============

/// Test 1.1: 校验失败时，费率provider一次都不被调用
#[tokio::test]
async fn test_fee_provider_never_called_on_invalid_request() {
    let rates = Arc::new(CountingFeeRateProvider::new());
    let engine = engine_with(
        rates.clone(),
        InMemoryBalanceProvider::new().with_balance("user-1", UnifiedBalance::new(1000.0, 0.0)),
    );

    // 低于最小金额
    let req = TransactionRequest::new(TransactionType::Send, 4.99, "user-1")
        .with_recipient("@john");
    let err = engine.process_transaction("user-1", &req).await.unwrap_err();

    assert_eq!(err.code(), "validation_failed");
    assert_eq!(err.to_string(), "Minimum amount for send is $5");
    assert_eq!(rates.call_count(), 0, "fee rates must not be fetched");
}

/// Test 1.2: 路由不可行时，计费同样不运行
#[tokio::test]
async fn test_fee_provider_never_called_on_infeasible_route() {
    let rates = Arc::new(CountingFeeRateProvider::new());
    let engine = engine_with(
        rates.clone(),
        InMemoryBalanceProvider::new().with_balance("user-1", UnifiedBalance::new(10.0, 0.0)),
    );

    let req = TransactionRequest::new(TransactionType::Send, 500.0, "user-1")
        .with_recipient("@john");
    let err = engine.process_transaction("user-1", &req).await.unwrap_err();

    assert_eq!(err.code(), "routing_infeasible");
    assert_eq!(err.to_string(), "Insufficient balance");
    assert_eq!(rates.call_count(), 0);
}

/// Test 1.3: 余额源故障 → ProviderUnavailable，消息不泄露内部端点
#[tokio::test]
async fn test_balance_provider_failure_classified() {
    let engine = TransactionEngine::new(
        Arc::new(CountingFeeRateProvider::new()),
        Arc::new(FlatRoutingFeeEstimator::default()),
        Arc::new(FailingBalanceProvider),
    );

    let req = TransactionRequest::new(TransactionType::Send, 50.0, "user-1")
        .with_recipient("@john");
    let err = engine.process_transaction("user-1", &req).await.unwrap_err();

    assert_eq!(err.code(), "provider_unavailable");
    assert!(!err.to_string().contains("balance-service.internal"));
    assert!(!err.to_string().contains("9090"));
}

// ============ 端到端场景 ============

/// Test 2.1: 出金1000到BTC地址（余额2500）——跨链、provider费0、DEX费>0
#[tokio::test]
async fn test_withdraw_to_btc_end_to_end() {
    let engine = default_engine(UnifiedBalance::new(2500.0, 0.0));

    let req = TransactionRequest::new(TransactionType::Withdraw, 1000.0, "user-1")
        .with_payment_method(PaymentMethod::ExternalWallet)
        .with_recipient("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
    let plan = engine.process_transaction("user-1", &req).await.unwrap();

    assert!(plan.routing_plan.feasible);
    assert_eq!(plan.routing_plan.to_chain, Some(ChainId::Btc));
    assert!(plan.routing_plan.needs_routing);
    assert_eq!(plan.fee_breakdown.provider, 0.0);
    assert!(plan.fee_breakdown.dex > 0.0);
    assert!(plan.validation.is_valid);

    // 收款方分类结果随计划返回
    let classification = plan.classification.expect("btc recipient classified");
    assert_eq!(classification.chain, Some(ChainId::Btc));
}

/// Test 2.2: 卖出500的BTC持仓只值430 → 余额不足
#[tokio::test]
async fn test_sell_exceeding_holding_value() {
    let engine =
        default_engine(UnifiedBalance::new(0.0, 0.0).with_asset("BTC", 0.01, 430.0));

    let req = TransactionRequest::new(TransactionType::Sell, 500.0, "user-1").with_asset("BTC");
    let err = engine.process_transaction("user-1", &req).await.unwrap_err();

    assert_eq!(err.code(), "routing_infeasible");
    assert!(err.to_string().contains("Insufficient balance"));
}

/// Test 2.3: send恰好5.00通过，4.99被拒（边界）
#[tokio::test]
async fn test_send_minimum_boundary() {
    let engine = default_engine(UnifiedBalance::new(100.0, 0.0));

    let req = TransactionRequest::new(TransactionType::Send, 5.0, "user-1")
        .with_recipient("@john");
    let plan = engine.process_transaction("user-1", &req).await.unwrap();
    assert!(plan.validation.is_valid);
    assert!(plan.routing_plan.stays_on_chain(ChainId::Sol));

    let req = TransactionRequest::new(TransactionType::Send, 4.99, "user-1")
        .with_recipient("@john");
    let err = engine.process_transaction("user-1", &req).await.unwrap_err();
    assert_eq!(err.to_string(), "Minimum amount for send is $5");
}

/// Test 2.4: buy USD无论金额/支付方式都被拒绝
#[tokio::test]
async fn test_buy_usd_always_rejected() {
    let engine = default_engine(UnifiedBalance::new(100000.0, 0.0));

    for amount in [10.0, 999.0, 50000.0] {
        for method in [PaymentMethod::CreditDebitCard, PaymentMethod::DiboasWallet] {
            let req = TransactionRequest::new(TransactionType::Buy, amount, "user-1")
                .with_asset("USD")
                .with_payment_method(method);
            let err = engine.process_transaction("user-1", &req).await.unwrap_err();
            assert_eq!(err.code(), "validation_failed");
            assert_eq!(
                err.to_string(),
                "Cannot buy USD. Please select a cryptocurrency or tokenized asset"
            );
        }
    }
}

/// Test 2.5: 全程SOL的路由DEX费恒为0
#[tokio::test]
async fn test_sol_route_zero_dex_fee() {
    let engine = default_engine(
        UnifiedBalance::new(1000.0, 0.0).with_asset("SOL", 10.0, 1500.0),
    );

    // transfer到SOL地址
    let req = TransactionRequest::new(TransactionType::Transfer, 100.0, "user-1")
        .with_recipient("DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK");
    let plan = engine.process_transaction("user-1", &req).await.unwrap();
    assert!(plan.routing_plan.stays_on_chain(ChainId::Sol));
    assert_eq!(plan.fee_breakdown.dex, 0.0);

    // 平台钱包买SOL
    let req = TransactionRequest::new(TransactionType::Buy, 100.0, "user-1")
        .with_asset("SOL")
        .with_payment_method(PaymentMethod::DiboasWallet);
    let plan = engine.process_transaction("user-1", &req).await.unwrap();
    assert_eq!(plan.fee_breakdown.dex, 0.0);
}

/// Test 2.6: 各类型请求的total都等于五项分量之和
#[tokio::test]
async fn test_fee_total_invariant_across_types() {
    let engine = default_engine(
        UnifiedBalance::new(100000.0, 5000.0)
            .with_asset("BTC", 1.0, 45000.0)
            .with_asset("PAXG", 2.0, 6000.0),
    );

    let requests = vec![
        TransactionRequest::new(TransactionType::Add, 250.0, "user-1")
            .with_payment_method(PaymentMethod::ApplePay),
        TransactionRequest::new(TransactionType::Withdraw, 100.0, "user-1")
            .with_payment_method(PaymentMethod::BankAccount),
        TransactionRequest::new(TransactionType::Send, 25.0, "user-1").with_recipient("@anna"),
        TransactionRequest::new(TransactionType::Receive, 25.0, "user-1").with_recipient("@bob"),
        TransactionRequest::new(TransactionType::Transfer, 300.0, "user-1")
            .with_recipient("0x742d35cc6634c0532925a3b844bc9e7595f0beb6"),
        TransactionRequest::new(TransactionType::Buy, 500.0, "user-1")
            .with_asset("BTC")
            .with_payment_method(PaymentMethod::DiboasWallet),
        TransactionRequest::new(TransactionType::Sell, 1000.0, "user-1").with_asset("BTC"),
        TransactionRequest::new(TransactionType::Invest, 200.0, "user-1").with_asset("PAXG"),
    ];

    for req in requests {
        let plan = engine.process_transaction("user-1", &req).await.unwrap();
        let fees = plan.fee_breakdown;
        let sum = fees.diboas + fees.network + fees.provider + fees.dex + fees.routing;
        assert!(
            (fees.total - sum).abs() < FEE_EPSILON,
            "{}: total {} != sum {}",
            req.tx_type(),
            fees.total,
            sum
        );
        assert!(fees.validate().is_ok());
    }
}

/// Test 2.7: 未接入网络的收款地址在校验阶段被拒，原因透传
#[tokio::test]
async fn test_transfer_to_unsupported_network() {
    let engine = default_engine(UnifiedBalance::new(1000.0, 0.0));

    let req = TransactionRequest::new(TransactionType::Transfer, 100.0, "user-1")
        .with_recipient("rN7n7otQDd6FczFgLdSqtcsAUxDkw6fzRH");
    let err = engine.process_transaction("user-1", &req).await.unwrap_err();

    assert_eq!(err.code(), "validation_failed");
    assert_eq!(err.to_string(), "XRP addresses are not currently supported");
}

// ============ 计划产出与序列化 ============

/// Test 3.1: 交易计划可序列化供外部执行层消费
#[tokio::test]
async fn test_plan_is_serializable() {
    let engine = default_engine(UnifiedBalance::new(1000.0, 0.0));

    let req = TransactionRequest::new(TransactionType::Add, 100.0, "user-1")
        .with_payment_method(PaymentMethod::CreditDebitCard);
    let plan = engine.process_transaction("user-1", &req).await.unwrap();

    let json = serde_json::to_string(&plan).unwrap();
    assert!(json.contains("\"plan_id\""));
    assert!(json.contains("\"fee_breakdown\""));
    assert!(json.contains("\"routing_plan\""));
    // 枚举按snake_case/大写约定上线
    assert!(json.contains("\"add\""));
    assert!(json.contains("\"SOL\""));
}

/// Test 3.2: 每次调用产出独立计划（不同plan_id），引擎无跨调用状态
#[tokio::test]
async fn test_each_call_yields_independent_plan() {
    let engine = default_engine(UnifiedBalance::new(1000.0, 0.0));

    let req = TransactionRequest::new(TransactionType::Send, 10.0, "user-1")
        .with_recipient("@john");
    let first = engine.process_transaction("user-1", &req).await.unwrap();
    let second = engine.process_transaction("user-1", &req).await.unwrap();

    assert_ne!(first.plan_id, second.plan_id);
    // 相同输入，相同定价
    assert_eq!(first.fee_breakdown.total, second.fee_breakdown.total);
}

/// Test 3.3: 自定义路由费报价进入明细
#[tokio::test]
async fn test_injected_routing_fee_estimator() {
    let engine = TransactionEngine::new(
        Arc::new(CountingFeeRateProvider::new()),
        Arc::new(FixedRoutingFeeEstimator { total: 2.5 }),
        Arc::new(
            InMemoryBalanceProvider::new()
                .with_balance("user-1", UnifiedBalance::new(1000.0, 0.0)),
        ),
    );

    let req = TransactionRequest::new(TransactionType::Transfer, 100.0, "user-1")
        .with_recipient("0x742d35cc6634c0532925a3b844bc9e7595f0beb6");
    let plan = engine.process_transaction("user-1", &req).await.unwrap();

    assert_eq!(plan.fee_breakdown.routing, 2.5);
}
