//! 交易请求模型
//!
//! 请求一经构造即不可变，类型特定的必填字段规则集中在
//! `TransactionValidator` 的规则表中执行

use std::fmt;

use serde::{Deserialize, Serialize};

/// 交易类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// 法币入金（on-ramp）
    Add,
    /// 出金（off-ramp或外部钱包）
    Withdraw,
    /// 平台内转账（发送方）
    Send,
    /// 平台内转账（接收方）
    Receive,
    /// 转出到外部链上地址
    Transfer,
    /// 购买加密/代币化资产
    Buy,
    /// 卖出资产回USDC
    Sell,
    /// 投资代币化实物资产
    Invest,
}

impl TransactionType {
    /// 全部交易类型（测试和费率表遍历用）
    pub const ALL: &'static [TransactionType] = &[
        TransactionType::Add,
        TransactionType::Withdraw,
        TransactionType::Send,
        TransactionType::Receive,
        TransactionType::Transfer,
        TransactionType::Buy,
        TransactionType::Sell,
        TransactionType::Invest,
    ];

    /// 是否法币入金方向
    pub fn is_on_ramp(&self) -> bool {
        matches!(self, TransactionType::Add)
    }

    /// 是否出金方向
    pub fn is_off_ramp(&self) -> bool {
        matches!(self, TransactionType::Withdraw)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionType::Add => "add",
            TransactionType::Withdraw => "withdraw",
            TransactionType::Send => "send",
            TransactionType::Receive => "receive",
            TransactionType::Transfer => "transfer",
            TransactionType::Buy => "buy",
            TransactionType::Sell => "sell",
            TransactionType::Invest => "invest",
        };
        write!(f, "{}", s)
    }
}

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditDebitCard,
    BankAccount,
    ApplePay,
    GooglePay,
    PayPal,
    /// 平台钱包余额
    DiboasWallet,
    /// 外部自托管钱包
    ExternalWallet,
}

impl PaymentMethod {
    /// 是否传统支付轨道（经支付服务商，收取provider费）
    pub fn is_traditional_rail(&self) -> bool {
        !matches!(
            self,
            PaymentMethod::DiboasWallet | PaymentMethod::ExternalWallet
        )
    }
}

/// 交易请求
///
/// 由调用方构造后不可变；引擎只读取，不修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    tx_type: TransactionType,
    amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<PaymentMethod>,
    source_user_id: String,
}

impl TransactionRequest {
    pub fn new(tx_type: TransactionType, amount: f64, source_user_id: impl Into<String>) -> Self {
        Self {
            tx_type,
            amount,
            asset: None,
            recipient: None,
            payment_method: None,
            source_user_id: source_user_id.into(),
        }
    }

    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = Some(asset.into());
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn asset(&self) -> Option<&str> {
        self.asset.as_deref()
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn source_user_id(&self) -> &str {
        &self.source_user_id
    }

    /// 是否从外部钱包进出（收DEX费而非provider费）
    pub fn uses_external_wallet(&self) -> bool {
        self.payment_method == Some(PaymentMethod::ExternalWallet)
    }

    /// 是否用平台钱包余额支付
    pub fn pays_from_platform_wallet(&self) -> bool {
        self.payment_method == Some(PaymentMethod::DiboasWallet)
    }
}
