//! 交易校验服务
//!
//! 有序、短路的结构与业务规则检查。预期中的业务失败以
//! `ValidationOutcome` 数据返回，从不panic；在动态语言里会"抛出"
//! 的畸形输入（非字符串收款方等）在这里由类型系统直接挡掉。
//!
//! 类型特定的规则（最小金额、收款方形态、资产范围）集中在一张
//! 规则表里，新增交易类型只改表不改流程。
//!
//! 余额充足性检查刻意不在这里做——只有RoutingPlanner能看到余额

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    domain::{
        chain::{is_crypto_asset, is_tokenized_asset},
        plan::ValidationOutcome,
        transaction::{TransactionRequest, TransactionType},
    },
    utils::address_classifier::AddressClassifier,
};

/// 平台用户名：@ + 3-20位字母数字下划线
static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@[A-Za-z0-9_]{3,20}$").expect("username pattern is valid"));

/// 收款方规则
#[derive(Debug, Clone, Copy, PartialEq)]
enum RecipientRule {
    /// 不要求收款方
    None,
    /// 平台用户名（@username）
    Username,
    /// 必须分类到受支持链的钱包地址
    SupportedAddress,
    /// 仅当支付方式为外部钱包时要求受支持的地址
    AddressIfExternalWallet,
}

/// 资产规则
#[derive(Debug, Clone, Copy, PartialEq)]
enum AssetRule {
    None,
    /// 加密资产或代币化资产（buy/sell）
    CryptoOrTokenized,
    /// 仅代币化实物资产（invest）
    TokenizedOnly,
}

/// 单一交易类型的校验规则
struct TypeRules {
    min_amount: f64,
    recipient: RecipientRule,
    asset: AssetRule,
}

fn rules_for(tx_type: TransactionType) -> TypeRules {
    match tx_type {
        TransactionType::Add => TypeRules {
            min_amount: 10.0,
            recipient: RecipientRule::None,
            asset: AssetRule::None,
        },
        TransactionType::Withdraw => TypeRules {
            min_amount: 10.0,
            recipient: RecipientRule::AddressIfExternalWallet,
            asset: AssetRule::None,
        },
        TransactionType::Send | TransactionType::Receive => TypeRules {
            min_amount: 5.0,
            recipient: RecipientRule::Username,
            asset: AssetRule::None,
        },
        TransactionType::Transfer => TypeRules {
            min_amount: 10.0,
            recipient: RecipientRule::SupportedAddress,
            asset: AssetRule::None,
        },
        TransactionType::Buy | TransactionType::Sell => TypeRules {
            min_amount: 10.0,
            recipient: RecipientRule::None,
            asset: AssetRule::CryptoOrTokenized,
        },
        TransactionType::Invest => TypeRules {
            min_amount: 10.0,
            recipient: RecipientRule::None,
            asset: AssetRule::TokenizedOnly,
        },
    }
}

/// 最小金额文案：整数不带小数位
fn format_minimum(min: f64) -> String {
    if min.fract() == 0.0 {
        format!("{:.0}", min)
    } else {
        format!("{}", min)
    }
}

/// 交易校验器
pub struct TransactionValidator;

impl TransactionValidator {
    pub fn new() -> Self {
        Self
    }

    /// 按固定顺序短路检查；全部通过返回 `ValidationOutcome::ok()`
    pub fn validate(&self, user_id: &str, request: &TransactionRequest) -> ValidationOutcome {
        let rules = rules_for(request.tx_type());

        // 1. 必填字段：金额缺省（交易类型由枚举保证存在）
        if request.amount() == 0.0 {
            return ValidationOutcome::fail("Missing required fields");
        }

        // 2. 金额必须是正的有限数
        if !request.amount().is_finite() || request.amount() <= 0.0 {
            return ValidationOutcome::fail("Invalid amount");
        }

        // 3. 类型最小金额
        if request.amount() < rules.min_amount {
            return ValidationOutcome::fail(format!(
                "Minimum amount for {} is ${}",
                request.tx_type(),
                format_minimum(rules.min_amount)
            ));
        }

        // 4. 收款方规则
        if let Some(outcome) = self.check_recipient(request, rules.recipient) {
            return outcome;
        }

        // 5. 资产规则
        if let Some(outcome) = self.check_asset(request, rules.asset) {
            return outcome;
        }

        tracing::debug!(user_id = %user_id, tx_type = %request.tx_type(), "validation passed");
        ValidationOutcome::ok()
    }

    fn check_recipient(
        &self,
        request: &TransactionRequest,
        rule: RecipientRule,
    ) -> Option<ValidationOutcome> {
        let rule = match rule {
            RecipientRule::AddressIfExternalWallet => {
                if request.uses_external_wallet() {
                    RecipientRule::SupportedAddress
                } else {
                    return None;
                }
            }
            other => other,
        };

        match rule {
            RecipientRule::None => None,
            RecipientRule::Username => {
                let recipient = request.recipient().unwrap_or("");
                if USERNAME_PATTERN.is_match(recipient) {
                    None
                } else {
                    Some(ValidationOutcome::fail("Invalid username format"))
                }
            }
            RecipientRule::SupportedAddress => {
                let classification =
                    AddressClassifier::classify(request.recipient().unwrap_or(""));
                if classification.is_valid && classification.is_supported {
                    None
                } else {
                    // 分类器原因（如"XRP addresses are not currently supported"）
                    // 直接透传给用户
                    let reason = classification
                        .reason
                        .unwrap_or_else(|| "A valid wallet address is required".to_string());
                    Some(ValidationOutcome::fail(reason))
                }
            }
            RecipientRule::AddressIfExternalWallet => unreachable!("resolved above"),
        }
    }

    fn check_asset(
        &self,
        request: &TransactionRequest,
        rule: AssetRule,
    ) -> Option<ValidationOutcome> {
        match rule {
            AssetRule::None => None,
            AssetRule::CryptoOrTokenized => {
                let asset = match request.asset() {
                    Some(a) if !a.trim().is_empty() => a,
                    _ => {
                        return Some(ValidationOutcome::fail(format!(
                            "Asset is required for {}",
                            request.tx_type()
                        )))
                    }
                };
                if request.tx_type() == TransactionType::Buy
                    && asset.trim().eq_ignore_ascii_case("USD")
                {
                    return Some(ValidationOutcome::fail(
                        "Cannot buy USD. Please select a cryptocurrency or tokenized asset",
                    ));
                }
                if is_crypto_asset(asset) || is_tokenized_asset(asset) {
                    None
                } else {
                    Some(ValidationOutcome::fail(format!(
                        "Asset {} is not available for trading",
                        asset.trim().to_uppercase()
                    )))
                }
            }
            AssetRule::TokenizedOnly => {
                let asset = match request.asset() {
                    Some(a) if !a.trim().is_empty() => a,
                    _ => {
                        return Some(ValidationOutcome::fail(
                            "Asset is required for invest",
                        ))
                    }
                };
                if is_tokenized_asset(asset) {
                    None
                } else {
                    Some(ValidationOutcome::fail(
                        "Only tokenized assets are available for investing",
                    ))
                }
            }
        }
    }
}

impl Default for TransactionValidator {
    fn default() -> Self {
        Self::new()
    }
}
