//! 错误类型定义
//!
//! 四类错误分级：用户可纠正的校验失败、路由不可行、外部数据源
//! 不可用、内部不变量违反。前两类是预期结果，以类型化Result返回；
//! 所有错误消息都可直接展示给用户，内部费率表数值和底层错误细节
//! 只进日志，绝不进入消息文本

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// 用户可纠正：缺字段、低于最小金额、收款方/资产非法
    #[error("{message}")]
    Validation { message: String },

    /// 路由不可行：余额不足、不支持的通道
    #[error("{message}")]
    RoutingInfeasible { message: String },

    /// 外部费率/余额数据源失败；每次调用只尝试一次，重试由调用方负责
    #[error("{message}")]
    ProviderUnavailable { provider: String, message: String },

    /// 内部缺陷（负费用、NaN金额），中止当前请求，绝不静默修复
    #[error("Internal error, the request could not be processed")]
    InvariantViolation { message: String },
}

/// 供外部消费的可序列化错误体
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn routing_infeasible(message: impl Into<String>) -> Self {
        Self::RoutingInfeasible {
            message: message.into(),
        }
    }

    /// `provider` 是内部标识（进日志）；`message` 是用户可见文案
    pub fn provider_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// 稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "validation_failed",
            EngineError::RoutingInfeasible { .. } => "routing_infeasible",
            EngineError::ProviderUnavailable { .. } => "provider_unavailable",
            EngineError::InvariantViolation { .. } => "invariant_violation",
        }
    }

    /// 是否用户侧可纠正的预期失败
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            EngineError::Validation { .. } | EngineError::RoutingInfeasible { .. }
        )
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_stable() {
        assert_eq!(EngineError::validation("x").code(), "validation_failed");
        assert_eq!(
            EngineError::routing_infeasible("x").code(),
            "routing_infeasible"
        );
        assert_eq!(
            EngineError::provider_unavailable("fee_rates", "x").code(),
            "provider_unavailable"
        );
        assert_eq!(EngineError::invariant("x").code(), "invariant_violation");
    }

    #[test]
    fn test_expected_failures_are_user_correctable() {
        assert!(EngineError::validation("Invalid amount").is_user_correctable());
        assert!(EngineError::routing_infeasible("Insufficient balance").is_user_correctable());
        assert!(!EngineError::invariant("negative fee").is_user_correctable());
    }

    #[test]
    fn test_invariant_message_never_leaks_details() {
        // 内部细节只进日志，Display输出固定文案
        let err = EngineError::invariant("fee component 'dex' is negative");
        assert_eq!(
            err.to_string(),
            "Internal error, the request could not be processed"
        );
    }

    #[test]
    fn test_error_body_serializable() {
        let body = EngineError::validation("Minimum amount for send is $5").to_body();
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("validation_failed"));
        assert!(json.contains("Minimum amount for send is $5"));
    }
}
