//! 领域模型层

pub mod balance;
pub mod chain;
pub mod plan;
pub mod transaction;

pub use balance::{AssetBalance, UnifiedBalance};
pub use chain::{native_chain_of, ChainId, SETTLEMENT_ASSET, SETTLEMENT_CHAIN};
pub use plan::{FeeBreakdown, RoutingPlan, TransactionPlan, ValidationOutcome};
pub use transaction::{PaymentMethod, TransactionRequest, TransactionType};
