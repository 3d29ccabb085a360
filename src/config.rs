//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 费率配置
///
/// DEX费率在产品历史上调整过（历史0.2%，现行0.8%），因此必须走
/// 配置而非常量：两个取值都要能在测试中复现。生产环境通过
/// `DEX_FEE_RATE` 环境变量下发
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeeConfig {
    /// DEX/桥接换币费率（现行 0.008 = 0.8%）
    pub dex_fee_rate: f64,
    /// 平台服务费标准费率（add/send/receive/buy/sell/invest）
    pub platform_standard_rate: f64,
    /// 平台服务费出金费率（withdraw/transfer）
    pub platform_exit_rate: f64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
    pub enable_file_logging: bool,
    pub log_file_path: Option<String>,
}

/// 解析并校验一个费率环境变量；非法值丢弃
fn env_rate(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|&v: &f64| v > 0.0 && v <= 1.0 && v.is_finite())
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            dex_fee_rate: env_rate("DEX_FEE_RATE").unwrap_or_else(|| {
                tracing::warn!(
                    "DEX_FEE_RATE未配置，使用现行默认费率 0.8% (0.008)。历史费率部署需显式配置"
                );
                0.008
            }),
            platform_standard_rate: env_rate("PLATFORM_FEE_RATE").unwrap_or(0.0009),
            platform_exit_rate: env_rate("PLATFORM_EXIT_FEE_RATE").unwrap_or(0.009),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
            enable_file_logging: std::env::var("LOG_FILE_ENABLED")
                .ok()
                .map(|v| v == "1")
                .unwrap_or(false),
            log_file_path: std::env::var("LOG_FILE_PATH").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fees: FeeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::default())
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                let file_config = Self::from_file(path)?;
                config = file_config;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("fees.dex_fee_rate", self.fees.dex_fee_rate),
            ("fees.platform_standard_rate", self.fees.platform_standard_rate),
            ("fees.platform_exit_rate", self.fees.platform_exit_rate),
        ] {
            if !rate.is_finite() || rate <= 0.0 || rate > 1.0 {
                anyhow::bail!("{} must be a rate in (0, 1], got {}", name, rate);
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        Ok(())
    }
}
