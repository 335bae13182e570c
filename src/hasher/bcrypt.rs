//! bcrypt 哈希策略

use std::sync::Arc;

use ::bcrypt::Version;
use serde::Serialize;

use super::{Algorithm, ConfigCell, Hasher, rehash_decision};
use crate::error::{Error, ParseError, PasswordHashError, Result};
use crate::info::{HashInfo, keys};
use crate::options::{Configuration, OptionField, OptionSchema, RawOptions, ResolvedOptions};

/// 默认 cost
pub const DEFAULT_COST: u32 = 10;
/// 允许的最小 cost
pub const MIN_COST: u32 = 4;
/// 允许的最大 cost
pub const MAX_COST: u32 = 31;

const FIELDS: &[OptionField] = &[OptionField::integer(
    keys::COST,
    DEFAULT_COST as i64,
    MIN_COST as i64,
    MAX_COST as i64,
)];

/// bcrypt 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BcryptConfig {
    /// cost 参数 (4-31, 默认 10)，每加 1 计算量翻倍
    pub cost: u32,
}

impl Default for BcryptConfig {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl Configuration for BcryptConfig {
    const SCHEMA: OptionSchema = OptionSchema::new("bcrypt", FIELDS);

    fn from_resolved(resolved: &ResolvedOptions) -> Result<Self> {
        Ok(Self {
            cost: resolved.get_u32(keys::COST)?,
        })
    }
}

impl BcryptConfig {
    /// 转为松散类型的选项
    pub fn to_options(&self) -> RawOptions {
        RawOptions::new().with(keys::COST, self.cost)
    }
}

/// bcrypt 哈希器
///
/// # Example
///
/// ```rust
/// use hashrs::{BcryptHasher, Hasher, RawOptions};
///
/// let hasher = BcryptHasher::new(&RawOptions::new().with("cost", 4)).unwrap();
/// let hash = hasher.compute("my_password").unwrap();
/// assert!(hash.starts_with("$2y$04$"));
/// ```
#[derive(Debug)]
pub struct BcryptHasher {
    config: ConfigCell<BcryptConfig>,
}

impl BcryptHasher {
    /// 使用给定选项创建 bcrypt 哈希器
    ///
    /// # Errors
    ///
    /// 选项不合法时返回 [`Error::Configuration`]
    pub fn new(options: &RawOptions) -> Result<Self> {
        let config = BcryptConfig::from_options(options)?;
        tracing::debug!(cost = config.cost, "bcrypt hasher configured");
        Ok(Self {
            config: ConfigCell::new(config),
        })
    }

    /// 使用指定 cost 创建 bcrypt 哈希器
    ///
    /// # Errors
    ///
    /// cost 不在 4-31 范围内时返回 [`Error::Configuration`]
    pub fn with_cost(cost: u32) -> Result<Self> {
        Self::new(&RawOptions::new().with(keys::COST, cost))
    }

    /// 当前配置快照
    pub fn config(&self) -> Arc<BcryptConfig> {
        self.config.load()
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self {
            config: ConfigCell::new(BcryptConfig::default()),
        }
    }
}

impl Clone for BcryptHasher {
    fn clone(&self) -> Self {
        Self {
            config: ConfigCell::new(*self.config()),
        }
    }
}

impl Hasher for BcryptHasher {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bcrypt
    }

    fn compute(&self, password: &str) -> Result<String> {
        let config = self.config();
        ::bcrypt::hash_with_result(password, config.cost)
            .map(|parts| parts.format_for_version(Version::TwoY))
            .map_err(|e| {
                Error::PasswordHash(PasswordHashError::HashFailed(format!(
                    "bcrypt hash failed: {}",
                    e
                )))
            })
    }

    fn needs_rehash(&self, hash: &str) -> Result<bool> {
        let info = HashInfo::parse(hash)?;
        let config = self.config();

        let reason = if info.algorithm() != Algorithm::Bcrypt {
            Some("algorithm changed")
        } else if info.param(keys::COST).is_none_or(|cost| cost < config.cost) {
            Some("cost below configured value")
        } else {
            None
        };
        Ok(rehash_decision(Algorithm::Bcrypt, reason))
    }

    fn options(&self) -> RawOptions {
        self.config().to_options()
    }

    fn reconfigure(&self, options: &RawOptions) -> Result<()> {
        let config = BcryptConfig::from_options(options)?;
        tracing::debug!(cost = config.cost, "bcrypt hasher reconfigured");
        self.config.store(config);
        Ok(())
    }
}

pub(crate) fn verify_bcrypt(password: &str, hash: &str) -> Result<bool> {
    ::bcrypt::verify(password, hash).map_err(|e| {
        Error::Parse(ParseError::Malformed {
            algorithm: "bcrypt",
            reason: e.to_string(),
        })
    })
}
