//! Argon2 哈希策略（Argon2i / Argon2id）
//!
//! 两个变体共用同一套选项模式，区别只在编码哈希中的算法标识。

use std::fmt;
use std::sync::Arc;

use ::argon2::{Argon2, Params, Version};
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use serde::Serialize;

use super::{Algorithm, ConfigCell, Hasher, rehash_decision};
use crate::error::{ConfigurationError, Error, ParseError, PasswordHashError, Result};
use crate::info::{HashInfo, keys};
use crate::options::{Configuration, OptionField, OptionSchema, RawOptions, ResolvedOptions};

/// 生成哈希时使用的 Argon2 版本 (0x13)
pub const CURRENT_VERSION: u32 = 0x13;

/// salt 长度（字节）
const SALT_LEN: usize = 16;

/// 每条并行通道至少需要的内存块数 (KiB)
const MIN_MEMORY_PER_LANE: u32 = 8;

const FIELDS: &[OptionField] = &[
    OptionField::integer(
        keys::MEMORY_COST,
        Params::DEFAULT_M_COST as i64,
        Params::MIN_M_COST as i64,
        Params::MAX_M_COST as i64,
    ),
    OptionField::integer(
        keys::TIME_COST,
        Params::DEFAULT_T_COST as i64,
        Params::MIN_T_COST as i64,
        Params::MAX_T_COST as i64,
    ),
    OptionField::integer(
        keys::PARALLELISM,
        Params::DEFAULT_P_COST as i64,
        Params::MIN_P_COST as i64,
        Params::MAX_P_COST as i64,
    ),
];

/// Argon2 变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Argon2Variant {
    /// Argon2i
    Argon2i,
    /// Argon2id
    #[default]
    Argon2id,
}

impl Argon2Variant {
    /// 对应的算法标识
    pub fn algorithm(self) -> Algorithm {
        match self {
            Argon2Variant::Argon2i => Algorithm::Argon2i,
            Argon2Variant::Argon2id => Algorithm::Argon2id,
        }
    }

    fn primitive(self) -> ::argon2::Algorithm {
        match self {
            Argon2Variant::Argon2i => ::argon2::Algorithm::Argon2i,
            Argon2Variant::Argon2id => ::argon2::Algorithm::Argon2id,
        }
    }
}

impl fmt::Display for Argon2Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.algorithm().name())
    }
}

/// Argon2 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Config {
    /// 内存开销，单位 KiB
    pub memory_cost: u32,
    /// 迭代次数
    pub time_cost: u32,
    /// 并行度
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: Params::DEFAULT_M_COST,
            time_cost: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl Configuration for Argon2Config {
    const SCHEMA: OptionSchema = OptionSchema::new("argon2", FIELDS);

    fn from_resolved(resolved: &ResolvedOptions) -> Result<Self> {
        let config = Self {
            memory_cost: resolved.get_u32(keys::MEMORY_COST)?,
            time_cost: resolved.get_u32(keys::TIME_COST)?,
            parallelism: resolved.get_u32(keys::PARALLELISM)?,
        };

        let min_memory = u64::from(config.parallelism) * u64::from(MIN_MEMORY_PER_LANE);
        if u64::from(config.memory_cost) < min_memory {
            return Err(ConfigurationError::OutOfRange {
                key: keys::MEMORY_COST.to_string(),
                value: config.memory_cost.to_string(),
                min: min_memory as i64,
                max: Params::MAX_M_COST as i64,
            }
            .into());
        }
        Ok(config)
    }
}

impl Argon2Config {
    /// 转为底层库的参数
    pub fn params(&self) -> Result<Params> {
        Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| Error::internal(format!("validated Argon2 params rejected: {}", e)))
    }

    /// 转为松散类型的选项
    pub fn to_options(&self) -> RawOptions {
        RawOptions::new()
            .with(keys::MEMORY_COST, self.memory_cost)
            .with(keys::TIME_COST, self.time_cost)
            .with(keys::PARALLELISM, self.parallelism)
    }
}

/// Argon2 哈希器
///
/// # Example
///
/// ```rust
/// use hashrs::{Argon2Hasher, Hasher, RawOptions};
///
/// let options = RawOptions::new()
///     .with("memoryCost", 1024)
///     .with("timeCost", 1)
///     .with("parallelism", 1);
/// let hasher = Argon2Hasher::argon2id(&options).unwrap();
///
/// let hash = hasher.compute("my_password").unwrap();
/// assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
/// assert!(hasher.verify("my_password", &hash).unwrap());
/// ```
#[derive(Debug)]
pub struct Argon2Hasher {
    variant: Argon2Variant,
    config: ConfigCell<Argon2Config>,
}

impl Argon2Hasher {
    /// 使用给定变体和选项创建 Argon2 哈希器
    ///
    /// # Errors
    ///
    /// 选项不合法时返回 [`Error::Configuration`]
    pub fn new(variant: Argon2Variant, options: &RawOptions) -> Result<Self> {
        let config = Argon2Config::from_options(options)?;
        tracing::debug!(
            algorithm = %variant,
            memory_cost = config.memory_cost,
            time_cost = config.time_cost,
            parallelism = config.parallelism,
            "argon2 hasher configured"
        );
        Ok(Self {
            variant,
            config: ConfigCell::new(config),
        })
    }

    /// 创建 Argon2i 哈希器
    pub fn argon2i(options: &RawOptions) -> Result<Self> {
        Self::new(Argon2Variant::Argon2i, options)
    }

    /// 创建 Argon2id 哈希器
    pub fn argon2id(options: &RawOptions) -> Result<Self> {
        Self::new(Argon2Variant::Argon2id, options)
    }

    /// 使用的变体
    pub fn variant(&self) -> Argon2Variant {
        self.variant
    }

    /// 当前配置快照
    pub fn config(&self) -> Arc<Argon2Config> {
        self.config.load()
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            variant: Argon2Variant::default(),
            config: ConfigCell::new(Argon2Config::default()),
        }
    }
}

impl Clone for Argon2Hasher {
    fn clone(&self) -> Self {
        Self {
            variant: self.variant,
            config: ConfigCell::new(*self.config()),
        }
    }
}

impl Hasher for Argon2Hasher {
    fn algorithm(&self) -> Algorithm {
        self.variant.algorithm()
    }

    fn compute(&self, password: &str) -> Result<String> {
        let params = self.config().params()?;
        let salt = generate_salt()?;
        let argon2 = Argon2::new(self.variant.primitive(), Version::V0x13, params);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                Error::PasswordHash(PasswordHashError::HashFailed(format!(
                    "Argon2 hash failed: {}",
                    e
                )))
            })
    }

    fn needs_rehash(&self, hash: &str) -> Result<bool> {
        let info = HashInfo::parse(hash)?;
        let config = self.config();
        let weaker = |key: &str, current: u32| info.param(key).is_none_or(|stored| stored < current);

        // 省略版本号时底层库按 0x13 处理
        let reason = if info.algorithm() != self.algorithm() {
            Some("algorithm changed")
        } else if info.version().unwrap_or(CURRENT_VERSION) < CURRENT_VERSION {
            Some("outdated version")
        } else if weaker(keys::MEMORY_COST, config.memory_cost) {
            Some("memory cost below configured value")
        } else if weaker(keys::TIME_COST, config.time_cost) {
            Some("time cost below configured value")
        } else if weaker(keys::PARALLELISM, config.parallelism) {
            Some("parallelism below configured value")
        } else {
            None
        };
        Ok(rehash_decision(self.algorithm(), reason))
    }

    fn options(&self) -> RawOptions {
        self.config().to_options()
    }

    fn reconfigure(&self, options: &RawOptions) -> Result<()> {
        let config = Argon2Config::from_options(options)?;
        tracing::debug!(
            algorithm = %self.variant,
            memory_cost = config.memory_cost,
            time_cost = config.time_cost,
            parallelism = config.parallelism,
            "argon2 hasher reconfigured"
        );
        self.config.store(config);
        Ok(())
    }
}

fn generate_salt() -> Result<SaltString> {
    let mut salt_bytes = [0u8; SALT_LEN];
    getrandom::fill(&mut salt_bytes).map_err(|e| {
        Error::PasswordHash(PasswordHashError::HashFailed(format!(
            "Failed to generate random salt: {}",
            e
        )))
    })?;
    SaltString::encode_b64(&salt_bytes).map_err(|e| {
        Error::PasswordHash(PasswordHashError::HashFailed(format!(
            "Failed to encode salt: {}",
            e
        )))
    })
}

pub(crate) fn verify_argon2(password: &str, hash: &str) -> Result<bool> {
    let malformed = |e: password_hash::Error| {
        Error::Parse(ParseError::Malformed {
            algorithm: "argon2",
            reason: e.to_string(),
        })
    };

    let parsed_hash = PasswordHash::new(hash).map_err(malformed)?;

    // 算法、版本与参数均取自哈希本身
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(malformed(e)),
    }
}
