//! 密码哈希器
//!
//! 定义所有哈希策略共享的 [`Hasher`] trait，以及与具体策略无关的校验函数。
//!
//! ## 支持的算法
//!
//! - **Argon2id** (推荐) / **Argon2i**: 内存硬哈希算法（需启用 `argon2` feature）
//! - **bcrypt**: 经典的密码哈希算法，输出 `$2y$` 格式（需启用 `bcrypt` feature）
//!
//! ## 示例
//!
#![cfg_attr(feature = "bcrypt", doc = "```rust")]
#![cfg_attr(not(feature = "bcrypt"), doc = "```rust,ignore")]
//! use hashrs::{BcryptHasher, Hasher, RawOptions};
//!
//! let hasher = BcryptHasher::new(&RawOptions::new().with("cost", 4)).unwrap();
//! let hash = hasher.compute("my_password").unwrap();
//!
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.needs_rehash(&hash).unwrap());
//!
//! // 提高 cost 后，旧哈希需要重新生成
//! hasher.set_options(&RawOptions::new().with("cost", 5)).unwrap();
//! assert!(hasher.needs_rehash(&hash).unwrap());
//! ```

#[cfg(feature = "argon2")]
mod argon2;
#[cfg(feature = "bcrypt")]
mod bcrypt;

#[cfg(feature = "argon2")]
pub use self::argon2::{Argon2Config, Argon2Hasher, Argon2Variant};
#[cfg(feature = "bcrypt")]
pub use self::bcrypt::{BcryptConfig, BcryptHasher};

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Error, ParseError, Result};
use crate::info::HashInfo;
use crate::options::RawOptions;

// 编译时检查：至少需要启用一个密码哈希算法
#[cfg(not(any(feature = "argon2", feature = "bcrypt")))]
compile_error!(
    "At least one password hashing algorithm (argon2 or bcrypt) must be enabled. Enable one of the password hashing features."
);

/// 哈希算法标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// bcrypt - 经典算法，广泛支持
    Bcrypt,

    /// Argon2i - 针对侧信道攻击优化
    Argon2i,

    /// Argon2id - 推荐的默认算法
    /// 结合了 Argon2i（抵抗侧信道攻击）和 Argon2d（抵抗 GPU 攻击）的优点
    Argon2id,
}

#[allow(clippy::derivable_impls)]
impl Default for Algorithm {
    fn default() -> Self {
        #[cfg(feature = "argon2")]
        {
            Algorithm::Argon2id
        }
        #[cfg(not(feature = "argon2"))]
        {
            Algorithm::Bcrypt
        }
    }
}

impl Algorithm {
    /// 所有算法
    pub const ALL: [Algorithm; 3] = [Algorithm::Bcrypt, Algorithm::Argon2i, Algorithm::Argon2id];

    /// 算法名称
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Bcrypt => "bcrypt",
            Algorithm::Argon2i => "argon2i",
            Algorithm::Argon2id => "argon2id",
        }
    }

    /// 编码哈希中使用的算法标识
    pub fn ident(&self) -> &'static str {
        match self {
            Algorithm::Bcrypt => "2y",
            Algorithm::Argon2i => "argon2i",
            Algorithm::Argon2id => "argon2id",
        }
    }

    /// 对应的 feature 是否已启用
    pub fn is_available(&self) -> bool {
        match self {
            Algorithm::Bcrypt => cfg!(feature = "bcrypt"),
            Algorithm::Argon2i | Algorithm::Argon2id => cfg!(feature = "argon2"),
        }
    }

    /// 使用给定选项构造该算法的哈希器
    ///
    /// # Errors
    ///
    /// 选项不合法，或算法对应的 feature 未启用时返回 [`Error::Configuration`]
    ///
    /// # Example
    ///
    /// ```rust
    /// use hashrs::{Algorithm, RawOptions};
    ///
    /// let hasher = Algorithm::default().hasher(&RawOptions::new()).unwrap();
    /// assert_eq!(hasher.algorithm(), Algorithm::default());
    /// ```
    pub fn hasher(self, options: &RawOptions) -> Result<Box<dyn Hasher>> {
        match self {
            #[cfg(feature = "bcrypt")]
            Algorithm::Bcrypt => Ok(Box::new(BcryptHasher::new(options)?)),
            #[cfg(feature = "argon2")]
            Algorithm::Argon2i => Ok(Box::new(Argon2Hasher::argon2i(options)?)),
            #[cfg(feature = "argon2")]
            Algorithm::Argon2id => Ok(Box::new(Argon2Hasher::argon2id(options)?)),
            #[allow(unreachable_patterns)]
            other => Err(ConfigurationError::UnsupportedAlgorithm(other.name()).into()),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bcrypt" | "2a" | "2b" | "2y" => Ok(Algorithm::Bcrypt),
            "argon2i" => Ok(Algorithm::Argon2i),
            "argon2id" => Ok(Algorithm::Argon2id),
            other => Err(ParseError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// 密码哈希策略
///
/// 所有策略在构造后只持有一份不可变配置，`compute` / `verify` /
/// `needs_rehash` / `get_info` 可以被多个线程并发调用。
/// `set_options` 会校验新选项并以原子方式替换配置。
pub trait Hasher: Send + Sync + fmt::Debug {
    /// 该策略使用的算法
    fn algorithm(&self) -> Algorithm;

    /// 计算密码哈希，每次调用使用新的随机 salt
    fn compute(&self, password: &str) -> Result<String>;

    /// 校验密码
    ///
    /// 使用哈希自身携带的算法、参数和 salt 重新计算，而不是当前配置，
    /// 因此旧配置甚至其他算法生成的哈希都可以校验。
    ///
    /// 密码不匹配返回 `Ok(false)`；哈希格式错误返回 [`Error::Parse`]。
    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        verify_password(password, hash)
    }

    /// 检查哈希是否需要用当前配置重新生成
    ///
    /// 算法不同，或任何参数弱于当前配置时返回 `true`。
    fn needs_rehash(&self, hash: &str) -> Result<bool>;

    /// 解析哈希中的算法与参数
    fn get_info(&self, hash: &str) -> Result<HashInfo> {
        HashInfo::parse(hash)
    }

    /// 当前生效的选项（已补全默认值）
    fn options(&self) -> RawOptions;

    /// 校验并替换配置
    ///
    /// 校验失败时保留原配置。
    fn reconfigure(&self, options: &RawOptions) -> Result<()>;

    /// 校验并替换配置，返回自身以便链式调用
    fn set_options(&self, options: &RawOptions) -> Result<&Self>
    where
        Self: Sized,
    {
        self.reconfigure(options)?;
        Ok(self)
    }
}

/// 以原子方式发布的不可变配置
///
/// 读取方拿到 `Arc` 快照后立即释放锁，哈希计算期间不持有锁。
#[derive(Debug)]
pub(crate) struct ConfigCell<C> {
    current: RwLock<Arc<C>>,
}

impl<C> ConfigCell<C> {
    pub(crate) fn new(config: C) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub(crate) fn load(&self) -> Arc<C> {
        // 锁内只有 Arc 的读写，中毒时的值依然完整
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn store(&self, config: C) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    }
}

pub(crate) fn rehash_decision(algorithm: Algorithm, reason: Option<&str>) -> bool {
    if let Some(reason) = reason {
        tracing::debug!(algorithm = %algorithm, reason, "password hash needs rehash");
    }
    reason.is_some()
}

// ============================================================================
// 便捷函数
// ============================================================================

/// 校验密码是否匹配哈希
///
/// 自动识别哈希的算法（bcrypt / Argon2i / Argon2id，取决于启用的 feature），
/// 与任何具体策略的当前配置无关。
///
/// # Returns
///
/// 密码正确返回 `Ok(true)`，错误返回 `Ok(false)`
///
/// # Errors
///
/// 哈希格式错误或算法不受支持时返回 [`Error::Parse`]，与"密码错误"严格区分
///
/// # Example
///
/// ```rust
/// use hashrs::{hash_password, verify_password};
///
/// let hash = hash_password("my_secure_password").unwrap();
///
/// assert!(verify_password("my_secure_password", &hash).unwrap());
/// assert!(!verify_password("wrong_password", &hash).unwrap());
/// assert!(verify_password("my_secure_password", "not-a-hash").is_err());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let info = HashInfo::parse(hash).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected malformed password hash");
    })?;

    match info.algorithm() {
        #[cfg(feature = "bcrypt")]
        Algorithm::Bcrypt => self::bcrypt::verify_bcrypt(password, hash),
        #[cfg(feature = "argon2")]
        Algorithm::Argon2i | Algorithm::Argon2id => self::argon2::verify_argon2(password, hash),
        #[allow(unreachable_patterns)]
        other => Err(Error::Parse(ParseError::UnsupportedAlgorithm(
            other.name().to_string(),
        ))),
    }
}

/// 使用默认算法和默认选项哈希密码
///
/// 默认使用 Argon2id（如果启用），否则使用 bcrypt
///
/// # Example
///
/// ```rust
/// use hashrs::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with('$'));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    Algorithm::default()
        .hasher(&RawOptions::new())?
        .compute(password)
}

/// 检查哈希相对默认算法和默认选项是否需要重新生成
pub fn needs_rehash(hash: &str) -> Result<bool> {
    Algorithm::default()
        .hasher(&RawOptions::new())?
        .needs_rehash(hash)
}
