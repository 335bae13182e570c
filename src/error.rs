//! 统一错误类型模块
//!
//! 提供 hashrs 库中所有操作的错误类型定义。
//!
//! 错误分为三类：
//!
//! - [`ConfigurationError`]: 构造哈希器或 `set_options` 时的选项校验失败
//! - [`ParseError`]: 输入的字符串不是可识别的密码哈希
//! - [`PasswordHashError`]: 底层密码学原语计算失败
//!
//! 注意：密码不匹配不是错误，`verify` 会返回 `Ok(false)`。

use std::fmt;

/// hashrs 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// hashrs 库的错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 配置错误
    Configuration(ConfigurationError),

    /// 哈希解析错误
    Parse(ParseError),

    /// 密码哈希计算错误
    PasswordHash(PasswordHashError),

    /// 内部错误
    Internal(String),
}

impl Error {
    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 是否为配置错误
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// 是否为哈希解析错误
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

/// 选项配置相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// 未知的选项名
    UnknownOption {
        /// 算法名称
        algorithm: &'static str,
        /// 选项名
        key: String,
    },
    /// 选项值类型错误
    InvalidType {
        /// 选项名
        key: String,
        /// 期望的类型
        expected: &'static str,
        /// 实际的类型
        found: &'static str,
    },
    /// 选项值超出允许范围
    OutOfRange {
        /// 选项名
        key: String,
        /// 实际的值（原样保留，可能超出 i64）
        value: String,
        /// 允许的最小值
        min: i64,
        /// 允许的最大值
        max: i64,
    },
    /// 算法对应的 feature 未启用
    UnsupportedAlgorithm(&'static str),
}

/// 哈希字符串解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 不是任何已知算法的哈希格式
    UnrecognizedFormat,
    /// 能识别算法，但格式不正确
    Malformed {
        /// 算法名称
        algorithm: &'static str,
        /// 具体原因
        reason: String,
    },
    /// 能识别格式，但算法不受支持（或对应的 feature 未启用）
    UnsupportedAlgorithm(String),
}

/// 密码哈希计算相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordHashError {
    /// 哈希生成失败
    HashFailed(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(e) => write!(f, "Configuration error: {}", e),
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::PasswordHash(e) => write!(f, "Password hash error: {}", e),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::UnknownOption { algorithm, key } => {
                write!(f, "unknown option '{}' for {}", key, algorithm)
            }
            ConfigurationError::InvalidType {
                key,
                expected,
                found,
            } => write!(
                f,
                "option '{}' must be of type {}, got {}",
                key, expected, found
            ),
            ConfigurationError::OutOfRange {
                key,
                value,
                min,
                max,
            } => write!(
                f,
                "option '{}' must be between {} and {}, got {}",
                key, min, max, value
            ),
            ConfigurationError::UnsupportedAlgorithm(alg) => {
                write!(f, "algorithm {} is not enabled", alg)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnrecognizedFormat => write!(f, "unrecognized hash format"),
            ParseError::Malformed { algorithm, reason } => {
                write!(f, "malformed {} hash: {}", algorithm, reason)
            }
            ParseError::UnsupportedAlgorithm(alg) => write!(f, "unsupported algorithm: {}", alg),
        }
    }
}

impl fmt::Display for PasswordHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordHashError::HashFailed(msg) => write!(f, "hash generation failed: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Configuration(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::PasswordHash(e) => Some(e),
            Error::Internal(_) => None,
        }
    }
}

impl std::error::Error for ConfigurationError {}
impl std::error::Error for ParseError {}
impl std::error::Error for PasswordHashError {}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<ConfigurationError> for Error {
    fn from(err: ConfigurationError) -> Self {
        Error::Configuration(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<PasswordHashError> for Error {
    fn from(err: PasswordHashError) -> Self {
        Error::PasswordHash(err)
    }
}
