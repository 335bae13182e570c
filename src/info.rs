//! 哈希信息解析
//!
//! 把编码后的密码哈希拆解为算法、版本和参数，不涉及任何密码学计算。
//!
//! 支持的格式：
//!
//! - bcrypt（modular crypt format）: `$2y$10$<22 字符 salt><31 字符摘要>`，
//!   同时接受 `$2a$` / `$2b$` 前缀
//! - Argon2（PHC 字符串）: `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<摘要>`
//!
//! ## 示例
//!
//! ```rust
//! use hashrs::{Algorithm, HashInfo};
//!
//! let info = HashInfo::parse("$2y$10$abcdefghijklmnopqrstuu5l6pM9B8sWZ3cuUVm1lXqxT7I5D6a7O").unwrap();
//! assert_eq!(info.algorithm(), Algorithm::Bcrypt);
//! assert_eq!(info.param("cost"), Some(10));
//!
//! assert!(HashInfo::parse("not-a-hash").is_err());
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ParseError, Result};
use crate::hasher::Algorithm;

/// 参数名，与选项名保持一致
pub mod keys {
    /// bcrypt cost
    pub const COST: &str = "cost";
    /// Argon2 内存开销（KiB）
    pub const MEMORY_COST: &str = "memoryCost";
    /// Argon2 迭代次数
    pub const TIME_COST: &str = "timeCost";
    /// Argon2 并行度
    pub const PARALLELISM: &str = "parallelism";
}

/// bcrypt salt + 摘要部分的长度（22 + 31）
const BCRYPT_PAYLOAD_LEN: usize = 53;

/// 从编码哈希中解析出的只读信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashInfo {
    algorithm: Algorithm,
    version: Option<u32>,
    params: BTreeMap<&'static str, u32>,
}

impl HashInfo {
    /// 解析编码哈希
    ///
    /// # Errors
    ///
    /// - [`ParseError::UnrecognizedFormat`]: 不是任何已知算法的格式
    /// - [`ParseError::Malformed`]: 能识别算法但格式错误
    /// - [`ParseError::UnsupportedAlgorithm`]: 如 `argon2d`、`$2x$`，或对应 feature 未启用
    pub fn parse(hash: &str) -> Result<Self> {
        let info = if hash.starts_with("$argon2") {
            parse_argon2(hash)?
        } else if hash.starts_with("$2") {
            parse_bcrypt(hash)?
        } else {
            return Err(ParseError::UnrecognizedFormat.into());
        };
        Ok(info)
    }

    /// 哈希使用的算法
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// 哈希中声明的算法版本（仅 Argon2，且可能省略）
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// 所有参数
    pub fn params(&self) -> &BTreeMap<&'static str, u32> {
        &self.params
    }

    /// 获取单个参数
    pub fn param(&self, key: &str) -> Option<u32> {
        self.params.get(key).copied()
    }
}

/// 解析编码哈希，等价于 [`HashInfo::parse`]
pub fn get_info(hash: &str) -> Result<HashInfo> {
    HashInfo::parse(hash)
}

fn malformed(algorithm: &'static str, reason: impl Into<String>) -> ParseError {
    ParseError::Malformed {
        algorithm,
        reason: reason.into(),
    }
}

fn is_bcrypt_base64(b: u8) -> bool {
    b == b'.' || b == b'/' || b.is_ascii_alphanumeric()
}

fn parse_bcrypt(hash: &str) -> std::result::Result<HashInfo, ParseError> {
    // "", 版本, cost, salt+摘要
    let parts: Vec<&str> = hash.split('$').collect();
    let [_, variant, cost, payload] = parts.as_slice() else {
        return Err(malformed("bcrypt", "expected 3 fields"));
    };

    match *variant {
        "2a" | "2b" | "2y" => {}
        // crypt_blowfish 的历史 bug 兼容格式，无法正确校验
        "2x" => return Err(ParseError::UnsupportedAlgorithm("2x".to_string())),
        other => return Err(malformed("bcrypt", format!("unknown variant '{}'", other))),
    }

    if cost.len() != 2 || !cost.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("bcrypt", "cost must be two digits"));
    }
    let cost: u32 = cost
        .parse()
        .map_err(|_| malformed("bcrypt", "cost must be two digits"))?;
    if !(4..=31).contains(&cost) {
        return Err(malformed("bcrypt", format!("cost {} out of range", cost)));
    }

    if payload.len() != BCRYPT_PAYLOAD_LEN || !payload.bytes().all(is_bcrypt_base64) {
        return Err(malformed("bcrypt", "invalid salt or digest"));
    }

    Ok(HashInfo {
        algorithm: Algorithm::Bcrypt,
        version: None,
        params: BTreeMap::from([(keys::COST, cost)]),
    })
}

#[cfg(feature = "argon2")]
fn parse_argon2(hash: &str) -> std::result::Result<HashInfo, ParseError> {
    use password_hash::PasswordHash;

    let parsed = PasswordHash::new(hash).map_err(|e| malformed("argon2", e.to_string()))?;

    let algorithm = match parsed.algorithm.as_str() {
        "argon2i" => Algorithm::Argon2i,
        "argon2id" => Algorithm::Argon2id,
        other => return Err(ParseError::UnsupportedAlgorithm(other.to_string())),
    };

    if let Some(version) = parsed.version {
        argon2::Version::try_from(version)
            .map_err(|_| malformed("argon2", format!("unknown version {}", version)))?;
    }
    if parsed.salt.is_none() {
        return Err(malformed("argon2", "missing salt"));
    }
    if parsed.hash.is_none() {
        return Err(malformed("argon2", "missing digest"));
    }

    let params =
        argon2::Params::try_from(&parsed).map_err(|e| malformed("argon2", e.to_string()))?;

    Ok(HashInfo {
        algorithm,
        version: parsed.version,
        params: BTreeMap::from([
            (keys::MEMORY_COST, params.m_cost()),
            (keys::TIME_COST, params.t_cost()),
            (keys::PARALLELISM, params.p_cost()),
        ]),
    })
}

#[cfg(not(feature = "argon2"))]
fn parse_argon2(hash: &str) -> std::result::Result<HashInfo, ParseError> {
    let tag = hash.split('$').nth(1).unwrap_or_default();
    Err(ParseError::UnsupportedAlgorithm(tag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const BCRYPT_HASH: &str = "$2y$10$abcdefghijklmnopqrstuu5l6pM9B8sWZ3cuUVm1lXqxT7I5D6a7O";

    fn parse_err(hash: &str) -> ParseError {
        match HashInfo::parse(hash) {
            Err(Error::Parse(e)) => e,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bcrypt() {
        let info = HashInfo::parse(BCRYPT_HASH).unwrap();
        assert_eq!(info.algorithm(), Algorithm::Bcrypt);
        assert_eq!(info.param(keys::COST), Some(10));
        assert_eq!(info.version(), None);
        assert_eq!(info.params().len(), 1);
    }

    #[test]
    fn test_parse_bcrypt_other_prefixes() {
        for prefix in ["2a", "2b"] {
            let hash = BCRYPT_HASH.replacen("2y", prefix, 1);
            assert_eq!(HashInfo::parse(&hash).unwrap().algorithm(), Algorithm::Bcrypt);
        }
        assert_eq!(
            parse_err(&BCRYPT_HASH.replacen("2y", "2x", 1)),
            ParseError::UnsupportedAlgorithm("2x".to_string())
        );
    }

    #[test]
    fn test_parse_bcrypt_malformed() {
        // cost 不是两位数
        assert!(matches!(
            parse_err("$2y$9$abcdefghijklmnopqrstuu5l6pM9B8sWZ3cuUVm1lXqxT7I5D6a7O"),
            ParseError::Malformed { .. }
        ));
        // cost 超出范围
        assert!(matches!(
            parse_err(&BCRYPT_HASH.replacen("$10$", "$03$", 1)),
            ParseError::Malformed { .. }
        ));
        // 长度不对
        assert!(matches!(
            parse_err(&BCRYPT_HASH[..59]),
            ParseError::Malformed { .. }
        ));
        // 非法字符
        assert!(matches!(
            parse_err(&BCRYPT_HASH.replacen('a', "!", 1)),
            ParseError::Malformed { .. }
        ));
        assert!(matches!(parse_err("$2y$10"), ParseError::Malformed { .. }));
        assert!(matches!(parse_err("$2q$10$x"), ParseError::Malformed { .. }));
    }

    #[test]
    fn test_unrecognized_format() {
        assert_eq!(parse_err("not-a-hash"), ParseError::UnrecognizedFormat);
        assert_eq!(parse_err(""), ParseError::UnrecognizedFormat);
        assert_eq!(parse_err("$scrypt$ln=15,r=8,p=1$c2FsdA$aGFzaA"), ParseError::UnrecognizedFormat);
    }

    #[test]
    #[cfg(feature = "argon2")]
    fn test_parse_argon2() {
        let hash = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$MTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMjM0NTY3ODkwMTI";
        let info = get_info(hash).unwrap();
        assert_eq!(info.algorithm(), Algorithm::Argon2id);
        assert_eq!(info.version(), Some(19));
        assert_eq!(info.param(keys::MEMORY_COST), Some(19456));
        assert_eq!(info.param(keys::TIME_COST), Some(2));
        assert_eq!(info.param(keys::PARALLELISM), Some(1));

        let info = get_info(&hash.replacen("argon2id", "argon2i", 1)).unwrap();
        assert_eq!(info.algorithm(), Algorithm::Argon2i);
    }

    #[test]
    #[cfg(feature = "argon2")]
    fn test_parse_argon2_errors() {
        let hash = "$argon2d$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$MTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMjM0NTY3ODkwMTI";
        assert_eq!(
            parse_err(hash),
            ParseError::UnsupportedAlgorithm("argon2d".to_string())
        );

        assert!(matches!(
            parse_err("$argon2id$v=19$m=19456,t=2,p=1"),
            ParseError::Malformed { .. }
        ));
        assert!(matches!(
            parse_err("$argon2id$garbage"),
            ParseError::Malformed { .. }
        ));
    }

    #[test]
    #[cfg(not(feature = "argon2"))]
    fn test_argon2_disabled() {
        assert_eq!(
            parse_err("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
            ParseError::UnsupportedAlgorithm("argon2id".to_string())
        );
    }
}
