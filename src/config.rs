//! 哈希器配置
//!
//! [`HasherConfig`] 可以直接从宿主应用的配置文件反序列化，
//! 调用 [`HasherConfig::build`] 时才进行选项校验。
//!
//! ```rust
//! use hashrs::{Algorithm, HasherConfig};
//!
//! let config: HasherConfig = serde_json::from_str(
//!     r#"{ "algorithm": "bcrypt", "options": { "cost": 4 } }"#,
//! ).unwrap();
//! assert_eq!(config.algorithm, Algorithm::Bcrypt);
//!
//! # #[cfg(feature = "bcrypt")]
//! # {
//! let hasher = config.build().unwrap();
//! let hash = hasher.compute("password").unwrap();
//! assert!(hash.starts_with("$2y$04$"));
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::hasher::{Algorithm, Hasher};
use crate::options::RawOptions;

/// 哈希器配置：算法 + 松散类型的选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HasherConfig {
    /// 使用的算法
    pub algorithm: Algorithm,

    /// 算法选项，缺省为空（全部取默认值）
    #[serde(default)]
    pub options: RawOptions,
}

impl HasherConfig {
    /// 创建使用默认选项的配置
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            options: RawOptions::new(),
        }
    }

    /// 设置一个选项
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key, value);
        self
    }

    /// 校验选项并构造哈希器
    ///
    /// # Errors
    ///
    /// 选项不合法，或算法对应的 feature 未启用时返回配置错误
    pub fn build(&self) -> Result<Box<dyn Hasher>> {
        self.algorithm.hasher(&self.options)
    }
}
