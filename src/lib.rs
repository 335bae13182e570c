//! # hashrs
//!
//! 可互换的密码哈希策略库。
//!
//! ## 功能特性
//!
//! - **统一接口**: 所有算法实现同一个 [`Hasher`] trait（compute / verify / needs_rehash / get_info）
//! - **选项校验**: 松散类型的选项按每个算法的模式校验，未知选项、类型错误、越界一律在构造时报错
//! - **Rehash 检测**: 提高工作因子后，在用户下次登录时发现并重新生成旧哈希
//! - **哈希解析**: 从编码哈希中读取算法与参数
//!
//! 实际的密码学计算委托给 `bcrypt` 和 `argon2` crate。
//!
//! ## Features
//!
//! - `argon2` - 启用 Argon2i / Argon2id 支持（默认启用）
//! - `bcrypt` - 启用 bcrypt 支持（默认启用）
//! - `full` - 启用所有功能
//!
//! ## 示例
//!
//! ```rust
//! use hashrs::{hash_password, verify_password};
//!
//! let hash = hash_password("my_secure_password").unwrap();
//! assert!(verify_password("my_secure_password", &hash).unwrap());
//! ```
//!
//! ## 登录时 Rehash
//!
#![cfg_attr(feature = "bcrypt", doc = "```rust")]
#![cfg_attr(not(feature = "bcrypt"), doc = "```rust,ignore")]
//! use hashrs::{BcryptHasher, Hasher, RawOptions};
//!
//! let hasher = BcryptHasher::with_cost(4).unwrap();
//! let stored = hasher.compute("password").unwrap();
//!
//! // 运维提高了 cost
//! hasher.set_options(&RawOptions::new().with("cost", 5)).unwrap();
//!
//! // 旧哈希依然可以校验，但需要重新生成
//! if hasher.verify("password", &stored).unwrap() && hasher.needs_rehash(&stored).unwrap() {
//!     let upgraded = hasher.compute("password").unwrap();
//!     assert!(upgraded.starts_with("$2y$05$"));
//! }
//! ```

pub mod config;
pub mod error;
pub mod hasher;
pub mod info;
pub mod options;

pub use config::HasherConfig;
pub use error::{ConfigurationError, Error, ParseError, PasswordHashError, Result};
pub use hasher::{Algorithm, Hasher, hash_password, needs_rehash, verify_password};
pub use info::{HashInfo, get_info};
pub use options::RawOptions;

#[cfg(feature = "argon2")]
pub use hasher::{Argon2Config, Argon2Hasher, Argon2Variant};
#[cfg(feature = "bcrypt")]
pub use hasher::{BcryptConfig, BcryptHasher};
