//! 哈希器选项模块
//!
//! 调用方以松散类型的 [`RawOptions`] 传入选项，由 [`OptionSchema`] 描述的
//! 每算法模式进行校验、补全默认值，最终得到强类型的配置。
//!
//! ## 示例
//!
//! ```rust
//! use hashrs::options::RawOptions;
//!
//! let options = RawOptions::new().with("cost", 12);
//! assert_eq!(options.len(), 1);
//!
//! // 也可以从 JSON 构造
//! let options = RawOptions::try_from(serde_json::json!({ "cost": 12 })).unwrap();
//! assert!(options.contains_key("cost"));
//! ```

mod schema;

pub use schema::{Configuration, OptionField, OptionSchema, ResolvedOptions, resolve};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigurationError;

/// 松散类型的选项映射
///
/// 键为选项名，值为任意 JSON 值。可以为空或只包含部分选项，
/// 缺失的选项在校验时取默认值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawOptions(Map<String, Value>);

impl RawOptions {
    /// 创建空的选项映射
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个选项（构建器风格）
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// 插入一个选项，返回被替换的旧值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// 获取选项值
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 是否包含某个选项
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// 选项名迭代器
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// 选项迭代器
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// 选项数量
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for RawOptions {
    type Error = ConfigurationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ConfigurationError::InvalidType {
                key: "options".to_string(),
                expected: "object",
                found: value_type_name(&other),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// JSON 值的类型名，用于错误信息
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let options = RawOptions::new().with("cost", 12).with("extra", "x");
        assert_eq!(options.len(), 2);
        assert_eq!(options.get("cost"), Some(&json!(12)));
        assert!(!options.is_empty());
    }

    #[test]
    fn test_try_from_object() {
        let options = RawOptions::try_from(json!({ "memoryCost": 1024 })).unwrap();
        assert!(options.contains_key("memoryCost"));
    }

    #[test]
    fn test_try_from_non_object() {
        let err = RawOptions::try_from(json!([1, 2])).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidType {
                key: "options".to_string(),
                expected: "object",
                found: "array",
            }
        );
    }

    #[test]
    fn test_deserialize_transparent() {
        let options: RawOptions = serde_json::from_str(r#"{"cost": 11}"#).unwrap();
        assert_eq!(options, RawOptions::new().with("cost", 11));
    }

    #[test]
    fn test_from_iterator() {
        let options: RawOptions = [("timeCost", 3), ("parallelism", 2)].into_iter().collect();
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_value_type_name() {
        assert_eq!(value_type_name(&json!(null)), "null");
        assert_eq!(value_type_name(&json!(true)), "bool");
        assert_eq!(value_type_name(&json!(1.5)), "float");
        assert_eq!(value_type_name(&json!(1)), "int");
        assert_eq!(value_type_name(&json!("x")), "string");
        assert_eq!(value_type_name(&json!({})), "object");
    }
}
