//! 选项模式与校验
//!
//! 每种算法用一个静态的 [`OptionSchema`] 描述允许的选项、默认值与取值范围。
//! [`OptionSchema::resolve`] 是唯一的校验入口，对所有算法通用。

use std::collections::BTreeMap;

use serde_json::Value;

use super::{RawOptions, value_type_name};
use crate::error::{ConfigurationError, Error, Result};

/// 单个整数选项的描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionField {
    /// 选项名
    pub key: &'static str,
    /// 默认值
    pub default: i64,
    /// 最小值（含）
    pub min: i64,
    /// 最大值（含）
    pub max: i64,
}

impl OptionField {
    /// 描述一个整数选项
    pub const fn integer(key: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            key,
            default,
            min,
            max,
        }
    }

    fn check(&self, value: &Value) -> std::result::Result<i64, ConfigurationError> {
        let Value::Number(number) = value else {
            return Err(self.invalid_type(value));
        };

        let parsed = match number.as_i64() {
            Some(v) => v,
            // 超出 i64 的正整数
            None if number.is_u64() => return Err(self.out_of_range(number.to_string())),
            None => return Err(self.invalid_type(value)),
        };

        if parsed < self.min || parsed > self.max {
            return Err(self.out_of_range(parsed.to_string()));
        }
        Ok(parsed)
    }

    fn invalid_type(&self, value: &Value) -> ConfigurationError {
        ConfigurationError::InvalidType {
            key: self.key.to_string(),
            expected: "int",
            found: value_type_name(value),
        }
    }

    fn out_of_range(&self, value: String) -> ConfigurationError {
        ConfigurationError::OutOfRange {
            key: self.key.to_string(),
            value,
            min: self.min,
            max: self.max,
        }
    }
}

/// 某个算法的选项模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSchema {
    /// 算法名称，用于错误信息
    pub algorithm: &'static str,
    /// 允许的选项
    pub fields: &'static [OptionField],
}

impl OptionSchema {
    /// 创建选项模式
    pub const fn new(algorithm: &'static str, fields: &'static [OptionField]) -> Self {
        Self { algorithm, fields }
    }

    /// 按名称查找选项描述
    pub fn field(&self, key: &str) -> Option<&OptionField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// 校验并补全选项
    ///
    /// 校验是全有或全无的：任何一个选项不合法都会返回错误，不会产生部分结果。
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::UnknownOption`]: 存在模式中未声明的选项（按名称排序报告第一个）
    /// - [`ConfigurationError::InvalidType`]: 选项值不是整数
    /// - [`ConfigurationError::OutOfRange`]: 选项值超出范围
    ///
    /// # Example
    ///
    /// ```rust
    /// use hashrs::options::{OptionField, OptionSchema, RawOptions};
    ///
    /// const FIELDS: &[OptionField] = &[OptionField::integer("cost", 10, 4, 31)];
    /// let schema = OptionSchema::new("bcrypt", FIELDS);
    ///
    /// let resolved = schema.resolve(&RawOptions::new()).unwrap();
    /// assert_eq!(resolved.get("cost"), Some(10));
    ///
    /// assert!(schema.resolve(&RawOptions::new().with("cost", 3)).is_err());
    /// ```
    pub fn resolve(
        &self,
        raw: &RawOptions,
    ) -> std::result::Result<ResolvedOptions, ConfigurationError> {
        if let Some(unknown) = raw.keys().filter(|key| self.field(key).is_none()).min() {
            return Err(ConfigurationError::UnknownOption {
                algorithm: self.algorithm,
                key: unknown.clone(),
            });
        }

        let mut values = BTreeMap::new();
        for field in self.fields {
            let value = match raw.get(field.key) {
                Some(value) => field.check(value)?,
                None => field.default,
            };
            values.insert(field.key, value);
        }

        Ok(ResolvedOptions {
            algorithm: self.algorithm,
            values,
        })
    }

    /// 所有选项均取默认值时的结果
    pub fn defaults(&self) -> ResolvedOptions {
        ResolvedOptions {
            algorithm: self.algorithm,
            values: self.fields.iter().map(|f| (f.key, f.default)).collect(),
        }
    }
}

/// 按模式校验选项，等价于 [`OptionSchema::resolve`]
pub fn resolve(
    raw: &RawOptions,
    schema: &OptionSchema,
) -> std::result::Result<ResolvedOptions, ConfigurationError> {
    schema.resolve(raw)
}

/// 校验通过、已补全默认值的选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    algorithm: &'static str,
    values: BTreeMap<&'static str, i64>,
}

impl ResolvedOptions {
    /// 算法名称
    pub fn algorithm(&self) -> &'static str {
        self.algorithm
    }

    /// 获取选项值
    pub fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    /// 获取 u32 类型的选项值
    ///
    /// 选项必须已在模式中声明，且模式的取值范围落在 u32 内。
    pub fn get_u32(&self, key: &str) -> Result<u32> {
        let value = self.get(key).ok_or_else(|| {
            Error::internal(format!(
                "option '{}' is not declared for {}",
                key, self.algorithm
            ))
        })?;
        u32::try_from(value)
            .map_err(|_| Error::internal(format!("option '{}' does not fit in u32", key)))
    }

    /// 选项迭代器（按名称排序）
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// 转回松散类型的选项
    pub fn to_raw(&self) -> RawOptions {
        self.iter().collect()
    }
}

/// 由选项模式校验得到的强类型配置
///
/// 每个算法的配置类型实现该 trait，通过 [`Configuration::from_options`]
/// 共享同一套校验逻辑。
pub trait Configuration: Sized {
    /// 该配置对应的选项模式
    const SCHEMA: OptionSchema;

    /// 从校验后的选项构造配置，可以在此检查跨选项的约束
    fn from_resolved(resolved: &ResolvedOptions) -> Result<Self>;

    /// 校验松散类型的选项并构造配置
    fn from_options(raw: &RawOptions) -> Result<Self> {
        let resolved = Self::SCHEMA.resolve(raw)?;
        Self::from_resolved(&resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[OptionField] = &[
        OptionField::integer("cost", 10, 4, 31),
        OptionField::integer("rounds", 1, 1, 8),
    ];
    const SCHEMA: OptionSchema = OptionSchema::new("test", FIELDS);

    fn raw(value: Value) -> RawOptions {
        RawOptions::try_from(value).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let resolved = SCHEMA.resolve(&RawOptions::new()).unwrap();
        assert_eq!(resolved.get("cost"), Some(10));
        assert_eq!(resolved.get("rounds"), Some(1));
        assert_eq!(resolved, SCHEMA.defaults());
    }

    #[test]
    fn test_partial_options() {
        let resolved = SCHEMA.resolve(&raw(json!({ "rounds": 4 }))).unwrap();
        assert_eq!(resolved.get("cost"), Some(10));
        assert_eq!(resolved.get("rounds"), Some(4));
    }

    #[test]
    fn test_bounds_inclusive() {
        assert!(SCHEMA.resolve(&raw(json!({ "cost": 4 }))).is_ok());
        assert!(SCHEMA.resolve(&raw(json!({ "cost": 31 }))).is_ok());
    }

    #[test]
    fn test_unknown_option() {
        let err = SCHEMA
            .resolve(&raw(json!({ "zeta": 1, "alpha": 1, "cost": 12 })))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownOption {
                algorithm: "test",
                key: "alpha".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_types() {
        for (value, found) in [
            (json!("12"), "string"),
            (json!(12.0), "float"),
            (json!(true), "bool"),
            (json!(null), "null"),
            (json!([12]), "array"),
        ] {
            let err = SCHEMA.resolve(&raw(json!({ "cost": value }))).unwrap_err();
            assert_eq!(
                err,
                ConfigurationError::InvalidType {
                    key: "cost".to_string(),
                    expected: "int",
                    found,
                }
            );
        }
    }

    #[test]
    fn test_out_of_range() {
        let err = SCHEMA.resolve(&raw(json!({ "cost": 3 }))).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::OutOfRange {
                key: "cost".to_string(),
                value: "3".to_string(),
                min: 4,
                max: 31,
            }
        );

        let err = SCHEMA.resolve(&raw(json!({ "cost": -1 }))).unwrap_err();
        assert!(matches!(err, ConfigurationError::OutOfRange { .. }));
    }

    #[test]
    fn test_out_of_range_beyond_i64() {
        let err = SCHEMA
            .resolve(&raw(json!({ "cost": u64::MAX })))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::OutOfRange {
                key: "cost".to_string(),
                value: u64::MAX.to_string(),
                min: 4,
                max: 31,
            }
        );
    }

    #[test]
    fn test_get_u32() {
        let resolved = SCHEMA.defaults();
        assert_eq!(resolved.get_u32("cost").unwrap(), 10);
        assert!(matches!(resolved.get_u32("missing"), Err(Error::Internal(_))));
    }

    #[test]
    fn test_to_raw() {
        let resolved = SCHEMA.resolve(&raw(json!({ "cost": 12 }))).unwrap();
        let round = SCHEMA.resolve(&resolved.to_raw()).unwrap();
        assert_eq!(resolved, round);
    }

    #[test]
    fn test_free_function() {
        let resolved = resolve(&RawOptions::new(), &SCHEMA).unwrap();
        assert_eq!(resolved.algorithm(), "test");
    }
}
