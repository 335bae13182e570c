//! 集成测试：哈希计算与校验
//!
//! 覆盖所有算法的往返校验、salt 随机性、跨算法校验与格式错误处理。

use hashrs::{Algorithm, Error, Hasher, ParseError, RawOptions, get_info, verify_password};

/// 各算法的低开销选项，加快测试
fn fast_options(algorithm: Algorithm) -> RawOptions {
    match algorithm {
        Algorithm::Bcrypt => RawOptions::new().with("cost", 4),
        Algorithm::Argon2i | Algorithm::Argon2id => RawOptions::new()
            .with("memoryCost", 1024)
            .with("timeCost", 1)
            .with("parallelism", 1),
    }
}

/// 所有已启用算法的哈希器
fn enabled_hashers() -> Vec<Box<dyn Hasher>> {
    Algorithm::ALL
        .into_iter()
        .filter(|a| a.is_available())
        .map(|a| a.hasher(&fast_options(a)).expect("fast options should be valid"))
        .collect()
}

/// 测试所有算法的往返校验
#[test]
fn test_round_trip_all_algorithms() {
    for hasher in enabled_hashers() {
        for password in ["", "password", "密码测试🔐émoji", "with spaces and symbols !@#$%^&*()"] {
            let hash = hasher.compute(password).unwrap();
            assert!(
                hasher.verify(password, &hash).unwrap(),
                "{} should verify its own hash",
                hasher.algorithm()
            );
        }
    }
}

/// 测试错误密码校验失败（返回 false 而不是错误）
#[test]
fn test_wrong_password_is_false_not_error() {
    for hasher in enabled_hashers() {
        let hash = hasher.compute("correct horse").unwrap();
        let result = hasher.verify("battery staple", &hash);
        assert_eq!(result, Ok(false), "{}", hasher.algorithm());
    }
}

/// 测试同一密码两次哈希结果不同，但都能校验
#[test]
fn test_salt_uniqueness() {
    for hasher in enabled_hashers() {
        let hash1 = hasher.compute("same_password").unwrap();
        let hash2 = hasher.compute("same_password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("same_password", &hash1).unwrap());
        assert!(hasher.verify("same_password", &hash2).unwrap());
    }
}

/// 测试编码格式
#[test]
fn test_wire_format() {
    for hasher in enabled_hashers() {
        let hash = hasher.compute("format").unwrap();
        match hasher.algorithm() {
            Algorithm::Bcrypt => {
                assert!(hash.starts_with("$2y$04$"));
                assert_eq!(hash.len(), 60);
            }
            Algorithm::Argon2i => assert!(hash.starts_with("$argon2i$v=19$m=1024,t=1,p=1$")),
            Algorithm::Argon2id => assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$")),
        }
    }
}

/// 测试 get_info 返回哈希中的参数
#[test]
fn test_get_info_reports_embedded_params() {
    for hasher in enabled_hashers() {
        let hash = hasher.compute("info").unwrap();
        let info = hasher.get_info(&hash).unwrap();
        assert_eq!(info.algorithm(), hasher.algorithm());
        assert_eq!(info, get_info(&hash).unwrap());

        for (key, value) in hasher.options().iter() {
            assert_eq!(
                info.param(key).map(u64::from),
                value.as_u64(),
                "{} param {}",
                hasher.algorithm(),
                key
            );
        }
    }
}

/// 测试任何哈希器都能校验其他算法生成的哈希
#[test]
fn test_cross_algorithm_verification() {
    let hashers = enabled_hashers();
    for producer in &hashers {
        let hash = producer.compute("shared").unwrap();
        for verifier in &hashers {
            assert!(
                verifier.verify("shared", &hash).unwrap(),
                "{} should verify a {} hash",
                verifier.algorithm(),
                producer.algorithm()
            );
            assert_eq!(
                verifier.needs_rehash(&hash).unwrap(),
                verifier.algorithm() != producer.algorithm()
            );
        }
        assert!(verify_password("shared", &hash).unwrap());
    }
}

/// 测试格式错误的哈希返回解析错误，而不是 false
#[test]
fn test_malformed_hash_is_parse_error() {
    for hasher in enabled_hashers() {
        assert_eq!(
            hasher.verify("password", "not-a-hash"),
            Err(Error::Parse(ParseError::UnrecognizedFormat))
        );
        assert!(hasher.get_info("not-a-hash").unwrap_err().is_parse());
        assert!(hasher.needs_rehash("not-a-hash").unwrap_err().is_parse());
        assert!(hasher.verify("password", "$2y$10$short").unwrap_err().is_parse());
        assert!(hasher.verify("password", "$argon2id$v=19$m=1024").unwrap_err().is_parse());
    }
}

/// 测试不支持的算法
#[test]
fn test_unsupported_algorithms() {
    let argon2d = "$argon2d$v=19$m=1024,t=1,p=1$c29tZXNhbHRzb21lc2FsdA$MTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMjM0NTY3ODkwMTI";
    let err = verify_password("password", argon2d).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::UnsupportedAlgorithm(_))));
}

/// 测试长密码
#[test]
fn test_long_password() {
    for hasher in enabled_hashers() {
        let password = "a".repeat(1000);
        let hash = hasher.compute(&password).unwrap();
        assert!(hasher.verify(&password, &hash).unwrap());
    }
}
