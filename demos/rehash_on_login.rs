//! 登录时 rehash 示例
//!
//! 展示如何在用户登录成功后，用当前配置升级旧的密码哈希。
//!
//! 运行: cargo run --example rehash_on_login --features full

use std::collections::HashMap;

use hashrs::{Error, HasherConfig, RawOptions};

/// 简单的用户存储（实际应用中应使用数据库）
struct UserStore {
    hashes: HashMap<String, String>,
}

fn login(
    store: &mut UserStore,
    hasher: &dyn hashrs::Hasher,
    username: &str,
    password: &str,
) -> Result<bool, Error> {
    let Some(stored) = store.hashes.get(username) else {
        return Ok(false);
    };

    if !hasher.verify(password, stored)? {
        return Ok(false);
    }

    if hasher.needs_rehash(stored)? {
        let upgraded = hasher.compute(password)?;
        println!("  升级 {} 的哈希: {} -> {}", username, prefix(stored), prefix(&upgraded));
        store.hashes.insert(username.to_string(), upgraded);
    }
    Ok(true)
}

fn prefix(hash: &str) -> &str {
    let end = hash.rfind('$').unwrap_or(hash.len());
    &hash[..end]
}

fn main() -> Result<(), Error> {
    println!("=== 登录时 Rehash 示例 ===\n");

    // 1. 旧系统使用 bcrypt
    let legacy = HasherConfig::new(hashrs::Algorithm::Bcrypt)
        .with_option("cost", 4)
        .build()?;
    let mut store = UserStore {
        hashes: HashMap::new(),
    };
    store
        .hashes
        .insert("alice".to_string(), legacy.compute("alice-password")?);
    store
        .hashes
        .insert("bob".to_string(), legacy.compute("bob-password")?);

    // 2. 新配置从配置文件读取
    let config: HasherConfig = serde_json::from_str(
        r#"{ "algorithm": "argon2id", "options": { "memoryCost": 8192, "timeCost": 2 } }"#,
    )
    .map_err(|e| Error::internal(e.to_string()))?;
    let current = config.build()?;
    println!("当前算法: {}, 选项: {:?}\n", current.algorithm(), current.options());

    // 3. 用户登录
    println!("alice 登录: {}", login(&mut store, current.as_ref(), "alice", "alice-password")?);
    println!("bob 输错密码: {}", login(&mut store, current.as_ref(), "bob", "wrong")?);

    // 4. 提高参数
    current.reconfigure(&RawOptions::new().with("memoryCost", 16384).with("timeCost", 3))?;
    println!("\n提高参数后: {:?}\n", current.options());
    println!("alice 再次登录: {}", login(&mut store, current.as_ref(), "alice", "alice-password")?);
    println!("bob 登录: {}", login(&mut store, current.as_ref(), "bob", "bob-password")?);

    // 5. 损坏的数据与错误密码被区分开
    store
        .hashes
        .insert("mallory".to_string(), "not-a-hash".to_string());
    match login(&mut store, current.as_ref(), "mallory", "anything") {
        Err(e) if e.is_parse() => println!("\nmallory 的哈希已损坏: {}", e),
        other => println!("\nmallory: {:?}", other),
    }

    for (user, hash) in &store.hashes {
        if let Ok(info) = current.get_info(hash) {
            println!("{}: {} {:?}", user, info.algorithm(), info.params());
        }
    }

    Ok(())
}
