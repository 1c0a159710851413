// src/probe/banner.rs
//! Fact extraction from service banners, decoupled from socket I/O.
//! Each function takes the raw response text and returns the fact if the
//! expected pattern is present; a miss is not an error.

use regex::Regex;
use std::sync::LazyLock;

static REDIS_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"redis_version:(\S+)").expect("valid regex"));

static REDIS_DB0_KEYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"db0:keys=(\d+)").expect("valid regex"));

static POSTGRES_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PostgreSQL (\d+\.\d+)").expect("valid regex"));

/// `redis_version:7.2.0` out of an INFO response.
pub fn redis_version(info: &str) -> Option<String> {
    capture(&REDIS_VERSION, info)
}

/// Key count of database 0 out of an INFO response (`db0:keys=42,...`).
pub fn redis_db0_keys(info: &str) -> Option<String> {
    capture(&REDIS_DB0_KEYS, info)
}

/// Major.minor out of a `SELECT version()` banner
/// (`PostgreSQL 15.3 on x86_64-pc-linux-gnu, ...`).
pub fn postgres_version(banner: &str) -> Option<String> {
    capture(&POSTGRES_VERSION, banner)
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| c[1].to_string())
}
