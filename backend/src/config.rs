use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_path: String,
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub jwt_secret: String,
}

// parse env variables and init Config
pub fn init_config() -> anyhow::Result<Config> {
    config_from(|key| std::env::var(key).ok())
}

fn config_from(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
    let database_path = lookup("DATABASE_PATH").unwrap_or_else(|| "users.db".to_string());

    let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
    let bind_addr = bind_addr
        .parse::<SocketAddr>()
        .with_context(|| format!("BIND_ADDR is not a socket address: {}", bind_addr))?;

    let static_dir = lookup("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("frontend/dist"));

    let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;

    Ok(Config {
        database_path,
        bind_addr,
        static_dir,
        jwt_secret,
    })
}
