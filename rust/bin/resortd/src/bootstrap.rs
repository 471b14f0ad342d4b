//! First-start checks and root admin creation.

use frontdesk::service::FrontDeskService;
use tracing::info;

use crate::config::ServerConfig;

/// Refuse to start on a config that cannot work.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.root.email.trim().is_empty() || !config.root.email.contains('@') {
        anyhow::bail!("root.email must be an email address.");
    }
    if config.root.password_hash.is_empty() {
        anyhow::bail!("No root password hash found in configuration.");
    }
    if !config.root.password_hash.starts_with("$argon2") {
        anyhow::bail!("root.password_hash must be an argon2 PHC string.");
    }
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Create the root admin account on first start.
pub fn ensure_root_admin(service: &FrontDeskService, config: &ServerConfig) -> anyhow::Result<()> {
    let created = service
        .ensure_root_admin(&config.root.email, &config.root.password_hash)
        .map_err(|e| anyhow::anyhow!("failed to create root admin: {}", e))?;
    if created {
        info!("Created root admin {}", config.root.email);
    } else {
        info!("Root admin already exists");
    }
    Ok(())
}
