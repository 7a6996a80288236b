//! Write the merged server list into the proxy clients' config files.
//!
//! Each emitter owns one part of its file (entries tagged with the harvest
//! group, or a marked block of lines) and leaves the rest as it found it.

pub mod cow;
pub mod shadowsocks;

use std::path::PathBuf;

use futures::future::join_all;
use log::{info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::server::ServerRecord;
use crate::store::ConfigStore;

pub const EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// Shadowsocks GUI `gui-config.json`.
    Shadowsocks,
    /// COW `rc` file.
    Cow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: ClientKind,
    pub path: PathBuf,
}

/// COW is written when asked for or already configured. Shadowsocks GUI is
/// written when asked for, already configured, or when nothing else is.
pub async fn select_targets<S: ConfigStore>(settings: &Settings, store: &S) -> Vec<Target> {
    let (cow_exists, ss_exists) = tokio::join!(
        store.exists(&settings.cow_config),
        store.exists(&settings.ss_config)
    );
    let is_cow = settings.force_cow || cow_exists;
    let is_ss = settings.force_ss || ss_exists;

    let mut targets = Vec::new();
    if is_cow {
        targets.push(Target {
            kind: ClientKind::Cow,
            path: settings.cow_config.clone(),
        });
    }
    if is_ss || !is_cow {
        targets.push(Target {
            kind: ClientKind::Shadowsocks,
            path: settings.ss_config.clone(),
        });
    }
    targets
}

/// Rewrite one target. An unreadable file is treated as absent.
pub async fn emit<S: ConfigStore>(
    store: &S,
    target: &Target,
    servers: &[ServerRecord],
    group: &str,
) -> Result<()> {
    let existing = match store.read(&target.path).await {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read {}, starting fresh: {}", target.path.display(), e);
            None
        }
    };

    let content = match target.kind {
        ClientKind::Shadowsocks => shadowsocks::render(existing.as_deref(), servers, group)?,
        ClientKind::Cow => cow::render(existing.as_deref(), servers, group)?,
    };

    store.write(&target.path, &content).await?;
    info!("💾 {} server(s) written to {}", servers.len(), target.path.display());
    Ok(())
}

/// Rewrite all targets concurrently. Every target is attempted; the first
/// error is returned.
pub async fn emit_all<S: ConfigStore>(
    store: &S,
    targets: &[Target],
    servers: &[ServerRecord],
    group: &str,
) -> Result<()> {
    join_all(targets.iter().map(|target| emit(store, target, servers, group)))
        .await
        .into_iter()
        .collect()
}
