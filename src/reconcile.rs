//! Merge a fresh harvest with previously known servers.

use std::collections::HashSet;

use log::info;

use crate::error::{FreeSsError, Result};
use crate::server::ServerRecord;

/// Fresh records first, then every prior record whose `(server, server_port)`
/// was not seen again. An empty harvest is an error whatever the prior set
/// holds.
pub fn reconcile(fresh: Vec<ServerRecord>, prior: Option<Vec<ServerRecord>>) -> Result<Vec<ServerRecord>> {
    if fresh.is_empty() {
        return Err(FreeSsError::NoServers);
    }

    let Some(prior) = prior else {
        return Ok(fresh);
    };

    let kept: Vec<ServerRecord> = {
        let seen: HashSet<(&str, u16)> = fresh.iter().map(ServerRecord::identity).collect();
        prior
            .into_iter()
            .filter(|record| !seen.contains(&record.identity()))
            .collect()
    };

    if !kept.is_empty() {
        info!("Keeping {} previously known server(s)", kept.len());
    }

    let mut merged = fresh;
    merged.extend(kept);
    Ok(merged)
}
