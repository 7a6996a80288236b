//! Harvest free Shadowsocks servers from public pages and write them into
//! proxy client configs.

pub mod config;
pub mod emit;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod prior;
pub mod reconcile;
pub mod server;
pub mod store;

pub use error::{FreeSsError, Result};
pub use server::ServerRecord;
