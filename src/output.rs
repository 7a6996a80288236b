//! Print the merged server list.

use anyhow::Result;
use clap::ValueEnum;

use crate::server::ServerRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Text,
}

pub fn format_servers(servers: &[ServerRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(servers),
        OutputFormat::Csv => format_csv(servers),
        OutputFormat::Text => Ok(format_text(servers)),
    }
}

/// Format servers as JSON
fn format_json(servers: &[ServerRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(servers)?)
}

/// Format servers as CSV
fn format_csv(servers: &[ServerRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);

    writer.write_record(["server", "server_port", "password", "method", "remarks", "group"])?;

    for server in servers {
        writer.write_record([
            server.server.as_str(),
            server.server_port.to_string().as_str(),
            server.password.as_str(),
            server.method.as_str(),
            server.remarks.as_deref().unwrap_or_default(),
            server.group.as_deref().unwrap_or_default(),
        ])?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

/// Format servers as plain text, one per line
fn format_text(servers: &[ServerRecord]) -> String {
    let mut output = format!("Servers ({}):\n", servers.len());

    for server in servers {
        output.push_str(&format!(
            "  - {}:{} [{}]",
            server.server, server.server_port, server.method
        ));
        if let Some(remarks) = &server.remarks {
            output.push_str(&format!(" {}", remarks));
        }
        output.push('\n');
    }

    output
}
