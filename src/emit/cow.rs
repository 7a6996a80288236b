use regex::Regex;

use super::EOL;
use crate::error::Result;
use crate::server::ServerRecord;

const DEFAULT_LINES: &[&str] = &["listen = http://0.0.0.0:1080", "loadBalance = latency"];

/// Render the COW rc file: everything outside the `# <group> start` /
/// `# <group> end` block is kept, the block is rebuilt at the end.
pub fn render(existing: Option<&str>, servers: &[ServerRecord], group: &str) -> Result<String> {
    let block = Regex::new(&format!(
        r"(?im)^#\s*{0}\s*start\s*$[\s\S]*?^#\s*{0}\s*end\s*$",
        regex::escape(group)
    ))?;

    let existing = existing.unwrap_or("").trim_start_matches('\u{feff}');
    let kept = block.replace_all(existing, "");
    let kept = kept.trim();

    let mut lines = vec![
        if kept.is_empty() {
            DEFAULT_LINES.join(EOL)
        } else {
            kept.to_string()
        },
        String::new(),
        format!("# {} start", group),
    ];
    lines.extend(servers.iter().map(proxy_line));
    lines.push(format!("# {} end", group));
    lines.push(String::new());

    Ok(lines.join(EOL))
}

fn proxy_line(server: &ServerRecord) -> String {
    format!(
        "proxy = ss://{}:{}@{}:{}",
        server.method, server.password, server.server, server.server_port
    )
}
