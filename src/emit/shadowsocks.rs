use log::warn;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{json, Serializer, Value};

use super::EOL;
use crate::error::Result;
use crate::server::ServerRecord;

/// Render `gui-config.json`.
///
/// Entries in `configs` carrying `group` are replaced by `servers`; every
/// other entry and key is kept. A missing or unparseable file becomes a
/// fresh high-availability config.
pub fn render(existing: Option<&str>, servers: &[ServerRecord], group: &str) -> Result<String> {
    let fresh = servers
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<Value>, _>>()?;

    let existing = existing.map(|text| text.trim_start_matches('\u{feff}'));
    let document = match existing.map(serde_json::from_str::<Value>) {
        Some(Ok(Value::Object(mut config))) => {
            if let Some(Value::Array(configs)) = config.get_mut("configs") {
                configs.retain(|entry| entry.get("group").and_then(Value::as_str) != Some(group));
                configs.extend(fresh);
            } else {
                config.insert("configs".to_string(), Value::Array(fresh));
            }
            Value::Object(config)
        }
        Some(Ok(_)) => {
            warn!("Existing Shadowsocks config is not an object, replacing it");
            skeleton(fresh)
        }
        Some(Err(e)) => {
            warn!("Existing Shadowsocks config is not valid JSON, replacing it: {}", e);
            skeleton(fresh)
        }
        None => skeleton(fresh),
    };

    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    document.serialize(&mut serializer)?;

    let text = String::from_utf8_lossy(&buf);
    Ok(format!("{}{}", text.replace('\n', EOL), EOL))
}

fn skeleton(configs: Vec<Value>) -> Value {
    json!({
        "index": -1,
        "shareOverLan": true,
        "strategy": "com.shadowsocks.strategy.ha",
        "configs": configs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(server: &str) -> ServerRecord {
        ServerRecord {
            server: server.to_string(),
            server_port: 443,
            password: "pw".to_string(),
            method: "aes-256-cfb".to_string(),
            remarks: None,
            group: Some("free-ss".to_string()),
        }
    }

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn fresh_file_gets_skeleton() {
        let doc = parse(&render(None, &[record("a")], "free-ss").unwrap());

        assert_eq!(doc["index"], -1);
        assert_eq!(doc["shareOverLan"], true);
        assert_eq!(doc["strategy"], "com.shadowsocks.strategy.ha");
        assert_eq!(doc["configs"][0]["server"], "a");
    }

    #[test]
    fn replaces_only_own_group() {
        let existing = r#"{
            "index": 3,
            "localPort": 1080,
            "configs": [
                {"server": "mine", "server_port": 8388, "password": "p", "method": "rc4-md5"},
                {"server": "old", "server_port": 443, "password": "p", "method": "x", "group": "free-ss"},
                {"server": "other", "server_port": 443, "password": "p", "method": "x", "group": "paid"}
            ]
        }"#;

        let doc = parse(&render(Some(existing), &[record("new")], "free-ss").unwrap());
        let servers: Vec<&str> = doc["configs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["server"].as_str().unwrap())
            .collect();

        assert_eq!(servers, ["mine", "other", "new"]);
        assert_eq!(doc["index"], 3);
        assert_eq!(doc["localPort"], 1080);
    }

    #[test]
    fn byte_order_mark_does_not_lose_user_entries() {
        let existing = "\u{feff}{\"localPort\": 1080, \"configs\": [\
            {\"server\": \"mine\", \"server_port\": 8388, \"password\": \"p\", \"method\": \"x\"}]}";

        let text = render(Some(existing), &[record("a")], "free-ss").unwrap();
        let doc = parse(&text);

        assert!(!text.starts_with('\u{feff}'));
        assert_eq!(doc["localPort"], 1080);
        assert!(doc.get("strategy").is_none());
        assert_eq!(doc["configs"][0]["server"], "mine");
        assert_eq!(doc["configs"][1]["server"], "a");
    }

    #[test]
    fn missing_configs_array_is_added() {
        let doc = parse(&render(Some(r#"{"index": 0}"#), &[record("a")], "free-ss").unwrap());
        assert_eq!(doc["index"], 0);
        assert_eq!(doc["configs"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn broken_file_gets_skeleton() {
        let doc = parse(&render(Some("{ not json"), &[record("a")], "free-ss").unwrap());
        assert_eq!(doc["strategy"], "com.shadowsocks.strategy.ha");
    }

    #[test]
    fn tab_indented_with_trailing_newline() {
        let text = render(None, &[record("a")], "free-ss").unwrap();
        assert!(text.contains(&format!("{}\t\"index\": -1", EOL)));
        assert!(text.ends_with(&format!("}}{}", EOL)));
    }

    #[test]
    fn unrelated_keys_keep_their_order() {
        let text = render(Some(r#"{"zeta": 1, "alpha": 2}"#), &[record("a")], "free-ss").unwrap();
        let zeta = text.find("zeta").unwrap();
        let alpha = text.find("alpha").unwrap();
        assert!(zeta < alpha);
    }
}
