//! Previously published servers, used as a fallback for pages that are
//! down this run.

use serde_json::Value;
use url::Url;

use crate::extract::RawFields;
use crate::fetch::Fetcher;

/// Pull the `configs` entries out of a Shadowsocks GUI config document.
///
/// Scalar values are stringified so the entries can go through the same
/// validation as freshly scraped ones; anything that is not an object is
/// skipped.
pub fn parse_prior(document: &Value) -> Vec<RawFields> {
    let Some(configs) = document.get("configs").and_then(Value::as_array) else {
        return Vec::new();
    };

    configs
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| {
            entry
                .iter()
                .filter_map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => return None,
                    };
                    Some((key.clone(), value))
                })
                .collect()
        })
        .collect()
}

/// `None` when there is no URL or the fetch fails; neither is an error.
pub async fn fetch_prior<F: Fetcher>(fetcher: &F, url: Option<&Url>) -> Option<Vec<RawFields>> {
    let url = url?;
    match fetcher.fetch_json(url).await {
        Ok(document) => {
            let entries = parse_prior(&document);
            log::info!("Fetched {} previously known server(s) from {}", entries.len(), url);
            Some(entries)
        }
        Err(e) => {
            log::warn!("Previously known servers unavailable ({}): {}", url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn configs_entries_become_raw_fields() {
        let document = json!({
            "index": -1,
            "configs": [
                {"server": "b", "server_port": 2, "password": "y", "method": "rc4-md5", "group": "free-ss"},
                "garbage",
                {"server": "c", "password": "z", "plugin_opts": null}
            ]
        });

        let entries = parse_prior(&document);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["server_port"], "2");
        assert_eq!(entries[0]["method"], "rc4-md5");
        assert!(!entries[1].contains_key("plugin_opts"));
    }

    #[test]
    fn missing_configs_is_empty() {
        assert!(parse_prior(&json!({"configs": {}})).is_empty());
        assert!(parse_prior(&json!([])).is_empty());
    }
}
