//! Map human-written field labels to canonical field names.

use crate::config::DEFAULT_LABELS;

/// Looks up canonical field names for page labels.
///
/// Lookup falls through four tiers:
/// 1. exact match against the label table,
/// 2. a label made only of ASCII word characters is already a field name,
/// 3. the first table label that contains the input,
/// 4. the first table label contained in the input.
///
/// Tiers 3 and 4 walk the table in declared order.
#[derive(Debug, Clone)]
pub struct KeyNormalizer {
    labels: Vec<(String, String)>,
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS.iter().copied())
    }
}

impl KeyNormalizer {
    pub fn new<'a>(labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            labels: labels
                .into_iter()
                .map(|(label, field)| (label.trim().to_lowercase(), field.to_string()))
                .collect(),
        }
    }

    pub fn normalize(&self, label: &str) -> Option<String> {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return None;
        }

        if let Some((_, field)) = self.labels.iter().find(|(known, _)| *known == label) {
            return Some(field.clone());
        }

        if is_word(&label) {
            return Some(label);
        }

        self.labels
            .iter()
            .find(|(known, _)| known.contains(label.as_str()))
            .or_else(|| {
                self.labels
                    .iter()
                    .find(|(known, _)| label.contains(known.as_str()))
            })
            .map(|(_, field)| field.clone())
    }
}

fn is_word(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_labels() {
        let keys = KeyNormalizer::default();
        assert_eq!(keys.normalize("加密方式").as_deref(), Some("method"));
        assert_eq!(keys.normalize("  IP Address ").as_deref(), Some("server"));
        assert_eq!(keys.normalize("Port").as_deref(), Some("server_port"));
    }

    #[test]
    fn machine_keys_pass_through() {
        let keys = KeyNormalizer::default();
        assert_eq!(keys.normalize("server_port").as_deref(), Some("server_port"));
        assert_eq!(keys.normalize("Password").as_deref(), Some("password"));
    }

    #[test]
    fn abbreviated_label_found_inside_table_label() {
        let keys = KeyNormalizer::default();
        assert_eq!(keys.normalize("器地址").as_deref(), Some("server"));
        assert_eq!(keys.normalize("ip addr").as_deref(), Some("server"));
    }

    #[test]
    fn padded_label_contains_table_label() {
        let keys = KeyNormalizer::default();
        assert_eq!(keys.normalize("服务端口号").as_deref(), Some("server_port"));
        assert_eq!(keys.normalize("当前状态").as_deref(), Some("remarks"));
    }

    #[test]
    fn unknown_and_empty_labels() {
        let keys = KeyNormalizer::default();
        assert_eq!(keys.normalize(""), None);
        assert_eq!(keys.normalize("   "), None);
        assert_eq!(keys.normalize("二维码"), None);
    }

    #[test]
    fn custom_table_order_decides_ties() {
        let keys = KeyNormalizer::new([("remote port", "server_port"), ("remote port note", "remarks")]);
        assert_eq!(keys.normalize("te po").as_deref(), Some("server_port"));

        let keys = KeyNormalizer::new([("remote port note", "remarks"), ("remote port", "server_port")]);
        assert_eq!(keys.normalize("te po").as_deref(), Some("remarks"));
    }
}
