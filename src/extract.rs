//! Turn one matched DOM node into a raw field mapping.

use std::collections::BTreeMap;

use scraper::ElementRef;

use crate::normalize::KeyNormalizer;

/// Field name to raw value, straight off the page.
pub type RawFields = BTreeMap<String, String>;

/// Elements that start a new line when text is rendered.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section",
    "table", "tr", "ul",
];

#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    keys: KeyNormalizer,
}

impl RecordExtractor {
    pub fn new(keys: KeyNormalizer) -> Self {
        Self { keys }
    }

    /// Tables are read as two-column label/value rows, anything else as
    /// `label: value` lines.
    pub fn extract(&self, node: ElementRef) -> RawFields {
        if node.value().name() == "table" {
            self.extract_table(node)
        } else {
            self.extract_text(node)
        }
    }

    fn extract_table(&self, table: ElementRef) -> RawFields {
        let mut fields = RawFields::new();

        for row in own_rows(table) {
            let cells: Vec<ElementRef> = row.children().filter_map(ElementRef::wrap).collect();
            if let [label, value] = cells.as_slice() {
                let label = label.text().collect::<String>();
                let value = value.text().collect::<String>();
                self.insert(&mut fields, &label, &value);
            }
        }

        fields
    }

    fn extract_text(&self, node: ElementRef) -> RawFields {
        let rendered = render_text(node);
        let rendered = rendered.trim();

        let lines: Vec<&str> = if rendered.contains('\n') {
            rendered.split('\n').map(str::trim).collect()
        } else {
            node.children()
                .filter_map(|child| child.value().as_text())
                .map(|text| text.trim())
                .collect()
        };

        let mut fields = RawFields::new();
        for line in lines {
            if let Some((label, value)) = line.split_once([':', '：']) {
                self.insert(&mut fields, label, value);
            }
        }

        fields
    }

    fn insert(&self, fields: &mut RawFields, label: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if let Some(key) = self.keys.normalize(label) {
            fields.insert(key, value.to_string());
        }
    }
}

/// Rows belonging to this table, skipping rows of nested tables.
fn own_rows(table: ElementRef) -> Vec<ElementRef> {
    table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .filter(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "table")
                .map(|owner| owner.id())
                == Some(table.id())
        })
        .collect()
}

/// Text content with line breaks where `<br>` and block elements sit.
fn render_text(node: ElementRef) -> String {
    let mut out = String::new();
    push_text(node, &mut out);
    out
}

fn push_text(node: ElementRef, out: &mut String) {
    for child in node.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if name == "br" {
                out.push('\n');
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push('\n');
            }
            push_text(el, out);
            if block {
                out.push('\n');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn extract_first(html: &str, selector: &str) -> RawFields {
        let document = Html::parse_document(html);
        let selector = Selector::parse(selector).unwrap();
        let node = document.select(&selector).next().unwrap();
        RecordExtractor::default().extract(node)
    }

    #[test]
    fn table_rows_become_fields() {
        let fields = extract_first(
            r#"<table>
                <tr><td>加密方式</td><td> aes-256-gcm </td></tr>
                <tr><td>服务器地址</td><td>1.2.3.4</td></tr>
                <tr><td>服务端口号</td><td>8388</td></tr>
                <tr><td>服务密码</td><td>secret</td></tr>
                <tr><td>状态</td><td>正常</td><td>extra</td></tr>
                <tr><td>二维码</td><td>img</td></tr>
                <tr><td>备注</td><td>  </td></tr>
            </table>"#,
            "table",
        );

        assert_eq!(fields.get("method").map(String::as_str), Some("aes-256-gcm"));
        assert_eq!(fields.get("server").map(String::as_str), Some("1.2.3.4"));
        assert_eq!(fields.get("server_port").map(String::as_str), Some("8388"));
        assert_eq!(fields.get("password").map(String::as_str), Some("secret"));
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn nested_table_rows_are_not_read_twice() {
        let fields = extract_first(
            r#"<table id="outer">
                <tr><td>服务器地址</td><td>outer.example</td></tr>
                <tr><td colspan="2"><table><tr><td>服务密码</td><td>inner</td></tr></table></td></tr>
            </table>"#,
            "#outer",
        );

        assert_eq!(fields.get("server").map(String::as_str), Some("outer.example"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn text_block_lines() {
        let fields = extract_first(
            "<div class=\"hover-text\"><h4>IP Address: 5.6.7.8</h4>\n<h4>Port：8388</h4><h4>Password:a:b</h4><h4>加密方式</h4></div>",
            ".hover-text",
        );

        assert_eq!(fields.get("server").map(String::as_str), Some("5.6.7.8"));
        assert_eq!(fields.get("server_port").map(String::as_str), Some("8388"));
        assert_eq!(fields.get("password").map(String::as_str), Some("a:b"));
        assert!(!fields.contains_key("method"));
    }

    #[test]
    fn raw_newlines_split_lines() {
        let fields = extract_first(
            "<pre>IP Address: 5.6.7.8\nPort: 8388\n</pre>",
            "pre",
        );

        assert_eq!(fields.get("server").map(String::as_str), Some("5.6.7.8"));
        assert_eq!(fields.get("server_port").map(String::as_str), Some("8388"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn single_line_uses_direct_text_children() {
        let fields = extract_first(
            "<span class=\"s\">server: s.example.com<i>password: hidden</i></span>",
            ".s",
        );

        assert_eq!(fields.get("server").map(String::as_str), Some("s.example.com"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn nothing_useful_yields_empty_mapping() {
        assert!(extract_first("<p class=\"x\">no separators here</p>", ".x").is_empty());
        assert!(extract_first("<table class=\"x\"></table>", ".x").is_empty());
    }
}
