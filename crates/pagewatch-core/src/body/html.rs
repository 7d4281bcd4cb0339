//! HTML body extraction
//!
//! CSS selector queries over a parsed HTML document. The result is the
//! text content of every matched node, space-joined and trimmed. A query
//! matching nothing yields `None` (unlike JSON bodies, there is no
//! sentinel).

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::warn;

/// A parsed HTML response body
pub struct HtmlBody {
    document: Html,
}

impl HtmlBody {
    /// Parse an HTML document. Anything before the first `<html` tag is
    /// discarded when one is present.
    pub fn parse(text: &str) -> Self {
        let text = match text.find("<html") {
            Some(index) => &text[index..],
            None => text,
        };

        Self {
            document: Html::parse_document(text),
        }
    }

    /// Query a CSS selector. An invalid selector is treated as no match.
    pub fn get(&self, path: &str) -> Option<Value> {
        let selector = match Selector::parse(path) {
            Ok(selector) => selector,
            Err(_) => {
                warn!(selector = path, "invalid CSS selector");
                return None;
            }
        };

        let mut matched = 0usize;
        let mut parts: Vec<String> = Vec::new();
        for element in self.document.select(&selector) {
            matched += 1;
            let text = element.text().collect::<Vec<_>>().join(" ");
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }

        if matched == 0 {
            return None;
        }

        Some(Value::String(parts.join(" ").trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOC: &str = r#"
        <html><body>
            <div class="price"><span>42.5</span></div>
            <ul id="news">
                <li>First headline</li>
                <li>Second headline</li>
            </ul>
        </body></html>
    "#;

    #[test]
    fn single_match_returns_trimmed_text() {
        let body = HtmlBody::parse(DOC);
        assert_eq!(body.get("div.price"), Some(json!("42.5")));
    }

    #[test]
    fn multiple_matches_are_space_joined() {
        let body = HtmlBody::parse(DOC);
        assert_eq!(
            body.get("#news li"),
            Some(json!("First headline Second headline"))
        );
    }

    #[test]
    fn no_match_returns_none() {
        let body = HtmlBody::parse(DOC);
        assert_eq!(body.get("table.quotes"), None);
    }

    #[test]
    fn invalid_selector_returns_none() {
        let body = HtmlBody::parse(DOC);
        assert_eq!(body.get("div[unclosed"), None);
    }

    #[test]
    fn leading_garbage_before_html_tag_is_ignored() {
        let body = HtmlBody::parse("garbage preamble <html><body><p>ok</p></body></html>");
        assert_eq!(body.get("p"), Some(json!("ok")));
    }
}
