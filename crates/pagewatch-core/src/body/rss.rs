//! RSS body extraction
//!
//! Element-path queries over an RSS document, answered with a single
//! streaming pass of the event reader. Paths are slash-separated element
//! names relative to the `<rss>` root (`channel/item/title`); a leading
//! `/` or `rss/` segment is tolerated, and a `//` prefix matches the path
//! as a suffix anywhere in the tree.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::Value;

/// A fetched RSS response body
pub struct RssBody {
    xml: String,
}

impl RssBody {
    /// Keep the document from the first `<rss` tag onward when one is
    /// present.
    pub fn parse(text: &str) -> Self {
        let xml = match text.find("<rss") {
            Some(index) => text[index..].to_string(),
            None => text.to_string(),
        };

        Self { xml }
    }

    /// Query an element path. The result is the text of every matching
    /// element, space-joined and trimmed; `None` when nothing matches.
    pub fn get(&self, path: &str) -> Option<Value> {
        let suffix = path.starts_with("//");
        let trimmed = path.trim_start_matches('/');
        let mut segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        if !suffix && segments.first() == Some(&"rss") {
            segments.remove(0);
        }
        if segments.is_empty() {
            return None;
        }

        let mut reader = Reader::from_str(&self.xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        let mut stack: Vec<String> = Vec::new();
        let mut matched = 0usize;
        let mut parts: Vec<String> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    stack.push(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                    if path_matches(&stack, &segments, suffix) {
                        matched += 1;
                    }
                }
                Ok(Event::Empty(e)) => {
                    stack.push(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                    if path_matches(&stack, &segments, suffix) {
                        matched += 1;
                    }
                    stack.pop();
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(e)) => {
                    if path_matches(&stack, &segments, suffix) {
                        let text = e.unescape().unwrap_or_default();
                        let text = text.trim();
                        if !text.is_empty() {
                            parts.push(text.to_string());
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if path_matches(&stack, &segments, suffix) {
                        let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                        let text = text.trim();
                        if !text.is_empty() {
                            parts.push(text.to_string());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        if matched == 0 {
            return None;
        }

        Some(Value::String(parts.join(" ").trim().to_string()))
    }
}

/// Whether the current element stack matches the query segments.
/// Exact matches are taken relative to the `rss` root; suffix matches
/// compare against the end of the stack.
fn path_matches(stack: &[String], segments: &[&str], suffix: bool) -> bool {
    if suffix {
        return stack.len() >= segments.len()
            && stack[stack.len() - segments.len()..]
                .iter()
                .zip(segments)
                .all(|(a, b)| a == b);
    }

    let relative: &[String] = match stack.first() {
        Some(root) if root == "rss" => &stack[1..],
        _ => stack,
    };

    relative.len() == segments.len() && relative.iter().zip(segments).all(|(a, b)| a == b)
}
