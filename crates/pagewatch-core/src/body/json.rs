//! JSON body extraction
//!
//! Dotted-path lookups over a parsed JSON document. Two quirks are load
//! bearing and covered by tests:
//!
//! - a path that fails to resolve (or resolves to JSON null) yields the
//!   literal string `"None"`, which callers store verbatim
//! - string results have HTML tags stripped; non-string results pass
//!   through unchanged

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::store::resolve_path;

/// Sentinel written for unresolved paths
const MISSING_SENTINEL: &str = "None";

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("<[^<]+?>").expect("tag pattern compiles"));

/// A parsed JSON response body
pub struct JsonBody {
    parsed: Value,
}

impl JsonBody {
    /// Parse a JSON document. Non-ASCII bytes are dropped before parsing.
    pub fn parse(text: &str) -> crate::Result<Self> {
        let ascii: String = text.chars().filter(|c| c.is_ascii()).collect();
        let parsed = serde_json::from_str(&ascii)?;
        Ok(Self { parsed })
    }

    /// Look up a dotted path. Never empty: misses produce the `"None"`
    /// sentinel.
    pub fn get(&self, path: &str) -> Value {
        match resolve_path(&self.parsed, path) {
            None | Some(Value::Null) => Value::String(MISSING_SENTINEL.to_string()),
            Some(Value::String(s)) => {
                Value::String(TAG_PATTERN.replace_all(s, "").into_owned())
            }
            Some(other) => other.clone(),
        }
    }
}
