//! Fetched-body parsing and field extraction
//!
//! A [`Body`] wraps one parsed response and answers path queries against
//! it. The variant is selected by the response's content-type at fetch
//! time; a content-type outside the recognized set is a distinct
//! [`crate::Error::ContentType`] error, not a silent null.
//!
//! Path dialects per variant:
//! - JSON: dotted paths (`quote.latestPrice`), numeric segments index
//!   arrays
//! - HTML: CSS selectors (`div.price > span`)
//! - RSS: slash-separated element paths relative to the `<rss>` root
//!   (`channel/item/title`); a `//` prefix matches any suffix
//!
//! Miss semantics differ by design: a JSON miss yields the literal string
//! `"None"`, while HTML/RSS misses yield nothing. Callers store the JSON
//! sentinel verbatim.

pub mod html;
pub mod json;
pub mod rss;

pub use html::HtmlBody;
pub use json::JsonBody;
pub use rss::RssBody;

use serde_json::Value;

use crate::fetch::FetchedResponse;

/// A parsed response body, polymorphic over the three recognized kinds
pub enum Body {
    /// `application/json`
    Json(JsonBody),
    /// `text/html`
    Html(HtmlBody),
    /// `application/rss+xml`
    Rss(RssBody),
}

impl Body {
    /// Construct a body wrapper from a fetched response, dispatching on
    /// its content-type.
    ///
    /// # Errors
    ///
    /// [`crate::Error::ContentType`] when the content-type matches none of
    /// the recognized kinds; [`crate::Error::Json`] when a JSON body does
    /// not parse.
    pub fn from_response(response: &FetchedResponse) -> crate::Result<Self> {
        let content_type = response.content_type.to_ascii_lowercase();

        if content_type.contains("application/json") {
            Ok(Body::Json(JsonBody::parse(&response.body)?))
        } else if content_type.contains("text/html") {
            Ok(Body::Html(HtmlBody::parse(&response.body)))
        } else if content_type.contains("application/rss+xml") {
            Ok(Body::Rss(RssBody::parse(&response.body)))
        } else {
            Err(crate::Error::content_type(response.content_type.clone()))
        }
    }

    /// Extract the value at a path expression
    pub fn extract(&self, path: &str) -> Option<Value> {
        match self {
            Body::Json(body) => Some(body.get(path)),
            Body::Html(body) => body.get(path),
            Body::Rss(body) => body.get(path),
        }
    }
}
