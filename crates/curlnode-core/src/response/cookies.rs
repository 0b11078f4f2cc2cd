//! Set-Cookie decomposition into parallel array/string/object views.

use indexmap::IndexMap;
use serde::Serialize;

/// One cookie attribute: its text when the attribute carries a value
/// (`Path=/`), boolean `true` when it does not (`HttpOnly`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CookieAttr {
    Text(String),
    Flag(bool),
}

/// Structured views over the cookies of a response.
///
/// `array` and `string` keep every occurrence in arrival order; `object`
/// maps cookie name to its attributes and is last-write-wins when two
/// cookies share a name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CookieBreakdown {
    /// Raw `name=value` pairs, one per Set-Cookie header.
    pub array: Vec<String>,
    /// The same pairs joined with `"; "`.
    pub string: String,
    /// Cookie name to attributes: `value` plus each `;`-delimited attribute
    /// under its lower-cased key.
    pub object: IndexMap<String, IndexMap<String, CookieAttr>>,
}

/// Builds the breakdown from raw Set-Cookie header values.
pub fn breakdown(cookies: &[String]) -> CookieBreakdown {
    let mut array = Vec::with_capacity(cookies.len());
    let mut object = IndexMap::new();

    for cookie in cookies {
        let mut segments = cookie.split(';');
        let pair = segments.next().unwrap_or("").trim();
        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (pair, ""),
        };

        let mut attributes = IndexMap::new();
        attributes.insert("value".to_string(), CookieAttr::Text(value.to_string()));
        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match segment.split_once('=') {
                Some((key, attr_value)) => attributes.insert(
                    key.trim().to_ascii_lowercase(),
                    CookieAttr::Text(attr_value.trim().to_string()),
                ),
                None => attributes.insert(segment.to_ascii_lowercase(), CookieAttr::Flag(true)),
            };
        }

        array.push(pair.to_string());
        object.insert(name.to_string(), attributes);
    }

    CookieBreakdown {
        string: array.join("; "),
        array,
        object,
    }
}
