//! Query-string construction for backend list endpoints.

use crate::models::params::{PaginationParams, ParamValue};
use url::form_urlencoded;

/// Appends the non-empty `params` to `path` in insertion order.
///
/// # Examples
/// ```
/// use hospitalsrv::models::params::PaginationParams;
/// use hospitalsrv::utils::query::build_url;
///
/// let params = PaginationParams::new()
///     .with("name", "")
///     .with("specialist_id", "3")
///     .limit(10);
///
/// assert_eq!(build_url("/doctors", &params), "/doctors?specialist_id=3&limit=10");
/// ```
pub fn build_url(path: &str, params: &PaginationParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    for (key, value) in params.iter() {
        match value {
            ParamValue::Single(value) => {
                serializer.append_pair(key, value);
            }
            ParamValue::List(values) => {
                for value in values.iter().filter(|v| !v.is_empty()) {
                    serializer.append_pair(key, value);
                }
            }
        }
    }

    let query = serializer.finish();
    if query.is_empty() {
        return path.to_string();
    }

    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, separator, query)
}

pub fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
