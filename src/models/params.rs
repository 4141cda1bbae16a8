//! Filter, sort and pagination parameters forwarded to backend list endpoints.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    /// `in:a,b,c` filter understood by the backend as "one of".
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        if joined.is_empty() {
            ParamValue::Single(String::new())
        } else {
            ParamValue::Single(format!("in:{}", joined))
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Single(value) => value.is_empty(),
            ParamValue::List(values) => values.iter().all(|v| v.is_empty()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Single(value.to_string())
    }
}

/// Insertion-ordered. `None`, empty strings and empty lists are skipped on
/// serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationParams {
    entries: Vec<(String, Option<ParamValue>)>,
}

impl PaginationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: Option<ParamValue>) -> &mut Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, Some(value.into()));
        self
    }

    pub fn with_optional<V: Into<ParamValue>>(
        mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        self.set(key, value.map(Into::into));
        self
    }

    pub fn limit(self, limit: u64) -> Self {
        self.with("limit", limit)
    }

    pub fn offset(self, offset: u64) -> Self {
        self.with("offset", offset)
    }

    pub fn sort(self, sort: impl Into<String>) -> Self {
        let sort: String = sort.into();
        self.with("sort", sort)
    }

    pub fn page(self, page: u64, per_page: u64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.limit(per_page).offset(offset)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().filter_map(|(key, value)| match value {
            Some(value) if !value.is_empty() => Some((key.as_str(), value)),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl FromIterator<(String, String)> for PaginationParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut params = PaginationParams::new();
        for (key, value) in iter {
            let merged = match params.get(&key).cloned() {
                None => ParamValue::Single(value),
                Some(ParamValue::Single(first)) => ParamValue::List(vec![first, value]),
                Some(ParamValue::List(mut values)) => {
                    values.push(value);
                    ParamValue::List(values)
                }
            };
            params.set(key, Some(merged));
        }
        params
    }
}
