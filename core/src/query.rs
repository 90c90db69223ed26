//! Query-string model and encoding.

use url::form_urlencoded;

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Dropped when encoding.
    Absent,
    Scalar(String),
    /// Encoded as one `key=value` pair per element.
    List(Vec<String>),
}

macro_rules! scalar_query_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    QueryValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_query_value!(&str, String, &String, bool, i32, i64, u8, u16, u32, u64, usize, f64);

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Absent, Into::into)
    }
}

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for QueryValue {
    fn from(values: [T; N]) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

/// Ordered query parameters. Insertion order is encoding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, QueryValue)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `application/x-www-form-urlencoded` form of the present values.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            match value {
                QueryValue::Absent => {}
                QueryValue::Scalar(v) => {
                    serializer.append_pair(key, v);
                }
                QueryValue::List(items) => {
                    for item in items {
                        serializer.append_pair(key, item);
                    }
                }
            }
        }
        serializer.finish()
    }
}

/// Append `query` to `path`. Returns `path` unchanged when there is nothing
/// to encode.
pub fn with_query(path: &str, query: Option<&Query>) -> String {
    let encoded = match query {
        Some(query) if !query.is_empty() => query.encode(),
        _ => return path.to_string(),
    };
    if encoded.is_empty() {
        return path.to_string();
    }
    format!("{path}?{encoded}")
}
