use std::fmt;

use crate::ClientError;

/// One named parameter or header entry.
///
/// Several entries may share a name; insertion order is preserved when the
/// request is assembled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameValue {
    name: String,
    value: Option<String>,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value, or `None` when the parameter is present without one.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for NameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Value attached to a query, form or header name.
///
/// A [`ParamValue::Repeated`] value expands into one entry per element, all
/// sharing the same name (`tags=a&tags=b`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    /// Parameter is present but carries no value.
    Absent,
    Scalar(String),
    Repeated(Vec<Option<String>>),
}

impl ParamValue {
    /// Builds a repeated value from any sequence of displayable items.
    pub fn repeated<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self::Repeated(values.into_iter().map(|v| Some(v.to_string())).collect())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Scalar(value.clone())
    }
}

macro_rules! scalar_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl<T: ToString> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::repeated(values)
    }
}

/// Borrowed slices become a repeated value, one entry per element.
impl<T: ToString> From<&[T]> for ParamValue {
    fn from(values: &[T]) -> Self {
        Self::Repeated(values.iter().map(|v| Some(v.to_string())).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        Self::repeated(values)
    }
}

/// Appends `value` under `name`, expanding repeated values into one entry each.
pub fn add(params: &mut Vec<NameValue>, name: &str, value: ParamValue) {
    match value {
        ParamValue::Absent => params.push(NameValue::new(name, None)),
        ParamValue::Scalar(value) => params.push(NameValue::new(name, Some(value))),
        ParamValue::Repeated(values) => {
            params.extend(values.into_iter().map(|value| NameValue::new(name, value)));
        }
    }
}

/// Splits a flat `[name, value, name, value, ...]` list into pairs.
///
/// Returns [`ClientError::InvalidArgument`] when the list has odd length.
pub fn pairs_from_flat<T: AsRef<str>>(args: &[T]) -> Result<Vec<(&str, &str)>, ClientError> {
    if args.len() % 2 != 0 {
        return Err(ClientError::invalid_argument("need even number of arguments"));
    }

    Ok(args
        .chunks_exact(2)
        .map(|pair| (pair[0].as_ref(), pair[1].as_ref()))
        .collect())
}
