use std::fmt;

use polars::prelude::*;

/// A single cell value, detached from any polars buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Lenient numeric coercion: numbers pass through, numeric strings are
    /// parsed, everything else (null, NaN, text) is `None`.
    pub fn to_number(&self) -> Option<f64> {
        let value = match self {
            Scalar::Null => return None,
            Scalar::Bool(b) => f64::from(u8::from(*b)),
            Scalar::Int(v) => *v as f64,
            Scalar::Float(v) => *v,
            Scalar::Str(s) => s.trim().parse::<f64>().ok()?,
        };
        (!value.is_nan()).then_some(value)
    }

    /// Numeric value with every failed coercion treated as 0.
    pub fn number_or_zero(&self) -> f64 {
        self.to_number().unwrap_or(0.0)
    }

    /// Integral value, e.g. a calendar year stored as `2024` or `2024.0`.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            other => {
                let value = other.to_number()?;
                (value.fract() == 0.0 && value.is_finite()).then_some(value as i64)
            }
        }
    }

    /// Whether comparing this value against a column of `dtype` can match
    /// at all. Text never equals a number and vice versa.
    pub fn comparable_with(&self, dtype: &DataType) -> bool {
        if matches!(dtype, DataType::Null) {
            return true;
        }
        match self {
            Scalar::Null => true,
            Scalar::Bool(_) => dtype.is_bool(),
            Scalar::Int(_) | Scalar::Float(_) => dtype.is_integer() || dtype.is_float(),
            Scalar::Str(_) => dtype.is_string(),
        }
    }

    /// Literal expression used when comparing against a column.
    pub fn to_lit(&self) -> Expr {
        match self {
            Scalar::Null => lit(NULL),
            Scalar::Bool(b) => lit(*b),
            Scalar::Int(v) => lit(*v),
            Scalar::Float(v) => lit(*v),
            Scalar::Str(s) => lit(s.clone()),
        }
    }

    pub fn to_any_value(&self) -> AnyValue<'static> {
        match self {
            Scalar::Null => AnyValue::Null,
            Scalar::Bool(b) => AnyValue::Boolean(*b),
            Scalar::Int(v) => AnyValue::Int64(*v),
            Scalar::Float(v) => AnyValue::Float64(*v),
            Scalar::Str(s) => AnyValue::StringOwned(s.as_str().into()),
        }
    }
}

impl From<AnyValue<'_>> for Scalar {
    fn from(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Scalar::Null,
            AnyValue::Boolean(b) => Scalar::Bool(b),
            AnyValue::String(s) => Scalar::Str(s.to_string()),
            AnyValue::StringOwned(s) => Scalar::Str(s.to_string()),
            AnyValue::Float32(v) => Scalar::Float(f64::from(v)),
            AnyValue::Float64(v) => Scalar::Float(v),
            other if other.dtype().is_integer() => other
                .extract::<i64>()
                .map(Scalar::Int)
                .or_else(|| other.extract::<f64>().map(Scalar::Float))
                .unwrap_or(Scalar::Null),
            other => Scalar::Str(other.to_string()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// One table row as an ordered column-name -> value mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<(String, Scalar)>,
}

impl Row {
    pub fn new(values: Vec<(String, Scalar)>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Value of `column` coerced to a number; absent or non-numeric is 0.
    pub fn number(&self, column: &str) -> f64 {
        self.get(column).map_or(0.0, Scalar::number_or_zero)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Split a frame into rows, preserving row and column order.
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Row>> {
        let columns = df.get_columns();
        (0..df.height())
            .map(|i| {
                columns
                    .iter()
                    .map(|column| Ok((column.name().to_string(), Scalar::from(column.get(i)?))))
                    .collect::<PolarsResult<Vec<_>>>()
                    .map(Row::new)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_numbers_are_not_comparable() {
        assert!(Scalar::Int(0).comparable_with(&DataType::Int64));
        assert!(Scalar::Float(2.5).comparable_with(&DataType::Int32));
        assert!(Scalar::from("2019").comparable_with(&DataType::String));
        assert!(!Scalar::from("2019").comparable_with(&DataType::Int64));
        assert!(!Scalar::Int(2019).comparable_with(&DataType::String));
        assert!(!Scalar::Bool(true).comparable_with(&DataType::Float64));
        assert!(Scalar::Null.comparable_with(&DataType::String));
        assert!(Scalar::from("x").comparable_with(&DataType::Null));
    }

    #[test]
    fn coercion_treats_garbage_as_zero() {
        assert_eq!(Scalar::Null.number_or_zero(), 0.0);
        assert_eq!(Scalar::from("n/a").number_or_zero(), 0.0);
        assert_eq!(Scalar::Float(f64::NAN).number_or_zero(), 0.0);
        assert_eq!(Scalar::from(" 12.5 ").number_or_zero(), 12.5);
        assert_eq!(Scalar::Int(7).number_or_zero(), 7.0);
        assert_eq!(Scalar::Bool(true).number_or_zero(), 1.0);
    }

    #[test]
    fn integer_years() {
        assert_eq!(Scalar::Float(2024.0).to_integer(), Some(2024));
        assert_eq!(Scalar::from("2030").to_integer(), Some(2030));
        assert_eq!(Scalar::Float(2024.5).to_integer(), None);
        assert_eq!(Scalar::Null.to_integer(), None);
    }

    #[test]
    fn rows_from_frame_keep_order_and_nulls() {
        let df = df!(
            "name" => ["a", "b"],
            "value" => [Some(1.5), None],
            "count" => [3i64, 4],
        )
        .unwrap();

        let rows = Row::from_frame(&df).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), ["name", "value", "count"]);
        assert_eq!(rows[0].get("name"), Some(&Scalar::from("a")));
        assert_eq!(rows[0].get("count"), Some(&Scalar::Int(3)));
        assert_eq!(rows[1].get("value"), Some(&Scalar::Null));
        assert_eq!(rows[1].number("value"), 0.0);
        assert_eq!(rows[1].number("missing"), 0.0);
    }
}
