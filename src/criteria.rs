use std::fmt;
use std::str::FromStr;

use polars::prelude::*;

use crate::error::LookupError;
use crate::value::Scalar;

/// Comparison applied between a column and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

impl Comparator {
    pub fn token(self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::GtEq => ">=",
            Comparator::LtEq => "<=",
        }
    }

    pub fn apply(self, column: Expr, value: Expr) -> Expr {
        match self {
            Comparator::Eq => column.eq(value),
            Comparator::Gt => column.gt(value),
            Comparator::Lt => column.lt(value),
            Comparator::GtEq => column.gt_eq(value),
            Comparator::LtEq => column.lt_eq(value),
        }
    }
}

impl FromStr for Comparator {
    type Err = LookupError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "=" => Ok(Comparator::Eq),
            ">" => Ok(Comparator::Gt),
            "<" => Ok(Comparator::Lt),
            ">=" => Ok(Comparator::GtEq),
            "<=" => Ok(Comparator::LtEq),
            other => Err(LookupError::InvalidComparator(other.to_string())),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One condition of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column == value`, on the column named by the criteria key.
    Equals(Scalar),
    /// `column <op> value`, on the column named by the criteria key.
    Compare(Comparator, Scalar),
    /// `column <op> value` on an explicit column. Lets one lookup put two
    /// predicates on the same column under different keys.
    CompareOn {
        column: String,
        op: Comparator,
        value: Scalar,
    },
}

impl Predicate {
    /// Column the predicate is evaluated against when stored under `key`.
    pub fn column<'a>(&'a self, key: &'a str) -> &'a str {
        match self {
            Predicate::CompareOn { column, .. } => column,
            _ => key,
        }
    }

    pub fn comparator(&self) -> Comparator {
        match self {
            Predicate::Equals(_) => Comparator::Eq,
            Predicate::Compare(op, _) | Predicate::CompareOn { op, .. } => *op,
        }
    }

    pub fn value(&self) -> &Scalar {
        match self {
            Predicate::Equals(value)
            | Predicate::Compare(_, value)
            | Predicate::CompareOn { value, .. } => value,
        }
    }

    pub fn to_expr(&self, key: &str) -> Expr {
        self.comparator()
            .apply(col(self.column(key)), self.value().to_lit())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equals(value) => write!(f, "{value}"),
            Predicate::Compare(op, value) => write!(f, "{op} {value}"),
            Predicate::CompareOn { column, op, value } => write!(f, "{column} {op} {value}"),
        }
    }
}

/// Conjunction of predicates keyed by name, in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Criteria {
    entries: Vec<(String, Predicate)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the predicate stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, predicate: Predicate) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = predicate,
            None => self.entries.push((key, predicate)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, predicate: Predicate) -> Self {
        self.insert(key, predicate);
        self
    }

    pub fn equals(self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.with(key, Predicate::Equals(value.into()))
    }

    pub fn compare(self, key: impl Into<String>, op: Comparator, value: impl Into<Scalar>) -> Self {
        self.with(key, Predicate::Compare(op, value.into()))
    }

    pub fn compare_on(
        self,
        key: impl Into<String>,
        column: impl Into<String>,
        op: Comparator,
        value: impl Into<Scalar>,
    ) -> Self {
        self.with(
            key,
            Predicate::CompareOn {
                column: column.into(),
                op,
                value: value.into(),
            },
        )
    }

    pub fn get(&self, key: &str) -> Option<&Predicate> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, predicate)| predicate)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of `self` with every entry of `overlay` applied on top.
    pub fn merged(&self, overlay: &Criteria) -> Criteria {
        let mut merged = self.clone();
        for (key, predicate) in overlay.iter() {
            merged.insert(key, predicate.clone());
        }
        merged
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, predicate)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {predicate}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_tokens() {
        for token in ["=", ">", "<", ">=", "<="] {
            let op: Comparator = token.parse().unwrap();
            assert_eq!(op.token(), token);
        }
        assert!(matches!(
            "!=".parse::<Comparator>(),
            Err(LookupError::InvalidComparator(t)) if t == "!="
        ));
    }

    #[test]
    fn merge_overlay_wins_and_keeps_order() {
        let original = Criteria::new()
            .equals("vehicle_subcategory", "Truck")
            .equals("vehicle_production_year", 2019i64)
            .equals("vehicle_manufacturer", "Acme");
        let overlay = Criteria::new()
            .equals("vehicle_manufacturer", "Others")
            .equals("extra", 1i64);

        let merged = original.merged(&overlay);

        let keys: Vec<_> = merged.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["vehicle_subcategory", "vehicle_production_year", "vehicle_manufacturer", "extra"]
        );
        assert_eq!(
            merged.get("vehicle_manufacturer"),
            Some(&Predicate::Equals(Scalar::from("Others")))
        );
        // the original is left untouched
        assert_eq!(
            original.get("vehicle_manufacturer"),
            Some(&Predicate::Equals(Scalar::from("Acme")))
        );
    }

    #[test]
    fn compare_on_redirects_column() {
        let criteria = Criteria::new()
            .compare_on("year_min", "year", Comparator::GtEq, 2020i64)
            .compare_on("year_max", "year", Comparator::Lt, 2030i64);

        let (key, predicate) = criteria.iter().next().unwrap();
        assert_eq!(key, "year_min");
        assert_eq!(predicate.column(key), "year");
        assert_eq!(predicate.comparator(), Comparator::GtEq);
        assert_eq!(criteria.to_string(), "{year_min: year >= 2020, year_max: year < 2030}");
    }
}
