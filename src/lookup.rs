//! Multi-criteria lookup over a reference table, with ordered fallbacks.
//!
//! Every criterion becomes a polars comparison expression and the
//! expressions are `and`-ed into one selection mask starting from
//! `lit(true)`. Failures never escape: they are logged, handed to the
//! observer and answered with an empty result.

use std::str::FromStr;

use polars::prelude::*;
use tracing::{debug, warn};

use crate::criteria::Criteria;
use crate::error::LookupError;
use crate::value::Row;

/// Shape of a lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    DataFrame,
    #[default]
    Rows,
}

impl FromStr for OutputFormat {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dataframe" => Ok(OutputFormat::DataFrame),
            "dictionary_list" => Ok(OutputFormat::Rows),
            other => Err(LookupError::InvalidOutputFormat(other.to_string())),
        }
    }
}

/// Which pass of a lookup is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Primary,
    /// Index into the fallback sequence.
    Fallback(usize),
}

/// Hook for watching a lookup resolve. All methods default to no-ops.
pub trait LookupObserver {
    fn on_attempt(&self, _attempt: Attempt, _criteria: &Criteria) {}

    fn on_result(&self, _attempt: Attempt, _rows: usize) {}

    fn on_exhausted(&self, _criteria: &Criteria) {}

    fn on_error(&self, _criteria: &Criteria, _error: &LookupError) {}
}

/// Optional knobs of [`lookup`].
#[derive(Default, Clone)]
pub struct LookupOptions<'a> {
    pub output_columns: Option<Vec<String>>,
    pub format: OutputFormat,
    pub fallback: Vec<Criteria>,
    pub observer: Option<&'a dyn LookupObserver>,
}

impl<'a> LookupOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn fallback(mut self, fallback: Vec<Criteria>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn observer(mut self, observer: &'a dyn LookupObserver) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// Result of a lookup. Never absent: no match is an empty collection.
#[derive(Debug, Clone)]
pub enum Matches {
    Frame(DataFrame),
    Rows(Vec<Row>),
}

impl Matches {
    pub fn empty(format: OutputFormat) -> Self {
        match format {
            OutputFormat::DataFrame => Matches::Frame(DataFrame::empty()),
            OutputFormat::Rows => Matches::Rows(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Matches::Frame(df) => df.height(),
            Matches::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows of the result regardless of its shape.
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Matches::Rows(rows) => rows,
            Matches::Frame(df) => Row::from_frame(&df).unwrap_or_else(|err| {
                warn!("Could not read lookup result rows: {err}");
                Vec::new()
            }),
        }
    }

    pub fn first(self) -> Option<Row> {
        self.into_rows().into_iter().next()
    }
}

/// Look up rows of `table` matching every predicate of `criteria`.
///
/// When the primary criteria match nothing, each fallback overlay is merged
/// onto a fresh copy of `criteria` and tried in order; the first non-empty
/// result wins. An exhausted sequence, or any evaluation error, yields
/// [`Matches::empty`].
pub fn lookup(table: &DataFrame, criteria: &Criteria, options: &LookupOptions<'_>) -> Matches {
    match resolve(table, criteria, options) {
        Ok(Some(matches)) => matches,
        Ok(None) => {
            debug!("No matching data found for {criteria}");
            if let Some(observer) = options.observer {
                observer.on_exhausted(criteria);
            }
            Matches::empty(options.format)
        }
        Err(err) => {
            warn!("Error during lookup with criteria {criteria}: {err}");
            if let Some(observer) = options.observer {
                observer.on_error(criteria, &err);
            }
            Matches::empty(options.format)
        }
    }
}

fn resolve(
    table: &DataFrame,
    criteria: &Criteria,
    options: &LookupOptions<'_>,
) -> Result<Option<Matches>, LookupError> {
    let columns = options.output_columns.as_deref().map(dedup_columns);

    let attempts = std::iter::once((Attempt::Primary, criteria.clone())).chain(
        options
            .fallback
            .iter()
            .enumerate()
            .map(|(i, overlay)| (Attempt::Fallback(i), criteria.merged(overlay))),
    );

    for (attempt, effective) in attempts {
        match attempt {
            Attempt::Primary => debug!("lookup called with criteria: {effective}"),
            Attempt::Fallback(_) => debug!("Applying fallback criteria: {effective}"),
        }
        if let Some(observer) = options.observer {
            observer.on_attempt(attempt, &effective);
        }

        let matched = evaluate(table, &effective, columns.as_deref())?;
        let rows = matched.height();
        debug!(rows, "lookup returning");
        if let Some(observer) = options.observer {
            observer.on_result(attempt, rows);
        }

        if rows > 0 {
            let matches = match options.format {
                OutputFormat::DataFrame => Matches::Frame(matched),
                OutputFormat::Rows => Matches::Rows(Row::from_frame(&matched)?),
            };
            return Ok(Some(matches));
        }
    }

    Ok(None)
}

/// Filter `table` by the conjunction of `criteria`, then project.
fn evaluate(
    table: &DataFrame,
    criteria: &Criteria,
    columns: Option<&[String]>,
) -> Result<DataFrame, LookupError> {
    let schema = table.schema();

    let mut mask = lit(true);
    for (key, predicate) in criteria.iter() {
        let column = predicate.column(key);
        let Some(dtype) = schema.get(column) else {
            return Err(LookupError::UnknownColumn(column.to_string()));
        };
        // a value of the wrong kind is a non-match, not an evaluation error
        let condition = if predicate.value().comparable_with(dtype) {
            predicate.to_expr(key)
        } else {
            debug!("'{column}' ({dtype}) cannot match {predicate}");
            lit(false)
        };
        mask = mask.and(condition);
    }

    let mut plan = table.clone().lazy().filter(mask);

    if let Some(columns) = columns {
        if let Some(missing) = columns.iter().find(|c| !schema.contains(c.as_str())) {
            return Err(LookupError::UnknownColumn(missing.clone()));
        }
        plan = plan.select(columns.iter().map(|c| col(c.as_str())).collect::<Vec<_>>());
    }

    Ok(plan.collect()?)
}

fn dedup_columns(columns: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        if !unique.contains(column) {
            unique.push(column.clone());
        }
    }
    unique
}
