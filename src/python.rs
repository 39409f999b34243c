use std::collections::HashMap;

use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyList, PyModule, PyTuple};
use pyo3_polars::PyDataFrame;
use tracing::warn;

use crate::calculator::EmissionsCalculator;
use crate::criteria::{Comparator, Criteria, Predicate};
use crate::error::LookupError;
use crate::loader;
use crate::lookup::{self as engine, LookupOptions, Matches, OutputFormat};
use crate::reference::ReferenceTables;
use crate::schema;
use crate::value::Scalar;

// ── Conversions ─────────────────────────────────────────────────────────────

fn scalar_from_py(key: &str, value: &Bound<'_, PyAny>) -> Result<Scalar, LookupError> {
    if value.is_none() {
        Ok(Scalar::Null)
    } else if value.is_instance_of::<PyBool>() {
        Ok(Scalar::Bool(value.extract().map_err(|_| unsupported(key))?))
    } else if let Ok(v) = value.extract::<i64>() {
        Ok(Scalar::Int(v))
    } else if let Ok(v) = value.extract::<f64>() {
        Ok(Scalar::Float(v))
    } else if let Ok(v) = value.extract::<String>() {
        Ok(Scalar::Str(v))
    } else {
        Err(unsupported(key))
    }
}

fn unsupported(key: &str) -> LookupError {
    LookupError::UnsupportedValue(key.to_string())
}

fn comparator_from_py(value: &Bound<'_, PyAny>) -> Result<Comparator, LookupError> {
    let token: String = value
        .extract()
        .map_err(|_| LookupError::InvalidComparator(value.to_string()))?;
    token.parse()
}

/// `{col: value}`, `{col: (op, value)}` or `{key: (col, op, value)}`.
fn criteria_from_py(dict: &Bound<'_, PyDict>) -> Result<Criteria, LookupError> {
    let mut criteria = Criteria::new();
    for (key, value) in dict.iter() {
        let key: String = key
            .extract()
            .map_err(|_| LookupError::UnsupportedValue(key.to_string()))?;

        let predicate = match value.downcast::<PyTuple>() {
            Ok(tuple) => match tuple.len() {
                2 => Predicate::Compare(
                    comparator_from_py(&tuple.get_item(0).map_err(|_| unsupported(&key))?)?,
                    scalar_from_py(&key, &tuple.get_item(1).map_err(|_| unsupported(&key))?)?,
                ),
                3 => Predicate::CompareOn {
                    column: tuple
                        .get_item(0)
                        .and_then(|c| c.extract::<String>())
                        .map_err(|_| unsupported(&key))?,
                    op: comparator_from_py(&tuple.get_item(1).map_err(|_| unsupported(&key))?)?,
                    value: scalar_from_py(&key, &tuple.get_item(2).map_err(|_| unsupported(&key))?)?,
                },
                len => return Err(LookupError::MalformedPredicate { key, len }),
            },
            Err(_) => Predicate::Equals(scalar_from_py(&key, &value)?),
        };
        criteria.insert(key, predicate);
    }
    Ok(criteria)
}

fn scalar_into_dict(dict: &Bound<'_, PyDict>, key: &str, value: &Scalar) -> PyResult<()> {
    match value {
        Scalar::Null => dict.set_item(key, dict.py().None()),
        Scalar::Bool(b) => dict.set_item(key, *b),
        Scalar::Int(v) => dict.set_item(key, *v),
        Scalar::Float(v) => dict.set_item(key, *v),
        Scalar::Str(s) => dict.set_item(key, s.as_str()),
    }
}

fn matches_into_py(py: Python<'_>, matches: Matches) -> PyResult<PyObject> {
    match matches {
        Matches::Frame(df) => Ok(PyDataFrame(df).into_pyobject(py)?.into_any().unbind()),
        Matches::Rows(rows) => {
            let list = PyList::empty(py);
            for row in rows {
                let dict = PyDict::new(py);
                for (name, value) in row.iter() {
                    scalar_into_dict(&dict, name, value)?;
                }
                list.append(dict)?;
            }
            Ok(list.into_any().unbind())
        }
    }
}

// ── Functions ───────────────────────────────────────────────────────────────

/// Look up rows of `df` matching `criteria`, with optional fallbacks.
///
/// Returns a list of dicts (default) or a DataFrame; never raises on bad
/// criteria, unknown columns or no match - the result is simply empty.
#[pyfunction]
#[pyo3(signature = (df, criteria, output_columns=None, output_format="dictionary_list", fallback_criteria=None))]
fn lookup(
    py: Python<'_>,
    df: PyDataFrame,
    criteria: &Bound<'_, PyDict>,
    output_columns: Option<Vec<String>>,
    output_format: &str,
    fallback_criteria: Option<Vec<Bound<'_, PyDict>>>,
) -> PyResult<PyObject> {
    let format = match output_format.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(err) => {
            warn!("Error during lookup: {err}");
            return matches_into_py(py, Matches::empty(OutputFormat::Rows));
        }
    };

    let parsed = criteria_from_py(criteria).and_then(|criteria| {
        let fallback = fallback_criteria
            .unwrap_or_default()
            .iter()
            .map(criteria_from_py)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((criteria, fallback))
    });
    let (criteria, fallback) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Error during lookup: {err}");
            return matches_into_py(py, Matches::empty(format));
        }
    };

    let mut options = LookupOptions::new().format(format).fallback(fallback);
    options.output_columns = output_columns;

    let matches = engine::lookup(&df.0, &criteria, &options);
    matches_into_py(py, matches)
}

/// Annual emissions per operation_id.
#[pyfunction]
#[pyo3(signature = (
    operation_data,
    fuel_data,
    refrigerant_gwp,
    refrigerator_data,
    vehicle_interventions,
    vehicle_interventions_tru,
    farm_emissions,
    current_year=None,
))]
#[allow(clippy::too_many_arguments)]
fn calculate_annual_emissions(
    operation_data: PyDataFrame,
    fuel_data: PyDataFrame,
    refrigerant_gwp: PyDataFrame,
    refrigerator_data: PyDataFrame,
    vehicle_interventions: PyDataFrame,
    vehicle_interventions_tru: PyDataFrame,
    farm_emissions: PyDataFrame,
    current_year: Option<i32>,
) -> PyResult<PyDataFrame> {
    let references = ReferenceTables {
        fuel_data: fuel_data.0,
        refrigerant_gwp: refrigerant_gwp.0,
        refrigerator_data: refrigerator_data.0,
        vehicle_interventions: vehicle_interventions.0,
        vehicle_interventions_tru: vehicle_interventions_tru.0,
        farm_emissions: farm_emissions.0,
    };
    let mut calculator = EmissionsCalculator::new(references);
    if let Some(year) = current_year {
        calculator = calculator.with_current_year(year);
    }

    let df = calculator.calculate(&operation_data.0)?;
    Ok(PyDataFrame(df))
}

/// Load every CSV in `csv_dir` into a dict of DataFrames keyed by file stem.
#[pyfunction]
fn load_data_from_directory(py: Python<'_>, csv_dir: &str) -> PyResult<HashMap<String, PyDataFrame>> {
    let frames = py.allow_threads(|| loader::load_data_from_directory(csv_dir))?;
    Ok(frames
        .into_iter()
        .map(|(name, df)| (name, PyDataFrame(df)))
        .collect())
}

// ── Module ──────────────────────────────────────────────────────────────────

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let tables = PyModule::new(m.py(), "tables")?;
    tables.add("OPERATION_DATA", schema::tables::OPERATION_DATA)?;
    tables.add("FUEL_DATA", schema::tables::FUEL_DATA)?;
    tables.add("REFRIGERANT_GWP", schema::tables::REFRIGERANT_GWP)?;
    tables.add("REFRIGERATOR_DATA", schema::tables::REFRIGERATOR_DATA)?;
    tables.add("VEHICLE_INTERVENTIONS", schema::tables::VEHICLE_INTERVENTIONS)?;
    tables.add(
        "VEHICLE_INTERVENTIONS_TRU",
        schema::tables::VEHICLE_INTERVENTIONS_TRU,
    )?;
    tables.add("FARM_EMISSIONS", schema::tables::FARM_EMISSIONS)?;
    m.add_submodule(&tables)?;

    let emissions = PyModule::new(m.py(), "emissions")?;
    emissions.add("OPERATION_ID", schema::emissions::OPERATION_ID)?;
    emissions.add("FUEL", schema::emissions::FUEL)?;
    emissions.add("VEHICLE", schema::emissions::VEHICLE)?;
    emissions.add("REFRIGERANT", schema::emissions::REFRIGERANT)?;
    emissions.add("LIVESTOCK", schema::emissions::LIVESTOCK)?;
    emissions.add("FERTILIZER", schema::emissions::FERTILIZER)?;
    emissions.add("WASTE", schema::emissions::WASTE)?;
    emissions.add("TRU", schema::emissions::TRU)?;
    emissions.add("TOTAL", schema::emissions::TOTAL)?;
    m.add_submodule(&emissions)?;

    let operation = PyModule::new(m.py(), "operation")?;
    operation.add("COLUMNS", schema::operation::ALL.to_vec())?;
    m.add_submodule(&operation)?;

    let sentinel = PyModule::new(m.py(), "sentinel")?;
    sentinel.add("TRU_REFRIGERATOR_TYPE", schema::sentinel::TRU_REFRIGERATOR_TYPE)?;
    sentinel.add("ANY_PRODUCTION_YEAR", schema::sentinel::ANY_PRODUCTION_YEAR)?;
    sentinel.add("OTHER_MANUFACTURER", schema::sentinel::OTHER_MANUFACTURER)?;
    sentinel.add("ANY_JURISDICTION", schema::sentinel::ANY_JURISDICTION)?;
    m.add_submodule(&sentinel)?;

    Ok(())
}

#[pymodule]
#[pyo3(name = "_core")]
fn core_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(lookup, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_annual_emissions, m)?)?;
    m.add_function(wrap_pyfunction!(load_data_from_directory, m)?)?;
    add_schema_exports(m)?;
    Ok(())
}
