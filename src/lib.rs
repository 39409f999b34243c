//! Annual greenhouse-gas emissions per operation.
//!
//! Operation records are joined against reference tables (fuel factors,
//! refrigerant GWPs, refrigerator leakage, vehicle efficiency, TRU
//! specifications, farm factors) through a multi-criteria [`lookup`] with
//! fallback resolution, and folded into one [`EmissionRecord`] each.

pub mod calculator;
pub mod config;
pub mod criteria;
pub mod error;
pub mod loader;
pub mod logging;
pub mod lookup;
pub mod reference;
pub mod schema;
pub mod value;

#[cfg(feature = "python")]
mod python;

pub use calculator::{
    calculate_annual_emissions, records_to_frame, EmissionBreakdown, EmissionRecord,
    EmissionSummary, EmissionsCalculator,
};
pub use config::CalculatorConfig;
pub use criteria::{Comparator, Criteria, Predicate};
pub use error::{EmissionsError, LookupError};
pub use loader::{load_data_from_directory, write_csv};
pub use lookup::{lookup, Attempt, LookupObserver, LookupOptions, Matches, OutputFormat};
pub use reference::{DataSet, ReferenceTables};
pub use value::{Row, Scalar};
