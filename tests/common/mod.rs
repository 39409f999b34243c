#![allow(dead_code)]

use std::cell::RefCell;

use annual_emissions::schema::operation;
use annual_emissions::{Attempt, Criteria, LookupObserver, ReferenceTables, Scalar};
use polars::prelude::*;

pub const TOLERANCE: f64 = 1e-9;

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

/// Reference tables with the right columns and no rows.
pub fn empty_references() -> ReferenceTables {
    ReferenceTables {
        fuel_data: df!(
            "fuel_type" => Vec::<&str>::new(),
            "fuel_mode" => Vec::<&str>::new(),
            "state_or_province" => Vec::<&str>::new(),
            "co2e_2024" => Vec::<f64>::new(),
        )
        .unwrap(),
        refrigerant_gwp: df!(
            "refrigerant_type" => Vec::<&str>::new(),
            "refrigerant_gwp" => Vec::<f64>::new(),
        )
        .unwrap(),
        refrigerator_data: df!(
            "refrigerator_type" => Vec::<&str>::new(),
            "annual_leakage_rate" => Vec::<f64>::new(),
        )
        .unwrap(),
        vehicle_interventions: df!(
            "vehicle_subcategory" => Vec::<&str>::new(),
            "fuel_type" => Vec::<&str>::new(),
            "vehicle_production_year" => Vec::<i64>::new(),
            "vehicle_manufacturer" => Vec::<&str>::new(),
            "fuel_efficiency" => Vec::<f64>::new(),
        )
        .unwrap(),
        vehicle_interventions_tru: df!(
            "tru_type" => Vec::<&str>::new(),
            "model_year" => Vec::<i64>::new(),
            "co2e_per_kwh_diesel_tru" => Vec::<f64>::new(),
            "tru_power_rating" => Vec::<f64>::new(),
            "average_load_factor" => Vec::<f64>::new(),
            "tru_annual_hours" => Vec::<f64>::new(),
            "tru_plug_in_fraction_of_hours" => Vec::<f64>::new(),
        )
        .unwrap(),
        farm_emissions: df!(
            "subcategory" => Vec::<&str>::new(),
            "emission_per_unit" => Vec::<f64>::new(),
        )
        .unwrap(),
    }
}

/// Operation table with every calculator column; fields not given are null.
pub fn operations(records: &[Vec<(&str, Scalar)>]) -> DataFrame {
    let columns = operation::ALL
        .iter()
        .map(|name| {
            let values: Vec<AnyValue<'static>> = records
                .iter()
                .map(|record| {
                    record
                        .iter()
                        .find(|(key, _)| key == name)
                        .map_or(AnyValue::Null, |(_, value)| value.to_any_value())
                })
                .collect();
            Series::from_any_values((*name).into(), &values, false)
                .unwrap()
                .into()
        })
        .collect::<Vec<Column>>();
    DataFrame::new(columns).unwrap()
}

/// Records every lookup attempt the calculator makes.
#[derive(Default)]
pub struct AttemptLog {
    pub attempts: RefCell<Vec<(Attempt, Criteria)>>,
}

impl AttemptLog {
    /// Attempts whose criteria mention `key`.
    pub fn for_key(&self, key: &str) -> Vec<(Attempt, Criteria)> {
        self.attempts
            .borrow()
            .iter()
            .filter(|(_, criteria)| criteria.get(key).is_some())
            .cloned()
            .collect()
    }
}

impl LookupObserver for AttemptLog {
    fn on_attempt(&self, attempt: Attempt, criteria: &Criteria) {
        self.attempts.borrow_mut().push((attempt, criteria.clone()));
    }
}
