//! Per-operation annual emissions.
//!
//! Each operation record resolves its secondary data (leakage rates, GWPs,
//! TRU specifications, farm factors, vehicle efficiency, fuel factors)
//! through [`lookup`], coerces its own numeric fields, and folds seven
//! category subtotals into one [`EmissionRecord`]. Unresolved data counts
//! as 0; only structural problems abort a run.

use std::sync::Arc;

use chrono::Datelike;
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::criteria::Criteria;
use crate::error::EmissionsError;
use crate::lookup::{lookup, LookupObserver, LookupOptions};
use crate::reference::{DataSet, ReferenceTables};
use crate::schema::{emissions, farm, fuel, operation, refrigerant, sentinel, tru, vehicle};
use crate::value::{Row, Scalar};

/// Seven category subtotals of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmissionBreakdown {
    pub fuel: f64,
    pub vehicle: f64,
    pub refrigerant: f64,
    pub livestock: f64,
    pub fertilizer: f64,
    pub waste: f64,
    pub tru: f64,
}

impl EmissionBreakdown {
    pub fn total(&self) -> f64 {
        self.fuel
            + self.vehicle
            + self.refrigerant
            + self.livestock
            + self.fertilizer
            + self.waste
            + self.tru
    }
}

/// Output row: one per operation record, never modified after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionRecord {
    operation_id: Scalar,
    breakdown: EmissionBreakdown,
    total: f64,
}

impl EmissionRecord {
    pub fn new(operation_id: Scalar, breakdown: EmissionBreakdown) -> Self {
        Self {
            operation_id,
            total: breakdown.total(),
            breakdown,
        }
    }

    pub fn operation_id(&self) -> &Scalar {
        &self.operation_id
    }

    pub fn breakdown(&self) -> &EmissionBreakdown {
        &self.breakdown
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

/// Totals over a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmissionSummary {
    pub operations: usize,
    pub total_emissions: f64,
}

impl EmissionSummary {
    pub fn from_records(records: &[EmissionRecord]) -> Self {
        Self {
            operations: records.len(),
            total_emissions: records.iter().map(EmissionRecord::total).sum(),
        }
    }
}

/// Build the output table, columns in the documented order.
pub fn records_to_frame(records: &[EmissionRecord]) -> Result<DataFrame, EmissionsError> {
    let ids: Vec<AnyValue<'static>> = records
        .iter()
        .map(|r| r.operation_id.to_any_value())
        .collect();
    let column = |pick: fn(&EmissionRecord) -> f64| -> Vec<f64> {
        records.iter().map(pick).collect()
    };

    let df = DataFrame::new(vec![
        Series::from_any_values(emissions::OPERATION_ID.into(), &ids, false)?.into(),
        Column::new(emissions::FUEL.into(), &column(|r| r.breakdown.fuel)),
        Column::new(emissions::VEHICLE.into(), &column(|r| r.breakdown.vehicle)),
        Column::new(emissions::REFRIGERANT.into(), &column(|r| r.breakdown.refrigerant)),
        Column::new(emissions::LIVESTOCK.into(), &column(|r| r.breakdown.livestock)),
        Column::new(emissions::FERTILIZER.into(), &column(|r| r.breakdown.fertilizer)),
        Column::new(emissions::WASTE.into(), &column(|r| r.breakdown.waste)),
        Column::new(emissions::TRU.into(), &column(|r| r.breakdown.tru)),
        Column::new(emissions::TOTAL.into(), &column(|r| r.total)),
    ])?;

    Ok(df)
}

/// Secondary data resolved for one operation record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct SecondaryData {
    annual_leakage_rate: f64,
    refrigerant_gwp: f64,
    tru_annual_leakage_rate: f64,
    tru_refrigerant_gwp: f64,
    tru_diesel_factor: f64,
    tru_power_rating: f64,
    tru_load_factor: f64,
    tru_annual_hours: f64,
    tru_plug_in_fraction: f64,
    livestock_factor: f64,
    fertilizer_factor: f64,
    waste_factor: f64,
    vehicle_fuel_efficiency: f64,
    fuel_factor_current: f64,
    fuel_factor_forecast: f64,
}

/// Numeric fields of one operation record, coerced to 0 on failure.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Quantities {
    fuel_amount: f64,
    refrigerant_charge: f64,
    number_of_refrigerators: f64,
    operating_distance: f64,
    tru_number_of_vehicle_units: f64,
    tru_refrigerant_charge: f64,
    livestock_count: f64,
    fertilizer_amount: f64,
    waste_amount: f64,
}

impl Quantities {
    fn from_record(record: &Row) -> Self {
        Self {
            fuel_amount: record.number(operation::FUEL_AMOUNT),
            refrigerant_charge: record.number(operation::REFRIGERANT_CHARGE),
            number_of_refrigerators: record.number(operation::NUMBER_OF_REFRIGERATORS),
            operating_distance: record.number(operation::OPERATING_DISTANCE),
            tru_number_of_vehicle_units: record.number(operation::TRU_NUMBER_OF_VEHICLE_UNITS),
            tru_refrigerant_charge: record.number(operation::TRU_REFRIGERANT_CHARGE),
            livestock_count: record.number(operation::LIVESTOCK_COUNT),
            fertilizer_amount: record.number(operation::FERTILIZER_AMOUNT),
            waste_amount: record.number(operation::WASTE_AMOUNT),
        }
    }
}

fn compute_breakdown(q: &Quantities, s: &SecondaryData) -> EmissionBreakdown {
    let average_fuel_factor = (s.fuel_factor_forecast + s.fuel_factor_current) / 2.0;

    let vehicle = if s.vehicle_fuel_efficiency != 0.0 {
        q.operating_distance / s.vehicle_fuel_efficiency * average_fuel_factor
    } else {
        0.0
    };

    let tru_energy = s.tru_power_rating
        * s.tru_load_factor
        * s.tru_annual_hours
        * s.tru_plug_in_fraction
        * s.tru_diesel_factor;
    let tru_leakage = s.tru_refrigerant_gwp * q.tru_refrigerant_charge * s.tru_annual_leakage_rate;

    EmissionBreakdown {
        fuel: q.fuel_amount * average_fuel_factor,
        vehicle,
        refrigerant: q.refrigerant_charge
            * s.annual_leakage_rate
            * s.refrigerant_gwp
            * q.number_of_refrigerators,
        livestock: q.livestock_count * s.livestock_factor,
        fertilizer: q.fertilizer_amount * s.fertilizer_factor,
        waste: q.waste_amount * s.waste_factor,
        tru: (tru_energy + tru_leakage) * q.tru_number_of_vehicle_units,
    }
}

/// Emission aggregator over a fixed set of reference tables.
pub struct EmissionsCalculator {
    references: ReferenceTables,
    current_year: i32,
    observer: Option<Arc<dyn LookupObserver>>,
}

impl EmissionsCalculator {
    pub fn new(references: ReferenceTables) -> Self {
        Self {
            references,
            current_year: chrono::Local::now().year(),
            observer: None,
        }
    }

    /// Year whose `co2e_<year>` column is the "current" fuel factor.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Observer handed to every lookup the calculator issues.
    pub fn with_observer(mut self, observer: Arc<dyn LookupObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Emission table for `operations`, one row per record, in input order.
    pub fn calculate(&self, operations: &DataFrame) -> Result<DataFrame, EmissionsError> {
        let records = self.calculate_records(operations)?;
        records_to_frame(&records)
    }

    pub fn calculate_records(
        &self,
        operations: &DataFrame,
    ) -> Result<Vec<EmissionRecord>, EmissionsError> {
        let schema = operations.schema();
        if !schema.contains(operation::OPERATION_ID) {
            return Err(EmissionsError::MissingColumn(operation::OPERATION_ID.to_string()));
        }
        for name in operation::ALL.iter().filter(|name| !schema.contains(name)) {
            warn!("Operation data has no '{name}' column; treating it as empty");
        }

        info!(
            operations = operations.height(),
            current_year = self.current_year,
            "Calculating annual emissions"
        );

        let records = Row::from_frame(operations)?
            .iter()
            .map(|record| self.calculate_record(record))
            .collect::<Vec<_>>();

        let summary = EmissionSummary::from_records(&records);
        info!(
            operations = summary.operations,
            total_emissions = summary.total_emissions,
            "Annual emissions calculated"
        );
        Ok(records)
    }

    /// Emissions of a single operation record. Never fails: unresolved
    /// reference data and unparseable fields count as 0.
    pub fn calculate_record(&self, record: &Row) -> EmissionRecord {
        let operation_id = field(record, operation::OPERATION_ID);
        let secondary = self.resolve_secondary(record);
        let quantities = Quantities::from_record(record);
        let breakdown = compute_breakdown(&quantities, &secondary);
        debug!(%operation_id, total = breakdown.total(), "operation emissions");
        EmissionRecord::new(operation_id, breakdown)
    }

    fn resolve_secondary(&self, record: &Row) -> SecondaryData {
        let refs = &self.references;

        let [annual_leakage_rate] = self.factors(
            &refs.refrigerator_data,
            Criteria::new().equals(
                refrigerant::REFRIGERATOR_TYPE,
                field(record, operation::REFRIGERATOR_TYPE),
            ),
            [refrigerant::ANNUAL_LEAKAGE_RATE],
            Vec::new(),
        );

        let [refrigerant_gwp] = self.factors(
            &refs.refrigerant_gwp,
            Criteria::new().equals(
                refrigerant::REFRIGERANT_TYPE,
                field(record, operation::REFRIGERANT_TYPE),
            ),
            [refrigerant::REFRIGERANT_GWP],
            Vec::new(),
        );

        let [tru_annual_leakage_rate] = self.factors(
            &refs.refrigerator_data,
            Criteria::new().equals(
                refrigerant::REFRIGERATOR_TYPE,
                sentinel::TRU_REFRIGERATOR_TYPE,
            ),
            [refrigerant::ANNUAL_LEAKAGE_RATE],
            Vec::new(),
        );

        let [tru_refrigerant_gwp] = self.factors(
            &refs.refrigerant_gwp,
            Criteria::new().equals(
                refrigerant::REFRIGERANT_TYPE,
                field(record, operation::TRU_REFRIGERANT_TYPE),
            ),
            [refrigerant::REFRIGERANT_GWP],
            Vec::new(),
        );

        let [tru_diesel_factor, tru_power_rating, tru_load_factor, tru_annual_hours, tru_plug_in_fraction] =
            self.factors(
                &refs.vehicle_interventions_tru,
                Criteria::new()
                    .equals(tru::TRU_TYPE, field(record, operation::TRU_SUBCATEGORY))
                    .equals(tru::MODEL_YEAR, field(record, operation::TRU_MODEL_YEAR)),
                tru::SPECIFICATION,
                Vec::new(),
            );

        let farm_factor = |subcategory_field: &str| {
            let [factor] = self.factors(
                &refs.farm_emissions,
                Criteria::new().equals(farm::SUBCATEGORY, field(record, subcategory_field)),
                [farm::EMISSION_PER_UNIT],
                Vec::new(),
            );
            factor
        };
        let livestock_factor = farm_factor(operation::LIVESTOCK_TYPE);
        let fertilizer_factor = farm_factor(operation::FERTILIZER_TYPE);
        let waste_factor = farm_factor(operation::WASTE_TYPE);

        let [vehicle_fuel_efficiency] = self.factors(
            &refs.vehicle_interventions,
            Criteria::new()
                .equals(vehicle::VEHICLE_SUBCATEGORY, field(record, operation::VEHICLE_SUBCATEGORY))
                .equals(vehicle::FUEL_TYPE, field(record, operation::FUEL_TYPE))
                .equals(
                    vehicle::VEHICLE_PRODUCTION_YEAR,
                    field(record, operation::VEHICLE_PRODUCTION_YEAR),
                )
                .equals(
                    vehicle::VEHICLE_MANUFACTURER,
                    field(record, operation::VEHICLE_MANUFACTURER),
                ),
            [vehicle::FUEL_EFFICIENCY],
            vec![
                Criteria::new()
                    .equals(vehicle::VEHICLE_PRODUCTION_YEAR, sentinel::ANY_PRODUCTION_YEAR),
                Criteria::new().equals(vehicle::VEHICLE_MANUFACTURER, sentinel::OTHER_MANUFACTURER),
                Criteria::new()
                    .equals(vehicle::VEHICLE_PRODUCTION_YEAR, sentinel::ANY_PRODUCTION_YEAR)
                    .equals(vehicle::VEHICLE_MANUFACTURER, sentinel::OTHER_MANUFACTURER),
            ],
        );

        let (fuel_factor_current, fuel_factor_forecast) = self.fuel_factors(record);

        SecondaryData {
            annual_leakage_rate,
            refrigerant_gwp,
            tru_annual_leakage_rate,
            tru_refrigerant_gwp,
            tru_diesel_factor,
            tru_power_rating,
            tru_load_factor,
            tru_annual_hours,
            tru_plug_in_fraction,
            livestock_factor,
            fertilizer_factor,
            waste_factor,
            vehicle_fuel_efficiency,
            fuel_factor_current,
            fuel_factor_forecast,
        }
    }

    /// Current-year and target-year fuel emission factors.
    ///
    /// Without a usable target year, or without a `co2e_<year>` column for
    /// it, the forecast factor is 0 and the current factor still applies.
    fn fuel_factors(&self, record: &Row) -> (f64, f64) {
        let entity = field(record, operation::ENTITY);
        let fuel_type = field(record, operation::FUEL_TYPE);
        let mode = if entity.as_str() == Some(sentinel::VEHICLE_ENTITY)
            && fuel_type.as_str() != Some(sentinel::ELECTRICITY)
        {
            sentinel::MODE_MOBILE
        } else {
            sentinel::MODE_STATIONARY
        };

        let criteria = Criteria::new()
            .equals(fuel::FUEL_TYPE, fuel_type)
            .equals(fuel::FUEL_MODE, mode)
            .equals(fuel::STATE_OR_PROVINCE, field(record, operation::STATE_OR_PROVINCE));
        let fallback = vec![Criteria::new().equals(fuel::STATE_OR_PROVINCE, sentinel::ANY_JURISDICTION)];

        let current_year = i64::from(self.current_year);
        let current_column = fuel::year_column(current_year);
        let target_year = field(record, operation::TARGET_COMPLETION_YEAR).to_integer();

        let fuel_data = &self.references.fuel_data;
        let target_column = match target_year {
            Some(year) if year == current_year => {
                let [current] = self.factors(fuel_data, criteria, [current_column.as_str()], fallback);
                return (current, current);
            }
            Some(year) => Some(fuel::year_column(year))
                .filter(|column| fuel_data.schema().contains(column.as_str())),
            None => None,
        };

        match target_column {
            Some(target_column) => {
                let [current, forecast] = self.factors(
                    fuel_data,
                    criteria,
                    [current_column.as_str(), target_column.as_str()],
                    fallback,
                );
                (current, forecast)
            }
            None => {
                warn!(
                    operation_id = %field(record, operation::OPERATION_ID),
                    target_year = %field(record, operation::TARGET_COMPLETION_YEAR),
                    "No fuel factor column for the target completion year; forecast factor is 0"
                );
                let [current] = self.factors(fuel_data, criteria, [current_column.as_str()], fallback);
                (current, 0.0)
            }
        }
    }

    /// First matching row's `columns` as numbers, each 0 when unresolved.
    fn factors<const N: usize>(
        &self,
        table: &DataFrame,
        criteria: Criteria,
        columns: [&str; N],
        fallback: Vec<Criteria>,
    ) -> [f64; N] {
        let mut options = LookupOptions::new().columns(columns).fallback(fallback);
        options.observer = self.observer.as_deref();

        match lookup(table, &criteria, &options).first() {
            Some(row) => columns.map(|column| row.number(column)),
            None => [0.0; N],
        }
    }
}

fn field(record: &Row, name: &str) -> Scalar {
    record.get(name).cloned().unwrap_or_default()
}

/// One-call entry point: calculate the emission table of a whole data set.
pub fn calculate_annual_emissions(
    data: &DataSet,
    current_year: Option<i32>,
) -> Result<DataFrame, EmissionsError> {
    let mut calculator = EmissionsCalculator::new(data.references.clone());
    if let Some(year) = current_year {
        calculator = calculator.with_current_year(year);
    }
    calculator.calculate(&data.operations)
}
