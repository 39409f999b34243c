//! Column names, table keys and sentinel values of the emissions tables.
//! The Python bindings re-export these instead of redefining them.

// ── Table keys ──────────────────────────────────────────────────────────────
pub mod tables {
    pub const OPERATION_DATA: &str = "operation_data";
    pub const FUEL_DATA: &str = "fuel_data";
    pub const REFRIGERANT_GWP: &str = "refrigerant_gwp";
    pub const REFRIGERATOR_DATA: &str = "refrigerator_data";
    pub const VEHICLE_INTERVENTIONS: &str = "vehicle_interventions";
    pub const VEHICLE_INTERVENTIONS_TRU: &str = "vehicle_interventions_tru";
    pub const FARM_EMISSIONS: &str = "farm_emissions";

    pub const REFERENCE: [&str; 6] = [
        FUEL_DATA,
        REFRIGERANT_GWP,
        REFRIGERATOR_DATA,
        VEHICLE_INTERVENTIONS,
        VEHICLE_INTERVENTIONS_TRU,
        FARM_EMISSIONS,
    ];
}

// ── Operation record columns ────────────────────────────────────────────────
pub mod operation {
    pub const OPERATION_ID: &str = "operation_id";
    pub const ENTITY: &str = "entity";
    pub const FUEL_TYPE: &str = "fuel_type";
    pub const FUEL_AMOUNT: &str = "fuel_amount";
    pub const OPERATING_DISTANCE: &str = "operating_distance";
    pub const REFRIGERATOR_TYPE: &str = "refrigerator_type";
    pub const REFRIGERANT_TYPE: &str = "refrigerant_type";
    pub const REFRIGERANT_CHARGE: &str = "refrigerant_charge";
    pub const NUMBER_OF_REFRIGERATORS: &str = "number_of_refrigerators";
    pub const VEHICLE_SUBCATEGORY: &str = "vehicle_subcategory";
    pub const VEHICLE_PRODUCTION_YEAR: &str = "vehicle_production_year";
    pub const VEHICLE_MANUFACTURER: &str = "vehicle_manufacturer";
    pub const TRU_SUBCATEGORY: &str = "tru_subcategory";
    pub const TRU_MODEL_YEAR: &str = "tru_model_year";
    pub const TRU_REFRIGERANT_TYPE: &str = "tru_refrigerant_type";
    pub const TRU_REFRIGERANT_CHARGE: &str = "tru_refrigerant_charge";
    pub const TRU_NUMBER_OF_VEHICLE_UNITS: &str = "tru_number_of_vehicle_units";
    pub const LIVESTOCK_TYPE: &str = "livestock_type";
    pub const LIVESTOCK_COUNT: &str = "livestock_count";
    pub const FERTILIZER_TYPE: &str = "fertilizer_type";
    pub const FERTILIZER_AMOUNT: &str = "fertilizer_amount";
    pub const WASTE_TYPE: &str = "waste_type";
    pub const WASTE_AMOUNT: &str = "waste_amount";
    pub const TARGET_COMPLETION_YEAR: &str = "target_completion_year";
    pub const STATE_OR_PROVINCE: &str = "state_or_province";

    /// Every column the calculator reads from an operation record.
    pub const ALL: [&str; 25] = [
        OPERATION_ID,
        ENTITY,
        FUEL_TYPE,
        FUEL_AMOUNT,
        OPERATING_DISTANCE,
        REFRIGERATOR_TYPE,
        REFRIGERANT_TYPE,
        REFRIGERANT_CHARGE,
        NUMBER_OF_REFRIGERATORS,
        VEHICLE_SUBCATEGORY,
        VEHICLE_PRODUCTION_YEAR,
        VEHICLE_MANUFACTURER,
        TRU_SUBCATEGORY,
        TRU_MODEL_YEAR,
        TRU_REFRIGERANT_TYPE,
        TRU_REFRIGERANT_CHARGE,
        TRU_NUMBER_OF_VEHICLE_UNITS,
        LIVESTOCK_TYPE,
        LIVESTOCK_COUNT,
        FERTILIZER_TYPE,
        FERTILIZER_AMOUNT,
        WASTE_TYPE,
        WASTE_AMOUNT,
        TARGET_COMPLETION_YEAR,
        STATE_OR_PROVINCE,
    ];
}

// ── Fuel emission factor columns ────────────────────────────────────────────
pub mod fuel {
    pub const FUEL_TYPE: &str = "fuel_type";
    pub const FUEL_MODE: &str = "fuel_mode";
    pub const STATE_OR_PROVINCE: &str = "state_or_province";
    /// Per-year factor columns are named `co2e_<year>`.
    pub const YEAR_PREFIX: &str = "co2e_";

    pub fn year_column(year: i64) -> String {
        format!("{YEAR_PREFIX}{year}")
    }
}

// ── Refrigerant / refrigerator columns ──────────────────────────────────────
pub mod refrigerant {
    pub const REFRIGERANT_TYPE: &str = "refrigerant_type";
    pub const REFRIGERANT_GWP: &str = "refrigerant_gwp";
    pub const REFRIGERATOR_TYPE: &str = "refrigerator_type";
    pub const ANNUAL_LEAKAGE_RATE: &str = "annual_leakage_rate";
}

// ── Vehicle efficiency columns ──────────────────────────────────────────────
pub mod vehicle {
    pub const VEHICLE_SUBCATEGORY: &str = "vehicle_subcategory";
    pub const FUEL_TYPE: &str = "fuel_type";
    pub const VEHICLE_PRODUCTION_YEAR: &str = "vehicle_production_year";
    pub const VEHICLE_MANUFACTURER: &str = "vehicle_manufacturer";
    pub const FUEL_EFFICIENCY: &str = "fuel_efficiency";
}

// ── TRU specification columns ───────────────────────────────────────────────
pub mod tru {
    pub const TRU_TYPE: &str = "tru_type";
    pub const MODEL_YEAR: &str = "model_year";
    pub const CO2E_PER_KWH_DIESEL: &str = "co2e_per_kwh_diesel_tru";
    pub const POWER_RATING: &str = "tru_power_rating";
    pub const AVERAGE_LOAD_FACTOR: &str = "average_load_factor";
    pub const ANNUAL_HOURS: &str = "tru_annual_hours";
    pub const PLUG_IN_FRACTION: &str = "tru_plug_in_fraction_of_hours";

    pub const SPECIFICATION: [&str; 5] = [
        CO2E_PER_KWH_DIESEL,
        POWER_RATING,
        AVERAGE_LOAD_FACTOR,
        ANNUAL_HOURS,
        PLUG_IN_FRACTION,
    ];
}

// ── Farm emission factor columns ────────────────────────────────────────────
pub mod farm {
    pub const SUBCATEGORY: &str = "subcategory";
    pub const EMISSION_PER_UNIT: &str = "emission_per_unit";
}

// ── Emission record (output) columns ────────────────────────────────────────
pub mod emissions {
    pub const OPERATION_ID: &str = "operation_id";
    pub const FUEL: &str = "fuel_emissions";
    pub const VEHICLE: &str = "vehicle_emissions";
    pub const REFRIGERANT: &str = "refrigerant_emissions";
    pub const LIVESTOCK: &str = "livestock_emissions";
    pub const FERTILIZER: &str = "fertilizer_emissions";
    pub const WASTE: &str = "waste_emissions";
    pub const TRU: &str = "tru_emissions";
    pub const TOTAL: &str = "total_emissions";
}

// ── Sentinel values ─────────────────────────────────────────────────────────
pub mod sentinel {
    /// Refrigerator type whose leakage rate applies to every TRU.
    pub const TRU_REFRIGERATOR_TYPE: &str = "Transportation Refrigeration Unit";
    /// Wildcard production year in the vehicle efficiency table.
    pub const ANY_PRODUCTION_YEAR: i64 = 0;
    /// Wildcard manufacturer in the vehicle efficiency table.
    pub const OTHER_MANUFACTURER: &str = "Others";
    /// Wildcard jurisdiction in the fuel factor table.
    pub const ANY_JURISDICTION: &str = "Any";

    pub const VEHICLE_ENTITY: &str = "vehicle";
    pub const ELECTRICITY: &str = "Electricity";
    pub const MODE_MOBILE: &str = "mobile";
    pub const MODE_STATIONARY: &str = "stationary";
}
