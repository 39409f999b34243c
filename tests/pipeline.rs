mod common;

use std::fs;
use std::path::Path;

use annual_emissions::loader::read_csv;
use annual_emissions::schema::emissions;
use annual_emissions::{
    load_data_from_directory, write_csv, DataSet, EmissionSummary, EmissionsCalculator,
    EmissionsError,
};
use common::assert_close;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn write_reference_tables(dir: &Path) {
    write(
        dir,
        "fuel_data.csv",
        "fuel_type,fuel_mode,state_or_province,co2e_2024,co2e_2030\n\
         Diesel,stationary,CA,1.2,0.8\n\
         Diesel,mobile,Any,2.7,2.0\n",
    );
    write(dir, "refrigerant_gwp.csv", "refrigerant_type,refrigerant_gwp\nR-404A,3922\n");
    write(
        dir,
        "refrigerator_data.csv",
        "refrigerator_type,annual_leakage_rate\nWalk-in,0.1\n",
    );
    write(
        dir,
        "vehicle_interventions.csv",
        "vehicle_subcategory,fuel_type,vehicle_production_year,vehicle_manufacturer,fuel_efficiency\n\
         Truck,Diesel,0,Others,5\n",
    );
    write(
        dir,
        "vehicle_interventions_tru.csv",
        "tru_type,model_year,co2e_per_kwh_diesel_tru,tru_power_rating,average_load_factor,tru_annual_hours,tru_plug_in_fraction_of_hours\n\
         Reefer,2020,0.5,10,0.5,100,0.4\n",
    );
    write(dir, "farm_emissions.csv", "subcategory,emission_per_unit\nCattle,2.5\n");
}

#[test]
fn directory_to_emission_table() {
    annual_emissions::logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    write_reference_tables(dir.path());
    write(
        dir.path(),
        "operation_data.csv",
        "operation_id,entity,fuel_type,fuel_amount,state_or_province,target_completion_year,livestock_type,livestock_count\n\
         1,facility,Diesel,100,CA,2024,,\n\
         2,farm,,,,,Cattle,10\n",
    );
    write(dir.path(), "notes.txt", "ignored");

    let frames = load_data_from_directory(dir.path()).unwrap();
    assert_eq!(frames.len(), 7);

    let data = DataSet::from_frames(frames, "operation_data").unwrap();
    let records = EmissionsCalculator::new(data.references)
        .with_current_year(2024)
        .calculate_records(&data.operations)
        .unwrap();

    assert_close(records[0].breakdown().fuel, 120.0);
    assert_close(records[1].breakdown().livestock, 25.0);
    let summary = EmissionSummary::from_records(&records);
    assert_eq!(summary.operations, 2);
    assert_close(summary.total_emissions, 145.0);

    let output = dir.path().join("outputs").join("annual_emissions.csv");
    let mut table = annual_emissions::records_to_frame(&records).unwrap();
    write_csv(&mut table, &output).unwrap();

    let written = read_csv(&output).unwrap();
    assert_eq!(written.height(), 2);
    let totals: Vec<Option<f64>> = written
        .column(emissions::TOTAL)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(totals, [Some(120.0), Some(25.0)]);
}

#[test]
fn missing_tables_are_all_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "farm_emissions.csv", "subcategory,emission_per_unit\nCattle,2.5\n");

    let frames = load_data_from_directory(dir.path()).unwrap();
    let err = DataSet::from_frames(frames, "operation_data").unwrap_err();

    match err {
        EmissionsError::MissingTables(missing) => {
            assert_eq!(missing.len(), 6);
            assert!(missing.iter().any(|t| t == "operation_data"));
            assert!(missing.iter().any(|t| t == "fuel_data"));
            assert!(!missing.iter().any(|t| t == "farm_emissions"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
