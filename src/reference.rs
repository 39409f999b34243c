use std::collections::HashMap;

use polars::prelude::*;

use crate::error::EmissionsError;
use crate::schema::tables;

/// The six read-only reference tables the calculator joins against.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub fuel_data: DataFrame,
    pub refrigerant_gwp: DataFrame,
    pub refrigerator_data: DataFrame,
    pub vehicle_interventions: DataFrame,
    pub vehicle_interventions_tru: DataFrame,
    pub farm_emissions: DataFrame,
}

/// Operation records plus the reference tables they are resolved against.
#[derive(Debug, Clone)]
pub struct DataSet {
    pub operations: DataFrame,
    pub references: ReferenceTables,
}

impl DataSet {
    /// Pick the required tables out of a name -> frame map.
    ///
    /// Every missing name is reported at once; nothing is computed on a
    /// partial set.
    pub fn from_frames(
        mut frames: HashMap<String, DataFrame>,
        operations_table: &str,
    ) -> Result<Self, EmissionsError> {
        let missing: Vec<String> = std::iter::once(operations_table)
            .chain(tables::REFERENCE)
            .filter(|name| !frames.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(EmissionsError::MissingTables(missing));
        }

        let mut take = |name: &str| {
            frames
                .remove(name)
                .ok_or_else(|| EmissionsError::MissingTables(vec![name.to_string()]))
        };

        Ok(Self {
            operations: take(operations_table)?,
            references: ReferenceTables {
                fuel_data: take(tables::FUEL_DATA)?,
                refrigerant_gwp: take(tables::REFRIGERANT_GWP)?,
                refrigerator_data: take(tables::REFRIGERATOR_DATA)?,
                vehicle_interventions: take(tables::VEHICLE_INTERVENTIONS)?,
                vehicle_interventions_tru: take(tables::VEHICLE_INTERVENTIONS_TRU)?,
                farm_emissions: take(tables::FARM_EMISSIONS)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(names: &[&str]) -> HashMap<String, DataFrame> {
        names
            .iter()
            .map(|name| (name.to_string(), df!("id" => [1i64]).unwrap()))
            .collect()
    }

    #[test]
    fn all_missing_tables_are_reported() {
        let err = DataSet::from_frames(
            frames(&[tables::OPERATION_DATA, tables::FUEL_DATA, tables::REFRIGERANT_GWP]),
            tables::OPERATION_DATA,
        )
        .unwrap_err();

        let EmissionsError::MissingTables(missing) = err else {
            panic!("expected missing tables");
        };
        assert_eq!(
            missing,
            [
                tables::REFRIGERATOR_DATA,
                tables::VEHICLE_INTERVENTIONS,
                tables::VEHICLE_INTERVENTIONS_TRU,
                tables::FARM_EMISSIONS,
            ]
        );
    }

    #[test]
    fn custom_operations_key() {
        let mut names = vec!["operation_data_test_2"];
        names.extend(tables::REFERENCE);

        let data = DataSet::from_frames(frames(&names), "operation_data_test_2").unwrap();
        assert_eq!(data.operations.height(), 1);

        let err = DataSet::from_frames(frames(&names), tables::OPERATION_DATA).unwrap_err();
        assert!(err.to_string().contains(tables::OPERATION_DATA));
    }
}
