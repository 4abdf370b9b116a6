use log::{info, warn};

use super::error::PipelineError;
use super::model::{CellValue, TraceCollection, TraceRecord};

// ---------------------------------------------------------------------------
// AggregatedTable – the comparable table fed to the summary stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Column-major table restricted to a fixed column set.
/// Same columns, in the requested order, whether built from one record or many.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregatedTable {
    pub columns: Vec<TableColumn>,
}

impl AggregatedTable {
    fn empty(required: &[&str]) -> Self {
        Self {
            columns: required
                .iter()
                .map(|name| TableColumn {
                    name: name.to_string(),
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Append the rows of `record`, restricted to this table's columns.
    /// Columns the record lacks are filled with `Null`.
    fn append(&mut self, record: &TraceRecord) {
        for column in &mut self.columns {
            if !record.has_column(&column.name) {
                warn!(
                    "{}: no '{}' column, filling {} rows with missing values",
                    record.name,
                    column.name,
                    record.len()
                );
                column
                    .values
                    .extend(std::iter::repeat(CellValue::Null).take(record.len()));
                continue;
            }
            column
                .values
                .extend((0..record.len()).map(|row| record.value(row, &column.name).clone()));
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Restrict the selected record (or every record, concatenated in input
/// order when `selection` is `None`) to `required` columns.
pub fn aggregate(
    collection: &TraceCollection,
    required: &[&str],
    selection: Option<usize>,
) -> Result<AggregatedTable, PipelineError> {
    let records = collection.selected(selection)?;
    let mut table = AggregatedTable::empty(required);
    for record in records {
        table.append(record);
    }
    info!(
        "Aggregated {} rows from {} data-set(s) into {:?}",
        table.num_rows(),
        records.len(),
        table.column_names()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    const REQUIRED: [&str; 2] = ["a", "b"];

    #[test]
    fn concatenates_in_record_order() {
        let coll = TraceCollection::new(vec![
            record("r1", &[("a", &[Some(1.0), Some(2.0)]), ("b", &[Some(10.0), Some(20.0)])]),
            record("r2", &[("b", &[Some(30.0)]), ("a", &[Some(3.0)]), ("c", &[Some(0.0)])]),
        ]);
        let table = aggregate(&coll, &REQUIRED, None).unwrap();
        assert_eq!(table.column_names(), REQUIRED.to_vec());
        assert_eq!(table.num_rows(), 3);
        let a: Vec<_> = table.column("a").unwrap().iter().map(CellValue::as_f64).collect();
        assert_eq!(a, vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert!(table.column("c").is_none());
    }

    #[test]
    fn missing_column_degrades_to_nulls() {
        let coll = TraceCollection::new(vec![
            record("full", &[("a", &[Some(1.0)]), ("b", &[Some(2.0)])]),
            record("partial", &[("a", &[Some(3.0), Some(4.0)])]),
        ]);
        let table = aggregate(&coll, &REQUIRED, None).unwrap();
        assert_eq!(table.num_rows(), 3);
        let b = table.column("b").unwrap();
        assert_eq!(b[0].as_f64(), Some(2.0));
        assert!(b[1].is_null() && b[2].is_null());
    }

    #[test]
    fn single_selection_matches_whole_singleton() {
        let coll = TraceCollection::new(vec![record(
            "only",
            &[("a", &[Some(1.0), None]), ("b", &[Some(2.0), Some(3.0)])],
        )]);
        assert_eq!(
            aggregate(&coll, &REQUIRED, Some(0)).unwrap(),
            aggregate(&coll, &REQUIRED, None).unwrap()
        );
    }

    #[test]
    fn selection_picks_one_record() {
        let coll = TraceCollection::new(vec![
            record("r1", &[("a", &[Some(1.0)]), ("b", &[Some(1.0)])]),
            record("r2", &[("a", &[Some(2.0), Some(2.5)]), ("b", &[Some(2.0), Some(2.5)])]),
        ]);
        let table = aggregate(&coll, &REQUIRED, Some(1)).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("a").unwrap()[0].as_f64(), Some(2.0));
    }

    #[test]
    fn out_of_range_selection() {
        let coll = TraceCollection::new(vec![TraceRecord::default(); 3]);
        assert_eq!(
            aggregate(&coll, &REQUIRED, Some(5)),
            Err(PipelineError::Selection { index: 5, len: 3 })
        );
    }
}
