use log::info;

use crate::data::aggregate::{aggregate, AggregatedTable};
use crate::data::error::PipelineError;
use crate::data::filter::MobilityFilter;
use crate::data::model::TraceCollection;
use crate::data::processor::{Pipeline, UeModel};
use crate::figure::Figure;
use crate::summary::{self, ColumnSummary, NORMALIZATION, THROUGHPUT_COLUMNS};

/// How a loaded collection is turned into a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub ue: UeModel,
    pub mobility: MobilityFilter,
    /// Analyse only this data-set instead of the whole library.
    pub selection: Option<usize>,
}

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub table: AggregatedTable,
    /// Raw (bit/s) statistics, as printed on the console.
    pub summaries: Vec<ColumnSummary>,
    /// Statistics in Mbit/s, as shown next to the plots.
    pub normalized_summaries: Vec<ColumnSummary>,
    pub figure: Figure,
}

/// Filter, process, aggregate and summarize the selected data-sets.
///
/// Records are mutated in place. Schema and selection errors abort before
/// anything is plotted.
pub fn run(collection: &mut TraceCollection, options: AnalysisOptions) -> Result<Analysis, PipelineError> {
    let records = collection.selected_mut(options.selection)?;

    let removed = options.mobility.apply_all(records)?;
    if options.mobility == MobilityFilter::MovingOnly {
        info!("Removed {removed} samples with non-positive velocity");
    }

    let pipeline = Pipeline::for_ue(options.ue);
    info!("Processing with {:?}: {}", options.ue, pipeline.names().join(" → "));
    pipeline.apply_all(records)?;

    let table = aggregate(collection, &THROUGHPUT_COLUMNS, options.selection)?;

    let mut figure = Figure::default();
    summary::drive_plots(&table, &mut figure);

    Ok(Analysis {
        summaries: summary::summarize(&table, 1.0),
        normalized_summaries: summary::summarize(&table, NORMALIZATION),
        table,
        figure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::columns;
    use crate::data::model::tests::record;

    fn options(selection: Option<usize>) -> AnalysisOptions {
        AnalysisOptions {
            ue: UeModel::E398,
            mobility: MobilityFilter::MovingOnly,
            selection,
        }
    }

    fn two_drives() -> TraceCollection {
        TraceCollection::new(vec![
            record(
                "a",
                &[
                    (columns::VELOCITY, &[Some(-1.0), Some(0.0), Some(5.0)]),
                    (columns::MAC_THROUGHPUT_DL, &[Some(1e6), Some(2e6), Some(3e6)]),
                ],
            ),
            record(
                "b",
                &[
                    (columns::VELOCITY, &[Some(2.0), Some(3.0)]),
                    (columns::APP_THROUGHPUT_DL, &[Some(4e6), Some(5e6)]),
                ],
            ),
        ])
    }

    #[test]
    fn mixed_schemas_aggregate_to_one_table() {
        let mut coll = two_drives();
        let analysis = run(&mut coll, options(None)).unwrap();

        assert_eq!(analysis.table.num_rows(), 3);
        assert_eq!(analysis.table.column_names(), THROUGHPUT_COLUMNS.to_vec());
        let app: Vec<_> = analysis
            .table
            .column(columns::APP_THROUGHPUT_DL)
            .unwrap()
            .iter()
            .map(|c| c.as_f64())
            .collect();
        assert_eq!(app, vec![Some(3e6), Some(4e6), Some(5e6)]);
        assert_eq!(analysis.normalized_summaries[0].stats.count, 3);
        assert_eq!(analysis.summaries[1].stats.count, 0);
        assert_eq!(analysis.figure.panels.len(), 4);
    }

    #[test]
    fn bad_selection_plots_nothing() {
        let mut coll = TraceCollection::new(vec![
            record("a", &[(columns::VELOCITY, &[Some(1.0)])]),
            record("b", &[(columns::VELOCITY, &[Some(1.0)])]),
            record("c", &[(columns::VELOCITY, &[Some(1.0)])]),
        ]);
        let err = run(&mut coll, options(Some(5))).unwrap_err();
        assert_eq!(err, PipelineError::Selection { index: 5, len: 3 });
    }

    #[test]
    fn selection_leaves_other_records_untouched() {
        let mut coll = two_drives();
        let analysis = run(&mut coll, options(Some(1))).unwrap();
        assert_eq!(analysis.table.num_rows(), 2);
        assert_eq!(coll.records[0].len(), 3);
        assert!(coll.records[0].has_column(columns::MAC_THROUGHPUT_DL));
    }

    #[test]
    fn schema_violation_aborts() {
        let mut coll = TraceCollection::new(vec![record(
            "no_velocity",
            &[(columns::APP_THROUGHPUT_DL, &[Some(1.0)])],
        )]);
        assert!(matches!(
            run(&mut coll, options(None)),
            Err(PipelineError::SchemaViolation { .. })
        ));

        let keep = AnalysisOptions {
            mobility: MobilityFilter::KeepStationary,
            ..options(None)
        };
        assert_eq!(run(&mut coll, keep).unwrap().table.num_rows(), 1);
    }
}
