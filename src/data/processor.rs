use log::debug;

use super::error::PipelineError;
use super::model::{columns, CellValue, TraceRecord};

// ---------------------------------------------------------------------------
// Processor capability
// ---------------------------------------------------------------------------

/// Outcome of one processor run on one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub processor: &'static str,
    /// The target column already existed (or nothing applied), record untouched.
    pub skipped: bool,
    /// Rows whose derived value could not be computed and were marked `Null`.
    pub missing: usize,
}

impl ProcessReport {
    fn skipped(processor: &'static str) -> Self {
        Self {
            processor,
            skipped: true,
            missing: 0,
        }
    }

    fn derived(processor: &'static str, missing: usize) -> Self {
        Self {
            processor,
            skipped: false,
            missing,
        }
    }
}

/// Derives or renames columns of a record in place.
///
/// Implementations never remove unrelated columns, never change the row
/// count, and are no-ops when their target column already exists, so a
/// record can safely go through the same processor twice.
pub trait ColumnProcessor {
    fn name(&self) -> &'static str;
    fn process(&self, record: &mut TraceRecord) -> Result<ProcessReport, PipelineError>;
}

// ---------------------------------------------------------------------------
// MAC → application throughput rename
// ---------------------------------------------------------------------------

/// Older firmware only reports MAC-layer throughput; treat it as the
/// application throughput when the latter is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameMacToApplication;

impl ColumnProcessor for RenameMacToApplication {
    fn name(&self) -> &'static str {
        "rename_mac_to_app"
    }

    fn process(&self, record: &mut TraceRecord) -> Result<ProcessReport, PipelineError> {
        if record.has_column(columns::APP_THROUGHPUT_DL)
            || !record.rename_column(columns::MAC_THROUGHPUT_DL, columns::APP_THROUGHPUT_DL)
        {
            return Ok(ProcessReport::skipped(self.name()));
        }
        Ok(ProcessReport::derived(self.name(), 0))
    }
}

// ---------------------------------------------------------------------------
// Application bandwidth / PRB utilization
// ---------------------------------------------------------------------------

/// Derives the spectrum actually used by the UE and the application
/// throughput per used Hz:
///
/// ```text
/// app_bw  [MHz]      = bandwidth [MHz] · prb_util [%] / 100
/// eff     [bit/s/Hz] = app_throughput [bit/s] / (app_bw · 1e6)
/// ```
///
/// Each target is written only when absent; an application bandwidth column
/// already present in the trace feeds the efficiency as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationBandwidthPrbUtil;

impl ColumnProcessor for ApplicationBandwidthPrbUtil {
    fn name(&self) -> &'static str {
        "app_bw_prb_util"
    }

    fn process(&self, record: &mut TraceRecord) -> Result<ProcessReport, PipelineError> {
        let has_app_bw = record.has_column(columns::APP_BANDWIDTH_DL);
        let has_efficiency = record.has_column(columns::APP_SPECTRAL_EFFICIENCY_DL);
        if has_app_bw && has_efficiency {
            return Ok(ProcessReport::skipped(self.name()));
        }

        // An existing application bandwidth column is an input, never a target.
        let app_bw: Vec<Option<f64>> = if has_app_bw {
            record.numeric_column(columns::APP_BANDWIDTH_DL)
        } else {
            let bandwidth = record.numeric_column(columns::BANDWIDTH_DL);
            let prb_util = record.numeric_column(columns::PRB_UTIL_DL);
            bandwidth
                .iter()
                .zip(&prb_util)
                .map(|(bw, util)| {
                    let (bw, util) = ((*bw)?, (*util)?);
                    (bw > 0.0 && util > 0.0).then(|| bw * util / 100.0)
                })
                .collect()
        };

        let mut missing = vec![false; record.len()];
        if !has_app_bw {
            for (flag, bw) in missing.iter_mut().zip(&app_bw) {
                *flag |= bw.is_none();
            }
            record.set_column(
                columns::APP_BANDWIDTH_DL,
                app_bw.iter().map(|bw| CellValue::from(*bw)).collect(),
            )?;
        }
        if !has_efficiency {
            let throughput = record.numeric_column(columns::APP_THROUGHPUT_DL);
            let efficiency: Vec<Option<f64>> = throughput
                .iter()
                .zip(&app_bw)
                .map(|(th, bw)| {
                    let (th, bw) = ((*th)?, (*bw)?);
                    (bw > 0.0).then(|| th / (bw * 1e6))
                })
                .collect();
            for (flag, eff) in missing.iter_mut().zip(&efficiency) {
                *flag |= eff.is_none();
            }
            record.set_column(
                columns::APP_SPECTRAL_EFFICIENCY_DL,
                efficiency.into_iter().map(CellValue::from).collect(),
            )?;
        }
        Ok(ProcessReport::derived(
            self.name(),
            missing.iter().filter(|m| **m).count(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Per-bandwidth throughput
// ---------------------------------------------------------------------------

/// LTE carrier bandwidths compared by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelBandwidth {
    Mhz10,
    Mhz15,
    Mhz20,
}

impl ChannelBandwidth {
    pub const ALL: [ChannelBandwidth; 3] = [
        ChannelBandwidth::Mhz10,
        ChannelBandwidth::Mhz15,
        ChannelBandwidth::Mhz20,
    ];

    pub fn mhz(self) -> f64 {
        match self {
            ChannelBandwidth::Mhz10 => 10.0,
            ChannelBandwidth::Mhz15 => 15.0,
            ChannelBandwidth::Mhz20 => 20.0,
        }
    }

    /// Name of the derived throughput column for this bandwidth.
    pub fn column(self) -> &'static str {
        match self {
            ChannelBandwidth::Mhz10 => columns::APP_THROUGHPUT_DL_10,
            ChannelBandwidth::Mhz15 => columns::APP_THROUGHPUT_DL_15,
            ChannelBandwidth::Mhz20 => columns::APP_THROUGHPUT_DL_20,
        }
    }

    /// Reported bandwidths drift slightly between tools; ±0.5 MHz is still the same carrier.
    fn matches(self, reported_mhz: f64) -> bool {
        (reported_mhz - self.mhz()).abs() < 0.5
    }
}

/// Application throughput scaled to full PRB utilization of one carrier
/// bandwidth: `eff · bandwidth · 1e6`. Samples recorded on another carrier
/// are marked missing. Expects [`ApplicationBandwidthPrbUtil`] to have run.
#[derive(Debug, Clone, Copy)]
pub struct ThroughputForBandwidth {
    pub bandwidth: ChannelBandwidth,
}

impl ColumnProcessor for ThroughputForBandwidth {
    fn name(&self) -> &'static str {
        match self.bandwidth {
            ChannelBandwidth::Mhz10 => "app_bw_prb_util_bw10",
            ChannelBandwidth::Mhz15 => "app_bw_prb_util_bw15",
            ChannelBandwidth::Mhz20 => "app_bw_prb_util_bw20",
        }
    }

    fn process(&self, record: &mut TraceRecord) -> Result<ProcessReport, PipelineError> {
        let target = self.bandwidth.column();
        if record.has_column(target) {
            return Ok(ProcessReport::skipped(self.name()));
        }

        let efficiency = record.numeric_column(columns::APP_SPECTRAL_EFFICIENCY_DL);
        let bandwidth = record.numeric_column(columns::BANDWIDTH_DL);

        let values: Vec<CellValue> = efficiency
            .iter()
            .zip(&bandwidth)
            .map(|(eff, bw)| match (eff, bw) {
                (Some(eff), Some(bw)) if self.bandwidth.matches(*bw) => {
                    CellValue::Float(eff * self.bandwidth.mhz() * 1e6)
                }
                _ => CellValue::Null,
            })
            .collect();

        let missing = values.iter().filter(|v| v.is_null()).count();
        record.set_column(target, values)?;
        Ok(ProcessReport::derived(self.name(), missing))
    }
}

// ---------------------------------------------------------------------------
// UE model → processor chain
// ---------------------------------------------------------------------------

/// Device used for the capture; decides which processors run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UeModel {
    /// Huawei E398, its firmware may log MAC throughput only.
    #[default]
    #[value(name = "e398")]
    E398,
    /// Huawei E3276.
    #[value(name = "e3276")]
    E3276,
}

impl UeModel {
    pub fn processor_chain(self) -> Vec<Box<dyn ColumnProcessor>> {
        let mut chain: Vec<Box<dyn ColumnProcessor>> = match self {
            UeModel::E398 => vec![Box::new(RenameMacToApplication)],
            UeModel::E3276 => Vec::new(),
        };
        chain.push(Box::new(ApplicationBandwidthPrbUtil));
        chain.extend(
            ChannelBandwidth::ALL
                .into_iter()
                .map(|bandwidth| Box::new(ThroughputForBandwidth { bandwidth }) as Box<dyn ColumnProcessor>),
        );
        chain
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Ordered processors applied uniformly to every record.
pub struct Pipeline {
    processors: Vec<Box<dyn ColumnProcessor>>,
}

impl Pipeline {
    pub fn new(processors: Vec<Box<dyn ColumnProcessor>>) -> Self {
        Self { processors }
    }

    pub fn for_ue(ue: UeModel) -> Self {
        Self::new(ue.processor_chain())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Run every processor on one record, in order.
    pub fn apply(&self, record: &mut TraceRecord) -> Result<Vec<ProcessReport>, PipelineError> {
        let mut reports = Vec::with_capacity(self.processors.len());
        for processor in &self.processors {
            let report = processor.process(record)?;
            debug!(
                "{}: {} (skipped: {}, missing rows: {}/{})",
                record.name,
                report.processor,
                report.skipped,
                report.missing,
                record.len()
            );
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn apply_all(&self, records: &mut [TraceRecord]) -> Result<(), PipelineError> {
        for record in records.iter_mut() {
            self.apply(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn radio_record() -> TraceRecord {
        record(
            "radio",
            &[
                (columns::APP_THROUGHPUT_DL, &[Some(20e6), Some(30e6), Some(10e6), Some(8e6)]),
                (columns::BANDWIDTH_DL, &[Some(10.0), Some(15.0), Some(20.0), Some(10.0)]),
                (columns::PRB_UTIL_DL, &[Some(50.0), Some(100.0), Some(25.0), None]),
            ],
        )
    }

    #[test]
    fn rename_only_when_legacy_present_and_target_absent() {
        let mut legacy = record("a", &[(columns::MAC_THROUGHPUT_DL, &[Some(1.0)])]);
        let report = RenameMacToApplication.process(&mut legacy).unwrap();
        assert!(!report.skipped);
        assert_eq!(legacy.column_names, vec![columns::APP_THROUGHPUT_DL]);

        let mut both = record(
            "b",
            &[
                (columns::MAC_THROUGHPUT_DL, &[Some(1.0)]),
                (columns::APP_THROUGHPUT_DL, &[Some(2.0)]),
            ],
        );
        assert!(RenameMacToApplication.process(&mut both).unwrap().skipped);
        assert_eq!(both.value(0, columns::APP_THROUGHPUT_DL).as_f64(), Some(2.0));
        assert!(both.has_column(columns::MAC_THROUGHPUT_DL));
    }

    #[test]
    fn rename_is_idempotent() {
        let mut once = record("a", &[(columns::MAC_THROUGHPUT_DL, &[Some(1.0), Some(2.0)])]);
        RenameMacToApplication.process(&mut once).unwrap();
        let mut twice = once.clone();
        assert!(RenameMacToApplication.process(&mut twice).unwrap().skipped);
        assert_eq!(once.column_names, twice.column_names);
        assert_eq!(once.samples, twice.samples);
    }

    #[test]
    fn generic_derivation_arithmetic() {
        let mut rec = radio_record();
        let report = ApplicationBandwidthPrbUtil.process(&mut rec).unwrap();
        assert_eq!(report.missing, 1);
        assert_eq!(
            rec.numeric_column(columns::APP_BANDWIDTH_DL),
            vec![Some(5.0), Some(15.0), Some(5.0), None]
        );
        assert_eq!(
            rec.numeric_column(columns::APP_SPECTRAL_EFFICIENCY_DL),
            vec![Some(4.0), Some(2.0), Some(2.0), None]
        );
    }

    #[test]
    fn per_bandwidth_keeps_only_matching_carrier() {
        let mut rec = radio_record();
        ApplicationBandwidthPrbUtil.process(&mut rec).unwrap();
        for bandwidth in ChannelBandwidth::ALL {
            ThroughputForBandwidth { bandwidth }.process(&mut rec).unwrap();
        }
        assert_eq!(
            rec.numeric_column(columns::APP_THROUGHPUT_DL_10),
            vec![Some(40e6), None, None, None]
        );
        assert_eq!(
            rec.numeric_column(columns::APP_THROUGHPUT_DL_15),
            vec![None, Some(30e6), None, None]
        );
        assert_eq!(
            rec.numeric_column(columns::APP_THROUGHPUT_DL_20),
            vec![None, None, Some(40e6), None]
        );
        assert_eq!(rec.len(), 4);
    }

    #[test]
    fn missing_inputs_mark_rows_missing_without_error() {
        let mut rec = record("bare", &[(columns::VELOCITY, &[Some(1.0), Some(2.0)])]);
        let reports = Pipeline::for_ue(UeModel::E3276).apply(&mut rec).unwrap();
        assert!(reports.iter().all(|r| r.skipped || r.missing == 2));
        assert_eq!(rec.numeric_column(columns::APP_THROUGHPUT_DL_20), vec![None, None]);
        assert!(rec.has_column(columns::VELOCITY));
    }

    #[test]
    fn derivation_is_noop_when_target_exists() {
        let mut rec = record(
            "pre",
            &[
                (columns::APP_THROUGHPUT_DL_10, &[Some(7.0)]),
                (columns::APP_SPECTRAL_EFFICIENCY_DL, &[Some(1.0)]),
                (columns::BANDWIDTH_DL, &[Some(10.0)]),
            ],
        );
        let report = ThroughputForBandwidth {
            bandwidth: ChannelBandwidth::Mhz10,
        }
        .process(&mut rec)
        .unwrap();
        assert!(report.skipped);
        assert_eq!(rec.value(0, columns::APP_THROUGHPUT_DL_10).as_f64(), Some(7.0));
    }

    #[test]
    fn generic_derivation_keeps_existing_application_bandwidth() {
        let mut rec = record(
            "partial",
            &[
                (columns::APP_BANDWIDTH_DL, &[Some(7.5)]),
                (columns::APP_THROUGHPUT_DL, &[Some(10e6)]),
            ],
        );
        let report = ApplicationBandwidthPrbUtil.process(&mut rec).unwrap();
        assert!(!report.skipped);
        assert_eq!(report.missing, 0);
        assert_eq!(rec.value(0, columns::APP_BANDWIDTH_DL).as_f64(), Some(7.5));
        let eff = rec.value(0, columns::APP_SPECTRAL_EFFICIENCY_DL).as_f64().unwrap();
        assert!((eff - 10e6 / 7.5e6).abs() < 1e-12);
    }

    #[test]
    fn generic_derivation_keeps_existing_efficiency() {
        let mut rec = radio_record();
        rec.set_column(
            columns::APP_SPECTRAL_EFFICIENCY_DL,
            vec![CellValue::Float(9.0); rec.len()],
        )
        .unwrap();
        ApplicationBandwidthPrbUtil.process(&mut rec).unwrap();
        assert!(rec.has_column(columns::APP_BANDWIDTH_DL));
        assert!((0..rec.len())
            .all(|row| rec.value(row, columns::APP_SPECTRAL_EFFICIENCY_DL).as_f64() == Some(9.0)));

        let report = ApplicationBandwidthPrbUtil.process(&mut rec).unwrap();
        assert!(report.skipped);
    }

    #[test]
    fn ue_chains() {
        assert_eq!(
            Pipeline::for_ue(UeModel::E398).names(),
            vec![
                "rename_mac_to_app",
                "app_bw_prb_util",
                "app_bw_prb_util_bw10",
                "app_bw_prb_util_bw15",
                "app_bw_prb_util_bw20"
            ]
        );
        assert!(!Pipeline::for_ue(UeModel::E3276)
            .names()
            .contains(&"rename_mac_to_app"));
    }

    #[test]
    fn e398_pipeline_always_yields_application_throughput() {
        let mut recs = vec![
            record("mac", &[(columns::MAC_THROUGHPUT_DL, &[Some(1.0)])]),
            record("app", &[(columns::APP_THROUGHPUT_DL, &[Some(2.0)])]),
        ];
        Pipeline::for_ue(UeModel::E398).apply_all(&mut recs).unwrap();
        assert!(recs.iter().all(|r| r.has_column(columns::APP_THROUGHPUT_DL)));

        let mut legacy = vec![record("mac", &[(columns::MAC_THROUGHPUT_DL, &[Some(1.0)])])];
        Pipeline::for_ue(UeModel::E3276).apply_all(&mut legacy).unwrap();
        assert!(!legacy[0].has_column(columns::APP_THROUGHPUT_DL));
    }
}
