use std::path::PathBuf;

use clap::{Parser, ValueHint};

use crate::analysis::AnalysisOptions;
use crate::data::filter::MobilityFilter;
use crate::data::processor::UeModel;

/// Plot drive test data.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// List all data-sets of the library and exit
    #[arg(short, long)]
    pub list: bool,

    /// Keep samples with zero velocity
    #[arg(short = 's', long = "static")]
    pub keep_static: bool,

    /// Select a particular data-set to display
    #[arg(short = 'd', long)]
    pub select: Option<usize>,

    /// Library to pull data from (a directory, or a name under $DRIVE_TEST_LIBRARY_ROOT)
    pub library: String,

    /// What UE was used
    #[arg(short, long, value_enum, default_value_t = UeModel::E398)]
    pub ue: UeModel,

    /// Print figure to file (PNG)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub print: Option<PathBuf>,

    /// Do not open the interactive viewer
    #[arg(long)]
    pub no_window: bool,
}

impl Cli {
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            ue: self.ue,
            mobility: MobilityFilter::from_keep_static(self.keep_static),
            selection: self.select,
        }
    }

    /// Window title / status line text.
    pub fn title(&self) -> String {
        match self.select {
            Some(index) => format!("{} #{index}", self.library),
            None => format!("{} (all data-sets)", self.library),
        }
    }
}
