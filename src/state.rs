use std::path::Path;

use crate::analysis::Analysis;
use crate::export;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// What is being shown, e.g. the library name and selected data-set.
    pub title: String,

    /// Result of the analysis run (table, statistics, figure).
    pub analysis: Analysis,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Whether the last status message reports a failure.
    pub status_is_error: bool,
}

impl AppState {
    pub fn new(title: impl Into<String>, analysis: Analysis) -> Self {
        Self {
            title: title.into(),
            analysis,
            status_message: None,
            status_is_error: false,
        }
    }

    /// Export the current figure and report the outcome in the status line.
    pub fn save_figure(&mut self, path: &Path) {
        match export::save_png(&self.analysis.figure, path) {
            Ok(()) => {
                self.status_message = Some(format!("Saved {}", path.display()));
                self.status_is_error = false;
            }
            Err(e) => {
                log::error!("Failed to save figure: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.status_is_error = true;
            }
        }
    }

    /// Samples in the aggregated table.
    pub fn sample_count(&self) -> usize {
        self.analysis.table.num_rows()
    }
}
