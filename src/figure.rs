// ---------------------------------------------------------------------------
// Plot collaborator: what the summary stage hands to a renderer
// ---------------------------------------------------------------------------

/// A labelled series of finite values (missing samples already dropped).
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

/// Receives distribution plots. Implementations own the figure lifecycle.
pub trait ThroughputPlotter {
    /// Three empirical CDFs overlaid on one axis.
    fn plot_ecdf_triplet(&mut self, series: [Series; 3], x_domain: &[f64], unit: &str);

    /// A single kernel density estimate.
    fn plot_density(&mut self, series: Series, x_domain: &[f64], unit: &str);
}

// ---------------------------------------------------------------------------
// Retained figure
// ---------------------------------------------------------------------------

/// One panel of the figure, in the order it was plotted.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    EcdfTriplet {
        series: [Series; 3],
        x_domain: Vec<f64>,
        unit: String,
    },
    Density {
        series: Series,
        x_domain: Vec<f64>,
        unit: String,
    },
}

/// Records plot calls so the same figure can be shown on screen and exported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn ecdf_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels
            .iter()
            .filter(|p| matches!(p, Panel::EcdfTriplet { .. }))
    }

    pub fn density_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels
            .iter()
            .filter(|p| matches!(p, Panel::Density { .. }))
    }
}

impl ThroughputPlotter for Figure {
    fn plot_ecdf_triplet(&mut self, series: [Series; 3], x_domain: &[f64], unit: &str) {
        self.panels.push(Panel::EcdfTriplet {
            series,
            x_domain: x_domain.to_vec(),
            unit: unit.to_string(),
        });
    }

    fn plot_density(&mut self, series: Series, x_domain: &[f64], unit: &str) {
        self.panels.push(Panel::Density {
            series,
            x_domain: x_domain.to_vec(),
            unit: unit.to_string(),
        });
    }
}
