use std::fmt;

// ---------------------------------------------------------------------------
// Quantity – the three integrals written by the model
// ---------------------------------------------------------------------------

/// One of the global integrals the simulation writes out over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    DryMass,
    Entropy,
    Energy,
}

impl Quantity {
    /// Processing order of a run.
    pub const ALL: [Quantity; 3] = [Quantity::DryMass, Quantity::Entropy, Quantity::Energy];

    /// Name of the input file inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Quantity::DryMass => "dry_mass",
            Quantity::Entropy => "entropy",
            Quantity::Energy => "energy",
        }
    }

    /// Suffix appended to the run id to build the image file name.
    pub fn output_suffix(self) -> &'static str {
        match self {
            Quantity::DryMass => "_dry_mass_integral.png",
            Quantity::Entropy => "_entropy_integral.png",
            Quantity::Energy => "_energy_integrals.png",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Quantity::DryMass => "Dry mass",
            Quantity::Entropy => "Entropy",
            Quantity::Energy => "Energy",
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            Quantity::DryMass | Quantity::Entropy => "relative to init value",
            Quantity::Energy => "relative to init value of total energy / %",
        }
    }

    /// Time column plus the quantity columns that are read.
    pub fn min_columns(self) -> usize {
        match self {
            Quantity::DryMass | Quantity::Entropy => 2,
            // kinetic, potential, internal
            Quantity::Energy => 4,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

pub const TIME_AXIS_LABEL: &str = "time since init / s";

// ---------------------------------------------------------------------------
// IntegralTable – one parsed input file
// ---------------------------------------------------------------------------

/// A rectangular numeric table. Column 0 is the time stamp, every other
/// column a quantity sampled at that time. Row 0 is the initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegralTable {
    /// Row-major values; every row has `width` entries.
    rows: Vec<Vec<f64>>,
    width: usize,
}

impl IntegralTable {
    /// Wrap already validated rows. Callers guarantee equal row lengths.
    pub(crate) fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        debug_assert!(rows.iter().all(|r| r.len() == width));
        IntegralTable { rows, width }
    }

    /// Number of samples (rows).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, time included.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Time stamps (column 0).
    pub fn time(&self) -> Vec<f64> {
        self.column(0)
    }

    /// Values of column `index` as numbered in the file (0 = time).
    ///
    /// Panics if `index >= width()`; the loader checks widths per quantity.
    pub fn column(&self, index: usize) -> Vec<f64> {
        assert!(index < self.width, "column {index} out of {}", self.width);
        self.rows.iter().map(|r| r[index]).collect()
    }
}

// ---------------------------------------------------------------------------
// Plot description
// ---------------------------------------------------------------------------

/// A y-series aligned with the plot's time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend label; `None` for single-line plots without a legend.
    pub label: Option<String>,
    pub values: Vec<f64>,
}

/// How the y values of a figure relate to the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Ratio to the initial value; no drift is 1.
    Relative,
    /// Change in percent of an initial total; no drift is 0.
    Percent,
}

impl Scale {
    /// Deviation of a plotted value from the undisturbed state.
    pub fn drift(self, value: f64) -> f64 {
        match self {
            Scale::Relative => value - 1.0,
            Scale::Percent => value,
        }
    }
}

/// Everything needed to draw one diagnostic figure.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Time since the first sample.
    pub time: Vec<f64>,
    pub series: Vec<Series>,
    pub scale: Scale,
    /// Visible x interval `(min, max)`.
    pub x_range: (f64, f64),
}

impl DriftPlot {
    /// Whether the figure needs a legend.
    pub fn has_legend(&self) -> bool {
        self.series.iter().any(|s| s.label.is_some())
    }
}
