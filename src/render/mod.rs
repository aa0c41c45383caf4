/// Figure rendering: `DriftPlot` → PNG on disk.
pub mod plot;
pub mod style;
