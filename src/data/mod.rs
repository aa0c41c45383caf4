/// Data layer: table types, loading, and normalization.
///
/// Architecture:
/// ```text
///  <data_dir>/dry_mass | entropy | energy
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → IntegralTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ IntegralTable │  time column + quantity columns
///   └──────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  shift time, relative / percent series → DriftPlot
///   └───────────┘
/// ```

pub mod error;
pub mod loader;
pub mod model;
pub mod normalize;
