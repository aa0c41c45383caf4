use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Largest accepted figure edge in pixels.
pub const MAX_SIDE_PX: f64 = 20_000.0;

/// Figure geometry and typography. Sizes are given in points, as in the
/// run scripts' matplotlib setup, and converted with the figure's dpi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Edge length of the square figure.
    pub fig_size_inches: f64,
    pub dpi: u32,
    pub line_width_pt: f64,
    pub font_size_pt: f64,
    pub grid: bool,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            fig_size_inches: 6.0,
            dpi: 500,
            line_width_pt: 1.5,
            font_size_pt: 10.0,
            grid: true,
        }
    }
}

impl PlotStyle {
    /// Read a style from a JSON object; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading style file {}", path.display()))?;
        let style: PlotStyle = serde_json::from_str(&text)
            .with_context(|| format!("parsing style file {}", path.display()))?;
        Ok(style)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fig_size_inches.is_finite() && self.fig_size_inches > 0.0) {
            bail!("figure size must be positive, got {}", self.fig_size_inches);
        }
        if self.dpi == 0 {
            bail!("dpi must be positive");
        }
        let side = self.fig_size_inches * f64::from(self.dpi);
        if side > MAX_SIDE_PX {
            bail!(
                "figure of {} in at {} dpi is {side:.0} px wide, limit is {MAX_SIDE_PX} px",
                self.fig_size_inches,
                self.dpi
            );
        }
        if !(self.line_width_pt >= 0.0 && self.font_size_pt > 0.0) {
            bail!(
                "invalid line width {} / font size {}",
                self.line_width_pt,
                self.font_size_pt
            );
        }
        Ok(())
    }

    /// Image size in pixels (square).
    pub fn pixel_size(&self) -> (u32, u32) {
        let side = (self.fig_size_inches * f64::from(self.dpi)).round().max(1.0) as u32;
        (side, side)
    }

    /// Convert points to pixels.
    pub fn px(&self, pt: f64) -> f64 {
        pt * f64::from(self.dpi) / 72.0
    }
}
