use std::path::PathBuf;

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueHint};

use crate::data::model::Quantity;
use crate::render::style::PlotStyle;

/// Arguments in the order the model's run scripts pass them.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plot dry mass, entropy and energy drift of a model run"
)]
pub struct Cli {
    /// Directory the figures are written to
    #[arg(value_hint = ValueHint::DirPath)]
    pub fig_save_path: PathBuf,

    /// Directory holding the `dry_mass`, `entropy` and `energy` files
    #[arg(value_hint = ValueHint::DirPath)]
    pub output_dir: PathBuf,

    /// Plot the dry mass integral (1/0)
    #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub dry_mass: bool,

    /// Plot the entropy integral (1/0)
    #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub entropy: bool,

    /// Plot the energy integrals (1/0)
    #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub energy: bool,

    /// Run identifier, prefix of every figure name
    pub run_id: String,

    /// Figure resolution, overrides the style file
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Figure edge length in inches, overrides the style file
    #[arg(long)]
    pub fig_size: Option<f64>,

    /// JSON style file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub style: Option<PathBuf>,
}

impl Cli {
    pub fn enabled(&self, quantity: Quantity) -> bool {
        match quantity {
            Quantity::DryMass => self.dry_mass,
            Quantity::Entropy => self.entropy,
            Quantity::Energy => self.energy,
        }
    }

    /// `<fig_save_path>/<run_id><suffix>`
    pub fn output_path(&self, quantity: Quantity) -> PathBuf {
        self.fig_save_path
            .join(format!("{}{}", self.run_id, quantity.output_suffix()))
    }

    /// Style file (or defaults) with the command-line overrides applied.
    pub fn plot_style(&self) -> Result<PlotStyle> {
        let mut style = match &self.style {
            Some(path) => PlotStyle::from_json_file(path)?,
            None => PlotStyle::default(),
        };
        if let Some(dpi) = self.dpi {
            style.dpi = dpi;
        }
        if let Some(size) = self.fig_size {
            style.fig_size_inches = size;
        }
        style.validate()?;
        Ok(style)
    }
}
