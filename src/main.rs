mod cli;
mod color;
mod data;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use data::loader::load_quantity;
use data::model::{Quantity, Scale};
use data::normalize::{drift_plot, final_drift};
use render::plot::render_png;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let written = run(&cli).inspect_err(|e| log::error!("{e:#}"))?;
    log::info!("{} figure(s) written for run {}", written.len(), cli.run_id);
    Ok(())
}

/// Load, normalize and plot every requested quantity. Stops at the first
/// failure.
fn run(cli: &Cli) -> Result<Vec<PathBuf>> {
    let style = cli.plot_style()?;
    let requested: Vec<Quantity> = Quantity::ALL
        .into_iter()
        .filter(|&q| cli.enabled(q))
        .collect();

    if requested.is_empty() {
        log::info!("No integral plots requested");
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(&cli.fig_save_path)
        .with_context(|| format!("creating {}", cli.fig_save_path.display()))?;

    let mut written = Vec::with_capacity(requested.len());
    for quantity in requested {
        let table = load_quantity(&cli.output_dir, quantity)?;
        let plot = drift_plot(quantity, &table).with_context(|| format!("normalizing {quantity}"))?;

        for (name, drift) in final_drift(&plot) {
            match plot.scale {
                Scale::Relative => log::info!(
                    "{name}: relative drift {drift:+.6e} at t = {:.0} s",
                    plot.x_range.1
                ),
                Scale::Percent => log::info!(
                    "{name}: {drift:+.6e} % of initial total at t = {:.0} s",
                    plot.x_range.1
                ),
            }
        }

        let path = cli.output_path(quantity);
        render_png(&plot, &style, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::data::error::DataError;

    fn write_run(dir: &Path) {
        fs::write(dir.join("dry_mass"), "0\t5.0\n300\t5.0\n600\t5.000001\n").unwrap();
        fs::write(dir.join("entropy"), "0\t2.0\n300\t2.1\n600\t2.2\n").unwrap();
        fs::write(
            dir.join("energy"),
            "0\t1.0\t4.0\t5.0\n300\t1.2\t3.9\t4.9\n600\t1.1\t4.0\t5.0\n",
        )
        .unwrap();
    }

    fn cli(figs: &Path, data: &Path, flags: [&str; 3]) -> Cli {
        Cli::try_parse_from([
            "integral-plots",
            figs.to_str().unwrap(),
            data.to_str().unwrap(),
            flags[0],
            flags[1],
            flags[2],
            "test_run",
            "--dpi",
            "40",
            "--fig-size",
            "5",
        ])
        .unwrap()
    }

    #[test]
    fn writes_all_three_figures() {
        let data = tempfile::tempdir().unwrap();
        let figs = tempfile::tempdir().unwrap();
        write_run(data.path());
        let figs_dir = figs.path().join("figs");

        let written = run(&cli(&figs_dir, data.path(), ["1", "1", "1"])).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "test_run_dry_mass_integral.png",
                "test_run_entropy_integral.png",
                "test_run_energy_integrals.png"
            ]
        );
        for path in &written {
            let img = image::open(path).unwrap();
            assert_eq!((img.width(), img.height()), (200, 200));
        }
    }

    #[test]
    fn disabled_quantities_are_not_read() {
        let data = tempfile::tempdir().unwrap();
        let figs = tempfile::tempdir().unwrap();
        // only the entropy file exists
        fs::write(data.path().join("entropy"), "0\t2.0\n1\t2.0\n").unwrap();

        let written = run(&cli(figs.path(), data.path(), ["0", "1", "0"])).unwrap();
        assert_eq!(written, vec![figs.path().join("test_run_entropy_integral.png")]);
        assert!(written[0].exists());
    }

    #[test]
    fn nothing_requested_writes_nothing() {
        let data = tempfile::tempdir().unwrap();
        let figs = tempfile::tempdir().unwrap();
        let written = run(&cli(figs.path(), data.path(), ["0", "0", "0"])).unwrap();
        assert!(written.is_empty());
        assert_eq!(fs::read_dir(figs.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_file_stops_the_run() {
        let data = tempfile::tempdir().unwrap();
        let figs = tempfile::tempdir().unwrap();
        let err = run(&cli(figs.path(), data.path(), ["1", "0", "0"])).unwrap_err();
        assert!(format!("{err:#}").contains("dry_mass"));
    }

    #[test]
    fn zero_total_energy_is_reported() {
        let data = tempfile::tempdir().unwrap();
        let figs = tempfile::tempdir().unwrap();
        fs::write(data.path().join("energy"), "0\t1\t-1\t0\n1\t1\t-1\t0\n").unwrap();
        let err = run(&cli(figs.path(), data.path(), ["0", "0", "1"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::ZeroReference { .. })
        ));
    }
}
