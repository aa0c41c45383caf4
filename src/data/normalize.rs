use super::error::DataError;
use super::model::{DriftPlot, IntegralTable, Quantity, Scale, Series, TIME_AXIS_LABEL};

// ---------------------------------------------------------------------------
// Time axis
// ---------------------------------------------------------------------------

/// Shift the time stamps so the first sample sits at zero.
pub fn time_since_init(time: &[f64]) -> Vec<f64> {
    let Some(&t0) = time.first() else {
        return Vec::new();
    };
    time.iter().map(|&t| t - t0).collect()
}

/// Visible x interval: the full extent of the shifted time axis.
///
/// A single sample gives an empty interval, which is widened to one second.
pub fn x_range(shifted_time: &[f64]) -> (f64, f64) {
    let min = shifted_time.iter().copied().fold(f64::INFINITY, f64::min);
    let max = shifted_time.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max - min <= 0.0 {
        (min, min + 1.0)
    } else {
        (min, max)
    }
}

// ---------------------------------------------------------------------------
// Normalizations
// ---------------------------------------------------------------------------

/// `v[i] / v[0]`.
pub fn relative_to_initial(values: &[f64], what: &str) -> Result<Vec<f64>, DataError> {
    let v0 = initial(values, what)?;
    Ok(values.iter().map(|&v| v / v0).collect())
}

/// Change since the first sample in percent of `total_begin`.
pub fn percent_of_total(values: &[f64], total_begin: f64) -> Vec<f64> {
    let Some(&v0) = values.first() else {
        return Vec::new();
    };
    values
        .iter()
        .map(|&v| 100.0 * (v - v0) / total_begin)
        .collect()
}

fn initial(values: &[f64], what: &str) -> Result<f64, DataError> {
    match values.first() {
        Some(&v0) if v0 != 0.0 => Ok(v0),
        _ => Err(DataError::ZeroReference {
            what: what.to_string(),
        }),
    }
}

/// Kinetic, potential and internal energy change plus the change of their
/// sum, all in percent of the initial total energy.
///
/// Expects columns 1..=3 to hold kinetic, potential and internal energy.
pub fn energy_breakdown(table: &IntegralTable) -> Result<Vec<Series>, DataError> {
    let kinetic = table.column(1);
    let potential = table.column(2);
    let internal = table.column(3);

    let total: Vec<f64> = kinetic
        .iter()
        .zip(&potential)
        .zip(&internal)
        .map(|((k, p), i)| k + p + i)
        .collect();
    let total_begin = initial(&total, "total energy")?;

    let total_change: Vec<f64> = total
        .iter()
        .map(|&e| 100.0 * (e - total_begin) / total_begin)
        .collect();

    Ok(vec![
        labelled("kinetic", percent_of_total(&kinetic, total_begin)),
        labelled("potential", percent_of_total(&potential, total_begin)),
        labelled("internal", percent_of_total(&internal, total_begin)),
        labelled("total", total_change),
    ])
}

fn labelled(label: &str, values: Vec<f64>) -> Series {
    Series {
        label: Some(label.to_string()),
        values,
    }
}

// ---------------------------------------------------------------------------
// Plot assembly
// ---------------------------------------------------------------------------

/// Build the figure description for one quantity.
pub fn drift_plot(quantity: Quantity, table: &IntegralTable) -> Result<DriftPlot, DataError> {
    let time = time_since_init(&table.time());

    let (series, scale) = match quantity {
        Quantity::DryMass | Quantity::Entropy => (
            vec![Series {
                label: None,
                values: relative_to_initial(&table.column(1), quantity.title())?,
            }],
            Scale::Relative,
        ),
        Quantity::Energy => (energy_breakdown(table)?, Scale::Percent),
    };

    Ok(DriftPlot {
        title: quantity.title().to_string(),
        x_label: TIME_AXIS_LABEL.to_string(),
        y_label: quantity.y_label().to_string(),
        x_range: x_range(&time),
        time,
        series,
        scale,
    })
}

/// Drift at the last sample of every series, labelled by series name (or
/// the plot title): `value - 1` for relative plots, the percentage as is.
pub fn final_drift(plot: &DriftPlot) -> Vec<(String, f64)> {
    plot.series
        .iter()
        .filter_map(|s| {
            let last = *s.values.last()?;
            let name = s.label.clone().unwrap_or_else(|| plot.title.clone());
            Some((name, plot.scale.drift(last)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[f64]]) -> IntegralTable {
        IntegralTable::from_rows(rows.iter().map(|r| r.to_vec()).collect())
    }

    #[test]
    fn time_axis_starts_at_zero() {
        assert_eq!(time_since_init(&[100.0, 400.0, 700.0]), vec![0.0, 300.0, 600.0]);
        assert_eq!(x_range(&[0.0, 300.0, 600.0]), (0.0, 600.0));
    }

    #[test]
    fn single_sample_range_is_widened() {
        assert_eq!(x_range(&[0.0]), (0.0, 1.0));
        assert_eq!(x_range(&[]), (0.0, 1.0));
    }

    #[test]
    fn dry_mass_relative_to_first_row() {
        let t = table(&[&[10.0, 4.0], &[20.0, 5.0], &[30.0, 2.0]]);
        let plot = drift_plot(Quantity::DryMass, &t).unwrap();
        assert_eq!(plot.time, vec![0.0, 10.0, 20.0]);
        assert_eq!(plot.x_range, (0.0, 20.0));
        assert_eq!(plot.series.len(), 1);
        assert_eq!(plot.series[0].values, vec![1.0, 1.25, 0.5]);
        assert!(!plot.has_legend());
        assert_eq!(plot.title, "Dry mass");
        assert_eq!(plot.x_label, "time since init / s");
    }

    #[test]
    fn entropy_uses_only_first_quantity_column() {
        let t = table(&[&[0.0, 8.0, 99.0], &[1.0, 6.0, 0.0], &[2.0, 10.0, 1.0]]);
        let plot = drift_plot(Quantity::Entropy, &t).unwrap();
        assert_eq!(plot.series[0].values, vec![1.0, 0.75, 1.25]);
    }

    #[test]
    fn zero_initial_value_is_rejected() {
        let t = table(&[&[0.0, 0.0], &[1.0, 1.0]]);
        assert_eq!(
            drift_plot(Quantity::DryMass, &t).unwrap_err(),
            DataError::ZeroReference {
                what: "Dry mass".into()
            }
        );
    }

    #[test]
    fn energy_breakdown_by_hand() {
        // total_begin = 10 + 20 + 70 = 100
        let t = table(&[
            &[0.0, 10.0, 20.0, 70.0],
            &[60.0, 12.0, 19.0, 70.0],
            &[120.0, 9.0, 20.0, 72.0],
        ]);
        let plot = drift_plot(Quantity::Energy, &t).unwrap();
        let labels: Vec<_> = plot.series.iter().map(|s| s.label.as_deref().unwrap()).collect();
        assert_eq!(labels, ["kinetic", "potential", "internal", "total"]);
        assert_eq!(plot.series[0].values, vec![0.0, 2.0, -1.0]);
        assert_eq!(plot.series[1].values, vec![0.0, -1.0, 0.0]);
        assert_eq!(plot.series[2].values, vec![0.0, 0.0, 2.0]);
        assert_eq!(plot.series[3].values, vec![0.0, 1.0, 1.0]);
        assert!(plot.has_legend());
        assert_eq!(plot.x_range, (0.0, 120.0));
    }

    #[test]
    fn energy_total_is_sum_of_components() {
        let t = table(&[
            &[0.0, 1.3e17, 4.1e20, 7.7e20],
            &[3600.0, 1.7e17, 4.09e20, 7.71e20],
            &[7200.0, 2.2e17, 4.12e20, 7.68e20],
            &[10800.0, 1.9e17, 4.1e20, 7.7e20],
        ]);
        let series = energy_breakdown(&t).unwrap();
        for i in 0..t.len() {
            let sum = series[0].values[i] + series[1].values[i] + series[2].values[i];
            assert!((series[3].values[i] - sum).abs() < 1e-9, "sample {i}");
        }
        assert!(series.iter().all(|s| s.values[0] == 0.0));
    }

    #[test]
    fn final_drift_reports_last_values() {
        let t = table(&[&[0.0, 2.0], &[1.0, 3.0]]);
        let plot = drift_plot(Quantity::Entropy, &t).unwrap();
        assert_eq!(final_drift(&plot), vec![("Entropy".to_string(), 0.5)]);
    }

    #[test]
    fn final_drift_keeps_tiny_relative_change() {
        let t = table(&[&[0.0, 5.1e18], &[600.0, 5.1e18 * (1.0 + 1e-9)]]);
        let plot = drift_plot(Quantity::DryMass, &t).unwrap();
        let drift = final_drift(&plot)[0].1;
        assert!((drift - 1e-9).abs() < 1e-14, "drift {drift:e}");
    }

    #[test]
    fn energy_drift_is_the_percentage() {
        let t = table(&[&[0.0, 10.0, 20.0, 70.0], &[1.0, 12.0, 19.0, 70.0]]);
        let plot = drift_plot(Quantity::Energy, &t).unwrap();
        assert_eq!(plot.scale, Scale::Percent);
        let drift = final_drift(&plot);
        assert_eq!(drift[0], ("kinetic".to_string(), 2.0));
        assert_eq!(drift[3], ("total".to_string(), 1.0));
    }
}
