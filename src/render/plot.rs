use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Once;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use plotters_backend::DrawingErrorKind;
use thiserror::Error;

use super::style::PlotStyle;
use crate::color::generate_palette;
use crate::data::model::DriftPlot;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
enum RenderError {
    #[error("font backend unavailable: {0}")]
    Font(String),
    #[error("drawing panicked: {0}")]
    Panic(String),
    #[error("drawing failed: {0}")]
    Drawing(String),
}

impl RenderError {
    /// Failures that a redraw without text can get around.
    fn is_text_failure(&self) -> bool {
        matches!(self, RenderError::Font(_) | RenderError::Panic(_))
    }
}

fn classify<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    match err {
        DrawingAreaErrorKind::BackendError(DrawingErrorKind::FontError(e)) => {
            RenderError::Font(e.to_string())
        }
        other => RenderError::Drawing(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Panic isolation
// ---------------------------------------------------------------------------

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Run `f`, turning a panic into [`RenderError::Panic`]. While `f` runs the
/// panic message goes to the debug log instead of stderr; other threads keep
/// the previous hook's behaviour.
fn guarded<T>(f: impl FnOnce() -> T) -> Result<T, RenderError> {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if QUIET_PANICS.with(Cell::get) {
                log::debug!("{info}");
            } else {
                previous(info);
            }
        }));
    });

    QUIET_PANICS.with(|quiet| quiet.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    QUIET_PANICS.with(|quiet| quiet.set(false));

    outcome.map_err(|payload| RenderError::Panic(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Draw `plot` and write it to `path` as a PNG.
///
/// Machines without a usable font still get an image: the chart is redrawn
/// without title, tick labels and legend.
pub fn render_png(plot: &DriftPlot, style: &PlotStyle, path: &Path) -> Result<()> {
    let (width, height) = style.pixel_size();

    let buffer = match draw_to_buffer(plot, style, true) {
        Ok(buffer) => buffer,
        Err(err) if err.is_text_failure() => {
            log::warn!("{err}; drawing '{}' without text", plot.title);
            draw_to_buffer(plot, style, false)
                .with_context(|| format!("drawing '{}'", plot.title))?
        }
        Err(err) => return Err(err).with_context(|| format!("drawing '{}'", plot.title)),
    };

    let image = image::RgbImage::from_raw(width, height, buffer)
        .context("bitmap size does not match figure size")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;

    log::info!("Wrote {} ({width}x{height})", path.display());
    Ok(())
}

/// Render into a packed RGB buffer.
fn draw_to_buffer(plot: &DriftPlot, style: &PlotStyle, text: bool) -> Result<Vec<u8>, RenderError> {
    let (width, height) = style.pixel_size();
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| RenderError::Drawing(format!("{width}x{height} bitmap is too large")))?;
    let mut buffer = vec![0u8; len];

    let drawn = guarded(|| {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, plot, style, text)?;
        root.present()
    })?;
    drawn.map_err(classify)?;
    Ok(buffer)
}

// ---------------------------------------------------------------------------
// Axis labels and legend placement
// ---------------------------------------------------------------------------

/// Decimals needed to tell apart ticks spread over `span`: one digit below
/// the span's leading digit. Capped at what an `f64` can resolve.
pub fn tick_decimals(span: f64) -> usize {
    if !(span.is_finite() && span > 0.0) {
        return 1;
    }
    ((-span.log10()).ceil() + 1.0).clamp(0.0, 15.0) as usize
}

pub fn format_tick(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendCorner {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

impl LegendCorner {
    /// Tie-break order, matplotlib's "best" favours the upper right.
    const PREFERENCE: [LegendCorner; 4] = [
        LegendCorner::UpperRight,
        LegendCorner::UpperLeft,
        LegendCorner::LowerLeft,
        LegendCorner::LowerRight,
    ];

    fn position(self) -> SeriesLabelPosition {
        match self {
            LegendCorner::UpperRight => SeriesLabelPosition::UpperRight,
            LegendCorner::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendCorner::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendCorner::LowerRight => SeriesLabelPosition::LowerRight,
        }
    }
}

/// The corner whose quarter of the plot area holds the fewest samples.
pub fn legend_corner(plot: &DriftPlot, (y_min, y_max): (f64, f64)) -> LegendCorner {
    let x_mid = 0.5 * (plot.x_range.0 + plot.x_range.1);
    let y_mid = 0.5 * (y_min + y_max);

    let mut counts = [0usize; 4];
    for series in &plot.series {
        for (&t, &v) in plot.time.iter().zip(&series.values) {
            if !v.is_finite() {
                continue;
            }
            let corner = match (t >= x_mid, v >= y_mid) {
                (true, true) => LegendCorner::UpperRight,
                (false, true) => LegendCorner::UpperLeft,
                (false, false) => LegendCorner::LowerLeft,
                (true, false) => LegendCorner::LowerRight,
            };
            counts[corner as usize] += 1;
        }
    }

    LegendCorner::PREFERENCE
        .into_iter()
        .zip(counts)
        .min_by_key(|&(_, n)| n)
        .map(|(corner, _)| corner)
        .unwrap_or(LegendCorner::UpperRight)
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

fn draw_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    plot: &DriftPlot,
    style: &PlotStyle,
    text: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let font_px = style.px(style.font_size_pt);
    let font = FontDesc::new(FontFamily::SansSerif, font_px, FontStyle::Normal);
    let (x_min, x_max) = plot.x_range;
    let (y_min, y_max) = y_range(plot);
    let decimals = tick_decimals(y_max - y_min);
    let y_tick = move |v: &f64| format_tick(*v, decimals);

    let mut builder = ChartBuilder::on(root);
    builder.margin(style.px(14.0).round() as u32);
    if text {
        // sign, leading digits, point and decimals
        let y_label_chars = decimals as f64 + 3.0;
        builder
            .caption(
                &plot.title,
                FontDesc::new(FontFamily::SansSerif, font_px * 1.2, FontStyle::Normal),
            )
            .x_label_area_size((font_px * 3.5).round() as u32)
            .y_label_area_size((font_px * (2.5 + 0.6 * y_label_chars)).round() as u32);
    }
    let mut chart = builder.build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_labels(8).y_labels(8);
    if !style.grid {
        mesh.disable_mesh();
    }
    if text {
        mesh.x_desc(plot.x_label.as_str())
            .y_desc(plot.y_label.as_str())
            .y_label_formatter(&y_tick)
            .label_style(font.clone())
            .axis_desc_style(font.clone());
    }
    mesh.draw()?;

    let stroke = style.px(style.line_width_pt).round().max(1.0) as u32;
    let legend_len = (font_px * 2.0).round() as i32;
    let colors = generate_palette(plot.series.len());

    for (series, color) in plot.series.iter().zip(colors) {
        let line_style = color.stroke_width(stroke);
        let points = plot
            .time
            .iter()
            .copied()
            .zip(series.values.iter().copied());
        let anno = chart.draw_series(LineSeries::new(points, line_style))?;
        if let Some(label) = &series.label {
            anno.label(label.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + legend_len, y)], line_style)
            });
        }
    }

    if text && plot.has_legend() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.3))
            .label_font(font)
            .position(legend_corner(plot, (y_min, y_max)).position())
            .draw()?;
    }

    Ok(())
}

/// Vertical extent of all series, padded by 5 % of the span. A flat set of
/// values is padded by 5 % of its magnitude (0.05 around zero).
pub fn y_range(plot: &DriftPlot) -> (f64, f64) {
    let values = plot
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .filter(|v| v.is_finite());
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return (-0.05, 0.05);
    }

    let span = max - min;
    let pad = if span > 0.0 {
        0.05 * span
    } else if max != 0.0 {
        0.05 * max.abs()
    } else {
        0.05
    };
    (min - pad, max + pad)
}
