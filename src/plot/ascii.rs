//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic output (golden tests compare the
//! exact string).
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-` line
//! - optional highlights: `^` (front ahead of model), `v` (behind)

use std::collections::HashSet;

use crate::domain::{ModelFile, SampleSeries};
use crate::fit::FittedModel;
use crate::report::Deviations;

/// Render observations and the fitted curve over the series' time range.
pub fn render_ascii_plot(
    series: &SampleSeries,
    model: &FittedModel,
    width: usize,
    height: usize,
    deviations: Option<&Deviations>,
) -> String {
    let (t_min, t_max) = time_range(&series.times).unwrap_or((0.0, 1.0));
    let curve = sample_curve(model, t_min, t_max, width.max(2));
    let points: Vec<(f64, f64)> = series.iter().collect();
    render_plot(&points, &curve, t_min, t_max, width, height, deviations)
}

/// Render the precomputed curve of a saved model file (no observations).
pub fn render_ascii_plot_from_model_file(file: &ModelFile, width: usize, height: usize) -> String {
    let (t_min, t_max) = time_range(&file.grid.time).unwrap_or((0.0, 1.0));
    let curve: Vec<(f64, f64)> = file
        .grid
        .time
        .iter()
        .zip(&file.grid.position)
        .map(|(&t, &x)| (t, x))
        .collect();
    render_plot(&[], &curve, t_min, t_max, width, height, None)
}

/// Sample `x(t)` on an even time grid, skipping times the model cannot invert.
pub fn sample_curve(model: &FittedModel, t_min: f64, t_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let times: Vec<f64> = (0..n)
        .map(|i| t_min + (t_max - t_min) * i as f64 / (n as f64 - 1.0))
        .collect();
    times
        .iter()
        .zip(model.positions(&times))
        .filter_map(|(&t, x)| x.ok().map(|x| (t, x)))
        .collect()
}

fn render_plot(
    points: &[(f64, f64)],
    curve: &[(f64, f64)],
    t_min: f64,
    t_max: f64,
    width: usize,
    height: usize,
    deviations: Option<&Deviations>,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = value_range(points, curve).unwrap_or((0.0, 1.0));
    let (x_min, x_max) = pad_range(x_min, x_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    draw_curve(&mut grid, curve, t_min, t_max, x_min, x_max);

    let key = |t: f64, x: f64| (t.to_bits(), x.to_bits());
    let (ahead, behind): (HashSet<_>, HashSet<_>) = deviations
        .map(|d| {
            (
                d.ahead.iter().map(|r| key(r.t, r.x_obs)).collect(),
                d.behind.iter().map(|r| key(r.t, r.x_obs)).collect(),
            )
        })
        .unwrap_or_default();

    for &(t, x) in points {
        if !(t.is_finite() && x.is_finite()) {
            continue;
        }
        let col = map_col(t, t_min, t_max, width);
        let row = map_row(x, x_min, x_max, height);
        grid[row][col] = if ahead.contains(&key(t, x)) {
            '^'
        } else if behind.contains(&key(t, x)) {
            'v'
        } else {
            'o'
        };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[{t_min:.3}, {t_max:.3}] | x=[{x_min:.2}, {x_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn time_range(times: &[f64]) -> Option<(f64, f64)> {
    let (lo, hi) = times
        .iter()
        .filter(|t| t.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| (lo.min(t), hi.max(t)));
    (lo.is_finite() && hi > lo).then_some((lo, hi))
}

fn value_range(points: &[(f64, f64)], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let (lo, hi) = points
        .iter()
        .chain(curve)
        .map(|&(_, x)| x)
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    (lo.is_finite() && hi > lo).then_some((lo, hi))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = ((max - min).abs() * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_col(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_row(x: f64, x_min: f64, x_max: f64, height: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    // Row 0 is the top (largest x).
    (height as f64 - 1.0 - u * (height as f64 - 1.0)).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, x_min: f64, x_max: f64) {
    let height = grid.len();
    let Some(width) = grid.first().map(Vec::len) else {
        return;
    };

    for segment in split_at_gaps(curve) {
        let mut prev = None;
        for &(t, x) in segment {
            let col = map_col(t, t_min, t_max, width);
            let row = map_row(x, x_min, x_max, height);
            match prev {
                Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
                None => grid[row][col] = '-',
            }
            prev = Some((col, row));
        }
    }
}

/// Split an evenly sampled curve where skipped times left a hole in the grid.
fn split_at_gaps(curve: &[(f64, f64)]) -> Vec<&[(f64, f64)]> {
    let step = curve
        .windows(2)
        .map(|w| w[1].0 - w[0].0)
        .filter(|dt| *dt > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !step.is_finite() {
        return vec![curve];
    }

    let mut segments = Vec::new();
    let mut start = 0;
    for i in 1..curve.len() {
        if curve[i].0 - curve[i - 1].0 > 1.5 * step {
            segments.push(&curve[start..i]);
            start = i;
        }
    }
    segments.push(&curve[start..]);
    segments
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], c0: usize, r0: usize, c1: usize, r1: usize, ch: char) {
    let (mut c, mut r) = (c0 as isize, r0 as isize);
    let (c1, r1) = (c1 as isize, r1 as isize);

    let dc = (c1 - c).abs();
    let sc = if c < c1 { 1 } else { -1 };
    let dr = -(r1 - r).abs();
    let sr = if r < r1 { 1 } else { -1 };
    let mut err = dc + dr;

    loop {
        if let Some(cell) = grid.get_mut(r as usize).and_then(|row| row.get_mut(c as usize)) {
            if *cell == ' ' {
                *cell = ch;
            }
        }
        if c == c1 && r == r1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dr {
            err += dr;
            c += sc;
        }
        if e2 <= dc {
            err += dc;
            r += sr;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelParams, SolverOptions};
    use crate::report::{compute_residuals, largest_deviations};

    fn washburn_unit() -> FittedModel {
        FittedModel::from_params(ModelParams::Washburn { k: 1.0 }, SolverOptions::default())
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = SampleSeries::new(vec![1.0, 4.0], vec![1.0, 3.0]);
        let txt = render_ascii_plot(&series, &washburn_unit(), 10, 5, None);
        let expected = concat!(
            "Plot: t=[1.000, 4.000] | x=[0.90, 3.10]\n",
            "         o\n",
            "          \n",
            "      ----\n",
            "  ----    \n",
            "o-        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn deviations_are_highlighted() {
        let series = SampleSeries::new(vec![1.0, 4.0], vec![1.0, 3.0]);
        let model = washburn_unit();
        let table = compute_residuals(&series, &model);
        let dev = largest_deviations(&table.rows, 1);

        let txt = render_ascii_plot(&series, &model, 10, 5, Some(&dev));
        assert_eq!(txt.lines().nth(1), Some("         ^"));
    }

    #[test]
    fn curve_skips_uninvertible_times() {
        // alpha = 1 => t_min = 0.5; the grid below it has no ascending depth.
        let model = FittedModel::from_params(
            ModelParams::WashburnRideal { alpha: 1.0, beta: 1.0 },
            SolverOptions::default(),
        );
        let curve = sample_curve(&model, 0.0, 2.4, 7);
        assert_eq!(curve.len(), 6);
        assert_eq!(curve[0], (0.0, 0.0));
        assert!(curve[1..].iter().all(|&(t, x)| t > 0.5 && x > 1.0));
        assert_eq!(split_at_gaps(&curve).len(), 2);
    }

    #[test]
    fn curve_is_not_bridged_across_skipped_times() {
        // t = 1 and t = 2 are missing from the unit grid.
        let curve = [(0.0, 0.0), (3.0, 3.0), (4.0, 4.0)];
        let txt = render_plot(&[], &curve, 0.0, 4.0, 10, 5, None);
        let expected = concat!(
            "Plot: t=[0.000, 4.000] | x=[-0.20, 4.20]\n",
            "        --\n",
            "       -  \n",
            "          \n",
            "          \n",
            "-         \n",
        );
        assert_eq!(txt, expected);
    }
}
