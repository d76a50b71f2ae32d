//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements, in drawing priority:
//! - forecast: `-` line
//! - history: `*` line
//! - forecast bounds: `:` lines
//! - start of the forecast: `|` column

use chrono::{Duration, NaiveDate};

use crate::domain::{DemandForecastResult, ForecastPoint};

const LEGEND: &str = "* history  - forecast  : bounds  | forecast start\n";

/// Render history followed by the forecast and its bounds.
///
/// `history` holds one value per day and ends the day before the first
/// forecast point.
pub fn render_forecast_plot(
    history: &[f64],
    points: &[ForecastPoint],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let n_hist = history.len();
    let n_total = n_hist + points.len();
    let t_max = n_total.saturating_sub(1).max(1) as f64;

    let hist_series: Vec<(f64, f64)> = history
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let forecast_at = |f: fn(&ForecastPoint) -> f64| -> Vec<(f64, f64)> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| ((n_hist + i) as f64, f(p)))
            .collect()
    };
    let predicted = forecast_at(|p| p.predicted_quantity);
    let lower = forecast_at(|p| p.lower_bound);
    let upper = forecast_at(|p| p.upper_bound);

    let (y_min, y_max) = y_range(&[&hist_series, &lower, &upper, &predicted]).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let frame = Frame {
        t_max,
        y_min,
        y_max,
    };
    draw_series(&mut grid, &predicted, &frame, '-');
    draw_series(&mut grid, &hist_series, &frame, '*');
    draw_series(&mut grid, &upper, &frame, ':');
    draw_series(&mut grid, &lower, &frame, ':');
    if n_hist > 0 && !points.is_empty() {
        let x = map_x(n_hist as f64, t_max, width);
        for row in grid.iter_mut() {
            if row[x] == ' ' {
                row[x] = '|';
            }
        }
    }

    let mut out = String::new();
    match date_span(n_hist, points) {
        Some((first, last)) => out.push_str(&format!(
            "Plot: {first} .. {last} | y=[{y_min:.2}, {y_max:.2}] units/day\n"
        )),
        None => out.push_str(&format!("Plot: y=[{y_min:.2}, {y_max:.2}] units/day\n")),
    }
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(LEGEND);
    out
}

/// Render a saved result (forecast only; results carry no history).
pub fn render_result_plot(result: &DemandForecastResult, width: usize, height: usize) -> String {
    render_forecast_plot(&[], &result.forecast_points, width, height)
}

struct Frame {
    t_max: f64,
    y_min: f64,
    y_max: f64,
}

fn date_span(n_hist: usize, points: &[ForecastPoint]) -> Option<(NaiveDate, NaiveDate)> {
    let first = points.first()?.date - Duration::days(n_hist as i64);
    let last = points.last()?.date;
    Some((first, last))
}

fn y_range(series: &[&[(f64, f64)]]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for s in series {
        for &(_, y) in *s {
            if y.is_finite() {
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat data: open a unit window around it.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (t / t_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(grid: &mut [Vec<char>], series: &[(f64, f64)], frame: &Frame, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in series {
        let x = map_x(t, frame.t_max, width);
        let yy = map_y(y, frame.y_min, frame.y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None if grid[yy][x] == ' ' => grid[yy][x] = ch,
            None => {}
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, value: f64, u: f64) -> ForecastPoint {
        ForecastPoint::from_value(NaiveDate::from_ymd_opt(2025, 1, day).unwrap(), value, u, 1.0)
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let points = vec![point(3, 10.0, 0.0), point(4, 10.0, 0.0)];
        let txt = render_forecast_plot(&[0.0, 10.0], &points, 10, 5);
        let expected = concat!(
            "Plot: 2025-01-01 .. 2025-01-04 | y=[-0.50, 10.50] units/day\n",
            "   *  ----\n",
            "  *   |   \n",
            "  *   |   \n",
            " *    |   \n",
            "*     |   \n",
            "* history  - forecast  : bounds  | forecast start\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn bounds_are_drawn_around_the_forecast() {
        let points: Vec<ForecastPoint> = (1..=20).map(|d| point(d, 10.0, 5.0)).collect();
        let txt = render_forecast_plot(&[], &points, 20, 9);
        assert!(txt.starts_with("Plot: 2025-01-01 .. 2025-01-20"));
        assert!(txt.contains('-'));
        assert!(txt.contains(':'));
        assert!(!txt.lines().nth(1).unwrap().contains('|'));
    }

    #[test]
    fn empty_input_still_renders_a_frame() {
        let txt = render_forecast_plot(&[], &[], 10, 5);
        assert_eq!(txt.lines().count(), 1 + 5 + 1);
    }
}
