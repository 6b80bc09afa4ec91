//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Three views:
//! - raw data: log AB/2 horizontal vs log rhoa vertical (`x` marks)
//! - sounding fit: log rhoa horizontal vs log AB/2 increasing downward,
//!   observed readings as `x`, model response as a `-` curve
//! - layered model: log resistivity horizontal vs depth increasing downward,
//!   rendered as a step curve

use crate::domain::LayerModel;

/// Fractional padding applied to log-axis ranges.
const PAD_FRAC: f64 = 0.05;

/// Render raw sounding data (no model overlay).
pub fn render_data_plot(ab2: &[f64], rhoa: &[f64], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((ax_min, ax_max)) = log_range(ab2, 0.0) else {
        return "No data to plot.\n".to_string();
    };
    let Some((ry_min, ry_max)) = log_range(rhoa, PAD_FRAC) else {
        return "No data to plot.\n".to_string();
    };

    let mut grid = vec![vec![' '; width]; height];
    for (&a, &r) in ab2.iter().zip(rhoa.iter()) {
        let x = map_log(a, ax_min, ax_max, width);
        let y = flip(map_log(r, ry_min, ry_max, height), height);
        grid[y][x] = 'x';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Data: AB/2=[{:.2}, {:.2}] m | rhoa=[{:.1}, {:.1}] ohm-m\n",
        ax_min.exp(),
        ax_max.exp(),
        ry_min.exp(),
        ry_max.exp()
    ));
    push_grid(&mut out, grid);
    out
}

/// Render observed readings against the model response, AB/2 increasing
/// downward as a depth proxy.
pub fn render_sounding_plot(
    ab2: &[f64],
    rhoa: &[f64],
    response: &[f64],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let combined: Vec<f64> = rhoa.iter().chain(response.iter()).copied().collect();
    let Some((rx_min, rx_max)) = log_range(&combined, PAD_FRAC) else {
        return "No data to plot.\n".to_string();
    };
    let Some((ay_min, ay_max)) = log_range(ab2, 0.0) else {
        return "No data to plot.\n".to_string();
    };

    let mut grid = vec![vec![' '; width]; height];

    // Response curve first so data marks overlay it.
    let curve: Vec<(usize, usize)> = ab2
        .iter()
        .zip(response.iter())
        .map(|(&a, &r)| {
            (
                map_log(r, rx_min, rx_max, width),
                map_log(a, ay_min, ay_max, height),
            )
        })
        .collect();
    draw_polyline(&mut grid, &curve, '-');

    for (&a, &r) in ab2.iter().zip(rhoa.iter()) {
        let x = map_log(r, rx_min, rx_max, width);
        let y = map_log(a, ay_min, ay_max, height);
        grid[y][x] = 'x';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Sounding: rhoa=[{:.1}, {:.1}] ohm-m | AB/2=[{:.2}, {:.2}] m (down)\n",
        rx_min.exp(),
        rx_max.exp(),
        ay_min.exp(),
        ay_max.exp()
    ));
    push_grid(&mut out, grid);
    out
}

/// Render a layered model as a resistivity-vs-depth step curve.
pub fn render_model_plot(model: &LayerModel, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((rx_min, rx_max)) = log_range(&model.res, PAD_FRAC) else {
        return "No model to plot.\n".to_string();
    };
    let depths = model.depths();
    let z_last = depths.last().copied().unwrap_or(1.0);
    // Show some of the semi-infinite basement below the last boundary.
    let z_max = (z_last * 1.5).max(1e-6);

    // Step-curve corners: down through each layer, across at each boundary.
    let mut corners: Vec<(usize, usize)> = Vec::new();
    let mut top = 0.0;
    for (k, &res) in model.res.iter().enumerate() {
        let bottom = depths.get(k).copied().unwrap_or(z_max);
        let x = map_log(res, rx_min, rx_max, width);
        corners.push((x, map_linear(top, z_max, height)));
        corners.push((x, map_linear(bottom, z_max, height)));
        top = bottom;
    }

    let mut grid = vec![vec![' '; width]; height];
    draw_polyline(&mut grid, &corners, '-');

    let mut out = String::new();
    out.push_str(&format!(
        "Model: res=[{:.1}, {:.1}] ohm-m | depth=[0.00, {z_max:.2}] m (down)\n",
        rx_min.exp(),
        rx_max.exp()
    ));
    push_grid(&mut out, grid);
    out
}

/// Log-space range of positive values, padded by `pad_frac` on both sides.
/// Returns `(ln_min, ln_max)`.
fn log_range(values: &[f64], pad_frac: f64) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for &v in values {
        if !(v.is_finite() && v > 0.0) {
            return None;
        }
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if !(min_v.is_finite() && max_v.is_finite()) {
        return None;
    }
    let mut ln_min = min_v.ln();
    let mut ln_max = max_v.ln();
    if ln_max <= ln_min {
        // Degenerate (constant) input: open up a decade-tenth around it.
        ln_min -= 0.1;
        ln_max += 0.1;
    }
    let pad = ((ln_max - ln_min) * pad_frac).max(0.0);
    Some((ln_min - pad, ln_max + pad))
}

fn map_log(v: f64, ln_min: f64, ln_max: f64, cells: usize) -> usize {
    let cells = cells.max(2);
    let u = ((v.ln() - ln_min) / (ln_max - ln_min)).clamp(0.0, 1.0);
    (u * (cells as f64 - 1.0)).round() as usize
}

fn map_linear(v: f64, v_max: f64, cells: usize) -> usize {
    let cells = cells.max(2);
    let u = (v / v_max).clamp(0.0, 1.0);
    (u * (cells as f64 - 1.0)).round() as usize
}

/// Flip a row index so larger values end up near the top.
fn flip(row: usize, height: usize) -> usize {
    height - 1 - row
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

fn draw_polyline(grid: &mut [Vec<char>], points: &[(usize, usize)], ch: char) {
    if points.is_empty() {
        return;
    }
    if points.len() == 1 {
        let (x, y) = points[0];
        if grid[y][x] == ' ' {
            grid[y][x] = ch;
        }
        return;
    }
    for w in points.windows(2) {
        draw_line(grid, w[0].0, w[0].1, w[1].0, w[1].1, ch);
    }
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
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

    #[test]
    fn data_plot_golden_snapshot_small() {
        let ab2 = [1.0, 100.0];
        let rhoa = [10.0, 1000.0];
        let txt = render_data_plot(&ab2, &rhoa, 10, 5);
        let expected = concat!(
            "Data: AB/2=[1.00, 100.00] m | rhoa=[7.9, 1258.9] ohm-m\n",
            "         x\n",
            "          \n",
            "          \n",
            "          \n",
            "x         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn sounding_plot_marks_data_over_curve() {
        let ab2 = [1.0, 3.0, 10.0, 30.0, 100.0];
        let rhoa = [100.0, 110.0, 150.0, 300.0, 450.0];
        let response = [98.0, 112.0, 149.0, 305.0, 445.0];
        let txt = render_sounding_plot(&ab2, &rhoa, &response, 40, 12);

        assert!(txt.starts_with("Sounding: "));
        assert_eq!(txt.lines().count(), 13);
        assert!(txt.contains('x'));
        assert!(txt.contains('-'));
    }

    #[test]
    fn model_plot_steps_through_every_layer() {
        let model = LayerModel::new(vec![100.0, 10.0, 800.0], vec![3.0, 10.0]).unwrap();
        let txt = render_model_plot(&model, 40, 12);

        assert!(txt.starts_with("Model: "));
        assert_eq!(txt.lines().count(), 13);
        // Step curve must touch the left edge region (min res) and the right
        // edge region (max res).
        let body: Vec<&str> = txt.lines().skip(1).collect();
        assert!(body.iter().any(|l| l.trim_start().starts_with('-') || l.starts_with('-')));
        assert!(body.iter().any(|l| l.trim_end().ends_with('-')));
    }

    #[test]
    fn empty_input_degrades_gracefully() {
        assert_eq!(render_data_plot(&[], &[], 10, 5), "No data to plot.\n");
    }
}
