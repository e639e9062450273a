//! SVG and plain-text rendering of aggregate tables.
//!
//! Purely presentational. Input is a (category, count) series or a list
//! of (lat, lon, count) points; output is a self-contained SVG string.

use crate::{aggregator::LocationCount, config::RenderConfig};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Categories down the left, bars grow to the right.
    Horizontal,
    /// Categories along the bottom, bars grow upwards.
    Vertical,
}

/// A (category, count) series ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub title: String,
    pub bars: Vec<(String, usize)>,
}

impl BarSeries {
    pub fn new(title: impl Into<String>, bars: Vec<(String, usize)>) -> Self {
        Self { title: title.into(), bars }
    }

    /// Bars by count, descending. Stable, so ties keep input order.
    pub fn ranked(&self) -> Vec<(String, usize)> {
        let mut bars = self.bars.clone();
        bars.sort_by(|a, b| b.1.cmp(&a.1));
        bars
    }
}

/// A named artifact produced by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub file_name: String,
    pub svg: String,
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

// ── Bar charts ─────────────────────────────────────────────────────

pub fn render_bar_chart(series: &BarSeries, orientation: Orientation, style: &RenderConfig) -> String {
    let bars = series.ranked();
    if bars.is_empty() {
        return empty_svg(&series.title, style.chart_width);
    }
    match orientation {
        Orientation::Horizontal => horizontal_bars(&series.title, &bars, style),
        Orientation::Vertical => vertical_bars(&series.title, &bars, style),
    }
}

fn horizontal_bars(title: &str, bars: &[(String, usize)], style: &RenderConfig) -> String {
    let width = style.chart_width as f64;
    let slot = style.bar_slot as f64;
    let label_width = 260.0;
    let top = 40.0;
    let right_pad = 70.0;
    let height = top + slot * bars.len() as f64 + 20.0;
    let plot_width = (width - label_width - right_pad).max(1.0);
    let max_count = bars.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f64;

    let mut body = String::new();
    for (i, (label, count)) in bars.iter().enumerate() {
        let y = top + i as f64 * slot;
        let bar_width = *count as f64 / max_count * plot_width;
        let _ = write!(
            body,
            r##"
  <text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11" fill="#374151">{}</text>
  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" opacity="0.85"/>
  <text x="{:.1}" y="{:.1}" font-size="11" fill="#6b7280">{}</text>"##,
            label_width - 8.0,
            y + slot * 0.6,
            escape_xml(label),
            label_width,
            y + slot * 0.15,
            bar_width,
            slot * 0.7,
            style.bar_color,
            label_width + bar_width + 6.0,
            y + slot * 0.6,
            count
        );
    }

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" style="background:white">
  <text x="{:.1}" y="22" text-anchor="middle" font-size="14" font-weight="600" fill="#374151">{}</text>
  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#e5e7eb" stroke-width="2"/>{}
</svg>"##,
        width,
        height,
        width / 2.0,
        escape_xml(title),
        label_width,
        top,
        label_width,
        height - 20.0,
        body
    )
}

fn vertical_bars(title: &str, bars: &[(String, usize)], style: &RenderConfig) -> String {
    let width = style.chart_width as f64;
    let height = 360.0;
    let margin = 50.0;
    let label_band = 90.0;
    let plot_height = height - margin - label_band;
    let slot = (width - 2.0 * margin) / bars.len() as f64;
    let max_count = bars.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f64;
    let baseline = margin + plot_height;

    let mut body = String::new();
    for (i, (label, count)) in bars.iter().enumerate() {
        let x = margin + i as f64 * slot;
        let bar_height = *count as f64 / max_count * plot_height;
        let cx = x + slot / 2.0;
        let _ = write!(
            body,
            r##"
  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" opacity="0.85"/>
  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="10" fill="#6b7280">{}</text>
  <text x="{:.1}" y="{:.1}" text-anchor="end" font-size="10" fill="#374151" transform="rotate(-45, {:.1}, {:.1})">{}</text>"##,
            x + slot * 0.1,
            baseline - bar_height,
            slot * 0.8,
            bar_height,
            style.bar_color,
            cx,
            baseline - bar_height - 4.0,
            count,
            cx,
            baseline + 14.0,
            cx,
            baseline + 14.0,
            escape_xml(label)
        );
    }

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" style="background:white">
  <text x="{:.1}" y="22" text-anchor="middle" font-size="14" font-weight="600" fill="#374151">{}</text>
  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#e5e7eb" stroke-width="2"/>{}
</svg>"##,
        width,
        height,
        width / 2.0,
        escape_xml(title),
        margin,
        baseline,
        width - margin,
        baseline,
        body
    )
}

fn empty_svg(title: &str, width: u32) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="60" style="background:white">
  <text x="{}" y="22" text-anchor="middle" font-size="14" font-weight="600" fill="#374151">{}</text>
  <text x="{}" y="44" text-anchor="middle" font-size="11" fill="#6b7280">no data</text>
</svg>"##,
        width / 2,
        escape_xml(title),
        width / 2
    )
}

// ── Point map ──────────────────────────────────────────────────────

/// Marker colour ramp, low to high.
const RAMP: [&str; 5] = ["#fde68a", "#fbbf24", "#f97316", "#dc2626", "#7f1d1d"];

fn ramp_color(fraction: f64) -> &'static str {
    let idx = (fraction.clamp(0.0, 1.0) * (RAMP.len() - 1) as f64).round() as usize;
    RAMP[idx]
}

/// Markers sized and coloured by count over an equirectangular projection
/// of the points' bounding box, with a colour legend.
pub fn render_point_map(title: &str, points: &[LocationCount], style: &RenderConfig) -> String {
    if points.is_empty() {
        return empty_svg(title, style.map_width);
    }
    let width = style.map_width as f64;
    let height = style.map_height as f64;
    let margin = 60.0;
    let legend_height = 40.0;

    let (mut min_lat, mut max_lat) = (f64::MAX, f64::MIN);
    let (mut min_lon, mut max_lon) = (f64::MAX, f64::MIN);
    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lon = min_lon.min(p.longitude);
        max_lon = max_lon.max(p.longitude);
    }
    // A single point (or a line of them) still needs a non-zero span.
    let lat_span = (max_lat - min_lat).max(1e-3);
    let lon_span = (max_lon - min_lon).max(1e-3);
    let plot_w = width - 2.0 * margin;
    let plot_h = height - 2.0 * margin - legend_height;

    let max_count = points.iter().map(|p| p.count).max().unwrap_or(1).max(1) as f64;
    let min_count = points.iter().map(|p| p.count).min().unwrap_or(0) as f64;
    let count_span = (max_count - min_count).max(1.0);

    let mut markers = String::new();
    for p in points {
        let x = margin + (p.longitude - min_lon) / lon_span * plot_w;
        let y = margin + (max_lat - p.latitude) / lat_span * plot_h;
        let fraction = (p.count as f64 - min_count) / count_span;
        let radius = 5.0 + 15.0 * (p.count as f64 / max_count).sqrt();
        let _ = write!(
            markers,
            r##"
  <circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" fill-opacity="0.75" stroke="#374151" stroke-width="0.5"><title>{:.6}, {:.6}: {}</title></circle>"##,
            x,
            y,
            radius,
            ramp_color(fraction),
            p.latitude,
            p.longitude,
            p.count
        );
    }

    let mut legend = String::new();
    let legend_y = height - margin;
    let swatch = 24.0;
    for (i, color) in RAMP.iter().enumerate() {
        let _ = write!(
            legend,
            r##"
  <rect x="{:.1}" y="{:.1}" width="{swatch}" height="12" fill="{color}"/>"##,
            margin + i as f64 * swatch,
            legend_y
        );
    }
    let _ = write!(
        legend,
        r##"
  <text x="{:.1}" y="{:.1}" font-size="10" fill="#6b7280">{}</text>
  <text x="{:.1}" y="{:.1}" font-size="10" fill="#6b7280" text-anchor="end">{}</text>
  <text x="{:.1}" y="{:.1}" font-size="11" fill="#374151">complaints per location</text>"##,
        margin,
        legend_y + 26.0,
        min_count,
        margin + RAMP.len() as f64 * swatch,
        legend_y + 26.0,
        max_count,
        margin + RAMP.len() as f64 * swatch + 12.0,
        legend_y + 10.0
    );

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" style="background:white">
  <text x="{:.1}" y="24" text-anchor="middle" font-size="14" font-weight="600" fill="#374151">{}</text>
  <rect x="{margin}" y="{margin}" width="{:.1}" height="{:.1}" fill="#f9fafb" stroke="#e5e7eb"/>
  <text x="{margin}" y="{:.1}" font-size="10" fill="#6b7280">{:.4}, {:.4}</text>
  <text x="{:.1}" y="{:.1}" font-size="10" fill="#6b7280" text-anchor="end">{:.4}, {:.4}</text>{}{}
</svg>"##,
        width,
        height,
        width / 2.0,
        escape_xml(title),
        plot_w,
        plot_h,
        margin - 6.0,
        max_lat,
        min_lon,
        width - margin,
        margin + plot_h + 14.0,
        min_lat,
        max_lon,
        markers,
        legend
    )
}

// ── Text ───────────────────────────────────────────────────────────

/// Two-column text table, counts right-aligned, in input order.
pub fn render_text_table(series: &BarSeries) -> String {
    let label_width = series
        .bars
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(8);
    let mut out = format!("{}\n", series.title);
    for (label, count) in &series.bars {
        let _ = writeln!(out, "  {label:<label_width$}  {count:>8}");
    }
    out
}
