//! Chart geometry derived from a summary.
//!
//! Only the numbers a renderer needs: bar widths relative to the largest
//! entry, pie slice angles, and hues on the 0 (red) to 120 (green) scale.

use serde::Serialize;

use crate::summary::Summary;

/// One horizontal bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub key: String,
    pub label: String,
    /// Width relative to the largest bar, 0..=100.
    pub width_percent: u32,
    /// HSL hue in degrees.
    pub hue: u32,
    pub percent_of_total: f64,
    pub hours: f64,
}

/// One pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub key: String,
    pub label: String,
    pub start_degrees: f64,
    pub angle_degrees: f64,
    pub hue: u32,
}

/// `round(factor / max_factor * 100)`, or 0 when there is no positive maximum.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bar_width_percent(factor: f64, max_factor: f64) -> u32 {
    if max_factor <= 0.0 {
        return 0;
    }
    (factor / max_factor * 100.0).round().clamp(0.0, 100.0) as u32
}

/// `120 - round(width / 100 * 120)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bar_hue(width_percent: u32) -> u32 {
    let scaled = (f64::from(width_percent.min(100)) / 100.0 * 120.0).round() as u32;
    120 - scaled
}

/// Bars for every entry, largest first.
pub fn bars(summary: &Summary) -> Vec<Bar> {
    let ranked = summary.ranked();
    let max_factor = ranked.first().map_or(0.0, |e| e.factor_of_total);

    ranked
        .into_iter()
        .map(|entry| {
            let width_percent = bar_width_percent(entry.factor_of_total, max_factor);
            Bar {
                key: entry.key.clone(),
                label: entry.label().to_string(),
                width_percent,
                hue: bar_hue(width_percent),
                percent_of_total: entry.factor_of_total * 100.0,
                hours: entry.received_hours(),
            }
        })
        .collect()
}

/// Pie slices for every entry, largest first, laid out clockwise from 0°.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn pie(summary: &Summary) -> Vec<Slice> {
    let ranked = summary.ranked();
    let count = ranked.len();
    let mut start_degrees = 0.0;

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let angle_degrees = entry.factor_of_total * 360.0;
            let slice = Slice {
                key: entry.key.clone(),
                label: entry.label().to_string(),
                start_degrees,
                angle_degrees,
                hue: (index as f64 / count as f64 * 120.0).round() as u32,
            };
            start_degrees += angle_degrees;
            slice
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::catalog::NoLookup;
    use crate::parser::{NegativeDurationPolicy, parse_lines};
    use crate::summary::summarize;

    fn summary_of(lines: &[&str]) -> Summary {
        let outcome = parse_lines(lines, NegativeDurationPolicy::Reject);
        summarize(&outcome.intervals, &NoLookup)
    }

    #[test]
    fn width_is_relative_to_largest() {
        assert_eq!(bar_width_percent(0.5, 0.5), 100);
        assert_eq!(bar_width_percent(0.25, 0.5), 50);
        assert_eq!(bar_width_percent(1.0 / 3.0, 2.0 / 3.0), 50);
        assert_eq!(bar_width_percent(0.1, 0.0), 0);
    }

    #[test]
    fn hue_runs_from_red_to_green() {
        assert_eq!(bar_hue(100), 0);
        assert_eq!(bar_hue(50), 60);
        assert_eq!(bar_hue(0), 120);
        assert_eq!(bar_hue(33), 80);
    }

    #[test]
    fn bars_are_ranked() {
        let summary = summary_of(&[
            "- (a 09:00 - 10:00) x",
            "- (a 10:00 - 10:30) y",
            "- (b 08:00 - 08:45) z",
        ]);
        let bars = bars(&summary);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].key, "a");
        assert_eq!(bars[0].width_percent, 100);
        assert_eq!(bars[0].hue, 0);
        assert_eq!(bars[1].key, "b");
        assert_eq!(bars[1].width_percent, 50);
        assert_eq!(bars[1].hue, 60);
        assert!((bars[1].hours - 0.75).abs() < 1e-12);
    }

    #[test]
    fn pie_slices_cover_the_circle() {
        let summary = summary_of(&[
            "- (a 09:00 - 10:00) x",
            "- (b 10:00 - 10:30) y",
            "- (c 10:30 - 11:00) z",
        ]);
        let slices = pie(&summary);

        assert_eq!(slices.len(), 3);
        assert!((slices[0].angle_degrees - 180.0).abs() < 1e-9);
        assert!((slices[1].start_degrees - 180.0).abs() < 1e-9);
        assert!((slices[2].start_degrees - 270.0).abs() < 1e-9);

        let hues: Vec<u32> = slices.iter().map(|s| s.hue).collect();
        assert_eq!(hues, vec![0, 40, 80]);

        let total: f64 = slices.iter().map(|s| s.angle_degrees).sum();
        assert!((total - 360.0).abs() < 1e-9);
    }

    #[test]
    fn empty_summary_has_no_geometry() {
        let summary = summary_of(&["# nothing"]);
        assert!(bars(&summary).is_empty());
        assert!(pie(&summary).is_empty());
    }
}
