//! Turn detected peaks into the markers, labels and listings shown to the user.
use std::fmt::Write;

use crate::panel::{AxisRange, Panel};
use crate::peak_detection::DetectedPeak;
use crate::render::{PeakLabel, PeakMarker, Renderer};
use crate::utils::{format_mz, format_rt};

pub const PEAK_ANNOTATION_COLOR: &str = "red";

/// Stem height as a fraction of the panel's y span
const STEM_FRACTION: f64 = 0.03;
/// Gap between the cap and the label, as a fraction of the y span
const LABEL_OFFSET_FRACTION: f64 = 0.04;
/// Cap half width as a fraction of the signal's x extent
const CAP_FRACTION: f64 = 0.002;
/// Headroom added above the panel so the top labels stay visible
const HEADROOM_FRACTION: f64 = 0.15;

/// Everything needed to draw the peaks of one panel
#[derive(Debug, Clone, PartialEq)]
pub struct PeakAnnotations {
    pub panel: Panel,
    pub markers: Vec<PeakMarker>,
    pub labels: Vec<PeakLabel>,
    /// The panel's y range, grown to make room for the labels
    pub y_range: AxisRange,
}

impl PeakAnnotations {
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Replace the panel's previous peak annotations with these
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.clear_peak_labels(self.panel);
        for marker in self.markers.iter() {
            renderer.draw_peak_marker(self.panel, *marker, PEAK_ANNOTATION_COLOR);
        }
        for label in self.labels.iter() {
            renderer.add_peak_label(label.clone());
        }
        renderer.set_y_range(self.panel, self.y_range);
    }
}

/// The label of a peak at `x`: m/z with four decimals on spectra, retention time
/// with two on chromatograms
pub fn label_text(panel: Panel, x: f64) -> String {
    if panel.is_spectrum() {
        format_mz(x)
    } else {
        format_rt(x)
    }
}

/// Lay out markers and labels for `peaks` found in a signal sampled at `x`, on a
/// panel currently showing `y_range`.
pub fn annotate_peaks(
    panel: Panel,
    x: &[f64],
    peaks: &[DetectedPeak],
    y_range: AxisRange,
) -> PeakAnnotations {
    let y_span = y_range.span();
    let stem_height = y_span * STEM_FRACTION;
    let label_offset = y_span * LABEL_OFFSET_FRACTION;
    let x_extent = x
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(*v), hi.max(*v))),
            None => Some((*v, *v)),
        })
        .map(|(lo, hi)| hi - lo)
        .unwrap_or_default();
    let cap_half_width = x_extent * CAP_FRACTION;

    let markers = peaks
        .iter()
        .map(|p| PeakMarker {
            x: p.x,
            y: p.y,
            stem_height,
            cap_half_width,
        })
        .collect();
    let labels = peaks
        .iter()
        .map(|p| PeakLabel {
            panel,
            x: p.x,
            y: p.y + stem_height + label_offset,
            text: label_text(panel, p.x),
            color: PEAK_ANNOTATION_COLOR.to_string(),
        })
        .collect();

    PeakAnnotations {
        panel,
        markers,
        labels,
        y_range: y_range.padded_above(HEADROOM_FRACTION),
    }
}

/// One line per peak, numbered from 1: `Peak 01 -> x = 12.3456, y = 1234.00`
pub fn peak_listing(peaks: &[DetectedPeak]) -> Vec<String> {
    peaks
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut line = String::new();
            let _ = write!(line, "Peak {:02} -> x = {:.4}, y = {:.2}", i + 1, p.x, p.y);
            line
        })
        .collect()
}
