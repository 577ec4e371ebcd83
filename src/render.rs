//! The drawing surface the viewer core talks to.
//!
//! The core never draws and never reads back what was drawn. Everything a
//! [`Renderer`] needs is passed in as plain numbers, identified by [`Panel`].
use crate::panel::{AxisRange, Panel};
use crate::style::PanelStyle;

/// The dashed rectangle previewing a drag-to-zoom on a chromatogram panel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoomRect {
    pub panel: Panel,
    pub x: AxisRange,
    pub y: AxisRange,
}

/// A T-shaped marker above a detected peak: a short vertical stem from the apex
/// topped by a horizontal cap.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeakMarker {
    pub x: f64,
    /// The apex height, where the stem starts
    pub y: f64,
    /// The height of the cap above the apex
    pub stem_height: f64,
    pub cap_half_width: f64,
}

/// A text label placed on a panel. Labels on one panel are retracted together
/// with [`Renderer::clear_peak_labels`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeakLabel {
    pub panel: Panel,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: String,
}

pub trait Renderer {
    /// Draw a connected line through `(x[i], y[i])`, replacing whatever the panel showed
    fn plot_series(&mut self, panel: Panel, x: &[f64], y: &[f64], style: &PanelStyle);

    /// Draw one vertical stem per point, replacing whatever the panel showed
    fn plot_spectrum(&mut self, panel: Panel, mz: &[f64], intensity: &[f32], style: &PanelStyle);

    fn set_title(&mut self, panel: Panel, title: &str);

    fn set_x_range(&mut self, panel: Panel, range: AxisRange);

    fn set_y_range(&mut self, panel: Panel, range: AxisRange);

    /// Show the zoom preview, or remove it when `rect` is `None`
    fn set_zoom_preview(&mut self, rect: Option<ZoomRect>);

    fn draw_peak_marker(&mut self, panel: Panel, marker: PeakMarker, color: &str);

    fn add_peak_label(&mut self, label: PeakLabel);

    /// Remove every peak marker and label from `panel`
    fn clear_peak_labels(&mut self, panel: Panel);
}

/// A renderer that draws nothing. Useful for running the viewer headless.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn plot_series(&mut self, _panel: Panel, _x: &[f64], _y: &[f64], _style: &PanelStyle) {}

    fn plot_spectrum(
        &mut self,
        _panel: Panel,
        _mz: &[f64],
        _intensity: &[f32],
        _style: &PanelStyle,
    ) {
    }

    fn set_title(&mut self, _panel: Panel, _title: &str) {}

    fn set_x_range(&mut self, _panel: Panel, _range: AxisRange) {}

    fn set_y_range(&mut self, _panel: Panel, _range: AxisRange) {}

    fn set_zoom_preview(&mut self, _rect: Option<ZoomRect>) {}

    fn draw_peak_marker(&mut self, _panel: Panel, _marker: PeakMarker, _color: &str) {}

    fn add_peak_label(&mut self, _label: PeakLabel) {}

    fn clear_peak_labels(&mut self, _panel: Panel) {}
}
