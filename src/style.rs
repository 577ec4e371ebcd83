//! Per-panel line styles handed to the [`Renderer`](crate::render::Renderer).
use std::collections::BTreeMap;

use crate::panel::Panel;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelStyle {
    /// Any color specification the renderer understands, usually `#rrggbb`
    pub color: String,
    #[cfg_attr(feature = "serde", serde(rename = "linewidth"))]
    pub line_width: f32,
}

impl PanelStyle {
    pub fn new(color: impl Into<String>, line_width: f32) -> Self {
        Self {
            color: color.into(),
            line_width,
        }
    }

    /// The built-in style of `panel`
    pub fn default_for(panel: Panel) -> Self {
        match panel {
            Panel::Tic => Self::new("#2b579a", 1.7),
            Panel::Bpc => Self::new("#107c10", 1.7),
            Panel::Ms1 => Self::new("#000000", 1.2),
            Panel::Ms2 => Self::new("#2b579a", 1.3),
        }
    }
}

/// A style for every panel. Panels without an explicit entry use
/// [`PanelStyle::default_for`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StylePresets {
    styles: BTreeMap<Panel, PanelStyle>,
}

impl Default for StylePresets {
    fn default() -> Self {
        Self {
            styles: Panel::ALL
                .into_iter()
                .map(|panel| (panel, PanelStyle::default_for(panel)))
                .collect(),
        }
    }
}

impl StylePresets {
    pub fn get(&self, panel: Panel) -> PanelStyle {
        self.styles
            .get(&panel)
            .cloned()
            .unwrap_or_else(|| PanelStyle::default_for(panel))
    }

    /// Update the color and/or the line width of `panel`, leaving unset parts as they were
    pub fn set(&mut self, panel: Panel, color: Option<&str>, line_width: Option<f32>) {
        let style = self
            .styles
            .entry(panel)
            .or_insert_with(|| PanelStyle::default_for(panel));
        if let Some(color) = color {
            style.color = color.to_string();
        }
        if let Some(line_width) = line_width {
            style.line_width = line_width;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Panel, &PanelStyle)> {
        self.styles.iter()
    }
}

#[cfg(feature = "serde")]
impl StylePresets {
    /// Read presets saved as a `{"tic": {"color": ..., "linewidth": ...}, ...}` mapping
    pub fn from_reader<R: std::io::Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    pub fn to_writer<W: std::io::Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}
