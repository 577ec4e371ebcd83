use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The plotting panels of the viewer.
///
/// [`Panel::Tic`] and [`Panel::Bpc`] share their retention time axis and form the
/// linked group. [`Panel::Ms1`] shows whichever survey scan the linked group points
/// at, and [`Panel::Ms2`] shows a fragment scan picked from the MS2 list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Panel {
    Tic,
    Bpc,
    Ms1,
    Ms2,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Tic, Panel::Bpc, Panel::Ms1, Panel::Ms2];

    /// Whether this panel is one of the two chromatograms sharing a time axis
    pub fn is_linked(&self) -> bool {
        matches!(self, Self::Tic | Self::Bpc)
    }

    /// The other member of the linked group, if this panel belongs to it
    pub fn partner(&self) -> Option<Panel> {
        match self {
            Self::Tic => Some(Self::Bpc),
            Self::Bpc => Some(Self::Tic),
            Self::Ms1 | Self::Ms2 => None,
        }
    }

    /// Whether the horizontal axis of this panel is m/z rather than time
    pub fn is_spectrum(&self) -> bool {
        matches!(self, Self::Ms1 | Self::Ms2)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tic => "tic",
            Self::Bpc => "bpc",
            Self::Ms1 => "ms1",
            Self::Ms2 => "ms2",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown panel {0:?}, expected one of tic, bpc, ms1, ms2")]
pub struct UnknownPanel(pub String);

impl FromStr for Panel {
    type Err = UnknownPanel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tic" => Ok(Self::Tic),
            "bpc" => Ok(Self::Bpc),
            "ms1" => Ok(Self::Ms1),
            "ms2" => Ok(Self::Ms2),
            _ => Err(UnknownPanel(s.to_string())),
        }
    }
}

/// A closed interval along one axis of a panel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The range spanning two coordinates given in either order
    pub fn spanning(a: f64, b: f64) -> Self {
        if a <= b {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Scale the span by `factor`, keeping the center fixed
    pub fn scaled(&self, factor: f64) -> Self {
        let center = self.center();
        let half = self.span() * factor / 2.0;
        Self::new(center - half, center + half)
    }

    /// Extend the upper bound by `fraction` of the span
    pub fn padded_above(&self, fraction: f64) -> Self {
        Self::new(self.min, self.max + self.span() * fraction)
    }
}
