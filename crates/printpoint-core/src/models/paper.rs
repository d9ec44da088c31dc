use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One of the two fixed target page geometries the kiosk prints on. Each
/// paper size owns a partition of the rendered-page cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    Letter,
    Legal,
}

impl PaperSize {
    pub const ALL: [PaperSize; 2] = [PaperSize::Letter, PaperSize::Legal];

    /// Target page geometry in points (72 points/inch).
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::Legal => (612.0, 1008.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaperSize::Letter => "letter",
            PaperSize::Legal => "legal",
        }
    }

    pub fn parse(s: &str) -> Option<PaperSize> {
        match s {
            "letter" => Some(PaperSize::Letter),
            "legal" => Some(PaperSize::Legal),
            _ => None,
        }
    }

    /// Classify a source page size for the UI default. Exact matches win;
    /// anything else is split on height at 900pt. Best-effort only, never
    /// blocks conversion.
    pub fn classify(width: f64, height: f64) -> PaperSize {
        if width == 612.0 && height == 792.0 {
            PaperSize::Letter
        } else if width == 612.0 && height == 1008.0 {
            PaperSize::Legal
        } else if height > 900.0 {
            PaperSize::Legal
        } else {
            PaperSize::Letter
        }
    }
}

impl std::fmt::Display for PaperSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested color mode for a print job. The bw transform is destructive on
/// the cached rendering, so color mode is sticky per physical file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Bw,
    Color,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Bw => "bw",
            ColorMode::Color => "color",
        }
    }

    pub fn parse(s: &str) -> Option<ColorMode> {
        match s {
            "bw" => Some(ColorMode::Bw),
            "color" => Some(ColorMode::Color),
            _ => None,
        }
    }
}
