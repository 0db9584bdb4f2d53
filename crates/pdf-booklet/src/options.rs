use crate::constants::{BACK_ROTATION_DEGREES, mm_to_pt, pt_to_mm};
use crate::layout::{Quadrant, SheetSide, printable_area};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How back-side quadrants are drawn. Never affects which page goes where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpositionConfig {
    pub binding_edge: BindingEdge,
    pub rotate_back: bool,
}

impl Default for ImpositionConfig {
    fn default() -> Self {
        Self {
            binding_edge: BindingEdge::LongEdge,
            rotate_back: true,
        }
    }
}

impl ImpositionConfig {
    /// Rotation for the content drawn into `quadrant`.
    ///
    /// Only back quadrants of a long-edge job with `rotate_back` set are turned
    /// 180°; short-edge jobs rely on the printer's own flip.
    pub fn rotation_for(&self, quadrant: Quadrant) -> f32 {
        let rotated = quadrant.side() == SheetSide::Back
            && self.binding_edge == BindingEdge::LongEdge
            && self.rotate_back;
        if rotated { BACK_ROTATION_DEGREES } else { 0.0 }
    }
}

/// Export configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExportOptions {
    pub mode: ExportMode,
    pub imposition: ImpositionConfig,
    pub scaling: ScalingMode,
    pub sheet_margins: SheetMargins,
}

impl ExportOptions {
    /// Options for a cut-and-stack export with default settings
    pub fn imposed() -> Self {
        Self {
            mode: ExportMode::Imposed,
            ..Default::default()
        }
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self =
            serde_json::from_slice(&bytes).map_err(|e| ConfigError::Parse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sheet_margins.any_negative() {
            return Err(ConfigError::Invalid(
                "Sheet margins must not be negative".to_string(),
            ));
        }

        if self.mode == ExportMode::Imposed {
            let area = printable_area(&self.sheet_margins);
            // Each half needs at least a millimetre of printable width
            if area.width < mm_to_pt(1.0) * 2.0 || area.height < mm_to_pt(1.0) {
                return Err(ConfigError::Invalid(format!(
                    "Sheet margins leave no printable area ({:.1} x {:.1} mm)",
                    pt_to_mm(area.width),
                    pt_to_mm(area.height)
                )));
            }
        }

        Ok(())
    }
}
