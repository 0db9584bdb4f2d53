use crate::sequence::SourceId;
use thiserror::Error;

/// Failure to turn a source document into a page sequence.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Document has no pages")]
    NoPages,
}

/// Terminal failure of an export attempt. No partial output survives one of these.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to export")]
    NoPages,
    #[error("Source document {0} is not loaded")]
    MissingSource(SourceId),
    #[error("Source document {document} has no page at index {page_index}")]
    MissingPage {
        document: SourceId,
        page_index: usize,
    },
    #[error("Source page has no usable MediaBox")]
    MissingMediaBox,
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Export cancelled")]
    Cancelled,
    #[error("Export result was already taken")]
    ResultTaken,
}

/// Errors reading, writing or validating export options.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// The two paper sizes of the A4-to-A5 duplex scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperSize {
    /// Physical output sheet
    A4,
    /// Logical page (half an A4 sheet)
    A5,
}

impl PaperSize {
    /// Get base dimensions (always portrait)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Which edge of the sheet the duplex printer flips on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BindingEdge {
    /// The printer's landscape flip keeps the back upright
    ShortEdge,
    /// The back comes out upside down unless it is pre-rotated
    #[default]
    LongEdge,
}

/// Page scaling behavior when a source page doesn't match its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalingMode {
    /// Fit page to available space (preserve aspect ratio)
    #[default]
    Fit,
    /// Fill available space (crops to the cell)
    Fill,
    /// Center without scaling
    None,
}

/// Straight page-per-page output or cut-and-stack sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExportMode {
    #[default]
    Sequential,
    Imposed,
}

/// Sheet margins - printer-safe area around the entire A4 sheet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetMargins {
    pub top_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
    pub right_mm: f32,
}

impl SheetMargins {
    /// Create uniform margins on all sides
    pub fn uniform(margin_mm: f32) -> Self {
        Self {
            top_mm: margin_mm,
            bottom_mm: margin_mm,
            left_mm: margin_mm,
            right_mm: margin_mm,
        }
    }

    fn all(&self) -> [f32; 4] {
        [self.top_mm, self.bottom_mm, self.left_mm, self.right_mm]
    }

    pub(crate) fn any_negative(&self) -> bool {
        self.all().iter().any(|m| *m < 0.0 || m.is_nan())
    }
}

/// Statistics about an export of the current sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpositionStatistics {
    /// Logical pages in the sequence (blanks included)
    pub logical_pages: usize,
    /// How many of those are inserted blanks
    pub blank_pages: usize,
    /// Physical sheets (equal to `logical_pages` for sequential output)
    pub sheets: usize,
    /// Pages in the output PDF
    pub output_pages: usize,
    /// Quadrants left empty on the last sheet
    pub empty_quadrants: usize,
}
