//! Shared constants for sequence editing and cut-and-stack export
//!
//! This module centralizes magic numbers used throughout the crate.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Sequence Editing
// =============================================================================

/// Number of snapshots kept for undo
pub const HISTORY_DEPTH: usize = 20;

// =============================================================================
// Imposition
// =============================================================================

/// Logical pages carried by one physical sheet (two per side)
pub const PAGES_PER_SHEET: usize = 4;

/// Output PDF pages per physical sheet (front and back)
pub const SIDES_PER_SHEET: usize = 2;

/// Rotation applied to back-side quadrants for long-edge duplex
pub const BACK_ROTATION_DEGREES: f32 = 180.0;

// =============================================================================
// Export
// =============================================================================

/// Share of the progress bar spent placing pages; the rest covers serialization
pub const PLACEMENT_PROGRESS_SHARE: usize = 95;

/// PDF version written to exported documents
pub const OUTPUT_PDF_VERSION: &str = "1.7";
