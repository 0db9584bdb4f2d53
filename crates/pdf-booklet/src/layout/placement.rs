//! Sheet geometry and content placement
//!
//! The output sheet is A4 landscape. Inside the sheet margins the printable
//! area is split down the vertical midline into two A5-sized cells; each
//! quadrant's page is scaled into its cell and centered.

use super::{Column, PagePlacement, Rect};
use crate::constants::mm_to_pt;
use crate::types::{Orientation, PaperSize, ScalingMode, SheetMargins};

/// Output sheet size in points (A4 landscape)
pub fn sheet_dimensions_pt() -> (f32, f32) {
    let (w, h) = PaperSize::A4.dimensions_with_orientation(Orientation::Landscape);
    (mm_to_pt(w), mm_to_pt(h))
}

/// Printable area of the sheet after margins
pub fn printable_area(margins: &SheetMargins) -> Rect {
    let (sheet_width, sheet_height) = sheet_dimensions_pt();
    let left = mm_to_pt(margins.left_mm);
    let bottom = mm_to_pt(margins.bottom_mm);
    Rect::new(
        left,
        bottom,
        sheet_width - left - mm_to_pt(margins.right_mm),
        sheet_height - bottom - mm_to_pt(margins.top_mm),
    )
}

/// Bounds of the left or right half of the printable area
pub fn cell_bounds(column: Column, margins: &SheetMargins) -> Rect {
    let area = printable_area(margins);
    let half = area.width / 2.0;
    let x = match column {
        Column::Left => area.x,
        Column::Right => area.x + half,
    };
    Rect::new(x, area.y, half, area.height)
}

/// Scale a source page into a cell and center it.
///
/// # Arguments
/// * `cell` - The cell bounds
/// * `source_width` - MediaBox width of the source page in points
/// * `source_height` - MediaBox height of the source page in points
/// * `scaling_mode` - How to scale the source page
/// * `rotation_degrees` - Clockwise rotation, a multiple of 90: the page's
///   own `/Rotate` plus 180 for an upside-down back page
pub fn place_page(
    cell: &Rect,
    source_width: f32,
    source_height: f32,
    scaling_mode: ScalingMode,
    rotation_degrees: f32,
) -> PagePlacement {
    // A quarter turn lays the page on its side
    let (source_width, source_height) = if quarter_turns(rotation_degrees) % 2 == 1 {
        (source_height, source_width)
    } else {
        (source_width, source_height)
    };

    let scale = calculate_scale(
        source_width,
        source_height,
        cell.width,
        cell.height,
        scaling_mode,
    );

    let scaled_width = source_width * scale;
    let scaled_height = source_height * scale;

    let x = cell.x + (cell.width - scaled_width) / 2.0;
    let y = cell.y + (cell.height - scaled_height) / 2.0;

    PagePlacement {
        cell: *cell,
        content_rect: Rect::new(x, y, scaled_width, scaled_height),
        scale,
        rotation_degrees,
    }
}

/// Clockwise quarter turns in `0..4` for a rotation in degrees
pub fn quarter_turns(rotation_degrees: f32) -> u8 {
    ((rotation_degrees / 90.0).round() as i64).rem_euclid(4) as u8
}

/// Calculate scale factor for fitting source to target dimensions.
pub fn calculate_scale(
    src_width: f32,
    src_height: f32,
    target_width: f32,
    target_height: f32,
    mode: ScalingMode,
) -> f32 {
    if src_width <= 0.0 || src_height <= 0.0 {
        return 1.0;
    }

    let scale_w = target_width / src_width;
    let scale_h = target_height / src_height;
    match mode {
        ScalingMode::Fit => scale_w.min(scale_h),
        ScalingMode::Fill => scale_w.max(scale_h),
        ScalingMode::None => 1.0,
    }
}
