use crate::constants::{PAGES_PER_SHEET, SIDES_PER_SHEET};
use crate::layout::sheet_count;
use crate::sequence::PageSequence;
use crate::types::*;

/// Calculate what an export of `sequence` in `mode` will produce
pub fn calculate_statistics(sequence: &PageSequence, mode: ExportMode) -> ImpositionStatistics {
    let logical_pages = sequence.len();
    let blank_pages = sequence.blank_count();

    match mode {
        ExportMode::Sequential => ImpositionStatistics {
            logical_pages,
            blank_pages,
            sheets: logical_pages,
            output_pages: logical_pages,
            empty_quadrants: 0,
        },
        ExportMode::Imposed => {
            let sheets = sheet_count(logical_pages);
            ImpositionStatistics {
                logical_pages,
                blank_pages,
                sheets,
                output_pages: sheets * SIDES_PER_SHEET,
                empty_quadrants: sheets * PAGES_PER_SHEET - logical_pages,
            }
        }
    }
}
