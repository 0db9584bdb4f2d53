//! Cut-and-stack sheet planning
//!
//! Every four consecutive logical pages go onto one sheet in the order
//! front-left, front-right, back-left, back-right. After duplex printing the
//! stack is cut down the vertical midline and the left-half stack is laid on
//! top of the right-half stack to get reading order back.
//!
//! ```text
//!  sheet 0 front      sheet 0 back
//! +------+------+    +------+------+
//! |  p1  |  p2  |    |  p3  |  p4  |
//! +------+------+    +------+------+
//! ```
//!
//! A short final block leaves its trailing quadrants empty. No blank logical
//! page is invented to fill them.

use super::{Quadrant, SheetLayout, SideLayout};
use crate::constants::PAGES_PER_SHEET;
use crate::sequence::{PageDescriptor, PageSequence};

/// Map the sequence onto sheets. Pure: the result depends only on `sequence`.
pub fn plan_imposition(sequence: &PageSequence) -> Vec<SheetLayout> {
    sequence
        .as_slice()
        .chunks(PAGES_PER_SHEET)
        .enumerate()
        .map(|(sheet_index, block)| {
            let slot = |offset: usize| block.get(offset).cloned();
            SheetLayout {
                sheet_index,
                front: SideLayout {
                    left: slot(0),
                    right: slot(1),
                },
                back: SideLayout {
                    left: slot(2),
                    right: slot(3),
                },
            }
        })
        .collect()
}

/// Read sheets back in traversal order, dropping empty quadrants.
pub fn flatten_sheets(sheets: &[SheetLayout]) -> Vec<PageDescriptor> {
    sheets
        .iter()
        .flat_map(|sheet| {
            Quadrant::TRAVERSAL
                .into_iter()
                .filter_map(move |q| sheet.get(q).cloned())
        })
        .collect()
}

/// Number of sheets needed for `page_count` logical pages
pub fn sheet_count(page_count: usize) -> usize {
    page_count.div_ceil(PAGES_PER_SHEET)
}
