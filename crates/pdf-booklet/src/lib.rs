pub mod constants;
mod editor;
pub mod export;
pub mod layout;
mod options;
pub mod render;
pub mod sequence;
mod stats;
mod types;

pub use editor::Editor;
pub use export::{
    CancelFlag, ExportEvent, ExportTask, export, load_pdf, load_pdf_bytes, render_output,
    save_pdf_bytes,
};
pub use layout::{Quadrant, SheetLayout, SideLayout, flatten_sheets, plan_imposition};
pub use options::*;
pub use sequence::{
    History, InsertPosition, PageContent, PageDescriptor, PageId, PageKind, PageSequence,
    SourceId, SourceSet, delete_by_id, delete_by_indices, insert_blanks, load_from_document,
    load_from_source, move_page, parse_range_spec,
};
pub use stats::calculate_statistics;
pub use types::*;
