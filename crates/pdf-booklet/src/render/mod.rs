//! PDF rendering modules for export
//!
//! This module handles all PDF-specific operations:
//! - Creating XObjects from source pages
//! - Building sequential and imposed output pages
//! - Deep copying PDF objects

mod page;
mod xobject;

pub(crate) use page::OutputBuilder;
pub use xobject::{
    copy_object_deep, create_page_xobject, get_page_dimensions, inherited_attribute,
    page_media_box, page_rotation,
};
