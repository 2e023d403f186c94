//! PDF rendering modules
//!
//! This module handles all lopdf-specific operations:
//! - Reading source page geometry (boxes, rotation, inheritance)
//! - Importing source pages as Form XObjects
//! - Writing content streams and the output page tree

mod document;
mod xobject;

pub use document::{LopdfSink, LopdfSource, write_ops};
pub use xobject::{ObjectCache, copy_object_deep, import_page_xobject, read_source_page};
