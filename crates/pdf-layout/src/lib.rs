pub mod compose;
pub mod constants;
pub mod impose;
pub mod layout;
mod options;
pub mod render;
mod stats;
mod types;

pub use compose::{ComposeReport, PageCanvasComposer, PageHandle, PageSink, PageSource};
pub use impose::{
    booklet, load_pdf, multi_page_layout, plan_layout, poster, run, save_all, save_pdf,
    split_sections,
};
pub use options::*;
pub use stats::{BookletStatistics, LayoutStatistics, booklet_statistics, plan_statistics};
pub use types::*;
