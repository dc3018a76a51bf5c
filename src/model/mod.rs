mod cache;
mod entry;
mod size;
mod source;
mod walker;
mod worker;

pub use cache::SizeCache;
pub use entry::Entry;
pub use size::{format_bytes, format_size, INVALID_SIZE};
pub use source::{
    format_modified, kind_label, matches_filter, Column, DirectorySizer, FsDataSource, FsSizer,
    SourceState, TreeDataSource,
};
pub use walker::{directory_size, directory_size_until, read_entries, SizeReport};
pub use worker::{SizeResult, SizeWorker};
