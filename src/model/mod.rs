//! Data model for entries and entry pages.

mod entry;
mod timestamp;

pub use entry::{
    Annotation, AnnotationRange, EmbeddedEntries, Entry, EntryPage, Link, Links, Tag,
};
pub use timestamp::{WIRE_TIMESTAMP_FORMAT, WireTimestamp};
