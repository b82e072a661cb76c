//! Embassy tasks

mod link;

pub use link::link_task;
