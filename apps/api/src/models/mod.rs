pub mod catalog;
pub mod resume;
