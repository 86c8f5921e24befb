pub mod batch;
pub mod resume;
