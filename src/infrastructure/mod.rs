pub mod advice;
pub mod audio;
pub mod cache;
pub mod observability;
