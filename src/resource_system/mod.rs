pub mod animation;
pub mod file_formats;
pub mod library;
