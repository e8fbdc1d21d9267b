//! Input processing module
//! Handles file detection, résumé text extraction and job sheet loading

pub mod file_detector;
pub mod manager;
pub mod spreadsheet;
pub mod text_extractor;

pub use manager::InputManager;
pub use spreadsheet::{load_contacts, JobSheet};
