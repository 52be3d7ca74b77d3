pub mod csv;
pub mod dispatcher;
pub mod docx;
pub mod output_manager;
pub mod pdf;
pub mod xlsx;

pub use dispatcher::{
    extract_file, ExtractedFile, ExtractionError, FileFailure, Payload, ProcessingProgress,
    SheetTable,
};
pub use output_manager::{ConfigSnapshot, OutputBundle, OutputManager, RunReport};
