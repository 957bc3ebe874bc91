pub mod correction_pipeline;
pub mod essay_store;
pub mod response_parser;

pub use correction_pipeline::CorrectionPipeline;
pub use essay_store::{EssayStore, SqliteEssayStore};
pub use response_parser::{parse, ParsedResponse};
