pub mod essay;
pub mod loaders;

pub use essay::{
    CorrectionRequest, CorrectionResult, EssayBatch, EssayRecord, EssayResponse, ErrorResponse,
    HealthStatus, NewEssay,
};
pub use loaders::{load_all_toml_files, load_toml_to_essay_batch};
