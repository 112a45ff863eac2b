pub mod config;
pub mod decoder;
pub mod evaluator;
pub mod history;
pub mod insights;
pub mod kb_draft;
pub mod prompts;
pub mod roi;
pub mod samples;
pub mod session;
pub mod transcript;

pub use config::*;
pub use decoder::*;
pub use evaluator::*;
pub use history::*;
pub use insights::*;
pub use kb_draft::*;
pub use roi::*;
pub use samples::*;
pub use session::*;
pub use transcript::*;
