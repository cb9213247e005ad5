pub mod collector;
pub mod error;
pub mod eval;
pub mod moves;
pub mod pipeline;
pub mod reader;
pub mod types;
pub mod visitor;
pub mod worker;

pub use collector::{Collector, Totals};
pub use error::SkipReason;
pub use eval::Evaluation;
pub use pipeline::{PipelineConfig, RunSummary, run_pipeline};
pub use reader::{CompressionMode, InputSource, RecordSplitter};
pub use types::{Batch, ParsedGame, Ply, PositionRecord, Record, WorkMessage};
pub use visitor::FastGameVisitor;
