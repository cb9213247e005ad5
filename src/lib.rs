//! Streams PGN games and extracts every position carrying a centipawn
//! evaluation as a `FEN;score` line.
//!
//! One thread cuts the input into game records, a pool of workers parses
//! them with a fast-exit [`chess::FastGameVisitor`] and replays the mainline
//! with shakmaty, and a single collector writes the results. The stages talk
//! through two bounded queues, which is all the flow control there is.

pub mod chess;

pub use chess::{PipelineConfig, RunSummary, run_pipeline};
