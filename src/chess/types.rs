use pgn_reader::SanPlus;
use smallvec::SmallVec;

use super::eval::Evaluation;

/// One game block cut out of the input stream: header lines, the separator
/// line and the movetext lines, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based position of the record in the input, for diagnostics only.
    pub index: u64,
    pub bytes: Vec<u8>,
}

/// A half-move on the mainline and the comment attached to the position it
/// produces.
#[derive(Debug, Clone)]
pub struct Ply {
    pub san: SanPlus,
    pub comment: Option<String>,
}

impl Ply {
    pub fn evaluation(&self) -> Option<Evaluation> {
        self.comment.as_deref().and_then(Evaluation::from_comment)
    }
}

pub type PlyList = SmallVec<[Ply; 64]>;

/// Mainline of one game. The root (starting position) can only carry a
/// comment; every entry of `plies` has exactly one move.
#[derive(Debug, Clone, Default)]
pub struct ParsedGame {
    pub root_comment: Option<String>,
    pub plies: PlyList,
}

impl ParsedGame {
    pub fn push_move(&mut self, san: SanPlus) {
        self.plies.push(Ply { san, comment: None });
    }

    /// Attaches `text` to the current tip: the last ply, or the root when no
    /// move has been played yet. Returns the evaluation it carries.
    pub fn annotate_tip(&mut self, text: String) -> Option<Evaluation> {
        let slot = match self.plies.last_mut() {
            Some(ply) => &mut ply.comment,
            None => &mut self.root_comment,
        };
        let text: &str = slot.insert(text);
        Evaluation::from_comment(text)
    }
}

#[cfg(test)]
impl ParsedGame {
    pub fn root_evaluation(&self) -> Option<Evaluation> {
        self.root_comment.as_deref().and_then(Evaluation::from_comment)
    }
}

/// One output line: the position after a move and White's centipawn score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    pub fen: String,
    pub score: i32,
}

/// Everything one worker extracted from one record, in move order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub record_index: u64,
    pub positions: Vec<PositionRecord>,
    /// The record was aborted (malformed, unevaluated, illegal move).
    pub skipped: bool,
}

impl Batch {
    pub fn skipped(record_index: u64) -> Self {
        Self {
            record_index,
            positions: Vec::new(),
            skipped: true,
        }
    }
}

#[cfg(test)]
impl Batch {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Item of the work queue.
#[derive(Debug)]
pub enum WorkMessage {
    Record(Record),
    /// Sent once per worker after the input is exhausted.
    EndOfInput,
}
