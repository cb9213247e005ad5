use super::error::SkipReason;
use super::types::ParsedGame;

use pgn_reader::{Nag, Outcome, RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use std::ops::ControlFlow;

/// Mainline-only PGN visitor (pgn-reader) that gives up on a game as soon as
/// it is known to carry no evaluations.
///
/// Builds a [`ParsedGame`] from the moves and the comment following each of
/// them. Headers, NAGs, results and variations are ignored. The first comment
/// of the game decides: if it is not an evaluation the visitor breaks with
/// [`SkipReason::Unevaluated`] and the reader skips the rest of the movetext.
/// A game without any comment ends as [`SkipReason::Unevaluated`] too, so it
/// is never replayed on a board.
///
/// A break travels out of `Reader::read_game` as the game's output, so the
/// reader never gets a chance to recover from it and keep parsing.
#[derive(Debug, Default)]
pub struct FastGameVisitor {
    seen_comment: bool,
    moves_visited: usize,
    pending_comment: Vec<u8>,
}

impl FastGameVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one record. Never fails hard: every way a record can be
    /// unusable comes back as a [`SkipReason`].
    pub fn parse(&mut self, record: &[u8]) -> Result<ParsedGame, SkipReason> {
        let mut reader = Reader::new(record);

        match reader.read_game(self) {
            Ok(Some(outcome)) => outcome,
            Ok(None) => Err(SkipReason::Empty),
            Err(err) => Err(SkipReason::Malformed(err.to_string())),
        }
    }

    /// Number of moves seen in the last parsed game before it ended or was
    /// abandoned.
    pub fn moves_visited(&self) -> usize {
        self.moves_visited
    }
}

impl Visitor for FastGameVisitor {
    type Tags = ();
    type Movetext = ParsedGame;
    type Output = Result<ParsedGame, SkipReason>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.seen_comment = false;
        self.moves_visited = 0;
        self.pending_comment.clear();
        ControlFlow::Continue(())
    }

    fn tag(&mut self, _: &mut Self::Tags, _: &[u8], _: RawTag<'_>) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(ParsedGame::default())
    }

    fn san(&mut self, game: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        game.push_move(san);
        self.moves_visited += 1;
        ControlFlow::Continue(())
    }

    fn nag(&mut self, _: &mut Self::Movetext, _: Nag) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        game: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        let text = if self.pending_comment.is_empty() {
            String::from_utf8_lossy(comment.as_bytes()).trim().to_string()
        } else {
            self.pending_comment.extend_from_slice(comment.as_bytes());
            let joined = String::from_utf8_lossy(&self.pending_comment).trim().to_string();
            self.pending_comment.clear();
            joined
        };
        let evaluation = game.annotate_tip(text);

        if !self.seen_comment {
            self.seen_comment = true;
            if evaluation.is_none() {
                return ControlFlow::Break(Err(SkipReason::Unevaluated));
            }
        }

        ControlFlow::Continue(())
    }

    /// Comments longer than the reader's buffer arrive in pieces.
    fn partial_comment(
        &mut self,
        _: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        self.pending_comment.extend_from_slice(comment.as_bytes());
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn outcome(&mut self, _: &mut Self::Movetext, _: Outcome) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, game: Self::Movetext) -> Self::Output {
        if !self.seen_comment {
            return Err(SkipReason::Unevaluated);
        }
        Ok(game)
    }
}
