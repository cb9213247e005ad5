use shakmaty::{Chess, EnPassantMode, Position, fen::Fen};

use super::error::SkipReason;
use super::types::{ParsedGame, PositionRecord};

/// Replays the mainline from the standard starting position and collects
/// every position whose comment carries a centipawn evaluation.
///
/// The board is created here and dropped on return, so nothing carries over
/// from one game to the next. An unplayable move invalidates the whole game.
pub fn extract_positions(game: &ParsedGame) -> Result<Vec<PositionRecord>, SkipReason> {
    let mut pos = Chess::default();
    let mut positions = Vec::new();

    for (idx, ply) in game.plies.iter().enumerate() {
        let m = ply
            .san
            .san
            .to_move(&pos)
            .map_err(|err| SkipReason::IllegalMove {
                ply: idx + 1,
                san: ply.san.to_string(),
                reason: err.to_string(),
            })?;
        pos.play_unchecked(m);

        let Some(score) = ply.evaluation().and_then(|eval| eval.centipawns()) else {
            continue;
        };

        positions.push(PositionRecord {
            fen: position_fen(&pos),
            score,
        });
    }

    Ok(positions)
}

/// Full FEN; the en passant square is only written when a capture is legal.
pub fn position_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}
