use thiserror::Error;

/// Why a record produced no positions. Absorbed by the worker, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The first comment of the game carries no evaluation, or the game has
    /// no comment at all.
    #[error("no evaluation in first comment")]
    Unevaluated,
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("illegal move {san} at ply {ply}: {reason}")]
    IllegalMove {
        ply: usize,
        san: String,
        reason: String,
    },
    #[error("record contains no game")]
    Empty,
}

impl SkipReason {
    /// Whether the record was abandoned by the first-comment fast exit rather
    /// than for being broken.
    pub fn is_fast_exit(&self) -> bool {
        matches!(self, Self::Unevaluated)
    }
}

#[cfg(test)]
mod tests {
    use super::SkipReason;

    #[test]
    fn test_illegal_move_message() {
        let reason = SkipReason::IllegalMove {
            ply: 3,
            san: "Qh5".to_string(),
            reason: "illegal san".to_string(),
        };

        assert_eq!(reason.to_string(), "illegal move Qh5 at ply 3: illegal san");
    }

    #[test]
    fn test_malformed_message_includes_cause() {
        let reason = SkipReason::Malformed("invalid data".to_string());
        assert_eq!(reason.to_string(), "malformed record: invalid data");
    }

    #[test]
    fn test_only_unevaluated_is_fast_exit() {
        assert!(SkipReason::Unevaluated.is_fast_exit());
        assert!(!SkipReason::Empty.is_fast_exit());
        assert!(!SkipReason::Malformed("x".to_string()).is_fast_exit());
    }
}
