use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `[%eval 0.25]`, `[%eval -1.3,22]`, `[%eval #-3]` anywhere in a comment.
static EVAL_COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%eval\s+(?:#([+-]?\d+)|([+-]?(?:\d{0,10}\.\d{1,2}|\d{1,10}\.?)))(?:,\d+)?\]")
        .expect("valid eval command regex")
});

/// A comment that is nothing but a score: `+0.30`, `-1.5`, `0.25`, `#-3`.
static BARE_EVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:#([+-]?\d+)|([+-]\d{1,10}(?:\.\d{0,2})?|[+-]?\d{0,10}\.\d{1,2}))\s*$")
        .expect("valid bare eval regex")
});

/// Engine assessment of a position, always from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Centipawns(i32),
    /// Moves until mate; negative when Black mates.
    Mate(i32),
}

impl Evaluation {
    /// Finds the evaluation carried by a PGN comment, if any.
    pub fn from_comment(comment: &str) -> Option<Self> {
        if let Some(caps) = EVAL_COMMAND_RE.captures(comment) {
            return Self::from_captures(&caps);
        }

        BARE_EVAL_RE
            .captures(comment)
            .and_then(|caps| Self::from_captures(&caps))
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        if let Some(mate) = caps.get(1) {
            return mate.as_str().parse::<i32>().ok().map(Self::Mate);
        }

        caps.get(2)
            .and_then(|pawns| parse_centipawns(pawns.as_str()))
            .map(Self::Centipawns)
    }

    /// The centipawn score, or `None` for mate markers.
    pub fn centipawns(self) -> Option<i32> {
        match self {
            Self::Centipawns(cp) => Some(cp),
            Self::Mate(_) => None,
        }
    }
}

/// Converts a decimal pawn value (`-1.5`, `+.25`, `3.`) to centipawns without
/// going through floating point.
fn parse_centipawns(raw: &str) -> Option<i32> {
    let (negative, unsigned) = match raw.as_bytes().first()? {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > 2 {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut hundredths: i64 = if fraction.is_empty() { 0 } else { fraction.parse().ok()? };
    if fraction.len() == 1 {
        hundredths *= 10;
    }

    let magnitude = whole.checked_mul(100)?.checked_add(hundredths)?;
    let centipawns = if negative { -magnitude } else { magnitude };
    i32::try_from(centipawns).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_command_pawn_values() {
        assert_eq!(
            Evaluation::from_comment("[%eval 0.25]"),
            Some(Evaluation::Centipawns(25))
        );
        assert_eq!(
            Evaluation::from_comment("[%eval -1.3]"),
            Some(Evaluation::Centipawns(-130))
        );
        assert_eq!(
            Evaluation::from_comment("[%eval 2]"),
            Some(Evaluation::Centipawns(200))
        );
        assert_eq!(
            Evaluation::from_comment("[%eval .05]"),
            Some(Evaluation::Centipawns(5))
        );
    }

    #[test]
    fn test_eval_command_with_depth_and_clock() {
        assert_eq!(
            Evaluation::from_comment("[%eval 0.17,23] [%clk 0:03:00]"),
            Some(Evaluation::Centipawns(17))
        );
        assert_eq!(
            Evaluation::from_comment(" [%clk 1:30:43] [%eval -0.29] "),
            Some(Evaluation::Centipawns(-29))
        );
    }

    #[test]
    fn test_eval_command_mate() {
        assert_eq!(
            Evaluation::from_comment("[%eval #-3]"),
            Some(Evaluation::Mate(-3))
        );
        assert_eq!(
            Evaluation::from_comment("[%eval #4]"),
            Some(Evaluation::Mate(4))
        );
        assert_eq!(Evaluation::Mate(4).centipawns(), None);
    }

    #[test]
    fn test_bare_scores() {
        assert_eq!(
            Evaluation::from_comment("+0.30"),
            Some(Evaluation::Centipawns(30))
        );
        assert_eq!(
            Evaluation::from_comment(" -1.5 "),
            Some(Evaluation::Centipawns(-150))
        );
        assert_eq!(
            Evaluation::from_comment("0.25"),
            Some(Evaluation::Centipawns(25))
        );
        assert_eq!(
            Evaluation::from_comment("+3"),
            Some(Evaluation::Centipawns(300))
        );
        assert_eq!(Evaluation::from_comment("#-3"), Some(Evaluation::Mate(-3)));
    }

    #[test]
    fn test_non_evaluations() {
        assert_eq!(Evaluation::from_comment(""), None);
        assert_eq!(Evaluation::from_comment("best by test"), None);
        assert_eq!(Evaluation::from_comment("[%clk 0:03:00]"), None);
        assert_eq!(Evaluation::from_comment("12"), None);
        assert_eq!(Evaluation::from_comment("+0.30 is fine"), None);
        assert_eq!(Evaluation::from_comment("[%eval abc]"), None);
    }

    #[test]
    fn test_parse_centipawns_is_exact() {
        // 0.29 * 100.0 is 28.999... in binary floating point.
        assert_eq!(parse_centipawns("0.29"), Some(29));
        assert_eq!(parse_centipawns("-0.07"), Some(-7));
        assert_eq!(parse_centipawns("1."), Some(100));
        assert_eq!(parse_centipawns("."), None);
        assert_eq!(parse_centipawns("0.123"), None);
    }

    #[test]
    fn test_parse_centipawns_rejects_overflow() {
        assert_eq!(parse_centipawns("9999999999"), None);
        assert_eq!(parse_centipawns("21474836.47"), Some(i32::MAX));
    }
}
