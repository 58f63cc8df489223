//! Canonical board codes.
//!
//! A board code lists each bottle's slots bottom-to-top (`A`..`H` for colors,
//! `.` for empty slots, `*` prefix for sinks) joined by `/`, for example
//! `AB../BA../....`. The code covers only the board shape: move counters and
//! level metadata never affect it, which is what the solver's visited set
//! relies on.

use crate::error::ParseError;
use crate::model::{Bottle, LevelState};

/// Separator between bottles in a board code.
pub const BOTTLE_SEPARATOR: char = '/';

/// Board code for `state`. Injective over board shapes.
pub fn encode(state: &LevelState) -> String {
    encode_bottles(state.bottles())
}

pub(crate) fn encode_bottles(bottles: &[Bottle]) -> String {
    let mut code = String::new();
    for (i, bottle) in bottles.iter().enumerate() {
        if i > 0 {
            code.push(BOTTLE_SEPARATOR);
        }
        code.push_str(&bottle.get_text_representation());
    }
    code
}

/// Parses a board code into a fresh state with zeroed metadata.
///
/// # Errors
/// Reports the offending bottle for empty codes, unknown letters or floating
/// liquid.
pub fn decode(code: &str) -> Result<LevelState, ParseError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ParseError::new(0, "board code is empty"));
    }
    let bottles = code
        .split(BOTTLE_SEPARATOR)
        .enumerate()
        .map(|(i, repr)| {
            Bottle::new_from_repr(repr)
                .map_err(|e| ParseError::new(0, format!("bottle {i}: {}", e.message)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LevelState::new(bottles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::apply_pour;

    #[test]
    fn code_ignores_move_counters() {
        let state = decode("AB../B.../....").unwrap();
        let (direct, _) = apply_pour(&state, 0, 1);
        let (detour, _) = apply_pour(&state, 0, 2);
        let (detour, _) = apply_pour(&detour, 2, 1);
        assert_eq!(direct.moves_used(), 1);
        assert_eq!(detour.moves_used(), 2);
        assert_eq!(encode(&direct), encode(&detour));
        assert_ne!(encode(&direct), encode(&state));
        assert_eq!(encode(&state.clone().with_level(9, 4).with_moves_allowed(30)), encode(&state));
    }

    #[test]
    fn code_distinguishes_sinks_and_capacity() {
        let plain = decode("A.../....").unwrap();
        let sink = decode("A.../*....").unwrap();
        let larger = decode("A.../.....").unwrap();
        assert_ne!(encode(&plain), encode(&sink));
        assert_ne!(encode(&plain), encode(&larger));
    }

    #[test]
    fn decode_reports_bad_bottle() {
        let err = decode("AB../A.B.").unwrap_err();
        assert!(err.message.starts_with("bottle 1"));
        assert!(decode("").is_err());
        assert!(decode("AB//..").is_err());
    }

    #[test]
    fn decode_then_encode_is_identity() {
        for code in ["AB../BA../....", "*CCC/DDDD/....", "ABCDEFGH/........"] {
            assert_eq!(encode(&decode(code).unwrap()), code);
        }
    }
}
