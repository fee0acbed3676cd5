//! The trained categorical encoder for state names.
//!
//! The model was trained with states label-encoded in lexicographic
//! order, so the code for a state is simply its index in the sorted
//! training list. A name outside the list has no code — that is a
//! client-input error, not a crash.

use crate::PredictionError;

/// States present in the training data, lexicographic. Index == code.
const TRAINED_STATES: &[&str] = &[
    "Adamawa", "Bauchi", "Borno", "Gombe", "Jigawa", "Kaduna", "Kano", "Katsina", "Kebbi",
    "Niger", "Sokoto", "Taraba", "Yobe", "Zamfara",
];

/// Encodes a state name to its trained integer code.
///
/// Matching ignores surrounding whitespace and ASCII case; the encoder
/// is otherwise exact.
///
/// # Errors
///
/// Returns [`PredictionError::UnknownCategory`] when the state was not
/// seen during training.
pub fn encode_state(name: &str) -> Result<u32, PredictionError> {
    let wanted = name.trim();
    TRAINED_STATES
        .iter()
        .position(|state| state.eq_ignore_ascii_case(wanted))
        .map(|index| u32::try_from(index).expect("state list fits in u32"))
        .ok_or_else(|| PredictionError::UnknownCategory {
            value: name.to_string(),
        })
}

/// The states the encoder can encode, in code order.
#[must_use]
pub const fn trained_states() -> &'static [&'static str] {
    TRAINED_STATES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_lexicographic_training_order() {
        assert_eq!(encode_state("Adamawa").unwrap(), 0);
        assert_eq!(encode_state("Kano").unwrap(), 6);
        assert_eq!(encode_state("Zamfara").unwrap(), 13);
    }

    #[test]
    fn matching_is_trimmed_and_case_insensitive() {
        assert_eq!(encode_state(" kano ").unwrap(), 6);
        assert_eq!(encode_state("SOKOTO").unwrap(), 10);
    }

    #[test]
    fn unknown_state_has_no_code() {
        let err = encode_state("Lagos Island").unwrap_err();
        assert!(
            matches!(err, PredictionError::UnknownCategory { ref value } if value == "Lagos Island")
        );
    }

    #[test]
    fn training_list_is_sorted_and_unique() {
        for window in TRAINED_STATES.windows(2) {
            assert!(window[0] < window[1], "{} >= {}", window[0], window[1]);
        }
    }
}
