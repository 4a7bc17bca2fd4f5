//! Classification of free-text verifier responses
//!
//! The upstream service answers with human-readable phrases that have changed
//! wording over time. An ordered rule list maps known phrasings onto a small
//! canonical vocabulary; anything unrecognized passes through verbatim so new
//! upstream wording is never dropped.

/// Sentinel recorded when a subject is blank and no call was made.
pub const EMPTY: &str = "empty";

/// Sentinel recorded when the verification call failed at the transport level.
pub const CONNECTION_ERROR: &str = "connection error";

/// Sentinel recorded when the verification response could not be interpreted.
pub const UNEXPECTED_RESPONSE: &str = "unexpected response";

/// Canonical result for a subject the service knows.
pub const REGISTERED: &str = "registered correctly";

/// Canonical result for a subject the service does not know.
pub const NOT_REGISTERED: &str = "not registered";

/// Ordered rules: first match wins. Negative phrasings come first because the
/// positive patterns are substrings of them.
const RULES: &[(&str, &str)] = &[
    ("no se encuentra inscrito", NOT_REGISTERED),
    ("not registered", NOT_REGISTERED),
    ("se encuentra inscrito", REGISTERED),
    ("registered", REGISTERED),
];

/// Map a raw classification string onto the canonical vocabulary.
///
/// Matching is case-insensitive on trimmed input. Unmatched responses are
/// returned trimmed but otherwise unchanged.
pub fn classify(raw: &str) -> String {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();

    for (pattern, canonical) in RULES {
        if lowered.contains(pattern) {
            return (*canonical).to_string();
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_phrases() {
        assert_eq!(classify("Equipo se encuentra inscrito."), REGISTERED);
        assert_eq!(classify("registered"), REGISTERED);
        assert_eq!(classify("Device registered with carrier"), REGISTERED);
    }

    #[test]
    fn test_not_registered_phrases() {
        assert_eq!(classify("Equipo no se encuentra inscrito."), NOT_REGISTERED);
        assert_eq!(classify("IMEI not registered"), NOT_REGISTERED);
    }

    #[test]
    fn test_negative_rule_wins_over_substring() {
        // "not registered" contains "registered"; rule order decides.
        assert_eq!(classify("The device is NOT REGISTERED."), NOT_REGISTERED);
    }

    #[test]
    fn test_unmatched_passes_through_verbatim() {
        assert_eq!(classify("Estado: homologación pendiente"), "Estado: homologación pendiente");
        assert_eq!(classify("  spaced out  "), "spaced out");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("EQUIPO SE ENCUENTRA INSCRITO"), REGISTERED);
    }

    #[test]
    fn test_sentinels_are_distinct() {
        let sentinels = [EMPTY, CONNECTION_ERROR, UNEXPECTED_RESPONSE, REGISTERED, NOT_REGISTERED];
        for (i, a) in sentinels.iter().enumerate() {
            for b in &sentinels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
