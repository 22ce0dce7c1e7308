//! Best-effort phone number extraction from booking descriptions.
//!
//! Feed descriptions mix the guest name, booking metadata, and a phone
//! number in unpredictable formats. The door code is the last 4 digits
//! of the phone number, so extraction runs a prioritized set of digit
//! patterns over the text and keeps the longest plausible candidate.
//! This is a heuristic: the returned [`PhoneCode`] carries the matched
//! tier and every surviving candidate so callers can log what was
//! actually found rather than pretend certainty.

use regex::Regex;

/// Which pattern tier produced the selected candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchTier {
    /// International mobile, e.g. `+44 7911123456`
    IntlMobile,
    /// International number with any leading digits, e.g. `+44 2079460000`
    IntlNumber,
    /// Nationally prefixed 11-digit number, e.g. `07911123456`
    NationalNumber,
    /// Bare run of 10 or more digits
    DigitRun10,
    /// Bare run of 8 or more digits
    DigitRun8,
    /// Separator-grouped digits, e.g. `0791 112 3456`
    GroupedDigits,
    /// Any run of 7 or more digits
    DigitRun7,
    /// Fallback: any 4+ digit run in the raw description
    RawDigits,
}

/// A derived door code plus extraction diagnostics.
#[derive(Clone, Debug)]
pub struct PhoneCode {
    /// The 4-digit door code (last 4 digits of the selected number).
    pub code: String,
    /// The full digit string the code was taken from.
    pub digits: String,
    pub tier: MatchTier,
    /// Every candidate digit string that survived filtering, in the
    /// order found.
    pub candidates: Vec<String>,
}

const PHONE_PATTERNS: &[(MatchTier, &str)] = &[
    (MatchTier::IntlMobile, r"\+44\s*7\d{9}"),
    (MatchTier::IntlNumber, r"\+44\s*\d{10}"),
    (MatchTier::NationalNumber, r"0\d{10}"),
    (MatchTier::DigitRun10, r"\d{10,}"),
    (MatchTier::DigitRun8, r"\d{8,}"),
    (
        MatchTier::GroupedDigits,
        r"\d{3,4}[\s\-\.]\d{3,4}[\s\-\.]\d{3,4}",
    ),
    (MatchTier::DigitRun7, r"\d{7,}"),
];

/// Minimum digits for a match to count as a phone number.
const MIN_PHONE_DIGITS: usize = 7;

/// Derive a 4-digit door code from a booking description.
///
/// Returns `None` when no plausible digit sequence exists; downstream
/// processing must treat that as a hard skip for the booking, not a
/// retryable failure.
pub fn extract_code(description: &str) -> Option<PhoneCode> {
    // Strip letters so alphanumeric tokens (booking refs, postcodes)
    // don't masquerade as phone numbers.
    let letters = Regex::new(r"[a-zA-Z]").unwrap();
    let cleaned = letters.replace_all(description, " ");

    let mut candidates: Vec<(MatchTier, String)> = Vec::new();
    for (tier, pattern) in PHONE_PATTERNS {
        let re = Regex::new(pattern).unwrap();
        for m in re.find_iter(&cleaned) {
            let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.len() >= MIN_PHONE_DIGITS {
                candidates.push((*tier, digits));
            }
        }
    }

    if let Some((tier, digits)) = longest_first(&candidates) {
        let code = last_four(&digits);
        tracing::debug!(?tier, digits = %digits, code = %code, "phone_code_extracted");
        return Some(PhoneCode {
            code,
            digits,
            tier,
            candidates: candidates.into_iter().map(|(_, d)| d).collect(),
        });
    }

    // Last resort: any 4+ digit run anywhere in the raw description.
    let any_digits = Regex::new(r"\d{4,}").unwrap();
    let fallback: Vec<(MatchTier, String)> = any_digits
        .find_iter(description)
        .map(|m| (MatchTier::RawDigits, m.as_str().to_string()))
        .collect();

    if let Some((tier, digits)) = longest_first(&fallback) {
        let code = last_four(&digits);
        tracing::debug!(digits = %digits, code = %code, "phone_code_fallback_digits");
        return Some(PhoneCode {
            code,
            digits,
            tier,
            candidates: fallback.into_iter().map(|(_, d)| d).collect(),
        });
    }

    tracing::debug!("phone_code_not_found");
    None
}

/// Longest candidate wins; the first one found breaks ties.
fn longest_first(candidates: &[(MatchTier, String)]) -> Option<(MatchTier, String)> {
    let mut best: Option<&(MatchTier, String)> = None;
    for candidate in candidates {
        if best.is_none_or(|(_, digits)| candidate.1.len() > digits.len()) {
            best = Some(candidate);
        }
    }
    best.cloned()
}

fn last_four(digits: &str) -> String {
    digits[digits.len().saturating_sub(4)..].to_string()
}
