use std::sync::OnceLock;

use laoslip_core::{Amount, SlipDate, SlipResult};
use regex::Regex;

use crate::classify;

// ── Compiled pattern tables ───────────────────────────────────────────────────

macro_rules! table {
    ($name:ident, [$($pat:expr),+ $(,)?]) => {
        fn $name() -> &'static [Regex] {
            static T: OnceLock<Vec<Regex>> = OnceLock::new();
            T.get_or_init(|| {
                vec![$(Regex::new($pat).expect("invalid regex")),+]
            })
        }
    };
}

// Most specific first. Currency-labelled amounts beat the bare digit-run
// fallbacks at the bottom, which only exist for slips whose "LAK" OCR'd badly.
table!(amount_patterns, [
    r"(?i)Amount\s*([0-9,]+(?:\.[0-9]{2})?)\s*LAK",
    r"(?m)^([0-9,]{3,})\s*LAK$",
    r"(?i)ຈ້ານວນເງິນ:\s*K?\s*-?([0-9,]+(?:\.[0-9]{2})?)",
    r"(?i)-([0-9,]+(?:\.[0-9]{2})?)\s*LAK",
    r"(?i)ຈໍານວນຊໍາລະ[:\s]*([0-9,]+(?:\.[0-9]{2})?)",
    r"(?i)([0-9,]+(?:\.[0-9]{2})?)\s*(?:ກີບ|LAK|Lak)",
    r"(?m)(?:^|\s)([0-9,]{6,}(?:\.[0-9]{2})?)\s*(?:$|\s)",
    r"(?m)(?:^|\s)([0-9,]{4,}(?:\.[0-9]{2})?)\s*(?:$|\s)",
]);

// Two-digit year + time, ISO date + time, then looser delimited triples.
// `(?:[^0-9]|$)` stands in for "not followed by another digit". The
// "Transfer Completed" signature stops at the first `dd/dd/dd` after the label
// and captures the next digit in group 2; see `date_candidate`.
table!(date_patterns, [
    r"([0-9]{2}/[0-9]{2}/[0-9]{2})\s+[0-9]{2}:[0-9]{2}:[0-9]{2}",
    r"(?i)Transfer Completed.*?([0-9]{2}/[0-9]{2}/[0-9]{2})([0-9]?)",
    r"([0-9]{4}-[0-9]{2}-[0-9]{2})\s+[0-9]{2}:[0-9]{2}:[0-9]{2}",
    r"ຊໍາລະ[/\s]*([0-9]{1,2}[/\-][0-9]{1,2}[/\-](?:[0-9]{4}|[0-9]{2}))",
    r"([0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{2})(?:[^0-9]|$)",
    r"([0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{4})",
    r"([0-9]{4}[/\-][0-9]{1,2}[/\-][0-9]{1,2})",
]);

/// First capture group of the leftmost match, if any.
fn first_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)?.get(1).map(|m| m.as_str())
}

/// Group 1 of the leftmost date match. A non-empty group 2 means the triple
/// ran on into more digits (`01/10/2024`), which counts as no match.
fn date_candidate<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    let caps = re.captures(text)?;
    if caps.get(2).is_some_and(|m| !m.as_str().is_empty()) {
        return None;
    }
    caps.get(1).map(|m| m.as_str())
}

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Classify and mine every field from raw OCR text.
    ///
    /// The three extractors run independently; amount and date matching does
    /// not branch on the detected institution.
    pub fn extract(ocr_text: String) -> SlipResult {
        let institution = classify::classify(&ocr_text);
        let amount = Self::extract_amount(&ocr_text);
        let date = Self::extract_date(&ocr_text);

        SlipResult { amount, date, institution, raw_text: ocr_text }
    }

    /// Walk the amount table; a zero or unparsable candidate falls through to
    /// the next pattern.
    pub fn extract_amount(text: &str) -> Option<Amount> {
        amount_patterns().iter().enumerate().find_map(|(i, re)| {
            let amount = Amount::parse(first_capture(re, text)?)?;
            tracing::debug!(pattern = i, amount = %amount, "amount matched");
            Some(amount)
        })
    }

    /// Walk the date table; an implausible candidate falls through to the
    /// next pattern rather than being returned.
    pub fn extract_date(text: &str) -> Option<SlipDate> {
        date_patterns().iter().enumerate().find_map(|(i, re)| {
            let date = SlipDate::parse(date_candidate(re, text)?)?;
            tracing::debug!(pattern = i, date = %date, "date matched");
            Some(date)
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
