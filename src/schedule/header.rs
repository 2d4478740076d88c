use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::types::{Language, Role, Tally};

// `[role] language 3`; anything after the digits is free text.
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<role>[^\]]+)\]\s*(?P<language>[^\s\d]+)\s*(?P<quota>\d+)")
        .expect("valid header regex")
});

// Same opening as a header, quota optional. Only names the section a cell belongs to.
static CONTEXT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<role>[^\]]+)\]\s*(?P<language>[^\s\d]+)").expect("valid context regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParsedHeader {
    pub role: Role,
    pub language: Language,
    pub quota: Tally,
}

pub fn parse_header(text: &str, role: Role, language: Language) -> ParsedHeader {
    let quota = match parse_any_header(text) {
        Some(found) if found.role == role && found.language == language => found.quota,
        _ => Tally::NotApplicable,
    };

    ParsedHeader {
        role,
        language,
        quota,
    }
}

pub fn parse_any_header(text: &str) -> Option<ParsedHeader> {
    let captures = HEADER_PATTERN.captures(text.trim())?;

    let role = Role::from_marker(captures.name("role")?.as_str().trim())?;
    let language = Language::from_marker(captures.name("language")?.as_str())?;
    let quota = captures
        .name("quota")?
        .as_str()
        .parse::<i64>()
        .map(Tally::Count)
        .unwrap_or(Tally::NotApplicable);

    Some(ParsedHeader {
        role,
        language,
        quota,
    })
}

/// Role and language of a header-shaped cell, whether or not its quota is written yet.
pub fn parse_header_context(text: &str) -> Option<(Role, Language)> {
    let captures = CONTEXT_PATTERN.captures(text.trim())?;

    let role = Role::from_marker(captures.name("role")?.as_str().trim())?;
    let language = Language::from_marker(captures.name("language")?.as_str())?;
    Some((role, language))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quota_for_matching_role_and_language() {
        let header = parse_header("[judge] zh 4", Role::Judge, Language::Zh);
        assert_eq!(header.quota, Tally::Count(4));

        let header = parse_header("  [심사위원] 영어 12 ", Role::Judge, Language::En);
        assert_eq!(header.quota, Tally::Count(12));

        let header = parse_header("[참가자]일본어3", Role::Participant, Language::Ja);
        assert_eq!(header.quota, Tally::Count(3));
    }

    #[test]
    fn trailing_text_after_quota_is_ignored() {
        let header = parse_header("[참가자] 중국어 2 (오후 7명)", Role::Participant, Language::Zh);
        assert_eq!(header.quota, Tally::Count(2));
    }

    #[test]
    fn mismatched_role_or_language_is_not_applicable() {
        assert_eq!(
            parse_header("[judge] zh 4", Role::Participant, Language::Zh).quota,
            Tally::NotApplicable
        );
        assert_eq!(
            parse_header("[judge] zh 4", Role::Judge, Language::En).quota,
            Tally::NotApplicable
        );
    }

    #[test]
    fn blank_or_malformed_headers_are_not_applicable() {
        for text in [
            "",
            "   ",
            "judge zh 4",
            "[judge] zh",
            "[judge] zh four",
            "[judge] fr 4",
            "[staff] en 4",
            "notes: [judge] zh 4",
        ] {
            assert_eq!(
                parse_header(text, Role::Judge, Language::Zh).quota,
                Tally::NotApplicable,
                "{text:?}"
            );
        }
    }

    #[test]
    fn never_guesses_quota_from_a_later_numeral() {
        assert_eq!(
            parse_header("[judge] zh TBD, 4 expected", Role::Judge, Language::Zh).quota,
            Tally::NotApplicable
        );
    }

    #[test]
    fn parse_any_reports_what_the_cell_declares() {
        let header = parse_any_header("[참가자] 영어 2").unwrap();
        assert_eq!(header.role, Role::Participant);
        assert_eq!(header.language, Language::En);
        assert_eq!(header.quota, Tally::Count(2));

        assert!(parse_any_header("[홍길동] 김철수").is_none());
    }

    #[test]
    fn context_needs_no_quota() {
        assert_eq!(
            parse_header_context("[참가자] 영어"),
            Some((Role::Participant, Language::En))
        );
        assert_eq!(
            parse_header_context(" [judge] zh 4 "),
            Some((Role::Judge, Language::Zh))
        );
        assert_eq!(parse_header_context("[노심사] Lee"), None);
        assert_eq!(parse_header_context("Kim"), None);

        // Quota stays mandatory for counting.
        assert_eq!(
            parse_header("[참가자] 영어", Role::Participant, Language::En).quota,
            Tally::NotApplicable
        );
    }
}
