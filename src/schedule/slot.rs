use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::types::Role;

// `[reviewer]` optionally followed by the interpreter assigned to them.
static BRACKET_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\[(?P<tag>[^\]]+)\](?P<rest>.*)$").expect("valid bracket tag regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    Blank,
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Filled,
    Empty,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTag<'a> {
    pub tag: &'a str,
    pub rest: &'a str,
}

pub fn split_bracket_tag(text: &str) -> Option<BracketTag<'_>> {
    let captures = BRACKET_TAG_PATTERN.captures(text.trim())?;
    Some(BracketTag {
        tag: captures.name("tag")?.as_str().trim(),
        rest: captures.name("rest")?.as_str().trim(),
    })
}

pub fn classify_slot(text: &str, role: Role) -> SlotState {
    let trimmed = text.trim();

    match role {
        Role::Participant => {
            if trimmed.is_empty() {
                SlotState::Empty
            } else {
                SlotState::Filled
            }
        }
        Role::Judge => {
            if trimmed.is_empty() {
                return SlotState::Ignored(IgnoreReason::Blank);
            }

            match split_bracket_tag(trimmed) {
                Some(tag) if tag.rest.is_empty() => SlotState::Empty,
                Some(_) => SlotState::Filled,
                None => SlotState::Ignored(IgnoreReason::Malformed),
            }
        }
    }
}
