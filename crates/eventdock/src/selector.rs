//! Compound selectors (`tag#id.class`) matched against an event's origin.

use std::fmt;
use std::str::FromStr;

use eventdock_types::ElementRef;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unsupported selector syntax '{0}': only tag, #id and .class parts are allowed")]
    Unsupported(String),
}

/// A single compound selector such as `button.primary` or `#save`.
///
/// Combinators, attribute selectors and pseudo-classes are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    /// Whether `element` satisfies every part of the selector.
    ///
    /// Tag names compare case-insensitively; ids and classes exactly.
    pub fn matches(&self, element: &ElementRef) -> bool {
        if let Some(tag) = &self.tag {
            match &element.tag_name {
                Some(actual) if actual.eq_ignore_ascii_case(tag) => {}
                _ => return false,
            }
        }
        if let Some(id) = &self.id {
            if element.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|class| element.class_list.iter().any(|c| c == class))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SelectorError::Empty);
        }
        let unsupported = || SelectorError::Unsupported(input.to_string());

        let mut selector = Selector::default();
        let mut parts = split_parts(input).into_iter();

        if let Some(first) = parts.next() {
            match first.chars().next() {
                Some('#') | Some('.') => apply_part(&mut selector, first).ok_or_else(unsupported)?,
                _ if first == "*" => {}
                _ if is_ident(first) => selector.tag = Some(first.to_ascii_lowercase()),
                _ => return Err(unsupported()),
            }
        }
        for part in parts {
            apply_part(&mut selector, part).ok_or_else(unsupported)?;
        }
        Ok(selector)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => f.write_str(tag)?,
            None if self.id.is_none() && self.classes.is_empty() => f.write_str("*")?,
            None => {}
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}

/// Splits before every `#` or `.`, keeping the marker with its name.
fn split_parts(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if i > start && (c == '#' || c == '.') {
            parts.push(&input[start..i]);
            start = i;
        }
    }
    parts.push(&input[start..]);
    parts
}

fn apply_part(selector: &mut Selector, part: &str) -> Option<()> {
    let (marker, name) = part.split_at(1);
    if !is_ident(name) {
        return None;
    }
    match marker {
        "#" if selector.id.is_none() => selector.id = Some(name.to_string()),
        "." => selector.classes.push(name.to_string()),
        _ => return None,
    }
    Some(())
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
