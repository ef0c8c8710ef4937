//! Inline tags embedded in dialog text.
//!
//! A tag has the form `[type:name]` where `type` is one of `s` (sound),
//! `a` (animation) or `e` (custom event). The payload is split on the first
//! `:`, so the name may itself contain colons.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const TAG_OPEN: char = '[';
pub const TAG_CLOSE: char = ']';
pub const TAG_SEPARATOR: char = ':';

/// Side effect requested by an inline tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Sound(String),
    Animation(String),
    Event(String),
}

impl Tag {
    pub fn name(&self) -> &str {
        match self {
            Tag::Sound(name) | Tag::Animation(name) | Tag::Event(name) => name,
        }
    }

    pub fn kind(&self) -> char {
        match self {
            Tag::Sound(_) => 's',
            Tag::Animation(_) => 'a',
            Tag::Event(_) => 'e',
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            TAG_OPEN,
            self.kind(),
            TAG_SEPARATOR,
            self.name(),
            TAG_CLOSE
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("missing ']' for tag opened at character {start}")]
    Unterminated { start: usize },
    #[error("expected type and name in tag `[{payload}]`")]
    MissingName { payload: String },
    #[error("unknown tag type `{kind}` in tag `[{payload}]`")]
    UnknownKind { kind: String, payload: String },
}

impl FromStr for Tag {
    type Err = TagError;

    /// Decodes the text between the brackets.
    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let (kind, name) = match payload.split_once(TAG_SEPARATOR) {
            Some((kind, name)) if !name.is_empty() => (kind, name),
            _ => {
                return Err(TagError::MissingName {
                    payload: payload.to_string(),
                })
            }
        };

        match kind {
            "s" => Ok(Tag::Sound(name.to_string())),
            "a" => Ok(Tag::Animation(name.to_string())),
            "e" => Ok(Tag::Event(name.to_string())),
            _ => Err(TagError::UnknownKind {
                kind: kind.to_string(),
                payload: payload.to_string(),
            }),
        }
    }
}

/// Reads the tag opening at `start` and returns it with the index right
/// after its closing bracket.
///
/// `text[start]` is expected to be [`TAG_OPEN`].
pub fn scan(text: &[char], start: usize) -> Result<(Tag, usize), TagError> {
    let close = text
        .iter()
        .skip(start + 1)
        .position(|c| *c == TAG_CLOSE)
        .map(|offset| start + 1 + offset)
        .ok_or(TagError::Unterminated { start })?;

    let payload: String = text[start + 1..close].iter().collect();
    let tag = payload.parse::<Tag>()?;

    Ok((tag, close + 1))
}

/// Every tag in `text`, in order. Scanning stops at the first malformed tag.
pub fn tags(text: &str) -> Result<Vec<Tag>, TagError> {
    let chars: Vec<char> = text.chars().collect();
    let mut found = Vec::new();
    let mut cursor = 0;

    while cursor < chars.len() {
        if chars[cursor] == TAG_OPEN {
            let (tag, next) = scan(&chars, cursor)?;
            found.push(tag);
            cursor = next;
        } else {
            cursor += 1;
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!("s:bell".parse::<Tag>(), Ok(Tag::Sound("bell".to_string())));
        assert_eq!("a:wave".parse::<Tag>(), Ok(Tag::Animation("wave".to_string())));
        assert_eq!("e:door".parse::<Tag>(), Ok(Tag::Event("door".to_string())));
    }

    #[test]
    fn test_split_on_first_separator() {
        let tag: Tag = "e:quest:started".parse().unwrap();
        assert_eq!(tag, Tag::Event("quest:started".to_string()));
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(
            "bell".parse::<Tag>(),
            Err(TagError::MissingName {
                payload: "bell".to_string()
            })
        );
        assert!(matches!(
            "s:".parse::<Tag>(),
            Err(TagError::MissingName { .. })
        ));
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            "x:bell".parse::<Tag>(),
            Err(TagError::UnknownKind {
                kind: "x".to_string(),
                payload: "x:bell".to_string()
            })
        );
    }

    #[test]
    fn test_scan_returns_index_after_bracket() {
        let text = chars("Hi[s:bell]!");
        let (tag, next) = scan(&text, 2).unwrap();

        assert_eq!(tag, Tag::Sound("bell".to_string()));
        assert_eq!(next, 10);
        assert_eq!(text[next], '!');
    }

    #[test]
    fn test_scan_unterminated() {
        let text = chars("Hi[s:bell");
        assert_eq!(scan(&text, 2), Err(TagError::Unterminated { start: 2 }));
    }

    #[test]
    fn test_scan_counts_chars_not_bytes() {
        let text = chars("¡Olé![a:bow]");
        let (tag, next) = scan(&text, 5).unwrap();

        assert_eq!(tag, Tag::Animation("bow".to_string()));
        assert_eq!(next, text.len());
    }

    #[test]
    fn test_tags_in_order() {
        let found = tags("[e:start]Hello [s:bell]world[a:nod]").unwrap();

        assert_eq!(
            found,
            vec![
                Tag::Event("start".to_string()),
                Tag::Sound("bell".to_string()),
                Tag::Animation("nod".to_string()),
            ]
        );
    }

    #[test]
    fn test_tags_reports_first_error() {
        assert_eq!(
            tags("ok [s:bell] then [broken"),
            Err(TagError::Unterminated { start: 17 })
        );
    }

    #[test]
    fn test_display_round_trips_grammar() {
        assert_eq!(Tag::Sound("bell".to_string()).to_string(), "[s:bell]");
    }
}
