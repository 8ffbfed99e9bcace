//! The subset of CSS selectors scenes use to pick entities: element names,
//! `#id`, `.class`, `[attr]` and `[attr=value]`, compounded and comma
//! separated. Combinators are not supported.
use std::fmt;
use std::str::FromStr;

use engine::scene::SceneNode;

use crate::TeleportError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Element(String),
    Id(String),
    Class(String),
    HasAttribute(String),
    AttributeEquals(String, String),
}

impl Condition {
    fn matches(&self, node: &SceneNode) -> bool {
        match self {
            Condition::Element(name) => node.element.eq_ignore_ascii_case(name),
            Condition::Id(id) => node.id.as_deref() == Some(id.as_str()),
            Condition::Class(class) => node.has_class(class),
            Condition::HasAttribute(name) => node.has_attribute(name),
            Condition::AttributeEquals(name, value) => node.attribute(name) == Some(value.as_str()),
        }
    }
}

/// A parsed selector list. The empty selector matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    source: String,
    alternatives: Vec<Vec<Condition>>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, TeleportError> {
        let trimmed = source.trim();
        let mut alternatives = Vec::new();

        if !trimmed.is_empty() {
            for compound in trimmed.split(',') {
                alternatives.push(parse_compound(compound.trim()).map_err(|reason| {
                    TeleportError::InvalidSelector {
                        selector: source.to_string(),
                        reason,
                    }
                })?);
            }
        }

        Ok(Self {
            source: trimmed.to_string(),
            alternatives,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn matches(&self, node: &SceneNode) -> bool {
        self.alternatives
            .iter()
            .any(|compound| compound.iter().all(|condition| condition.matches(node)))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = TeleportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<String, String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    if ident.is_empty() {
        Err("expected a name".to_string())
    } else {
        Ok(ident)
    }
}

fn parse_compound(compound: &str) -> Result<Vec<Condition>, String> {
    if compound.is_empty() {
        return Err("empty selector in list".to_string());
    }

    let mut conditions = Vec::new();
    let mut chars = compound.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '#' => {
                chars.next();
                conditions.push(Condition::Id(take_ident(&mut chars)?));
            }
            '.' => {
                chars.next();
                conditions.push(Condition::Class(take_ident(&mut chars)?));
            }
            '[' => {
                chars.next();
                conditions.push(parse_attribute(&mut chars)?);
            }
            c if is_ident_char(c) && conditions.is_empty() => {
                conditions.push(Condition::Element(take_ident(&mut chars)?));
            }
            c if c.is_whitespace() => return Err("combinators are not supported".to_string()),
            c => return Err(format!("unexpected '{c}'")),
        }
    }

    Ok(conditions)
}

fn parse_attribute(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<Condition, String> {
    let name = take_ident(chars)?;
    match chars.next() {
        Some(']') => Ok(Condition::HasAttribute(name)),
        Some('=') => {
            let mut value = String::new();
            let quote = match chars.peek() {
                Some(&q @ ('"' | '\'')) => {
                    chars.next();
                    Some(q)
                }
                _ => None,
            };
            loop {
                match (chars.next(), quote) {
                    (None, _) => return Err("unterminated attribute selector".to_string()),
                    (Some(c), Some(q)) if c == q => {
                        if chars.next() != Some(']') {
                            return Err("expected ']'".to_string());
                        }
                        break;
                    }
                    (Some(']'), None) => break,
                    (Some(c), _) => value.push(c),
                }
            }
            Ok(Condition::AttributeEquals(name, value))
        }
        _ => Err("expected ']' or '='".to_string()),
    }
}
