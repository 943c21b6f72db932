#![forbid(unsafe_code)]

//! Compound CSS selectors.
//!
//! Page markers are configured as selector strings. Only compound simple
//! selectors are supported (no combinators, no pseudo-classes):
//!
//! ```text
//! tag? ( '#' ident | '.' ident | '[' name ( ('=' | '^=') value )? ']' )*
//! ```
//!
//! That covers every marker the site uses (`[data-menu-toggle]`,
//! `#mobile-menu`, `a[href^="#"]`) and can be matched against the in-memory
//! document without a CSS engine. Web hosts pass [`Selector::as_css`]
//! straight to `querySelector`/`closest`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Read-only view of an element, as needed for selector matching.
pub trait ElementView {
    /// Lower-case tag name.
    fn tag_name(&self) -> &str;
    /// Attribute value, if present.
    fn attribute(&self, name: &str) -> Option<&str>;
    /// Whether the element's class list contains `class`.
    fn has_class(&self, class: &str) -> bool;
}

/// Attribute condition inside `[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    /// `[name]`
    Exists,
    /// `[name="value"]`
    Equals(String),
    /// `[name^="value"]`
    Prefix(String),
}

/// One simple selector of a compound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Id(String),
    Class(String),
    Attribute { name: String, matcher: AttrMatch },
}

/// Selector parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector string was empty or whitespace.
    Empty,
    /// A character that is not part of the supported grammar.
    Unexpected { ch: char, offset: usize },
    /// `#`, `.`, or `[` not followed by a name.
    MissingName { offset: usize },
    /// `[` without a closing `]`, or an unterminated quoted value.
    Unterminated { offset: usize },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::Unexpected { ch, offset } => {
                write!(f, "unsupported character {ch:?} at offset {offset}")
            }
            Self::MissingName { offset } => write!(f, "missing name at offset {offset}"),
            Self::Unterminated { offset } => {
                write!(f, "unterminated attribute selector starting at offset {offset}")
            }
        }
    }
}

impl std::error::Error for SelectorError {}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    source: String,
    tag: Option<String>,
    parts: Vec<SimpleSelector>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }
        let base = input.len() - input.trim_start().len();
        let mut cursor = Cursor {
            src: source,
            pos: 0,
            base,
        };

        let tag = if cursor.peek() == Some('*') {
            cursor.bump();
            None
        } else {
            cursor.ident().map(|t| t.to_ascii_lowercase())
        };

        let mut parts = Vec::new();
        while let Some(ch) = cursor.peek() {
            let start = cursor.offset();
            match ch {
                '#' => {
                    cursor.bump();
                    let name = cursor
                        .ident()
                        .ok_or(SelectorError::MissingName { offset: start })?;
                    parts.push(SimpleSelector::Id(name.to_string()));
                }
                '.' => {
                    cursor.bump();
                    let name = cursor
                        .ident()
                        .ok_or(SelectorError::MissingName { offset: start })?;
                    parts.push(SimpleSelector::Class(name.to_string()));
                }
                '[' => {
                    cursor.bump();
                    parts.push(cursor.attribute(start)?);
                }
                other => {
                    return Err(SelectorError::Unexpected {
                        ch: other,
                        offset: start,
                    });
                }
            }
        }

        Ok(Self {
            source: source.to_string(),
            tag,
            parts,
        })
    }

    /// Shorthand for an `#id` selector.
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self::from_parts(None, vec![SimpleSelector::Id(id.to_string())])
    }

    /// Shorthand for a bare tag selector such as `a`.
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self::from_parts(Some(tag.to_ascii_lowercase()), Vec::new())
    }

    /// Shorthand for `[name]`.
    #[must_use]
    pub fn has_attribute(name: &str) -> Self {
        Self::from_parts(None, Vec::new()).and_attribute(name, AttrMatch::Exists)
    }

    /// Shorthand for `[name="value"]`.
    #[must_use]
    pub fn attribute_equals(name: &str, value: &str) -> Self {
        Self::from_parts(None, Vec::new())
            .and_attribute(name, AttrMatch::Equals(value.to_string()))
    }

    /// Append an attribute condition to the compound.
    #[must_use]
    pub fn and_attribute(mut self, name: &str, matcher: AttrMatch) -> Self {
        self.parts.push(SimpleSelector::Attribute {
            name: name.to_ascii_lowercase(),
            matcher,
        });
        self.source = render(self.tag.as_deref(), &self.parts);
        self
    }

    fn from_parts(tag: Option<String>, parts: Vec<SimpleSelector>) -> Self {
        Self {
            source: render(tag.as_deref(), &parts),
            tag,
            parts,
        }
    }

    /// The selector text, suitable for `querySelector`.
    #[must_use]
    pub fn as_css(&self) -> &str {
        &self.source
    }

    /// Required tag name, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The simple selectors following the tag.
    #[must_use]
    pub fn parts(&self) -> &[SimpleSelector] {
        &self.parts
    }

    /// If this selector is exactly `#id`, return the id.
    #[must_use]
    pub fn as_id(&self) -> Option<&str> {
        match (self.tag.as_ref(), self.parts.as_slice()) {
            (None, [SimpleSelector::Id(id)]) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Whether `element` satisfies every part of the compound.
    pub fn matches(&self, element: &impl ElementView) -> bool {
        if let Some(tag) = &self.tag
            && !element.tag_name().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        self.parts.iter().all(|part| match part {
            SimpleSelector::Id(id) => element.attribute("id") == Some(id.as_str()),
            SimpleSelector::Class(class) => element.has_class(class),
            SimpleSelector::Attribute { name, matcher } => {
                let Some(value) = element.attribute(name) else {
                    return false;
                };
                match matcher {
                    AttrMatch::Exists => true,
                    AttrMatch::Equals(expected) => value == expected,
                    AttrMatch::Prefix(prefix) => value.starts_with(prefix.as_str()),
                }
            }
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.source
    }
}

fn render(tag: Option<&str>, parts: &[SimpleSelector]) -> String {
    let mut out = String::from(tag.unwrap_or(""));
    for part in parts {
        match part {
            SimpleSelector::Id(id) => {
                out.push('#');
                out.push_str(id);
            }
            SimpleSelector::Class(class) => {
                out.push('.');
                out.push_str(class);
            }
            SimpleSelector::Attribute { name, matcher } => {
                out.push('[');
                out.push_str(name);
                match matcher {
                    AttrMatch::Exists => {}
                    AttrMatch::Equals(v) => out.push_str(&format!("=\"{v}\"")),
                    AttrMatch::Prefix(v) => out.push_str(&format!("^=\"{v}\"")),
                }
                out.push(']');
            }
        }
    }
    if out.is_empty() {
        out.push('*');
    }
    out
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos > start {
            Some(&self.src[start..self.pos])
        } else {
            None
        }
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Parse the remainder of `[...]`; the opening bracket is consumed.
    fn attribute(&mut self, open: usize) -> Result<SimpleSelector, SelectorError> {
        self.skip_spaces();
        let name = self
            .ident()
            .ok_or(SelectorError::MissingName { offset: open })?
            .to_ascii_lowercase();
        self.skip_spaces();

        let matcher = match self.bump() {
            Some(']') => {
                return Ok(SimpleSelector::Attribute {
                    name,
                    matcher: AttrMatch::Exists,
                });
            }
            Some('=') => AttrMatch::Equals(self.value(open)?),
            Some('^') => {
                if self.bump() != Some('=') {
                    return Err(SelectorError::Unterminated { offset: open });
                }
                AttrMatch::Prefix(self.value(open)?)
            }
            Some(ch) => {
                return Err(SelectorError::Unexpected {
                    ch,
                    offset: self.offset() - ch.len_utf8(),
                });
            }
            None => return Err(SelectorError::Unterminated { offset: open }),
        };

        self.skip_spaces();
        match self.bump() {
            Some(']') => Ok(SimpleSelector::Attribute { name, matcher }),
            _ => Err(SelectorError::Unterminated { offset: open }),
        }
    }

    fn value(&mut self, open: usize) -> Result<String, SelectorError> {
        self.skip_spaces();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(ch) if ch == quote => {
                            let end = self.pos - quote.len_utf8();
                            return Ok(self.src[start..end].to_string());
                        }
                        Some(_) => {}
                        None => return Err(SelectorError::Unterminated { offset: open }),
                    }
                }
            }
            _ => self
                .ident()
                .map(str::to_string)
                .ok_or(SelectorError::MissingName { offset: open }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct El {
        tag: &'static str,
        attrs: Vec<(&'static str, &'static str)>,
    }

    impl ElementView for El {
        fn tag_name(&self) -> &str {
            self.tag
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attrs.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
        }

        fn has_class(&self, class: &str) -> bool {
            self.attribute("class")
                .is_some_and(|list| list.split_whitespace().any(|c| c == class))
        }
    }

    #[test]
    fn parses_site_markers() {
        let toggle = Selector::parse("[data-menu-toggle]").unwrap();
        assert_eq!(toggle.tag(), None);
        assert_eq!(
            toggle.parts(),
            &[SimpleSelector::Attribute {
                name: "data-menu-toggle".into(),
                matcher: AttrMatch::Exists,
            }]
        );

        let panel = Selector::parse("#mobile-menu").unwrap();
        assert_eq!(panel.as_id(), Some("mobile-menu"));

        let anchors = Selector::parse(r##"a[href^="#"]"##).unwrap();
        assert_eq!(anchors.tag(), Some("a"));
        assert_eq!(
            anchors.parts(),
            &[SimpleSelector::Attribute {
                name: "href".into(),
                matcher: AttrMatch::Prefix("#".into()),
            }]
        );
        assert_eq!(anchors.as_css(), r##"a[href^="#"]"##);
    }

    #[test]
    fn matches_compound() {
        let sel = Selector::parse("button.primary[type=submit]").unwrap();
        let hit = El {
            tag: "button",
            attrs: vec![("class", "btn primary"), ("type", "submit")],
        };
        let wrong_tag = El {
            tag: "a",
            attrs: vec![("class", "primary"), ("type", "submit")],
        };
        let wrong_attr = El {
            tag: "button",
            attrs: vec![("class", "primary"), ("type", "reset")],
        };
        assert!(sel.matches(&hit));
        assert!(!sel.matches(&wrong_tag));
        assert!(!sel.matches(&wrong_attr));
    }

    #[test]
    fn prefix_match_on_href() {
        let sel = Selector::parse("a[href^='#']").unwrap();
        let local = El {
            tag: "a",
            attrs: vec![("href", "#pricing")],
        };
        let remote = El {
            tag: "a",
            attrs: vec![("href", "https://example.com/#x")],
        };
        assert!(sel.matches(&local));
        assert!(!sel.matches(&remote));
    }

    #[test]
    fn builders_render_css() {
        assert_eq!(Selector::id("mobile-menu").as_css(), "#mobile-menu");
        assert_eq!(Selector::element("A").as_css(), "a");
        assert_eq!(
            Selector::has_attribute("data-menu-toggle").as_css(),
            "[data-menu-toggle]"
        );
        let anchors =
            Selector::element("a").and_attribute("href", AttrMatch::Prefix("#".into()));
        assert_eq!(anchors.as_css(), r##"a[href^="#"]"##);
        assert_eq!(anchors, Selector::parse(r##"a[href^="#"]"##).unwrap());
        assert_eq!(
            Selector::attribute_equals("name", "petDetails").as_css(),
            r#"[name="petDetails"]"#
        );
    }

    #[test]
    fn universal_tag_is_ignored() {
        let sel = Selector::parse("*[data-x]").unwrap();
        assert_eq!(sel.tag(), None);
    }

    #[test]
    fn rejects_combinators_and_garbage() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("nav a"),
            Err(SelectorError::Unexpected { ch: ' ', offset: 3 })
        ));
        assert!(matches!(
            Selector::parse("a:hover"),
            Err(SelectorError::Unexpected { ch: ':', .. })
        ));
        assert_eq!(
            Selector::parse("#"),
            Err(SelectorError::MissingName { offset: 0 })
        );
        assert_eq!(
            Selector::parse("a[href"),
            Err(SelectorError::Unterminated { offset: 1 })
        );
        assert_eq!(
            Selector::parse("a[href='#]"),
            Err(SelectorError::Unterminated { offset: 1 })
        );
    }

    #[test]
    fn serde_uses_selector_text() {
        let sel: Selector = serde_json::from_str(r##""#contact-form""##).unwrap();
        assert_eq!(sel.as_id(), Some("contact-form"));
        assert_eq!(serde_json::to_string(&sel).unwrap(), r##""#contact-form""##);
        assert!(serde_json::from_str::<Selector>(r#""ul > li""#).is_err());
    }
}
