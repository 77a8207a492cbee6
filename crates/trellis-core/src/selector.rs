#![forbid(unsafe_code)]

//! A small CSS selector engine.
//!
//! Widgets locate their parts (`.accordion-toggle`, `[data-tooltip]`,
//! `a[href^="#"]`) with selectors taken from settings, so the matcher accepts
//! the subset of CSS those settings use:
//!
//! - type (`button`), universal (`*`), id (`#main`), class (`.item`)
//! - attribute presence and value tests: `[a]`, `[a=v]`, `[a~=v]`, `[a^=v]`,
//!   `[a$=v]`, `[a*=v]` with bare or quoted values
//! - descendant (` `) and child (`>`) combinators
//! - selector lists (`a, b`)
//!
//! Pseudo-classes are not supported and are rejected at parse time.

use std::fmt;

use crate::dom::{Document, ElementId};

/// Errors from selector parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector (or one of its list entries) was empty.
    Empty,
    /// An unexpected character at the given byte offset.
    Unexpected { position: usize, found: char },
    /// Input ended inside a bracket or quoted string.
    Unterminated,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::Unexpected { position, found } => {
                write!(f, "unexpected '{found}' at offset {position}")
            }
            Self::Unterminated => write!(f, "unterminated attribute selector or string"),
        }
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrTest {
    fn matches(&self, doc: &Document, el: ElementId) -> bool {
        let actual = if self.name == "class" {
            if self.op == AttrOp::Exists {
                return doc.has_attr(el, "class");
            }
            doc.class_name(el)
        } else {
            match doc.attr(el, &self.name) {
                Some(v) => v.to_owned(),
                None => return false,
            }
        };
        let v = self.value.as_str();
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == v,
            AttrOp::Includes => actual.split_whitespace().any(|w| w == v),
            AttrOp::Prefix => !v.is_empty() && actual.starts_with(v),
            AttrOp::Suffix => !v.is_empty() && actual.ends_with(v),
            AttrOp::Substring => !v.is_empty() && actual.contains(v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, doc: &Document, el: ElementId) -> bool {
        let Some(tag) = doc.tag(el) else {
            return false;
        };
        if let Some(t) = &self.tag
            && t != "*"
            && t != tag
        {
            return false;
        }
        if let Some(id) = &self.id
            && doc.attr(el, "id") != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|c| doc.has_class(el, c))
            && self.attrs.iter().all(|a| a.matches(doc, el))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One comma-separated entry: compounds joined by combinators.
///
/// `parts[i].0` is the combinator linking `parts[i]` to `parts[i - 1]`
/// (ignored for the first part).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches(&self, doc: &Document, el: ElementId) -> bool {
        match self.parts.len() {
            0 => false,
            n => self.matches_from(doc, el, n - 1),
        }
    }

    fn matches_from(&self, doc: &Document, el: ElementId, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(doc, el) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => doc
                .parent(el)
                .is_some_and(|p| self.matches_from(doc, p, index - 1)),
            Combinator::Descendant => doc
                .ancestors(el)
                .any(|a| self.matches_from(doc, a, index - 1)),
        }
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    list: Vec<Complex>,
}

impl Selector {
    /// Parse a selector list.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] for empty input, unsupported syntax
    /// (pseudo-classes, sibling combinators) or unterminated brackets.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let list = Parser::new(input).parse_list()?;
        Ok(Self {
            source: input.trim().to_owned(),
            list,
        })
    }

    /// Whether `el` matches any entry of the list.
    pub fn matches(&self, doc: &Document, el: ElementId) -> bool {
        self.list.iter().any(|c| c.matches(doc, el))
    }

    /// The selector text as written (trimmed).
    pub fn as_str(&self) -> &str {
        &self.source
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

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.char_indices().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or_else(
            || self.chars.last().map_or(0, |&(i, c)| i + c.len_utf8()),
            |&(i, _)| i,
        )
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                position: self.offset(),
                found,
            },
            None => SelectorError::Unterminated,
        }
    }

    fn parse_list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        let mut list = Vec::new();
        loop {
            self.skip_ws();
            let complex = self.parse_complex()?;
            list.push(complex);
            self.skip_ws();
            match self.peek() {
                None => return Ok(list),
                Some(',') => {
                    self.bump();
                }
                Some(_) => return Err(self.unexpected()),
            }
        }
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        loop {
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                return Err(match self.peek() {
                    None | Some(',') => SelectorError::Empty,
                    Some(_) => self.unexpected(),
                });
            }
            parts.push((combinator, compound));

            let had_ws = self.skip_ws();
            match self.peek() {
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    combinator = Combinator::Child;
                }
                None | Some(',') => return Ok(Complex { parts }),
                Some(_) if had_ws => combinator = Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            }
        }
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.bump();
            compound.tag = Some("*".to_owned());
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident().to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    let id = self.ident();
                    if id.is_empty() {
                        return Err(self.unexpected());
                    }
                    compound.id = Some(id);
                }
                Some('.') => {
                    self.bump();
                    let class = self.ident();
                    if class.is_empty() {
                        return Err(self.unexpected());
                    }
                    compound.classes.push(class);
                }
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.attr_test()?);
                }
                _ => return Ok(compound),
            }
        }
    }

    fn attr_test(&mut self) -> Result<AttrTest, SelectorError> {
        self.skip_ws();
        let name = self.ident().to_ascii_lowercase();
        if name.is_empty() {
            return Err(self.unexpected());
        }
        self.skip_ws();
        let op = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttrTest {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => {
                self.bump();
                AttrOp::Equals
            }
            Some(c @ ('~' | '^' | '$' | '*')) => {
                self.bump();
                if self.bump() != Some('=') {
                    return Err(self.unexpected());
                }
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return Err(self.unexpected()),
        };
        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let mut v = String::new();
                loop {
                    match self.bump() {
                        None => return Err(SelectorError::Unterminated),
                        Some(c) if c == q => break,
                        Some(c) => v.push(c),
                    }
                }
                v
            }
            _ => self.ident(),
        };
        self.skip_ws();
        match self.bump() {
            Some(']') => Ok(AttrTest { name, op, value }),
            Some(found) => Err(SelectorError::Unexpected {
                position: self.offset().saturating_sub(found.len_utf8()),
                found,
            }),
            None => Err(SelectorError::Unterminated),
        }
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_char(c) {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixture() -> (Document, ElementId, ElementId, ElementId) {
        let mut doc = Document::new();
        let nav = doc
            .build("nav")
            .attr("id", "main")
            .class("menu dark")
            .append_to_body();
        let list = doc.build("ul").append_to(nav);
        let link = doc
            .build("a")
            .attr("href", "#intro")
            .attr("data-tooltip", "Go to intro")
            .class("link")
            .append_to(list);
        (doc, nav, list, link)
    }

    fn m(doc: &Document, el: ElementId, s: &str) -> bool {
        Selector::parse(s).unwrap().matches(doc, el)
    }

    #[test]
    fn simple_selectors() {
        let (doc, nav, _, link) = fixture();
        assert!(m(&doc, nav, "nav"));
        assert!(m(&doc, nav, "#main"));
        assert!(m(&doc, nav, ".menu.dark"));
        assert!(m(&doc, nav, "*"));
        assert!(!m(&doc, nav, ".light"));
        assert!(m(&doc, link, "a.link[data-tooltip]"));
    }

    #[test]
    fn attribute_operators() {
        let (doc, nav, _, link) = fixture();
        assert!(m(&doc, link, "a[href^=\"#\"]"));
        assert!(m(&doc, link, "[href='#intro']"));
        assert!(m(&doc, link, "[href$=intro]"));
        assert!(m(&doc, link, "[data-tooltip*=\"to in\"]"));
        assert!(m(&doc, nav, "[class~=dark]"));
        assert!(!m(&doc, link, "[href^=\"/\"]"));
        assert!(!m(&doc, link, "[href^='']"));
    }

    #[test]
    fn combinators() {
        let (doc, _, list, link) = fixture();
        assert!(m(&doc, link, "nav a"));
        assert!(m(&doc, link, "#main ul > a"));
        assert!(m(&doc, list, "nav > ul"));
        assert!(!m(&doc, link, "nav > a"));
        assert!(m(&doc, link, "body nav ul a"));
    }

    #[test]
    fn selector_lists() {
        let (doc, nav, list, _) = fixture();
        let s = Selector::parse("ul, nav").unwrap();
        assert!(s.matches(&doc, nav));
        assert!(s.matches(&doc, list));
        assert_eq!(s.to_string(), "ul, nav");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("a,"), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("[href"), Err(SelectorError::Unterminated));
        assert_eq!(Selector::parse("[a='x"), Err(SelectorError::Unterminated));
        assert!(matches!(
            Selector::parse("a:hover"),
            Err(SelectorError::Unexpected { found: ':', .. })
        ));
        assert!(matches!(
            Selector::parse("a + b"),
            Err(SelectorError::Unexpected { found: '+', .. })
        ));
        assert!(Selector::parse(".").is_err());
    }

    #[test]
    fn error_display() {
        let err = Selector::parse("a:hover").unwrap_err();
        assert_eq!(err.to_string(), "unexpected ':' at offset 1");
    }

    proptest! {
        #[test]
        fn parse_never_panics(input in ".{0,40}") {
            let _ = Selector::parse(&input);
        }

        #[test]
        fn class_selectors_roundtrip(class in "[a-z][a-z0-9_-]{0,12}") {
            let mut doc = Document::new();
            let el = doc.build("div").class(&class).append_to_body();
            let s = Selector::parse(&format!(".{class}")).unwrap();
            prop_assert!(s.matches(&doc, el));
        }
    }
}
