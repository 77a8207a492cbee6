#![forbid(unsafe_code)]

//! Indentation-based markup fixtures.
//!
//! Each non-blank line declares one element; deeper indentation nests it
//! under the nearest shallower line. Top-level lines are appended to
//! `body`.
//!
//! ```text
//! div.accordion#faq
//!   div.accordion-item[data-expanded=true]
//!     button.accordion-toggle "Shipping"
//!     div.accordion-content @0,40,300,120
//! ```
//!
//! Line grammar: `tag(.class | #id | [name] | [name=value] | [name="value"])*`
//! followed by an optional `"text"` and an optional `@x,y,w,h` layout box.
//! Lines starting with `//` are comments.

use std::fmt;

use ahash::AHashMap;
use trellis_core::dom::ElementId;
use trellis_core::geometry::Rect;
use trellis_widgets::WidgetHost;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureErrorKind {
    MissingTag,
    EmptyName(char),
    UnterminatedQuote,
    UnterminatedAttribute,
    BadRect,
    Unexpected(char),
    DuplicateId(String),
}

/// A markup error with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureError {
    pub line: usize,
    pub kind: FixtureErrorKind,
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            FixtureErrorKind::MissingTag => write!(f, "expected a tag name"),
            FixtureErrorKind::EmptyName(after) => write!(f, "empty name after '{after}'"),
            FixtureErrorKind::UnterminatedQuote => write!(f, "unterminated string"),
            FixtureErrorKind::UnterminatedAttribute => write!(f, "missing ']'"),
            FixtureErrorKind::BadRect => write!(f, "layout box must be @x,y,w,h"),
            FixtureErrorKind::Unexpected(c) => write!(f, "unexpected '{c}'"),
            FixtureErrorKind::DuplicateId(id) => write!(f, "duplicate id '{id}'"),
        }
    }
}

impl std::error::Error for FixtureError {}

#[derive(Debug, Default, PartialEq, Eq)]
struct Node {
    tag: String,
    classes: Vec<String>,
    id: Option<String>,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    rect: Option<Rect>,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn err(&self, kind: FixtureErrorKind) -> FixtureError {
        FixtureError {
            line: self.line,
            kind,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek()
            && pred(c)
        {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn name(&mut self) -> &'a str {
        self.take_while(|c| c.is_alphanumeric() || c == '-' || c == '_')
    }

    fn named(&mut self, after: char) -> Result<String, FixtureError> {
        match self.name() {
            "" => Err(self.err(FixtureErrorKind::EmptyName(after))),
            n => Ok(n.to_owned()),
        }
    }

    /// Opening quote already consumed.
    fn quoted(&mut self) -> Result<String, FixtureError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => return Err(self.err(FixtureErrorKind::UnterminatedQuote)),
                },
                Some(c) => out.push(c),
                None => return Err(self.err(FixtureErrorKind::UnterminatedQuote)),
            }
        }
    }

    fn attribute(&mut self) -> Result<(String, String), FixtureError> {
        let name = self.named('[')?;
        let value = if self.peek() == Some('=') {
            self.bump();
            if self.peek() == Some('"') {
                self.bump();
                self.quoted()?
            } else {
                self.take_while(|c| c != ']').to_owned()
            }
        } else {
            String::new()
        };
        match self.bump() {
            Some(']') => Ok((name, value)),
            _ => Err(self.err(FixtureErrorKind::UnterminatedAttribute)),
        }
    }

    fn rect(&mut self) -> Result<Rect, FixtureError> {
        let raw = self.take_while(|c| !c.is_whitespace());
        let parts: Vec<i32> = raw
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| self.err(FixtureErrorKind::BadRect))?;
        match parts[..] {
            [x, y, w, h] => Ok(Rect::new(x, y, w, h)),
            _ => Err(self.err(FixtureErrorKind::BadRect)),
        }
    }
}

fn parse_line(src: &str, line: usize) -> Result<Node, FixtureError> {
    let mut cur = Cursor { src, pos: 0, line };
    let tag = cur.name();
    if tag.is_empty() {
        return Err(cur.err(FixtureErrorKind::MissingTag));
    }
    let mut node = Node {
        tag: tag.to_owned(),
        ..Node::default()
    };
    loop {
        match cur.peek() {
            Some('.') => {
                cur.bump();
                node.classes.push(cur.named('.')?);
            }
            Some('#') => {
                cur.bump();
                node.id = Some(cur.named('#')?);
            }
            Some('[') => {
                cur.bump();
                node.attrs.push(cur.attribute()?);
            }
            _ => break,
        }
    }
    loop {
        cur.take_while(char::is_whitespace);
        match cur.bump() {
            None => return Ok(node),
            Some('"') => node.text = Some(cur.quoted()?),
            Some('@') => node.rect = Some(cur.rect()?),
            Some(c) => return Err(cur.err(FixtureErrorKind::Unexpected(c))),
        }
    }
}

/// A widget host whose document was built from markup, plus an index of
/// the elements that declared an `#id`.
#[derive(Debug)]
pub struct Fixture {
    pub host: WidgetHost,
    ids: AHashMap<String, ElementId>,
}

impl Fixture {
    pub fn parse(markup: &str) -> Result<Self, FixtureError> {
        let mut host = WidgetHost::default();
        let mut ids = AHashMap::new();
        let body = host.ui.doc.body();
        let mut stack: Vec<(usize, ElementId)> = Vec::new();

        for (idx, raw) in markup.lines().enumerate() {
            let line = idx + 1;
            let content = raw.trim_start();
            if content.is_empty() || content.starts_with("//") {
                continue;
            }
            let indent = raw.len() - content.len();
            let node = parse_line(content.trim_end(), line)?;

            while stack.last().is_some_and(|&(depth, _)| depth >= indent) {
                stack.pop();
            }
            let parent = stack.last().map_or(body, |&(_, el)| el);

            let doc = &mut host.ui.doc;
            let el = doc.create_element(&node.tag);
            for class in &node.classes {
                doc.add_class(el, class);
            }
            for (name, value) in &node.attrs {
                doc.set_attr(el, name, value.as_str());
            }
            if let Some(id) = node.id {
                if ids.contains_key(&id) {
                    return Err(FixtureError {
                        line,
                        kind: FixtureErrorKind::DuplicateId(id),
                    });
                }
                doc.set_attr(el, "id", id.as_str());
                ids.insert(id, el);
            }
            if let Some(text) = node.text {
                doc.set_text(el, text);
            }
            if let Some(rect) = node.rect {
                doc.set_rect(el, rect);
            }
            doc.append_child(parent, el);
            stack.push((indent, el));
        }
        tracing::trace!(elements = host.ui.doc.len(), ids = ids.len(), "fixture parsed");
        Ok(Self { host, ids })
    }

    pub fn try_el(&self, id: &str) -> Option<ElementId> {
        self.ids.get(id).copied()
    }

    /// Element declared with `#id`.
    ///
    /// # Panics
    ///
    /// When no line declared that id.
    pub fn el(&self, id: &str) -> ElementId {
        self.try_el(id)
            .unwrap_or_else(|| panic!("fixture has no element #{id}"))
    }

    pub fn body(&self) -> ElementId {
        self.host.ui.doc.body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_follows_indentation() {
        let f = Fixture::parse(
            "div#a.one.two\n  span#b[data-x=1] \"hi\"\n  span#c\n    em#d\np#e @1,2,3,4\n",
        )
        .expect("parse");
        let doc = &f.host.ui.doc;
        assert_eq!(doc.parent(f.el("a")), Some(doc.body()));
        assert_eq!(doc.children(f.el("a")), &[f.el("b"), f.el("c")]);
        assert_eq!(doc.parent(f.el("d")), Some(f.el("c")));
        assert_eq!(doc.parent(f.el("e")), Some(doc.body()));
        assert!(doc.has_class(f.el("a"), "two"));
        assert_eq!(doc.attr(f.el("b"), "data-x"), Some("1"));
        assert_eq!(doc.text(f.el("b")), Some("hi"));
        assert_eq!(doc.rect(f.el("e")), Some(Rect::new(1, 2, 3, 4)));
    }

    #[test]
    fn quoted_attribute_values_and_flags() {
        let f = Fixture::parse(r##"a#x[href="#top"][data-title="Say \"hi\""][disabled]"##).expect("parse");
        let doc = &f.host.ui.doc;
        assert_eq!(doc.attr(f.el("x"), "href"), Some("#top"));
        assert_eq!(doc.attr(f.el("x"), "data-title"), Some("Say \"hi\""));
        assert_eq!(doc.attr(f.el("x"), "disabled"), Some(""));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = Fixture::parse("div\n  .orphan").expect_err("missing tag");
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, FixtureErrorKind::MissingTag);

        let err = Fixture::parse("div#a\ndiv#a").expect_err("dup");
        assert_eq!(err.kind, FixtureErrorKind::DuplicateId("a".into()));

        let err = Fixture::parse("div[open").expect_err("bracket");
        assert_eq!(err.kind, FixtureErrorKind::UnterminatedAttribute);

        let err = Fixture::parse("div @1,2").expect_err("rect");
        assert_eq!(err.to_string(), "line 1: layout box must be @x,y,w,h");
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let f = Fixture::parse("// header\n\ndiv#only\n").expect("parse");
        assert_eq!(f.host.ui.doc.children(f.body()), &[f.el("only")]);
    }
}
