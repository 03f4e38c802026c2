//! Query surface over parsed markup.
//!
//! The extractor only ever talks to [`TreeNode`], so it never inspects what
//! kind of node a lookup produced; it matches on [`Found`] instead.

use scraper::{ElementRef, Html, Selector};

/// Result of a lookup that matched something.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Found<N> {
    Element(N),
    /// Matched a position in the tree that is not a usable element.
    Placeholder,
}

impl<N> Found<N> {
    pub fn element(self) -> Option<N> {
        match self {
            Found::Element(node) => Some(node),
            Found::Placeholder => None,
        }
    }
}

/// Tag name plus an optional class.
///
/// A single class name matches any token of the class list. A class string
/// with several names matches when the element's class tokens, joined by
/// single spaces, equal those names joined the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Query<'q> {
    pub tag: &'q str,
    pub class: Option<&'q str>,
}

impl<'q> Query<'q> {
    pub const fn tag(tag: &'q str) -> Self {
        Self { tag, class: None }
    }

    pub const fn class(tag: &'q str, class: &'q str) -> Self {
        Self {
            tag,
            class: Some(class),
        }
    }

    /// Selector narrowing candidates to the first class token.
    ///
    /// Multi-class queries still need [`Query::accepts_class_attr`].
    pub fn to_css(&self) -> String {
        match self.class.and_then(|class| class.split_whitespace().next()) {
            Some(first) => format!("{}.{}", self.tag, first),
            None => self.tag.to_string(),
        }
    }

    /// Checks a raw `class` attribute against the class part of the query.
    pub fn accepts_class_attr(&self, attr: Option<&str>) -> bool {
        let wanted: Vec<&str> = match self.class {
            Some(class) => class.split_whitespace().collect(),
            None => return true,
        };
        let present: Vec<&str> = attr
            .map(|raw| raw.split_whitespace().collect())
            .unwrap_or_default();
        match wanted.as_slice() {
            [] => true,
            [single] => present.contains(single),
            _ => present == wanted,
        }
    }
}

pub trait TreeNode: Sized {
    /// First matching descendant in document order.
    fn find_first(&self, query: &Query<'_>) -> Option<Found<Self>>;

    /// All matching descendants in document order.
    fn find_all(&self, query: &Query<'_>) -> Vec<Found<Self>>;

    /// Raw text fragments of the subtree, in order.
    fn text_fragments(&self) -> Vec<String>;

    fn attr(&self, name: &str) -> Option<&str>;

    fn has_class(&self, class: &str) -> bool;

    /// Concatenated text, untouched.
    fn text(&self) -> String {
        self.text_fragments().concat()
    }

    /// Fragments trimmed, empties dropped, joined by single spaces.
    fn collapsed_text(&self) -> String {
        self.text_fragments()
            .iter()
            .flat_map(|fragment| fragment.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn root(&self) -> Element<'_> {
        Element(self.html.root_element())
    }
}

/// An element of a [`Document`].
///
/// Tag selectors only ever hand back elements, so this backend never yields
/// [`Found::Placeholder`].
#[derive(Clone, Copy, Debug)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    fn descendants(&self, query: &Query<'_>) -> Vec<Element<'a>> {
        let root = self.0;
        let Ok(selector) = Selector::parse(&query.to_css()) else {
            return Vec::new();
        };
        root.select(&selector)
            .filter(|element| element.id() != root.id())
            .filter(|element| query.accepts_class_attr(element.value().attr("class")))
            .map(Element)
            .collect()
    }
}

impl<'a> TreeNode for Element<'a> {
    fn find_first(&self, query: &Query<'_>) -> Option<Found<Self>> {
        self.descendants(query).into_iter().next().map(Found::Element)
    }

    fn find_all(&self, query: &Query<'_>) -> Vec<Found<Self>> {
        self.descendants(query)
            .into_iter()
            .map(Found::Element)
            .collect()
    }

    fn text_fragments(&self) -> Vec<String> {
        self.0.text().map(str::to_string).collect()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.0.value().attr(name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.value().classes().any(|candidate| candidate == class)
    }
}
