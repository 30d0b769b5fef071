//! CSS Selectors
//!
//! Parsing and matching of selector lists against a [`DomTree`].
//! Matching runs right to left: the rightmost compound is tested first and
//! combinators walk towards the root or earlier siblings.
//!
//! The document is static, so user-action pseudo-classes (`:hover`,
//! `:focus`, `:visited`, ...) parse but never match, and neither do
//! pseudo-elements.

use std::fmt;
use std::iter::successors;
use std::str::FromStr;

use crate::node::{ElementData, Node, NodeData};
use crate::{DomError, DomResult, DomTree, NodeId};

/// Parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(source: &str) -> DomResult<Self> {
        let mut parser = Parser::new(source);
        let selectors = parser.parse_list(false)?;
        Ok(Self { selectors })
    }

    /// Number of comma-separated selectors
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Check whether the element `id` matches any selector in the list
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        tree.is_element(id)
            && self
                .selectors
                .iter()
                .any(|selector| selector.matches(tree, id, None))
    }
}

impl FromStr for SelectorList {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    LaterSibling,
}

/// Compounds joined by combinators; `combinators[i]` sits between
/// `compounds[i]` and `compounds[i + 1]`
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

/// Selector inside `:has()`, anchored to the `:has` subject
#[derive(Debug, Clone, PartialEq)]
struct RelativeSelector {
    leading: Combinator,
    selector: ComplexSelector,
}

#[derive(Debug, Clone, PartialEq)]
enum TypeSelector {
    Universal,
    Name(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    type_selector: Option<TypeSelector>,
    simple: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, PartialEq)]
enum SimpleSelector {
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    PseudoClass(PseudoClass),
    PseudoElement(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeOperator {
    /// `[attr=value]`
    Equals,
    /// `[attr~=value]`
    Includes,
    /// `[attr|=value]`
    DashMatch,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr*=value]`
    Substring,
}

#[derive(Debug, Clone, PartialEq)]
struct AttributeSelector {
    name: String,
    operation: Option<(AttributeOperator, String)>,
    case_insensitive: bool,
}

impl AttributeSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let Some((operator, expected)) = &self.operation else {
            return true;
        };

        let (value, expected) = if self.case_insensitive {
            (value.to_ascii_lowercase(), expected.to_ascii_lowercase())
        } else {
            (value.to_string(), expected.clone())
        };

        match operator {
            AttributeOperator::Equals => value == expected,
            AttributeOperator::Includes => {
                !expected.is_empty()
                    && !expected.contains(char::is_whitespace)
                    && value.split_ascii_whitespace().any(|word| word == expected)
            }
            AttributeOperator::DashMatch => {
                value == expected
                    || value
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttributeOperator::Prefix => !expected.is_empty() && value.starts_with(&expected),
            AttributeOperator::Suffix => !expected.is_empty() && value.ends_with(&expected),
            AttributeOperator::Substring => !expected.is_empty() && value.contains(&expected),
        }
    }
}

/// An+B expression for `:nth-*` selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NthExpression {
    a: i32,
    b: i32,
}

impl NthExpression {
    /// Parse "2n+1", "odd", "even", "-n+3", "3"
    fn parse(s: &str) -> Option<Self> {
        let s: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match s.as_str() {
            "odd" => return Some(Self { a: 2, b: 1 }),
            "even" => return Some(Self { a: 2, b: 0 }),
            _ => {}
        }

        if let Ok(b) = s.parse::<i32>() {
            return Some(Self { a: 0, b });
        }

        let (a, rest) = s.split_once('n')?;
        let a = match a {
            "" | "+" => 1,
            "-" => -1,
            a => a.parse().ok()?,
        };
        let b = if rest.is_empty() {
            0
        } else if rest.starts_with('+') || rest.starts_with('-') {
            rest.parse().ok()?
        } else {
            return None;
        };
        Some(Self { a, b })
    }

    /// Check a 1-based position
    fn matches(self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }
        // Widened so `n-2147483648` and `-1n` cannot overflow.
        let (a, diff) = (i64::from(self.a), i64::from(n) - i64::from(self.b));
        diff % a == 0 && diff / a >= 0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    Not(SelectorList),
    /// `:is()` and `:where()`
    Is(SelectorList),
    Has(Vec<RelativeSelector>),
    /// `:link` and `:any-link`
    Link,
    Checked,
    Disabled,
    Enabled,
    Required,
    Optional,
    ReadOnly,
    ReadWrite,
    Lang(String),
    /// State that a static document never has
    Never,
}

const NEVER_MATCHING: &[&str] = &[
    "hover",
    "active",
    "focus",
    "focus-within",
    "focus-visible",
    "visited",
    "target",
    "target-within",
    "fullscreen",
    "playing",
    "paused",
    "autofill",
    "placeholder-shown",
    "indeterminate",
    "default",
    "valid",
    "invalid",
    "in-range",
    "out-of-range",
    "defined",
];

const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

struct Parser<'i> {
    input: &'i str,
    pos: usize,
}

impl<'i> Parser<'i> {
    fn new(input: &'i str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, reason: impl fmt::Display) -> DomError {
        DomError::InvalidSelector {
            selector: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> DomResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{expected}`")))
        }
    }

    /// Skip whitespace, reporting whether any was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn parse_list(&mut self, nested: bool) -> DomResult<Vec<ComplexSelector>> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            list.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') if nested => return Ok(list),
                None if !nested => return Ok(list),
                None => return Err(self.error("unclosed `(`")),
                Some(c) => return Err(self.error(format!("unexpected `{c}`"))),
            }
        }
    }

    fn parse_relative_list(&mut self) -> DomResult<Vec<RelativeSelector>> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            let leading = self.parse_explicit_combinator().unwrap_or(Combinator::Descendant);
            self.skip_whitespace();
            list.push(RelativeSelector {
                leading,
                selector: self.parse_complex()?,
            });
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => return Ok(list),
                None => return Err(self.error("unclosed `(`")),
                Some(c) => return Err(self.error(format!("unexpected `{c}`"))),
            }
        }
    }

    fn parse_explicit_combinator(&mut self) -> Option<Combinator> {
        let combinator = match self.peek()? {
            '>' => Combinator::Child,
            '+' => Combinator::NextSibling,
            '~' => Combinator::LaterSibling,
            _ => return None,
        };
        self.bump();
        Some(combinator)
    }

    fn parse_complex(&mut self) -> DomResult<ComplexSelector> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.parse_explicit_combinator() {
                Some(combinator) => combinator,
                None if had_whitespace && self.peek().is_some_and(starts_compound) => {
                    Combinator::Descendant
                }
                None => break,
            };
            self.skip_whitespace();
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> DomResult<Compound> {
        let mut compound = Compound::default();

        match self.peek() {
            Some('*') => {
                self.bump();
                compound.type_selector = Some(TypeSelector::Universal);
            }
            Some(c) if is_ident_start(c) => {
                compound.type_selector = Some(TypeSelector::Name(self.parse_ident()?));
            }
            _ => {}
        }

        loop {
            let simple = match self.peek() {
                Some('#') => {
                    self.bump();
                    SimpleSelector::Id(self.parse_ident()?)
                }
                Some('.') => {
                    self.bump();
                    SimpleSelector::Class(self.parse_ident()?)
                }
                Some('[') => {
                    self.bump();
                    SimpleSelector::Attribute(self.parse_attribute()?)
                }
                Some(':') => {
                    self.bump();
                    self.parse_pseudo()?
                }
                _ => break,
            };
            compound.simple.push(simple);
        }

        if compound.type_selector.is_none() && compound.simple.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("unexpected `{c}`")),
                None => self.error("expected selector"),
            });
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> DomResult<AttributeSelector> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        let operator = match self.peek() {
            Some(']') => None,
            Some('=') => Some(AttributeOperator::Equals),
            Some(c) => {
                let operator = match c {
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    '*' => AttributeOperator::Substring,
                    _ => return Err(self.error(format!("unexpected `{c}` in attribute selector"))),
                };
                self.bump();
                if self.peek() != Some('=') {
                    return Err(self.error("expected `=`"));
                }
                Some(operator)
            }
            None => return Err(self.error("unclosed `[`")),
        };

        let mut selector = AttributeSelector {
            name,
            operation: None,
            case_insensitive: false,
        };

        if let Some(operator) = operator {
            self.expect('=')?;
            self.skip_whitespace();
            let value = match self.peek() {
                Some(quote @ ('"' | '\'')) => {
                    self.bump();
                    self.parse_string(quote)?
                }
                _ => self.parse_ident()?,
            };
            selector.operation = Some((operator, value));
            self.skip_whitespace();

            if self.peek().is_some_and(is_ident_start) {
                let flag = self.parse_ident()?;
                if flag.eq_ignore_ascii_case("i") {
                    selector.case_insensitive = true;
                } else if !flag.eq_ignore_ascii_case("s") {
                    return Err(self.error(format!("unknown attribute flag `{flag}`")));
                }
                self.skip_whitespace();
            }
        }

        self.expect(']')?;
        Ok(selector)
    }

    fn parse_pseudo(&mut self) -> DomResult<SimpleSelector> {
        if self.eat(':') {
            let name = self.parse_ident()?.to_ascii_lowercase();
            if self.eat('(') {
                self.raw_argument()?;
            }
            return Ok(SimpleSelector::PseudoElement(name));
        }

        let name = self.parse_ident()?.to_ascii_lowercase();

        if self.eat('(') {
            let pseudo = match name.as_str() {
                "not" => PseudoClass::Not(SelectorList {
                    selectors: self.parse_list(true)?,
                }),
                "is" | "where" | "matches" => PseudoClass::Is(SelectorList {
                    selectors: self.parse_list(true)?,
                }),
                "has" => PseudoClass::Has(self.parse_relative_list()?),
                "nth-child" => PseudoClass::NthChild(self.nth_argument()?),
                "nth-last-child" => PseudoClass::NthLastChild(self.nth_argument()?),
                "nth-of-type" => PseudoClass::NthOfType(self.nth_argument()?),
                "nth-last-of-type" => PseudoClass::NthLastOfType(self.nth_argument()?),
                "lang" => PseudoClass::Lang(self.raw_argument_trimmed()?),
                "dir" => {
                    self.raw_argument_trimmed()?;
                    PseudoClass::Never
                }
                _ => return Err(self.error(format!("unknown pseudo-class `:{name}()`"))),
            };
            self.expect(')')?;
            return Ok(SimpleSelector::PseudoClass(pseudo));
        }

        if LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
            return Ok(SimpleSelector::PseudoElement(name));
        }

        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "only-of-type" => PseudoClass::OnlyOfType,
            "link" | "any-link" => PseudoClass::Link,
            "checked" => PseudoClass::Checked,
            "disabled" => PseudoClass::Disabled,
            "enabled" => PseudoClass::Enabled,
            "required" => PseudoClass::Required,
            "optional" => PseudoClass::Optional,
            "read-only" => PseudoClass::ReadOnly,
            "read-write" => PseudoClass::ReadWrite,
            name if NEVER_MATCHING.contains(&name) => PseudoClass::Never,
            _ => return Err(self.error(format!("unknown pseudo-class `:{name}`"))),
        };
        Ok(SimpleSelector::PseudoClass(pseudo))
    }

    /// Text up to the closing `)`, which is left for the caller
    fn raw_argument_trimmed(&mut self) -> DomResult<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ')' {
                return Ok(self.input[start..self.pos].trim().to_string());
            }
            self.bump();
        }
        Err(self.error("unclosed `(`"))
    }

    /// Skip a balanced argument including its closing `)`
    fn raw_argument(&mut self) -> DomResult<()> {
        let mut depth = 1;
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(self.error("unclosed `(`"))
    }

    fn nth_argument(&mut self) -> DomResult<NthExpression> {
        let raw = self.raw_argument_trimmed()?;
        NthExpression::parse(&raw).ok_or_else(|| self.error(format!("invalid An+B `{raw}`")))
    }

    fn parse_ident(&mut self) -> DomResult<String> {
        let mut ident = String::new();
        match self.peek() {
            Some(c) if is_ident_start(c) => {}
            Some(c) => return Err(self.error(format!("unexpected `{c}`"))),
            None => return Err(self.error("expected identifier")),
        }

        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                ident.push(self.parse_escape()?);
            } else if is_ident_char(c) {
                self.bump();
                ident.push(c);
            } else {
                break;
            }
        }

        if ident == "-" {
            return Err(self.error("expected identifier"));
        }
        Ok(ident)
    }

    fn parse_string(&mut self, quote: char) -> DomResult<String> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => value.push(self.parse_escape()?),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    /// Escape body after the backslash
    fn parse_escape(&mut self) -> DomResult<char> {
        let start = self.pos;
        while self.pos - start < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.bump();
        }
        if self.pos == start {
            return self.bump().ok_or_else(|| self.error("unterminated escape"));
        }

        let code = u32::from_str_radix(&self.input[start..self.pos], 16).unwrap_or(0xFFFD);
        if self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        Ok(match char::from_u32(code) {
            Some(c) if code != 0 => c,
            _ => char::REPLACEMENT_CHARACTER,
        })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

fn starts_compound(c: char) -> bool {
    is_ident_start(c) || matches!(c, '*' | '#' | '.' | '[' | ':')
}

// Tree walking helpers

fn prev_sibling(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    tree.get(id).and_then(Node::previous_sibling)
}

fn next_sibling(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    tree.get(id).and_then(Node::next_sibling)
}

fn prev_element_siblings(tree: &DomTree, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    successors(prev_sibling(tree, id), move |&s| prev_sibling(tree, s))
        .filter(move |&s| tree.is_element(s))
}

fn next_element_siblings(tree: &DomTree, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    successors(next_sibling(tree, id), move |&s| next_sibling(tree, s))
        .filter(move |&s| tree.is_element(s))
}

fn ancestors(tree: &DomTree, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    successors(tree.parent(id), move |&p| tree.parent(p))
}

fn element_ancestors(tree: &DomTree, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    ancestors(tree, id).filter(move |&p| tree.is_element(p))
}

fn same_type(a: &ElementData, b: &ElementData) -> bool {
    a.local_name() == b.local_name() && a.namespace_uri() == b.namespace_uri()
}

fn is_html_named(data: &ElementData, names: &[&str]) -> bool {
    data.is_html()
        && names
            .iter()
            .any(|name| data.local_name().eq_ignore_ascii_case(name))
}

/// Check the relation a `:has()` argument's leftmost compound must have
/// with the anchor element
fn related(tree: &DomTree, combinator: Combinator, anchor: NodeId, id: NodeId) -> bool {
    match combinator {
        Combinator::Descendant => ancestors(tree, id).any(|p| p == anchor),
        Combinator::Child => tree.parent(id) == Some(anchor),
        Combinator::NextSibling => prev_element_siblings(tree, id).next() == Some(anchor),
        Combinator::LaterSibling => prev_element_siblings(tree, id).any(|s| s == anchor),
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, id: NodeId, anchor: Option<(Combinator, NodeId)>) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.match_at(tree, n - 1, id, anchor),
        }
    }

    fn match_at(
        &self,
        tree: &DomTree,
        index: usize,
        id: NodeId,
        anchor: Option<(Combinator, NodeId)>,
    ) -> bool {
        if !self.compounds[index].matches(tree, id) {
            return false;
        }
        if index == 0 {
            return anchor.is_none_or(|(combinator, a)| related(tree, combinator, a, id));
        }

        let next = index - 1;
        match self.combinators[next] {
            Combinator::Child => tree
                .parent(id)
                .filter(|&p| tree.is_element(p))
                .is_some_and(|p| self.match_at(tree, next, p, anchor)),
            Combinator::Descendant => {
                element_ancestors(tree, id).any(|p| self.match_at(tree, next, p, anchor))
            }
            Combinator::NextSibling => prev_element_siblings(tree, id)
                .next()
                .is_some_and(|s| self.match_at(tree, next, s, anchor)),
            Combinator::LaterSibling => {
                prev_element_siblings(tree, id).any(|s| self.match_at(tree, next, s, anchor))
            }
        }
    }
}

impl RelativeSelector {
    fn matches(&self, tree: &DomTree, anchor: NodeId) -> bool {
        let relation = Some((self.leading, anchor));
        let test = |candidate: NodeId| {
            tree.is_element(candidate) && self.selector.matches(tree, candidate, relation)
        };

        match self.leading {
            Combinator::Descendant | Combinator::Child => tree.descendants(anchor).any(test),
            Combinator::NextSibling | Combinator::LaterSibling => {
                next_element_siblings(tree, anchor)
                    .any(|s| std::iter::once(s).chain(tree.descendants(s)).any(test))
            }
        }
    }
}

impl Compound {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(data) = tree.element(id) else {
            return false;
        };

        let type_matches = match &self.type_selector {
            None | Some(TypeSelector::Universal) => true,
            Some(TypeSelector::Name(name)) => data.has_tag_name(name),
        };

        type_matches
            && self.simple.iter().all(|simple| match simple {
                SimpleSelector::Id(expected) => data.id() == Some(expected.as_str()),
                SimpleSelector::Class(expected) => data.classes().any(|c| c == expected),
                SimpleSelector::Attribute(attribute) => {
                    attribute.matches(data.get_attr(&attribute.name))
                }
                SimpleSelector::PseudoClass(pseudo) => pseudo.matches(tree, id, data),
                SimpleSelector::PseudoElement(_) => false,
            })
    }
}

impl PseudoClass {
    fn matches(&self, tree: &DomTree, id: NodeId, data: &ElementData) -> bool {
        let of_type = |s: &NodeId| tree.element(*s).is_some_and(|other| same_type(data, other));

        match self {
            Self::Root => tree.parent(id) == Some(NodeId::ROOT),
            Self::Empty => tree.children(id).all(|child| {
                match tree.get(child).map(Node::data) {
                    Some(NodeData::Comment(_)) => true,
                    Some(NodeData::Text(text)) => text.is_empty(),
                    _ => false,
                }
            }),
            Self::FirstChild => prev_element_siblings(tree, id).next().is_none(),
            Self::LastChild => next_element_siblings(tree, id).next().is_none(),
            Self::OnlyChild => {
                prev_element_siblings(tree, id).next().is_none()
                    && next_element_siblings(tree, id).next().is_none()
            }
            Self::FirstOfType => !prev_element_siblings(tree, id).any(|s| of_type(&s)),
            Self::LastOfType => !next_element_siblings(tree, id).any(|s| of_type(&s)),
            Self::OnlyOfType => {
                !prev_element_siblings(tree, id).any(|s| of_type(&s))
                    && !next_element_siblings(tree, id).any(|s| of_type(&s))
            }
            Self::NthChild(nth) => nth.matches(position(prev_element_siblings(tree, id))),
            Self::NthLastChild(nth) => nth.matches(position(next_element_siblings(tree, id))),
            Self::NthOfType(nth) => {
                nth.matches(position(prev_element_siblings(tree, id).filter(of_type)))
            }
            Self::NthLastOfType(nth) => {
                nth.matches(position(next_element_siblings(tree, id).filter(of_type)))
            }
            Self::Not(list) => !list.matches(tree, id),
            Self::Is(list) => list.matches(tree, id),
            Self::Has(relative) => relative.iter().any(|r| r.matches(tree, id)),
            Self::Link => is_html_named(data, &["a", "area", "link"]) && data.get_attr("href").is_some(),
            Self::Checked => {
                let checkable = is_html_named(data, &["input"])
                    && data.get_attr("type").is_some_and(|t| {
                        t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio")
                    });
                (checkable && data.get_attr("checked").is_some())
                    || (is_html_named(data, &["option"]) && data.get_attr("selected").is_some())
            }
            Self::Disabled => is_disableable(data) && data.get_attr("disabled").is_some(),
            Self::Enabled => is_disableable(data) && data.get_attr("disabled").is_none(),
            Self::Required => {
                is_html_named(data, &["input", "select", "textarea"])
                    && data.get_attr("required").is_some()
            }
            Self::Optional => {
                is_html_named(data, &["input", "select", "textarea"])
                    && data.get_attr("required").is_none()
            }
            Self::ReadWrite => is_read_write(data),
            Self::ReadOnly => !is_read_write(data),
            Self::Lang(lang) => std::iter::once(id)
                .chain(element_ancestors(tree, id))
                .find_map(|a| tree.get_attribute(a, "lang"))
                .is_some_and(|value| lang_matches(value, lang)),
            Self::Never => false,
        }
    }
}

/// 1-based position given the siblings before (or after) an element
fn position(siblings: impl Iterator<Item = NodeId>) -> i32 {
    i32::try_from(siblings.count()).map_or(i32::MAX, |n| n.saturating_add(1))
}

fn is_disableable(data: &ElementData) -> bool {
    is_html_named(
        data,
        &["button", "input", "select", "textarea", "optgroup", "option", "fieldset"],
    )
}

fn is_read_write(data: &ElementData) -> bool {
    if is_html_named(data, &["input", "textarea"]) {
        return data.get_attr("readonly").is_none() && data.get_attr("disabled").is_none();
    }
    data.get_attr("contenteditable")
        .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
}

fn lang_matches(value: &str, lang: &str) -> bool {
    let lang = lang.trim_matches(|c| c == '"' || c == '\'');
    value.eq_ignore_ascii_case(lang)
        || (value.len() > lang.len()
            && value.as_bytes()[..lang.len()].eq_ignore_ascii_case(lang.as_bytes())
            && value.as_bytes()[lang.len()] == b'-')
}
