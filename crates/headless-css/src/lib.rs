//! Headless CSS
//!
//! Turns stylesheet text into an ordered list of rules.
//! Parsing is delegated to lightningcss; the result is an owned, simplified
//! representation that outlives the source text.

mod parser;

pub use parser::CssParser;

/// Parse a stylesheet into its rules, in source order.
pub fn parse_stylesheet(css: &str) -> Result<Vec<CssRule>, CssError> {
    CssParser::new().parse(css)
}

/// Kind of a top-level rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Style,
    Media,
    Import,
    FontFace,
    Keyframes,
    Supports,
    Other,
}

/// A parsed CSS rule
#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub kind: RuleKind,
    /// Serialized form of the whole rule
    pub css_text: String,
    /// Selector list, for style rules only
    pub selector_text: Option<String>,
    /// Declarations, for style rules only
    pub declarations: Vec<Declaration>,
}

impl CssRule {
    /// Look up the last declared value of a property.
    pub fn property_value(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|d| d.property.eq_ignore_ascii_case(property))
            .map(|d| d.value.as_str())
    }
}

/// CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// CSS parsing error
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("CSS parse error: {message}")]
    Parse { message: String },

    #[error("CSS serialization error: {message}")]
    Serialize { message: String },
}
