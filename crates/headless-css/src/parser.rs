//! CSS Parser using lightningcss
//!
//! Parses CSS stylesheets into our internal representation.

use crate::{CssError, CssRule, Declaration, RuleKind};
use lightningcss::declaration::DeclarationBlock;
use lightningcss::rules::CssRule as LightningRule;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;

/// CSS Parser
#[derive(Debug, Clone)]
pub struct CssParser {
    error_recovery: bool,
}

impl CssParser {
    /// Create a lenient parser that skips invalid rules like a browser does
    pub fn new() -> Self {
        Self { error_recovery: true }
    }

    /// Fail on the first invalid rule instead of skipping it
    pub fn strict(mut self) -> Self {
        self.error_recovery = false;
        self
    }

    /// Parse a CSS stylesheet
    pub fn parse(&self, css: &str) -> Result<Vec<CssRule>, CssError> {
        let options = ParserOptions {
            error_recovery: self.error_recovery,
            ..ParserOptions::default()
        };

        let stylesheet = StyleSheet::parse(css, options).map_err(|e| CssError::Parse {
            message: e.to_string(),
        })?;

        let mut rules = Vec::with_capacity(stylesheet.rules.0.len());
        for rule in stylesheet.rules.0.iter() {
            if let Some(converted) = self.convert_rule(rule)? {
                rules.push(converted);
            }
        }

        tracing::trace!("Parsed {} CSS rules", rules.len());
        Ok(rules)
    }

    fn convert_rule(&self, rule: &LightningRule) -> Result<Option<CssRule>, CssError> {
        let kind = match rule {
            LightningRule::Ignored => return Ok(None),
            LightningRule::Style(_) => RuleKind::Style,
            LightningRule::Media(_) => RuleKind::Media,
            LightningRule::Import(_) => RuleKind::Import,
            LightningRule::FontFace(_) => RuleKind::FontFace,
            LightningRule::Keyframes(_) => RuleKind::Keyframes,
            LightningRule::Supports(_) => RuleKind::Supports,
            _ => RuleKind::Other,
        };

        let css_text = rule
            .to_css_string(PrinterOptions::default())
            .map_err(|e| CssError::Serialize {
                message: e.to_string(),
            })?;

        let (selector_text, declarations) = match rule {
            LightningRule::Style(style_rule) => {
                let selectors = css_text
                    .split_once('{')
                    .map(|(selectors, _)| selectors.trim().to_string());
                (selectors, self.convert_declarations(&style_rule.declarations)?)
            }
            _ => (None, Vec::new()),
        };

        Ok(Some(CssRule {
            kind,
            css_text,
            selector_text,
            declarations,
        }))
    }

    fn convert_declarations(&self, block: &DeclarationBlock) -> Result<Vec<Declaration>, CssError> {
        let normal = block.declarations.iter().map(|p| (p, false));
        let important = block.important_declarations.iter().map(|p| (p, true));

        normal
            .chain(important)
            .map(|(property, important)| {
                let value = property
                    .value_to_css_string(PrinterOptions::default())
                    .map_err(|e| CssError::Serialize {
                        message: e.to_string(),
                    })?;
                Ok(Declaration {
                    property: property.property_id().name().to_string(),
                    value,
                    important,
                })
            })
            .collect()
    }
}

impl Default for CssParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let css = r#"
            .foo { display: block; }
            #bar { color: red; }
        "#;

        let rules = CssParser::new().parse(css).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind, RuleKind::Style);
        assert_eq!(rules[0].selector_text.as_deref(), Some(".foo"));
        assert_eq!(rules[1].selector_text.as_deref(), Some("#bar"));
    }

    #[test]
    fn test_parse_declarations() {
        let rules = CssParser::new()
            .parse("body { color: red; margin: 0 !important }")
            .unwrap();

        let body = &rules[0];
        assert_eq!(body.declarations.len(), 2);
        assert_eq!(body.property_value("color"), Some("red"));
        assert!(body.declarations.iter().any(|d| d.property == "margin" && d.important));
    }

    #[test]
    fn test_parse_at_rules() {
        let css = r#"
            @media screen { a { color: blue } }
            @font-face { font-family: x; src: url(x.woff) }
            p { color: green }
        "#;

        let rules = CssParser::new().parse(css).unwrap();
        let kinds: Vec<_> = rules.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RuleKind::Media, RuleKind::FontFace, RuleKind::Style]);
        assert!(rules[0].selector_text.is_none());
        assert!(rules[0].declarations.is_empty());
    }

    #[test]
    fn test_parse_empty() {
        assert!(CssParser::new().parse("").unwrap().is_empty());
        assert!(CssParser::new().parse("   /* only a comment */ ").unwrap().is_empty());
    }

    #[test]
    fn test_lenient_parser_skips_garbage() {
        let rules = CssParser::new()
            .parse("a:::b { color: red } div { color: blue }")
            .unwrap();
        assert_eq!(rules.last().and_then(|r| r.selector_text.as_deref()), Some("div"));
    }
}
