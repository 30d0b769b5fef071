//! Style Sheets
//!
//! Entries of `document.styleSheets`. Sheets owned by `<link>` elements are
//! placeholders: their external CSS is not fetched here, so they carry no
//! rule list.

use headless_css::CssRule;

use crate::NodeId;

/// One `<style>` or `<link rel="stylesheet">` sheet
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    owner_node: NodeId,
    href: Option<String>,
    css_rules: Option<Vec<CssRule>>,
}

impl StyleSheet {
    /// Sheet parsed from an inline `<style>` element
    pub fn inline(owner_node: NodeId, css_rules: Vec<CssRule>) -> Self {
        Self {
            owner_node,
            href: None,
            css_rules: Some(css_rules),
        }
    }

    /// Rule-less placeholder for an external `<link>` sheet
    pub fn external(owner_node: NodeId, href: impl Into<String>) -> Self {
        Self {
            owner_node,
            href: Some(href.into()),
            css_rules: None,
        }
    }

    /// The `<style>` or `<link>` element that produced this sheet
    pub fn owner_node(&self) -> NodeId {
        self.owner_node
    }

    /// `href` of a `<link>` sheet, as written in the document
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Parsed rules; `None` for `<link>` placeholders
    pub fn css_rules(&self) -> Option<&[CssRule]> {
        self.css_rules.as_deref()
    }

    pub fn is_external(&self) -> bool {
        self.href.is_some()
    }
}

/// Ordered list of style sheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheetList {
    sheets: Vec<StyleSheet>,
}

impl StyleSheetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, sheet: StyleSheet) {
        self.sheets.push(sheet);
    }

    pub fn length(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&StyleSheet> {
        self.sheets.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StyleSheet> {
        self.sheets.iter()
    }

    /// Placeholders for external sheets, in document order
    pub fn external(&self) -> impl Iterator<Item = &StyleSheet> {
        self.sheets.iter().filter(|sheet| sheet.is_external())
    }
}

impl<'a> IntoIterator for &'a StyleSheetList {
    type Item = &'a StyleSheet;
    type IntoIter = std::slice::Iter<'a, StyleSheet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.iter()
    }
}
