//! Element Attributes
//!
//! Ordered attribute collection with unique names and by-name lookup.
//! Elements in the HTML namespace compare attribute names ASCII
//! case-insensitively; every other namespace is case-sensitive.

use std::collections::HashMap;

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_id(&self) -> bool {
        self.name == "id"
    }
}

/// Named node map (attribute collection)
#[derive(Debug, Clone, Default)]
pub struct NamedNodeMap {
    attributes: Vec<Attr>,
    by_name: HashMap<String, usize>,
    lowercase_names: bool,
}

impl NamedNodeMap {
    /// Create a case-sensitive map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map that lowercases names (HTML elements)
    pub fn html() -> Self {
        Self {
            lowercase_names: true,
            ..Self::default()
        }
    }

    fn key<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str> {
        if self.lowercase_names && name.bytes().any(|b| b.is_ascii_uppercase()) {
            std::borrow::Cow::Owned(name.to_ascii_lowercase())
        } else {
            std::borrow::Cow::Borrowed(name)
        }
    }

    /// Get number of attributes
    pub fn length(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Get attribute by index
    pub fn item(&self, index: usize) -> Option<&Attr> {
        self.attributes.get(index)
    }

    /// Get attribute by name
    pub fn get_named_item(&self, name: &str) -> Option<&Attr> {
        let key = self.key(name);
        self.by_name
            .get(key.as_ref())
            .and_then(|&i| self.attributes.get(i))
    }

    /// Get attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.get_named_item(name).map(|a| a.value.as_str())
    }

    /// Set attribute, returning the replaced one if the name was taken
    pub fn set_named_item(&mut self, mut attr: Attr) -> Option<Attr> {
        attr.name = self.key(&attr.name).into_owned();
        if let Some(&index) = self.by_name.get(&attr.name) {
            Some(std::mem::replace(&mut self.attributes[index], attr))
        } else {
            let index = self.attributes.len();
            self.by_name.insert(attr.name.clone(), index);
            self.attributes.push(attr);
            None
        }
    }

    /// Set attribute by name/value
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.set_named_item(Attr::new(name, value));
    }

    /// Set attribute only when no attribute of that name exists yet
    pub fn set_if_missing(&mut self, name: &str, value: &str) -> bool {
        if self.has_attribute(name) {
            false
        } else {
            self.set_attribute(name, value);
            true
        }
    }

    /// Remove attribute by name
    pub fn remove_named_item(&mut self, name: &str) -> Option<Attr> {
        let key = self.key(name);
        let index = self.by_name.remove(key.as_ref())?;
        for idx in self.by_name.values_mut() {
            if *idx > index {
                *idx -= 1;
            }
        }
        Some(self.attributes.remove(index))
    }

    /// Check if attribute exists
    pub fn has_attribute(&self, name: &str) -> bool {
        let key = self.key(name);
        self.by_name.contains_key(key.as_ref())
    }

    /// Get attribute names, in insertion order
    pub fn get_attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Iterate over attributes, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attributes.iter()
    }
}
