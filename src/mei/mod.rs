//! MEI document tree.
//!
//! A small owned element tree: the builder fills it from the numbered boxes
//! and the writer serializes it. Every element carries a document-unique
//! `xml:id` so measures can point at their zones.

mod builder;
mod writer;

use std::path::Path;

use log::info;

use crate::error::{GtruthError, Result};

pub use builder::build_mei;
pub use writer::{escape, to_xml_string};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeiElement {
    pub name: String,
    pub id: String,
    pub attributes: Vec<(String, String)>,
    /// Text content written before the children.
    pub value: Option<String>,
    /// Text written right after the closing tag, inside the parent.
    pub tail: Option<String>,
    pub children: Vec<MeiElement>,
}

impl MeiElement {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn add_child(&mut self, child: MeiElement) {
        self.children.push(child);
    }

    pub fn with_child(mut self, child: MeiElement) -> Self {
        self.children.push(child);
        self
    }

    /// First element named `name` in document order, this one included.
    pub fn find(&self, name: &str) -> Option<&MeiElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Every element named `name` in document order.
    pub fn elements_named<'a>(&'a self, name: &str) -> Vec<&'a MeiElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, out: &mut Vec<&'a MeiElement>) {
        if self.name == name {
            out.push(self);
        }
        for child in &self.children {
            child.collect_named(name, out);
        }
    }

    pub fn element_by_id(&self, id: &str) -> Option<&MeiElement> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.element_by_id(id))
    }
}

/// Hands out sequential `xml:id`s.
#[derive(Debug, Default)]
pub struct IdGen {
    next: u32,
}

impl IdGen {
    pub fn element(&mut self, name: &str) -> MeiElement {
        self.next += 1;
        MeiElement::new(name, format!("m-{}", self.next))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeiDocument {
    pub root: MeiElement,
}

impl MeiDocument {
    pub fn to_xml(&self) -> String {
        to_xml_string(self)
    }

    pub fn measures(&self) -> Vec<&MeiElement> {
        self.root.elements_named("measure")
    }

    pub fn zones(&self) -> Vec<&MeiElement> {
        self.root.elements_named("zone")
    }

    /// Serialize and write to `path`.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_xml()).map_err(|e| GtruthError::io(path, e))?;
        info!("MEI written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_sequential() {
        let mut ids = IdGen::default();
        let a = ids.element("zone");
        let b = ids.element("measure");
        assert_eq!(a.id, "m-1");
        assert_eq!(b.id, "m-2");
    }

    #[test]
    fn add_attribute_overwrites() {
        let mut el = MeiElement::new("zone", "z").with_attribute("ulx", "1");
        el.add_attribute("ulx", "2");
        assert_eq!(el.attributes.len(), 1);
        assert_eq!(el.attribute("ulx"), Some("2"));
    }
}
