//! XML serializer for the MEI tree.
//!
//! Elements with only element children are indented one level per depth.
//! Elements carrying text are written on one line with their children
//! inline, so mixed content keeps its exact spacing.

use super::{MeiDocument, MeiElement};

const INDENT: &str = "  ";

pub fn to_xml_string(doc: &MeiDocument) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_block(&mut xml, &doc.root, 0);
    xml
}

fn write_block(out: &mut String, el: &MeiElement, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    if el.value.is_some() || el.children.is_empty() {
        write_inline(out, el);
    } else {
        open_tag(out, el);
        out.push_str(">\n");
        for child in &el.children {
            write_block(out, child, depth + 1);
        }
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        out.push_str("</");
        out.push_str(&el.name);
        out.push('>');
        if let Some(tail) = &el.tail {
            out.push_str(&escape(tail));
        }
    }
    out.push('\n');
}

fn write_inline(out: &mut String, el: &MeiElement) {
    open_tag(out, el);
    if el.value.is_none() && el.children.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        if let Some(value) = &el.value {
            out.push_str(&escape(value));
        }
        for child in &el.children {
            write_inline(out, child);
        }
        out.push_str("</");
        out.push_str(&el.name);
        out.push('>');
    }
    if let Some(tail) = &el.tail {
        out.push_str(&escape(tail));
    }
}

fn open_tag(out: &mut String, el: &MeiElement) {
    out.push('<');
    out.push_str(&el.name);
    // the namespace declaration goes first, then the id
    if let Some(ns) = el.attribute("xmlns") {
        push_attr(out, "xmlns", ns);
    }
    push_attr(out, "xml:id", &el.id);
    for (key, value) in el.attributes.iter().filter(|(k, _)| k != "xmlns") {
        push_attr(out, key, value);
    }
}

fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
