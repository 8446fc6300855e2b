//! Minimal XML tree and writer used by the query and REST encoders.

use std::io::{self, Write};

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesText, Event},
};

/// Content of an [`XmlElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    /// Escaped text.
    Text(String),
    /// Nested elements.
    Children(Vec<XmlElement>),
    /// `<Name/>`
    Empty,
}

/// One element of a response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Tag name.
    pub name: String,
    /// Body.
    pub content: XmlContent,
}

impl XmlElement {
    /// `<name>value</name>`
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: XmlContent::Text(value.into()),
        }
    }

    /// `<name>children...</name>`
    #[must_use]
    pub fn parent(name: impl Into<String>, children: Vec<XmlElement>) -> Self {
        Self {
            name: name.into(),
            content: XmlContent::Children(children),
        }
    }

    /// `<name/>`
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: XmlContent::Empty,
        }
    }

    /// `<name>value</name>` when `value` is present.
    #[must_use]
    pub fn optional(name: impl Into<String>, value: Option<impl Into<String>>) -> Option<Self> {
        value.map(|v| Self::text(name, v))
    }
}

/// Write one element and its descendants.
pub fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> io::Result<()> {
    let start = writer.create_element(element.name.as_str());
    match &element.content {
        XmlContent::Text(text) => {
            start.write_text_content(BytesText::new(text))?;
        }
        XmlContent::Children(children) => {
            start.write_inner_content(|w| write_elements(w, children))?;
        }
        XmlContent::Empty => {
            start.write_empty()?;
        }
    }
    Ok(())
}

/// Write a sequence of sibling elements.
pub fn write_elements<W: Write>(writer: &mut Writer<W>, elements: &[XmlElement]) -> io::Result<()> {
    for element in elements {
        write_element(writer, element)?;
    }
    Ok(())
}

/// Serialize a full document with declaration and an optional `xmlns`.
///
/// ```
/// use cloudmock_gateway::{XmlElement, xml::to_document};
///
/// let doc = to_document("Root", None, &[XmlElement::text("Key", "a&b")]);
/// let doc = String::from_utf8(doc).unwrap();
/// assert!(doc.ends_with("<Root><Key>a&amp;b</Key></Root>"));
/// ```
#[must_use]
pub fn to_document(root: &str, xmlns: Option<&str>, children: &[XmlElement]) -> Vec<u8> {
    render(root, xmlns, RootBody::Children(children))
}

/// Serialize a document whose root holds only text, e.g.
/// `<LocationConstraint>eu-west-1</LocationConstraint>`.
#[must_use]
pub fn to_text_document(root: &str, xmlns: Option<&str>, text: &str) -> Vec<u8> {
    render(root, xmlns, RootBody::Text(text))
}

enum RootBody<'a> {
    Children(&'a [XmlElement]),
    Text(&'a str),
}

fn render(root: &str, xmlns: Option<&str>, body: RootBody<'_>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    // Writing to Vec<u8> is infallible; if this fails it means a logic error.
    if let Err(e) = write_document(&mut buf, root, xmlns, body) {
        tracing::error!(error = %e, root, "failed to serialize XML document");
        buf.clear();
    }
    buf
}

fn write_document(
    buf: &mut Vec<u8>,
    root: &str,
    xmlns: Option<&str>,
    body: RootBody<'_>,
) -> io::Result<()> {
    let mut writer = Writer::new(buf);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut start = writer.create_element(root);
    if let Some(ns) = xmlns {
        start = start.with_attribute(("xmlns", ns));
    }
    match body {
        RootBody::Children([]) | RootBody::Text("") => {
            start.write_empty()?;
        }
        RootBody::Children(children) => {
            start.write_inner_content(|w| write_elements(w, children))?;
        }
        RootBody::Text(text) => {
            start.write_text_content(BytesText::new(text))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(root: &str, xmlns: Option<&str>, children: &[XmlElement]) -> String {
        String::from_utf8(to_document(root, xmlns, children)).unwrap()
    }

    #[test]
    fn test_should_write_nested_elements() {
        let doc = render(
            "Root",
            Some("urn:test"),
            &[XmlElement::parent(
                "Items",
                vec![
                    XmlElement::text("Item", "one"),
                    XmlElement::empty("Nothing"),
                ],
            )],
        );
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(doc.contains(
            "<Root xmlns=\"urn:test\"><Items><Item>one</Item><Nothing/></Items></Root>"
        ));
    }

    #[test]
    fn test_should_write_empty_root() {
        let doc = render("LocationConstraint", None, &[]);
        assert!(doc.ends_with("<LocationConstraint/>"));
    }

    #[test]
    fn test_should_write_text_root() {
        let doc = String::from_utf8(to_text_document("LocationConstraint", Some("urn:s3"), "eu-west-1")).unwrap();
        assert!(doc.ends_with("<LocationConstraint xmlns=\"urn:s3\">eu-west-1</LocationConstraint>"));
        let empty = String::from_utf8(to_text_document("LocationConstraint", None, "")).unwrap();
        assert!(empty.ends_with("<LocationConstraint/>"));
    }

    #[test]
    fn test_should_skip_absent_optional() {
        assert!(XmlElement::optional("A", None::<String>).is_none());
        assert_eq!(
            XmlElement::optional("A", Some("x")),
            Some(XmlElement::text("A", "x"))
        );
    }
}
