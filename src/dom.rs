//! Minimal mutable SVG element tree.
//!
//! The render surface holds the prepared template as this tree, mutates it
//! through [`crate::mutate`] commands and serializes it back for rasterization.
//! Only elements, text and CDATA survive a parse/serialize round trip;
//! comments, processing instructions and doctypes are dropped, which is
//! irrelevant for rendering output.

use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::{PaintshopError, PaintshopResult};

#[derive(Clone, Debug)]
pub enum SvgChild {
    Element(SvgElement),
    Text(String),
}

/// One element node: tag name, attributes in document order, children.
#[derive(Clone, Debug, Default)]
pub struct SvgElement {
    pub name: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<SvgChild>,
}

impl SvgElement {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace an attribute, preserving its original position.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Read one property out of the inline `style` attribute.
    pub fn style_property(&self, prop: &str) -> Option<String> {
        let style = self.attr("style")?;
        for decl in style.split(';') {
            let mut parts = decl.splitn(2, ':');
            let key = parts.next()?.trim();
            if key.eq_ignore_ascii_case(prop) {
                return Some(parts.next().unwrap_or("").trim().to_string());
            }
        }
        None
    }

    /// Insert or replace one property in the inline `style` attribute.
    ///
    /// Inline style wins over presentation attributes in SVG, so this is the
    /// same override mechanism the template format relies on.
    pub fn set_style_property(&mut self, prop: &str, value: &str) {
        let mut decls: Vec<(String, String)> = Vec::new();
        if let Some(style) = self.attr("style") {
            for decl in style.split(';') {
                let mut parts = decl.splitn(2, ':');
                let key = parts.next().unwrap_or("").trim();
                if key.is_empty() {
                    continue;
                }
                let val = parts.next().unwrap_or("").trim();
                decls.push((key.to_string(), val.to_string()));
            }
        }
        match decls.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(prop)) {
            Some((_, v)) => *v = value.to_string(),
            None => decls.push((prop.to_string(), value.to_string())),
        }
        let style = decls
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(";");
        self.set_attr("style", style);
    }

    fn matches_id_prefix(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return false;
        }
        let Some(id) = self.id() else {
            return false;
        };
        id.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    /// First descendant (depth-first pre-order, i.e. document order) whose id
    /// starts with `prefix`, compared ASCII case-insensitively. The element
    /// itself is not a candidate. Document order is the tie-break when several
    /// ids share the prefix.
    pub fn find_id_prefix(&self, prefix: &str) -> Option<&SvgElement> {
        for child in &self.children {
            let SvgChild::Element(el) = child else {
                continue;
            };
            if el.matches_id_prefix(prefix) {
                return Some(el);
            }
            if let Some(found) = el.find_id_prefix(prefix) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable counterpart of [`SvgElement::find_id_prefix`].
    pub fn find_id_prefix_mut(&mut self, prefix: &str) -> Option<&mut SvgElement> {
        for child in &mut self.children {
            let SvgChild::Element(el) = child else {
                continue;
            };
            if el.matches_id_prefix(prefix) {
                return Some(el);
            }
            if let Some(found) = el.find_id_prefix_mut(prefix) {
                return Some(found);
            }
        }
        None
    }

    /// Direct child elements, in document order.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut SvgElement> {
        self.children.iter_mut().filter_map(|c| match c {
            SvgChild::Element(el) => Some(el),
            SvgChild::Text(_) => None,
        })
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &SvgElement> {
        self.children.iter().filter_map(|c| match c {
            SvgChild::Element(el) => Some(el),
            SvgChild::Text(_) => None,
        })
    }
}

/// Parse a markup string into its root element.
pub fn parse_markup(markup: &str) -> PaintshopResult<SvgElement> {
    let mut reader = Reader::from_str(markup);
    let mut stack: Vec<SvgElement> = Vec::new();
    let mut root: Option<SvgElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| PaintshopError::config(format!("parse markup: {e}")))?;
        match event {
            Event::Start(e) => stack.push(element_from_start(&e)?),
            Event::Empty(e) => {
                let el = element_from_start(&e)?;
                attach(&mut stack, &mut root, el);
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| PaintshopError::config("parse markup: unbalanced close tag"))?;
                attach(&mut stack, &mut root, el);
            }
            Event::Text(t) => {
                if let Some(parent) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| PaintshopError::config(format!("parse markup text: {e}")))?;
                    parent.children.push(SvgChild::Text(text.into_owned()));
                }
            }
            Event::CData(t) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&t).into_owned();
                    parent.children.push(SvgChild::Text(text));
                }
            }
            Event::Eof => break,
            // Declarations, comments, doctypes and PIs carry nothing the
            // renderer needs.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(PaintshopError::config("parse markup: unclosed element"));
    }
    root.ok_or_else(|| PaintshopError::config("parse markup: no root element"))
}

fn element_from_start(e: &BytesStart<'_>) -> PaintshopResult<SvgElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| PaintshopError::config(format!("parse attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| PaintshopError::config(format!("parse attribute value: {e}")))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(SvgElement {
        name,
        attrs,
        children: Vec::new(),
    })
}

fn attach(stack: &mut Vec<SvgElement>, root: &mut Option<SvgElement>, el: SvgElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(SvgChild::Element(el)),
        // First top-level element wins as the document root.
        None => {
            if root.is_none() {
                *root = Some(el);
            }
        }
    }
}

/// Serialize an element tree back to markup.
pub fn write_markup(root: &SvgElement) -> PaintshopResult<String> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, root)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| PaintshopError::backend(format!("serialize markup: {e}")))
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &SvgElement) -> PaintshopResult<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (k, v) in &el.attrs {
        start.push_attribute((k.as_str(), v.as_str()));
    }

    if el.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| PaintshopError::backend(format!("serialize markup: {e}")))?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| PaintshopError::backend(format!("serialize markup: {e}")))?;
    for child in &el.children {
        match child {
            SvgChild::Element(e) => write_element(writer, e)?,
            SvgChild::Text(t) => writer
                .write_event(Event::Text(BytesText::new(t)))
                .map_err(|e| PaintshopError::backend(format!("serialize markup: {e}")))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(|e| PaintshopError::backend(format!("serialize markup: {e}")))?;
    Ok(())
}
