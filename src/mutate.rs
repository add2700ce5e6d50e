//! Structured mutation commands applied to a loaded template document.
//!
//! The command set is intentionally narrow: show/hide a substructure and
//! repaint a substructure. Commands are plain data, so a surface backend
//! never executes free-form script against its document.

use std::fmt;

use crate::{
    dom::SvgElement,
    error::{PaintshopError, PaintshopResult},
};

/// A path of case-insensitive id prefixes, resolved by descending from the
/// document root one matched element at a time.
///
/// Each step matches the first element in document order whose id starts with
/// the prefix (see [`SvgElement::find_id_prefix_mut`]); template authors vary
/// identifier casing, so matching is case-insensitive by design.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    path: Vec<String>,
}

impl Selector {
    pub fn id(prefix: impl Into<String>) -> Self {
        Self {
            path: vec![prefix.into()],
        }
    }

    /// Extend the path with another id prefix, scoped to the current match.
    pub fn child(mut self, prefix: impl Into<String>) -> Self {
        self.path.push(prefix.into());
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.join(" > "))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Show or hide the matched element (`style="display:block|none"`).
    SetVisible { target: Selector, visible: bool },
    /// Repaint the matched subtree: the fill lands on every direct child of
    /// the match and on every deeper descendant that already carries a
    /// `style` attribute (the template marks paintable shapes that way).
    SetFill { target: Selector, color: String },
}

/// Apply commands in order. A selector that matches nothing fails the whole
/// batch with a mutation error; partial application is visible on the
/// document, which is fine because callers reload from pristine markup on
/// error (and per-variant anyway).
pub fn apply_mutations(root: &mut SvgElement, mutations: &[Mutation]) -> PaintshopResult<()> {
    for mutation in mutations {
        match mutation {
            Mutation::SetVisible { target, visible } => {
                let el = resolve_mut(root, target)?;
                el.set_style_property("display", if *visible { "block" } else { "none" });
            }
            Mutation::SetFill { target, color } => {
                let el = resolve_mut(root, target)?;
                apply_fill(el, color);
            }
        }
    }
    Ok(())
}

fn resolve_mut<'a>(
    root: &'a mut SvgElement,
    selector: &Selector,
) -> PaintshopResult<&'a mut SvgElement> {
    let mut current = root;
    for prefix in &selector.path {
        current = current.find_id_prefix_mut(prefix).ok_or_else(|| {
            PaintshopError::mutation(format!(
                "no element matches id prefix '{prefix}' (selector '{selector}')"
            ))
        })?;
    }
    Ok(current)
}

fn apply_fill(el: &mut SvgElement, color: &str) {
    for child in el.child_elements_mut() {
        child.set_style_property("fill", color);
        fill_styled_descendants(child, color);
    }
}

fn fill_styled_descendants(el: &mut SvgElement, color: &str) {
    for child in el.child_elements_mut() {
        if child.attr("style").is_some() {
            child.set_style_property("fill", color);
        }
        fill_styled_descendants(child, color);
    }
}
