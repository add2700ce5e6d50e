use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::error::{PaintshopError, PaintshopResult};

/// A selectable part of the template: a body style, add-on or wheel style.
///
/// `identifier` addresses the matching substructure in the template by
/// case-insensitive id prefix. An empty identifier means "apply nothing"
/// (the original catalogs carry a "none" add-on with an empty identifier).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PartOption {
    pub name: String,
    pub identifier: String,
}

/// A paint choice with its CSS color value.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColorOption {
    pub name: String,
    pub identifier: String,
    pub value: String,
}

/// A livery pattern with its two colorable zones.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveryOption {
    pub name: String,
    pub identifier: String,
    pub color1_identifier: String,
    pub color2_identifier: String,
}

/// The seven option categories, loaded once from a JSON document and passed
/// read-only to enumeration, preparation and rendering.
///
/// Field names on the wire match the original catalog documents
/// (`carColors`, `liveryColors1`, ...), so existing `options.json` files load
/// unchanged. Lists are ordered; enumeration order follows declaration order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCatalog {
    pub bodies: Vec<PartOption>,
    pub addons: Vec<PartOption>,
    pub liveries: Vec<LiveryOption>,
    pub car_colors: Vec<ColorOption>,
    pub livery_colors1: Vec<ColorOption>,
    pub livery_colors2: Vec<ColorOption>,
    pub wheels: Vec<PartOption>,
}

impl OptionCatalog {
    /// Load and validate a catalog from a JSON file.
    pub fn from_json_file(path: &Path) -> PaintshopResult<Self> {
        let f = File::open(path).with_context(|| format!("open options '{}'", path.display()))?;
        let catalog: OptionCatalog = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse options '{}'", path.display()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Every category must have at least one entry; bodies, liveries and
    /// wheels must be template-addressable (non-empty identifiers).
    pub fn validate(&self) -> PaintshopResult<()> {
        fn non_empty<T>(list: &[T], what: &str) -> PaintshopResult<()> {
            if list.is_empty() {
                return Err(PaintshopError::config(format!(
                    "option category '{what}' must not be empty"
                )));
            }
            Ok(())
        }

        non_empty(&self.bodies, "bodies")?;
        non_empty(&self.addons, "addons")?;
        non_empty(&self.liveries, "liveries")?;
        non_empty(&self.car_colors, "carColors")?;
        non_empty(&self.livery_colors1, "liveryColors1")?;
        non_empty(&self.livery_colors2, "liveryColors2")?;
        non_empty(&self.wheels, "wheels")?;

        for body in &self.bodies {
            if body.identifier.is_empty() {
                return Err(PaintshopError::config(format!(
                    "body '{}' has an empty identifier",
                    body.name
                )));
            }
        }
        for livery in &self.liveries {
            if livery.identifier.is_empty()
                || livery.color1_identifier.is_empty()
                || livery.color2_identifier.is_empty()
            {
                return Err(PaintshopError::config(format!(
                    "livery '{}' has an empty identifier",
                    livery.name
                )));
            }
        }
        for wheel in &self.wheels {
            if wheel.identifier.is_empty() {
                return Err(PaintshopError::config(format!(
                    "wheel style '{}' has an empty identifier",
                    wheel.name
                )));
            }
        }
        Ok(())
    }
}
