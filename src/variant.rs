use std::{fs::File, io::BufReader, io::BufWriter, path::Path};

use anyhow::Context as _;

use crate::{
    error::PaintshopResult,
    options::{ColorOption, LiveryOption, OptionCatalog, PartOption},
};

/// One fully specified configuration: exactly one option from each category.
///
/// Value object; equality is structural. Wire field names match the original
/// enumeration artifact (`carColor`, `liveryColor1`, ..., `wheels`).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub body: PartOption,
    pub addon: PartOption,
    pub livery: LiveryOption,
    pub car_color: ColorOption,
    pub livery_color1: ColorOption,
    pub livery_color2: ColorOption,
    pub wheels: PartOption,
}

impl Variant {
    /// Stable, filesystem-safe artifact name for this variant at a 1-based
    /// ordinal. Injective for distinct ordinals; the resumability key.
    pub fn file_name(&self, ordinal: usize) -> String {
        format!(
            "{}_{}_A-{}_L-{}_CC-{}_LC1-{}_LC2-{}_W-{}",
            ordinal,
            self.body.name,
            self.addon.name,
            self.livery.name,
            self.car_color.name,
            self.livery_color1.name,
            self.livery_color2.name,
            self.wheels.name,
        )
    }
}

/// Enumerate every constraint-valid variant in declared category order.
///
/// Nested iteration over (body, addon, livery, carColor, liveryColor1,
/// liveryColor2, wheel). Color clashes are pruned at the first violating
/// level: a liveryColor1 equal to the car color skips its whole subtree, and
/// a liveryColor2 equal to either prior color skips its wheel loop. The
/// result order is the visible contract consumed by naming and resumability.
pub fn enumerate_variants(catalog: &OptionCatalog) -> Vec<Variant> {
    let mut variants = Vec::new();

    for body in &catalog.bodies {
        for addon in &catalog.addons {
            for livery in &catalog.liveries {
                for car_color in &catalog.car_colors {
                    for livery_color1 in &catalog.livery_colors1 {
                        if livery_color1.value == car_color.value {
                            continue;
                        }

                        for livery_color2 in &catalog.livery_colors2 {
                            if livery_color2.value == car_color.value
                                || livery_color2.value == livery_color1.value
                            {
                                continue;
                            }

                            for wheel in &catalog.wheels {
                                variants.push(Variant {
                                    body: body.clone(),
                                    addon: addon.clone(),
                                    livery: livery.clone(),
                                    car_color: car_color.clone(),
                                    livery_color1: livery_color1.clone(),
                                    livery_color2: livery_color2.clone(),
                                    wheels: wheel.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    variants
}

/// The subset of an enumeration targeting one body style, in enumeration order.
pub fn filter_by_body(variants: &[Variant], body_name: &str) -> Vec<Variant> {
    variants
        .iter()
        .filter(|v| v.body.name == body_name)
        .cloned()
        .collect()
}

/// Persist the enumeration artifact as pretty-printed JSON.
pub fn write_variants(path: &Path, variants: &[Variant]) -> PaintshopResult<()> {
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), variants)
        .with_context(|| format!("write variants '{}'", path.display()))?;
    Ok(())
}

/// Read a previously written enumeration artifact.
pub fn read_variants(path: &Path) -> PaintshopResult<Vec<Variant>> {
    let f = File::open(path).with_context(|| format!("open variants '{}'", path.display()))?;
    let variants: Vec<Variant> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse variants '{}'", path.display()))?;
    Ok(variants)
}
