//! Template preparation: derive the all-off baseline the renderer starts from.
//!
//! The prepared markup has every body hidden with its paintable region reset
//! to a neutral fill, every catalogued add-on, livery and wheel substructure
//! hidden, and livery color zones neutralized. The catalog is the source of
//! truth for which substructures exist; shapes it does not name (e.g. wheel
//! shadows) are left untouched.

use crate::{
    error::PaintshopResult,
    mutate::{Mutation, Selector},
    options::OptionCatalog,
    surface::RenderSurface,
};

/// Fill applied to paintable regions in the baseline.
pub const NEUTRAL_FILL: &str = "#fff";

/// Id prefix of a body's paintable region.
pub const CAR_REGION: &str = "car";
/// Id prefix of a body's add-on container.
pub const ADDONS_REGION: &str = "add-ons";
/// Id prefix of a body's wheel container.
pub const WHEELS_REGION: &str = "wheels";

/// Build the baseline command list for a catalog.
pub fn baseline_mutations(catalog: &OptionCatalog) -> Vec<Mutation> {
    let mut mutations = Vec::new();

    for body in &catalog.bodies {
        let body_sel = Selector::id(&body.identifier);
        mutations.push(Mutation::SetVisible {
            target: body_sel.clone(),
            visible: false,
        });
        mutations.push(Mutation::SetFill {
            target: body_sel.clone().child(CAR_REGION),
            color: NEUTRAL_FILL.to_string(),
        });

        for addon in &catalog.addons {
            if addon.identifier.is_empty() {
                continue;
            }
            mutations.push(Mutation::SetVisible {
                target: body_sel
                    .clone()
                    .child(ADDONS_REGION)
                    .child(&addon.identifier),
                visible: false,
            });
        }

        for wheel in &catalog.wheels {
            mutations.push(Mutation::SetVisible {
                target: body_sel
                    .clone()
                    .child(WHEELS_REGION)
                    .child(&wheel.identifier),
                visible: false,
            });
        }

        for livery in &catalog.liveries {
            let livery_sel = body_sel.clone().child(&livery.identifier);
            mutations.push(Mutation::SetVisible {
                target: livery_sel.clone(),
                visible: false,
            });
            mutations.push(Mutation::SetFill {
                target: livery_sel.clone().child(&livery.color1_identifier),
                color: NEUTRAL_FILL.to_string(),
            });
            mutations.push(Mutation::SetFill {
                target: livery_sel.child(&livery.color2_identifier),
                color: NEUTRAL_FILL.to_string(),
            });
        }
    }

    mutations
}

/// Transform raw template markup into the prepared baseline form.
pub fn prepare_template(
    raw_markup: &str,
    catalog: &OptionCatalog,
    surface: &mut dyn RenderSurface,
) -> PaintshopResult<String> {
    surface.load(raw_markup)?;
    surface.apply(&baseline_mutations(catalog))?;
    surface.markup()
}
