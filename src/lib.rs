#![forbid(unsafe_code)]

//! Batch renderer for car configurator variants.
//!
//! Enumerates every constraint-valid combination of body, add-on, livery,
//! paint and wheel options, then renders each combination to a PNG by
//! mutating a prepared SVG template on a pooled render surface. Chunks of the
//! variant list render in parallel; existing artifacts are skipped so an
//! interrupted run resumes where it left off.

pub mod dom;
pub mod error;
pub mod mutate;
pub mod options;
pub mod prepare;
pub mod render;
pub mod surface;
pub mod variant;

pub use error::{PaintshopError, PaintshopResult};
pub use mutate::{Mutation, Selector};
pub use options::{ColorOption, LiveryOption, OptionCatalog, PartOption};
pub use prepare::{NEUTRAL_FILL, baseline_mutations, prepare_template};
pub use render::{
    RenderOpts, RenderOutcome, RenderStats, render_batch, render_variant, variant_mutations,
};
pub use surface::{BackendKind, CpuSurface, FrameRgba, RenderSurface, SurfacePool, create_surface};
pub use variant::{Variant, enumerate_variants, filter_by_body, read_variants, write_variants};
