//! Batch scheduling and per-variant rendering.
//!
//! The filtered variant list is split into contiguous chunks; each chunk is
//! bound to one exclusively-owned surface and driven sequentially, chunks run
//! in parallel. Artifacts that already exist are skipped, which makes a rerun
//! after interruption resume where it left off.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    error::{PaintshopError, PaintshopResult},
    mutate::{Mutation, Selector},
    prepare::{ADDONS_REGION, CAR_REGION, WHEELS_REGION},
    surface::{RenderSurface, SurfacePool},
    variant::Variant,
};

/// Batch run controls.
#[derive(Clone, Debug)]
pub struct RenderOpts {
    /// Variants per chunk; chunk count is `ceil(n / chunk_size)`.
    pub chunk_size: usize,
    /// Directory artifacts are written to (created if missing).
    pub out_dir: PathBuf,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

/// Aggregated batch counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub total: u64,
    pub rendered: u64,
    pub skipped: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Saved,
    Skipped,
}

/// The command list realizing one variant on a prepared baseline.
///
/// Everything is additive: the baseline has all substructures hidden, so only
/// the chosen ones are turned on. An add-on with an empty identifier ("none")
/// contributes no command at all.
pub fn variant_mutations(variant: &Variant) -> Vec<Mutation> {
    let body_sel = Selector::id(&variant.body.identifier);
    let mut mutations = vec![
        Mutation::SetVisible {
            target: body_sel.clone(),
            visible: true,
        },
        Mutation::SetFill {
            target: body_sel.clone().child(CAR_REGION),
            color: variant.car_color.value.clone(),
        },
    ];

    if !variant.addon.identifier.is_empty() {
        mutations.push(Mutation::SetVisible {
            target: body_sel
                .clone()
                .child(ADDONS_REGION)
                .child(&variant.addon.identifier),
            visible: true,
        });
    }

    let livery_sel = body_sel.clone().child(&variant.livery.identifier);
    mutations.push(Mutation::SetVisible {
        target: livery_sel.clone(),
        visible: true,
    });
    mutations.push(Mutation::SetFill {
        target: livery_sel.clone().child(&variant.livery.color1_identifier),
        color: variant.livery_color1.value.clone(),
    });
    mutations.push(Mutation::SetFill {
        target: livery_sel.child(&variant.livery.color2_identifier),
        color: variant.livery_color2.value.clone(),
    });

    mutations.push(Mutation::SetVisible {
        target: body_sel
            .child(WHEELS_REGION)
            .child(&variant.wheels.identifier),
        visible: true,
    });

    mutations
}

/// Render one variant on an already-acquired surface.
///
/// `index` is the 0-based position in the filtered list; the artifact name
/// and progress lines use the 1-based ordinal. If the artifact already exists
/// the render is skipped entirely — the surface is not touched.
pub fn render_variant(
    variant: &Variant,
    template: &str,
    surface: &mut dyn RenderSurface,
    index: usize,
    total: usize,
    out_dir: &Path,
) -> PaintshopResult<RenderOutcome> {
    let ordinal = index + 1;
    let name = variant.file_name(ordinal);
    let out_path = out_dir.join(format!("{name}.png"));

    if out_path.exists() {
        tracing::info!("[{ordinal}/{total}] skipped \"{name}.png\"");
        return Ok(RenderOutcome::Skipped);
    }

    // Each variant starts from a pristine copy of the prepared template so no
    // state leaks between variants sharing this surface.
    surface.load(template)?;
    surface.apply(&variant_mutations(variant))?;
    let frame = surface.capture()?;

    image::save_buffer_with_format(
        &out_path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| PaintshopError::render(format!("write png '{}': {e}", out_path.display())))?;

    tracing::info!("[{ordinal}/{total}] saved \"{name}.png\"");
    Ok(RenderOutcome::Saved)
}

/// Render a filtered variant list to completion.
///
/// One surface per chunk, acquired up front (acquisition failure is fatal
/// before any work starts). Chunks run in parallel; a failure inside a chunk
/// aborts that chunk's remaining variants but every other chunk still runs to
/// completion, and the first chunk error fails the whole run afterwards.
pub fn render_batch(
    variants: &[Variant],
    template: &str,
    pool: &SurfacePool,
    opts: &RenderOpts,
) -> PaintshopResult<RenderStats> {
    if opts.chunk_size == 0 {
        return Err(PaintshopError::config("chunk size must be >= 1"));
    }
    std::fs::create_dir_all(&opts.out_dir).map_err(|e| {
        PaintshopError::render(format!(
            "create output dir '{}': {e}",
            opts.out_dir.display()
        ))
    })?;

    let total = variants.len();
    let chunks: Vec<&[Variant]> = variants.chunks(opts.chunk_size).collect();
    let surfaces = pool.acquire(chunks.len())?;
    tracing::info!("rendering {total} variants in {} chunks", chunks.len());

    let thread_pool = build_thread_pool(opts.threads)?;
    let results: Vec<PaintshopResult<RenderStats>> = thread_pool.install(|| {
        chunks
            .into_par_iter()
            .zip(surfaces.into_par_iter())
            .enumerate()
            .map(|(chunk_index, (chunk, mut surface))| {
                render_chunk(
                    chunk,
                    template,
                    surface.as_mut(),
                    chunk_index * opts.chunk_size,
                    total,
                    &opts.out_dir,
                )
            })
            .collect()
    });

    let mut stats = RenderStats::default();
    for result in results {
        let chunk_stats = result?;
        stats.total += chunk_stats.total;
        stats.rendered += chunk_stats.rendered;
        stats.skipped += chunk_stats.skipped;
    }
    Ok(stats)
}

/// Drive one chunk strictly in list order. The global index reported for a
/// variant is `start_index + intra_chunk_index`, independent of which chunk
/// finishes first. The first error aborts the rest of the chunk.
fn render_chunk(
    chunk: &[Variant],
    template: &str,
    surface: &mut dyn RenderSurface,
    start_index: usize,
    total: usize,
    out_dir: &Path,
) -> PaintshopResult<RenderStats> {
    let mut stats = RenderStats::default();
    for (i, variant) in chunk.iter().enumerate() {
        match render_variant(variant, template, surface, start_index + i, total, out_dir)? {
            RenderOutcome::Saved => stats.rendered += 1,
            RenderOutcome::Skipped => stats.skipped += 1,
        }
        stats.total += 1;
    }
    Ok(stats)
}

fn build_thread_pool(threads: Option<usize>) -> PaintshopResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PaintshopError::config(
            "render 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PaintshopError::backend(format!("failed to build thread pool: {e}")))
}
