//! Render surfaces: stateful contexts that hold one template document,
//! accept mutation commands and capture the result as a raster frame.

use crate::{
    dom::{self, SvgElement},
    error::{PaintshopError, PaintshopResult},
    mutate::{Mutation, apply_mutations},
};

/// A captured frame as straight-alpha RGBA8 pixels, transparent background.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, straight (non-premultiplied)
    /// alpha so they can be written to PNG as-is.
    pub data: Vec<u8>,
}

/// One addressable rendering context.
///
/// A surface holds at most one document at a time and is used strictly
/// sequentially; exclusive ownership per chunk is enforced by moving the
/// surface into the chunk task. Dropping a surface tears it down.
pub trait RenderSurface: Send {
    /// Replace the current document with a pristine parse of `markup`.
    fn load(&mut self, markup: &str) -> PaintshopResult<()>;

    /// Apply mutation commands to the loaded document.
    fn apply(&mut self, mutations: &[Mutation]) -> PaintshopResult<()>;

    /// Rasterize the current document state.
    fn capture(&mut self) -> PaintshopResult<FrameRgba>;

    /// Serialize the current document state back to markup.
    fn markup(&self) -> PaintshopResult<String>;
}

/// Available surface backends. `Cpu` is always constructible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process CPU rasterization via `usvg` + `resvg`.
    Cpu,
}

/// CPU surface: document tree in memory, rasterized with `resvg`.
#[derive(Default)]
pub struct CpuSurface {
    doc: Option<SvgElement>,
}

impl CpuSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn doc_mut(&mut self) -> PaintshopResult<&mut SvgElement> {
        self.doc
            .as_mut()
            .ok_or_else(|| PaintshopError::backend("no document loaded"))
    }
}

impl RenderSurface for CpuSurface {
    fn load(&mut self, markup: &str) -> PaintshopResult<()> {
        self.doc = Some(dom::parse_markup(markup)?);
        Ok(())
    }

    fn apply(&mut self, mutations: &[Mutation]) -> PaintshopResult<()> {
        apply_mutations(self.doc_mut()?, mutations)
    }

    fn capture(&mut self) -> PaintshopResult<FrameRgba> {
        let markup = self.markup()?;
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_str(&markup, &opts)
            .map_err(|e| PaintshopError::backend(format!("parse svg for raster: {e}")))?;

        let size = tree.size();
        let width = (size.width().ceil() as u32).max(1);
        let height = (size.height().ceil() as u32).max(1);
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| PaintshopError::backend("failed to allocate capture pixmap"))?;

        let sx = width as f32 / size.width();
        let sy = height as f32 / size.height();
        let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        Ok(FrameRgba {
            width,
            height,
            data,
        })
    }

    fn markup(&self) -> PaintshopResult<String> {
        let doc = self
            .doc
            .as_ref()
            .ok_or_else(|| PaintshopError::backend("no document loaded"))?;
        dom::write_markup(doc)
    }
}

/// Construct one surface of the given kind.
///
/// A kind that cannot be constructed on this host is fatal to the caller;
/// there is no degraded mode.
pub fn create_surface(kind: BackendKind) -> PaintshopResult<Box<dyn RenderSurface>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(CpuSurface::new())),
    }
}

/// Hands out independent surfaces, one per concurrent chunk.
#[derive(Clone, Copy, Debug)]
pub struct SurfacePool {
    kind: BackendKind,
}

impl SurfacePool {
    pub fn new(kind: BackendKind) -> Self {
        Self { kind }
    }

    /// Acquire `count` independent surfaces. Any single construction failure
    /// fails the whole acquisition.
    pub fn acquire(&self, count: usize) -> PaintshopResult<Vec<Box<dyn RenderSurface>>> {
        (0..count).map(|_| create_surface(self.kind)).collect()
    }
}
