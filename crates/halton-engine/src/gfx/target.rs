//! Indexed render target registry and output binding.

use std::fmt;

use super::error::GfxError;
use super::resource::{GpuTarget, TargetKind};

/// Opaque render target identifier.
///
/// Handles are indices into the registry and stay valid (and identical)
/// across resizes and swapchain loss for the registry's lifetime.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct TargetHandle(u32);

impl TargetHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TargetHandle({})", self.0)
    }
}

/// Creates backing storage for render targets.
pub trait TargetAllocator {
    type Storage;

    fn allocate(
        &mut self,
        kind: TargetKind,
        width: u32,
        height: u32,
    ) -> Result<Self::Storage, GfxError>;
}

/// Allocates real GPU textures.
pub struct DeviceAllocator<'d>(pub &'d wgpu::Device);

impl TargetAllocator for DeviceAllocator<'_> {
    type Storage = GpuTarget;

    fn allocate(&mut self, kind: TargetKind, width: u32, height: u32) -> Result<GpuTarget, GfxError> {
        GpuTarget::new(self.0, kind, width, height)
    }
}

/// Where an output (color or depth) currently points.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Output {
    /// The swapchain image (color) or the renderer-owned back-buffer depth.
    Backbuffer,
    Target(TargetHandle),
}

/// The color/depth pair applied to every pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OutputBinding {
    pub color: Output,
    pub depth: Option<Output>,
}

impl Default for OutputBinding {
    fn default() -> Self {
        Self {
            color: Output::Backbuffer,
            depth: Some(Output::Backbuffer),
        }
    }
}

struct Slot<S> {
    kind: TargetKind,
    width: u32,
    height: u32,
    storage: Option<S>,
}

/// Registry of render targets plus the active output binding.
pub struct RenderTargets<S> {
    slots: Vec<Slot<S>>,
    binding: OutputBinding,
    /// Single saved level; a second push overwrites it.
    saved: Option<OutputBinding>,
}

impl<S> Default for RenderTargets<S> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            binding: OutputBinding::default(),
            saved: None,
        }
    }
}

impl<S> RenderTargets<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn create<A>(
        &mut self,
        alloc: &mut A,
        kind: TargetKind,
        width: u32,
        height: u32,
    ) -> Result<TargetHandle, GfxError>
    where
        A: TargetAllocator<Storage = S>,
    {
        let storage = alloc.allocate(kind, width, height)?;
        let handle = TargetHandle(self.slots.len() as u32);
        self.slots.push(Slot {
            kind,
            width,
            height,
            storage: Some(storage),
        });
        log::info!("render target {handle:?}: {kind:?} {width}x{height}");
        Ok(handle)
    }

    fn slot(&self, handle: TargetHandle) -> Result<&Slot<S>, GfxError> {
        self.slots
            .get(handle.index())
            .ok_or(GfxError::InvalidTarget(handle))
    }

    pub fn kind(&self, handle: TargetHandle) -> Result<TargetKind, GfxError> {
        Ok(self.slot(handle)?.kind)
    }

    pub fn size(&self, handle: TargetHandle) -> Result<(u32, u32), GfxError> {
        let slot = self.slot(handle)?;
        Ok((slot.width, slot.height))
    }

    /// Backing storage; fails for unknown handles and for released color targets.
    pub fn get(&self, handle: TargetHandle) -> Result<&S, GfxError> {
        self.slot(handle)?
            .storage
            .as_ref()
            .ok_or(GfxError::InvalidTarget(handle))
    }

    /// Switches the color output (color targets) or the depth output (depth
    /// targets); the other half of the binding is untouched.
    pub fn bind(&mut self, handle: TargetHandle) -> Result<(), GfxError> {
        match self.kind(handle)? {
            TargetKind::HdrColor => self.binding.color = Output::Target(handle),
            TargetKind::Depth => self.binding.depth = Some(Output::Target(handle)),
        }
        Ok(())
    }

    /// Keeps the color output and detaches depth.
    pub fn unbind_depth(&mut self) {
        self.binding.depth = None;
    }

    pub fn binding(&self) -> OutputBinding {
        self.binding
    }

    /// Saves the active binding. Not reentrant: only one level is kept.
    pub fn push_default(&mut self) {
        if self.saved.is_some() {
            log::debug!("push_default overwrote an unrestored binding");
        }
        self.saved = Some(self.binding);
    }

    /// Restores the binding saved by `push_default`.
    pub fn pop_default(&mut self) {
        match self.saved.take() {
            Some(binding) => self.binding = binding,
            None => {
                log::warn!("pop_default without push_default; restoring back buffer");
                self.binding = OutputBinding::default();
            }
        }
    }

    /// Points both outputs back at the back buffer and forgets any saved level.
    pub fn reset_binding(&mut self) {
        self.binding = OutputBinding::default();
        self.saved = None;
    }

    /// Recreates every color target at `width`×`height`. Depth targets keep
    /// their storage and original dimensions.
    pub fn resize<A>(&mut self, alloc: &mut A, width: u32, height: u32) -> Result<(), GfxError>
    where
        A: TargetAllocator<Storage = S>,
    {
        for slot in self.slots.iter_mut().filter(|s| s.kind.is_color()) {
            slot.storage = None;
            slot.storage = Some(alloc.allocate(slot.kind, width, height)?);
            slot.width = width;
            slot.height = height;
        }
        log::debug!("render targets resized to {width}x{height}");
        Ok(())
    }

    /// Drops the storage of every color target; handles stay valid.
    pub fn release(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.kind.is_color()) {
            slot.storage = None;
        }
    }

    pub fn handles(&self) -> impl Iterator<Item = TargetHandle> + '_ {
        (0..self.slots.len() as u32).map(TargetHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct FakeTexture {
        kind: TargetKind,
        width: u32,
        height: u32,
        serial: u32,
    }

    #[derive(Default)]
    struct FakeAllocator {
        serial: u32,
    }

    impl TargetAllocator for FakeAllocator {
        type Storage = FakeTexture;

        fn allocate(&mut self, kind: TargetKind, width: u32, height: u32) -> Result<FakeTexture, GfxError> {
            if width == 0 || height == 0 {
                return Err(GfxError::ResourceCreation("zero extent".into()));
            }
            self.serial += 1;
            Ok(FakeTexture { kind, width, height, serial: self.serial })
        }
    }

    fn registry() -> (RenderTargets<FakeTexture>, FakeAllocator) {
        (RenderTargets::new(), FakeAllocator::default())
    }

    // ── creation ─────────────────────────────────────────────────────────

    #[test]
    fn handles_are_sequential() {
        let (mut rt, mut alloc) = registry();
        let a = rt.create(&mut alloc, TargetKind::HdrColor, 64, 32).unwrap();
        let b = rt.create(&mut alloc, TargetKind::Depth, 64, 32).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(rt.len(), 2);
    }

    #[test]
    fn failed_allocation_creates_no_handle() {
        let (mut rt, mut alloc) = registry();
        assert!(rt.create(&mut alloc, TargetKind::HdrColor, 0, 32).is_err());
        assert!(rt.is_empty());
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let (rt, _) = registry();
        assert!(matches!(rt.get(TargetHandle(3)), Err(GfxError::InvalidTarget(_))));
    }

    // ── resize / release ─────────────────────────────────────────────────

    #[test]
    fn resize_recreates_color_and_keeps_depth() {
        let (mut rt, mut alloc) = registry();
        let color = rt.create(&mut alloc, TargetKind::HdrColor, 640, 480).unwrap();
        let depth = rt.create(&mut alloc, TargetKind::Depth, 640, 480).unwrap();
        let depth_serial = rt.get(depth).unwrap().serial;

        rt.resize(&mut alloc, 800, 600).unwrap();

        let c = rt.get(color).unwrap();
        assert_eq!((c.width, c.height), (800, 600));
        assert_eq!(rt.size(color).unwrap(), (800, 600));

        let d = rt.get(depth).unwrap();
        assert_eq!(d.serial, depth_serial);
        assert_eq!((d.width, d.height), (640, 480));
        assert_eq!(rt.size(depth).unwrap(), (640, 480));
    }

    #[test]
    fn handle_identity_survives_resize() {
        let (mut rt, mut alloc) = registry();
        let handles: Vec<_> = (0..3)
            .map(|_| rt.create(&mut alloc, TargetKind::HdrColor, 8, 8).unwrap())
            .collect();

        rt.resize(&mut alloc, 16, 16).unwrap();

        assert_eq!(rt.handles().collect::<Vec<_>>(), handles);
        for h in handles {
            assert_eq!(rt.get(h).unwrap().kind, TargetKind::HdrColor);
        }
    }

    #[test]
    fn release_drops_only_color_storage() {
        let (mut rt, mut alloc) = registry();
        let color = rt.create(&mut alloc, TargetKind::HdrColor, 8, 8).unwrap();
        let depth = rt.create(&mut alloc, TargetKind::Depth, 8, 8).unwrap();

        rt.release();
        assert!(rt.get(color).is_err());
        assert!(rt.get(depth).is_ok());

        rt.resize(&mut alloc, 4, 4).unwrap();
        assert_eq!(rt.get(color).unwrap().width, 4);
    }

    // ── binding ──────────────────────────────────────────────────────────

    #[test]
    fn color_and_depth_bind_independently() {
        let (mut rt, mut alloc) = registry();
        let color = rt.create(&mut alloc, TargetKind::HdrColor, 8, 8).unwrap();
        let depth = rt.create(&mut alloc, TargetKind::Depth, 8, 8).unwrap();

        rt.bind(color).unwrap();
        assert_eq!(rt.binding().color, Output::Target(color));
        assert_eq!(rt.binding().depth, Some(Output::Backbuffer));

        rt.bind(depth).unwrap();
        assert_eq!(rt.binding().color, Output::Target(color));
        assert_eq!(rt.binding().depth, Some(Output::Target(depth)));

        rt.unbind_depth();
        assert_eq!(rt.binding().color, Output::Target(color));
        assert_eq!(rt.binding().depth, None);
    }

    #[test]
    fn push_pop_restores_saved_binding() {
        let (mut rt, mut alloc) = registry();
        let a = rt.create(&mut alloc, TargetKind::HdrColor, 8, 8).unwrap();

        rt.push_default();
        rt.bind(a).unwrap();
        rt.unbind_depth();
        rt.pop_default();

        assert_eq!(rt.binding(), OutputBinding::default());
    }

    #[test]
    fn second_push_overwrites_saved_level() {
        let (mut rt, mut alloc) = registry();
        let a = rt.create(&mut alloc, TargetKind::HdrColor, 8, 8).unwrap();

        rt.push_default();
        rt.bind(a).unwrap();
        rt.push_default();
        rt.pop_default();

        // The first saved binding (back buffer) is lost.
        assert_eq!(rt.binding().color, Output::Target(a));
    }

    #[test]
    fn unmatched_pop_falls_back_to_back_buffer() {
        let (mut rt, mut alloc) = registry();
        let a = rt.create(&mut alloc, TargetKind::HdrColor, 8, 8).unwrap();
        rt.bind(a).unwrap();
        rt.pop_default();
        assert_eq!(rt.binding(), OutputBinding::default());
    }
}
