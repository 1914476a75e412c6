use crate::error::Result;
use crate::gfx::backend::GraphicsBackend;
use crate::gfx::texture::AssetLoader;

/// Everything a resource needs to (re)create itself on the GPU
pub struct GpuContext<'a> {
    pub backend: &'a mut dyn GraphicsBackend,
    pub assets: &'a dyn AssetLoader,
    /// Current context version
    pub version: u64,
}

impl<'a> GpuContext<'a> {
    pub fn new(backend: &'a mut dyn GraphicsBackend, assets: &'a dyn AssetLoader, version: u64) -> Self {
        Self {
            backend,
            assets,
            version,
        }
    }

    /// Shorter-lived reborrow, for handing the context down a call chain
    pub fn reborrow(&mut self) -> GpuContext<'_> {
        GpuContext {
            backend: &mut *self.backend,
            assets: self.assets,
            version: self.version,
        }
    }
}

/// The context version a resource was last synced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionStamp(Option<u64>);

impl VersionStamp {
    /// Never synced; the first [`VersionedResource::ensure_current`] always recreates
    pub const fn unsynced() -> Self {
        Self(None)
    }

    pub fn is_current(&self, version: u64) -> bool {
        self.0 == Some(version)
    }

    pub fn mark(&mut self, version: u64) {
        self.0 = Some(version);
    }

    pub fn invalidate(&mut self) {
        self.0 = None;
    }

    pub fn version(&self) -> Option<u64> {
        self.0
    }
}

/// A GPU object that can rebuild itself for a new context version.
///
/// The handle a resource holds is only valid while its stamp equals the current
/// context version. Implementors provide [`recreate`](Self::recreate); callers go
/// through [`ensure_current`](Self::ensure_current).
pub trait VersionedResource {
    fn stamp(&self) -> VersionStamp;

    fn stamp_mut(&mut self) -> &mut VersionStamp;

    /// Creates the GPU object from scratch for `gpu.version`
    fn recreate(&mut self, gpu: &mut GpuContext<'_>) -> Result<()>;

    /// Recreates the resource if its stamp is stale.
    ///
    /// Returns `Ok(true)` when a recreation happened. The stamp is only advanced
    /// when [`recreate`](Self::recreate) succeeds.
    fn ensure_current(&mut self, gpu: &mut GpuContext<'_>) -> Result<bool> {
        if self.stamp().is_current(gpu.version) {
            return Ok(false);
        }
        self.recreate(gpu)?;
        self.stamp_mut().mark(gpu.version);
        Ok(true)
    }
}
