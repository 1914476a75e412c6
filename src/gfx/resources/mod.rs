//! GPU resource lifetime management
//!
//! Every GPU-backed object in the engine (buffers, textures, shader programs)
//! remembers the context version it was last created for. When the renderer
//! bumps the version after a context loss, each resource notices on its next use
//! and rebuilds itself from the CPU-side data it kept. No central invalidation
//! pass is needed.

pub mod registry;
pub mod versioned;

pub use registry::{Registry, DYNAMIC_ID_BASE};
pub use versioned::{GpuContext, VersionStamp, VersionedResource};
