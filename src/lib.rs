/// Use mimalloc as the global allocator.
/// uniq allocates a key buffer and a pending-line buffer per run; mimalloc's
/// thread-local caching keeps those small allocations cheap.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod uniq;
