// Router assembly.

pub mod admin_router;
pub mod public_router;
pub mod router;

pub use router::create_router;
