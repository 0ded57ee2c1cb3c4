// handlers/mod.rs - Handler tiers
//
// Public (no session) → Protected (session when enabled) → Elevated (admin gate)
pub mod elevated;
pub mod extract;
pub mod protected;
pub mod public;

pub use extract::JsonBody;
