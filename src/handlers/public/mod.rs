// handlers/public/mod.rs - No session required
pub mod health;
pub mod session;

pub use health::health;
pub use session::{login, logout};
