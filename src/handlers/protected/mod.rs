// handlers/protected/mod.rs - Session required when sessions are enabled
pub mod users;

pub use users::show_users;
