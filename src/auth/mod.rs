pub mod authenticator;
pub mod gate;
pub mod password;
pub mod session;

pub use authenticator::{AuthResult, Authenticator};
pub use gate::AdminGate;
pub use password::{HashError, PasswordHasher};
pub use session::{Claims, IssuedSession, SessionError, SessionIssuer, SESSION_COOKIE};
