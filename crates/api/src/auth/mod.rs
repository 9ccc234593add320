pub mod accounts;
pub mod config;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod session;

pub use config::AuthConfig;
pub use jwt::{Claims, JwtService};
pub use permissions::{capabilities, Capability};
pub use session::Session;
