pub mod email;
pub mod jwt;
pub mod password;

pub use email::validate_email;
pub use jwt::*;
pub use password::*;
