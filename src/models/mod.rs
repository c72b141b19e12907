pub mod advertisement;
pub mod ai;
pub mod category;
pub mod common;
pub mod subscription;
pub mod user;

pub use advertisement::*;
pub use ai::*;
pub use category::*;
pub use common::*;
pub use subscription::*;
pub use user::*;
