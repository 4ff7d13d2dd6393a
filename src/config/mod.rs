pub mod types;
pub mod scalar;
pub mod loader;
pub mod validator;
pub mod resolved;

pub use types::*;
pub use scalar::*;
pub use loader::*;
pub use validator::*;
pub use resolved::*;
