pub mod methods;
pub mod resource;
pub mod types;

pub use methods::*;
pub use resource::{ClientIndex, ClientResource, Resource};
pub use types::*;
