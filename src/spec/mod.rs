mod parameter;
mod schema;
mod types;

pub use parameter::*;
pub use schema::*;
pub use types::*;
