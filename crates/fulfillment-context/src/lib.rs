pub mod path;
pub mod store;
pub mod types;

pub use path::SessionPath;
pub use store::ContextStore;
pub use types::{Context, ContextInput, DEFAULT_LIFESPAN};
