pub mod config;
pub mod error;
pub mod event;
pub mod platform;

pub use error::{FulfillmentError, Result};
pub use event::{Dialect, FollowupEvent};
pub use platform::PlatformId;
