//! Response value objects and their per-format rendering.
//!
//! Every response kind (text, card, image, suggestion chips, raw payload)
//! renders itself into either webhook format for a target platform. Items
//! pinned to one platform render to `None` for every other platform, which is
//! how platform-specific responses drop out of the output.

pub mod card;
mod fields;
pub mod image;
pub mod item;
pub mod payload;
pub mod suggestion;
pub mod text;

pub use card::{Button, Card, CardOptions};
pub use image::{Image, ImageOptions, DEFAULT_ACCESSIBILITY_TEXT};
pub use item::{ResponseItem, RichResponse};
pub use payload::Payload;
pub use suggestion::Suggestion;
pub use text::{Text, TextOptions};
