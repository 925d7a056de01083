//! Wire types: inbound request shapes and the UI descriptor envelope

pub mod request;
pub mod ui;

pub use request::{BookingDetails, ChatRequest, ConversationContext, Customer};
pub use ui::UiComponent;
