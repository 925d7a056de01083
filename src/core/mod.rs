//! Core booking domain: the step machine, the accumulated selection, and the
//! per-conversation record.

pub mod booking;
pub mod conversation;

pub use booking::{BookingSelection, BookingStep, SelectionDelta, Timing, TourLine};
pub use conversation::{ChatMessage, ConversationRecord, Role};
