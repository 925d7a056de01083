//! Booking conversation orchestrator for the Doha stopover programme.
//!
//! The crate wires an LLM tool-calling loop around a fixed set of booking
//! tools: the model drives the conversation, each booking step exposes
//! exactly one tool, and tool results are merged into a per-conversation
//! record held by [`store::ConversationStore`]. Model calls go through a
//! fallback chain ([`services::FallbackController`]) so a rate-limited or
//! unreachable provider degrades to the next model instead of failing the
//! turn. Pricing is a pure function over the committed selection
//! ([`pricing::compute_pricing`]).
//!
//! With the `server` feature (on by default) the crate also ships an axum
//! HTTP surface streaming assistant text from `POST /api/chat`.

pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod pricing;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
pub mod store;
pub mod tools;
pub mod types;

pub use crate::config::{AgentConfig, PricingConfig};
pub use crate::core::booking::{BookingSelection, BookingStep, SelectionDelta};
pub use crate::error::{AgentError, FieldError, Result};
pub use crate::pricing::{compute_pricing, PricingResult};
pub use crate::services::{ChatModel, FallbackController, HttpModelClient, Orchestrator};
pub use crate::store::ConversationStore;
pub use crate::tools::{ToolName, ToolRegistry};
pub use crate::types::request::{ChatRequest, ConversationContext};
