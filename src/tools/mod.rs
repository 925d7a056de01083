//! The fixed tool catalog: one tool per booking step, dispatched over a
//! closed enum. Each tool declares an introspectable parameter schema and a
//! deterministic execute function; execution is all-or-nothing and never
//! checks the current step itself.

pub mod booking;
pub mod browse;
pub mod params;
pub mod payment;
pub mod validation;

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::config::PricingConfig;
use crate::core::booking::{BookingStep, SelectionDelta};
use crate::core::conversation::ConversationRecord;
use crate::error::{AgentError, Result};
use crate::pricing::PricingResult;
use crate::types::ui::UiComponent;

/// The closed set of booking tools, in step order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ShowCategories,
    SelectCategory,
    SelectHotel,
    SelectTimingAndDuration,
    SelectExtras,
    InitiatePayment,
    CompleteBooking,
}

impl ToolName {
    pub const ALL: &'static [ToolName] = &[
        ToolName::ShowCategories,
        ToolName::SelectCategory,
        ToolName::SelectHotel,
        ToolName::SelectTimingAndDuration,
        ToolName::SelectExtras,
        ToolName::InitiatePayment,
        ToolName::CompleteBooking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ShowCategories => "showCategories",
            ToolName::SelectCategory => "selectCategory",
            ToolName::SelectHotel => "selectHotel",
            ToolName::SelectTimingAndDuration => "selectTimingAndDuration",
            ToolName::SelectExtras => "selectExtras",
            ToolName::InitiatePayment => "initiatePayment",
            ToolName::CompleteBooking => "completeBooking",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::ShowCategories => {
                "Show the available stopover hotel categories to the customer"
            }
            ToolName::SelectCategory => "Record the customer's hotel category and show its hotels",
            ToolName::SelectHotel => {
                "Record the chosen hotel and show stopover timing and duration options"
            }
            ToolName::SelectTimingAndDuration => {
                "Record whether the stopover is on the outbound or return leg and for how many nights (1-4)"
            }
            ToolName::SelectExtras => {
                "Record transfers and tour choices and compute the authoritative price"
            }
            ToolName::InitiatePayment => {
                "Start payment with the chosen method; does not move money"
            }
            ToolName::CompleteBooking => {
                "Finalize the booking once payment is confirmed and issue the new reference"
            }
        }
    }

    /// The binding parameter contract for what the model may send. Draft-7,
    /// introspectable: required fields, primitive types, enum constraints,
    /// numeric bounds.
    pub fn parameters_schema(&self) -> Value {
        match self {
            ToolName::ShowCategories => json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
            ToolName::SelectCategory => json!({
                "type": "object",
                "properties": {
                    "categoryId": {"type": "string", "minLength": 1},
                    "categoryName": {"type": "string", "minLength": 1}
                },
                "required": ["categoryId", "categoryName"]
            }),
            ToolName::SelectHotel => json!({
                "type": "object",
                "properties": {
                    "hotelId": {"type": "string", "minLength": 1},
                    "hotelName": {"type": "string", "minLength": 1}
                },
                "required": ["hotelId", "hotelName"]
            }),
            ToolName::SelectTimingAndDuration => json!({
                "type": "object",
                "properties": {
                    "timing": {"type": "string", "enum": ["outbound", "return"]},
                    "duration": {"type": "integer", "minimum": 1, "maximum": 4}
                },
                "required": ["timing", "duration"]
            }),
            ToolName::SelectExtras => json!({
                "type": "object",
                "properties": {
                    "includeTransfers": {"type": "boolean"},
                    "selectedTours": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "tourId": {"type": "string", "minLength": 1},
                                "tourName": {"type": "string"},
                                "quantity": {"type": "integer", "minimum": 0},
                                "totalPrice": {"type": "integer", "minimum": 0}
                            },
                            "required": ["tourId", "quantity", "totalPrice"]
                        }
                    },
                    "totalExtrasPrice": {"type": "integer", "minimum": 0}
                },
                "required": ["includeTransfers", "selectedTours", "totalExtrasPrice"]
            }),
            ToolName::InitiatePayment => json!({
                "type": "object",
                "properties": {
                    "paymentMethod": {"type": "string", "enum": ["credit-card", "avios"]},
                    "totalAmount": {"type": "integer", "minimum": 0}
                },
                "required": ["paymentMethod", "totalAmount"]
            }),
            ToolName::CompleteBooking => json!({
                "type": "object",
                "properties": {
                    "paymentData": {
                        "type": "object",
                        "properties": {
                            "method": {"type": "string"},
                            "confirmed": {"type": "boolean"}
                        },
                        "required": ["method", "confirmed"]
                    }
                },
                "required": ["paymentData"]
            }),
        }
    }

    /// Serialize for OpenAI-style function calling
    pub fn to_openai_tool(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.as_str(),
                "description": self.description(),
                "parameters": self.parameters_schema()
            }
        })
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        ToolName::ALL
            .iter()
            .copied()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| AgentError::ToolNotFound(s.to_string()))
    }
}

/// A tool call as received from the model
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    /// Parse from OpenAI tool-call wire format; arguments arrive as a JSON
    /// string that must itself parse.
    pub fn from_wire(tool_call: &Value) -> Result<Self> {
        let id = tool_call
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let function = tool_call
            .get("function")
            .ok_or_else(|| AgentError::InvalidFunctionCall("tool call missing function".into()))?;
        let name = function
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                AgentError::InvalidFunctionCall("tool call missing function name".into())
            })?
            .to_string();
        let arguments_str = function
            .get("arguments")
            .and_then(Value::as_str)
            .unwrap_or("{}");
        let arguments: Value = serde_json::from_str(arguments_str).map_err(|err| {
            AgentError::InvalidFunctionCall(format!("arguments for `{name}` are not JSON: {err}"))
        })?;

        Ok(Self { id, name, arguments })
    }
}

/// Result envelope every tool execution returns. `message` and
/// `ui_component` are the presentation contract; `selection_delta` and
/// `next_step` are merged into the conversation record by the orchestrator.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub success: bool,
    pub message: String,
    pub ui_component: UiComponent,
    pub selection_delta: Option<SelectionDelta>,
    pub next_step: Option<BookingStep>,
    pub pricing: Option<PricingResult>,
}

impl ToolOutcome {
    /// The payload appended to the message trace as the tool result
    pub fn trace_payload(&self) -> Value {
        json!({
            "success": self.success,
            "message": self.message,
            "uiComponent": self.ui_component,
        })
    }
}

/// Dispatch table over the closed tool enum. Holds the pricing constants so
/// execution needs no ambient state.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    pricing: PricingConfig,
}

impl ToolRegistry {
    pub fn new(pricing: PricingConfig) -> Self {
        Self { pricing }
    }

    /// OpenAI tool definitions for the tools exposed at this step
    pub fn definitions_for(&self, step: BookingStep) -> Vec<Value> {
        step.available_tools()
            .iter()
            .map(ToolName::to_openai_tool)
            .collect()
    }

    /// Validate raw arguments against the tool's declared schema
    pub fn validate(&self, tool: ToolName, arguments: &Value) -> Result<()> {
        validation::validate_arguments(tool.as_str(), &tool.parameters_schema(), arguments)
    }

    /// Validate, parse, and execute. All-or-nothing: any failure returns an
    /// error and produces no selection delta.
    pub fn execute(
        &self,
        tool: ToolName,
        arguments: Value,
        record: &ConversationRecord,
    ) -> Result<ToolOutcome> {
        self.validate(tool, &arguments)?;

        match tool {
            ToolName::ShowCategories => Ok(browse::show_categories()),
            ToolName::SelectCategory => {
                browse::select_category(validation::parse_arguments(tool.as_str(), arguments)?)
            }
            ToolName::SelectHotel => browse::select_hotel(
                validation::parse_arguments(tool.as_str(), arguments)?,
                record,
            ),
            ToolName::SelectTimingAndDuration => Ok(booking::select_timing_and_duration(
                validation::parse_arguments(tool.as_str(), arguments)?,
                &self.pricing,
            )),
            ToolName::SelectExtras => booking::select_extras(
                validation::parse_arguments(tool.as_str(), arguments)?,
                record,
                &self.pricing,
            ),
            ToolName::InitiatePayment => Ok(payment::initiate_payment(
                validation::parse_arguments(tool.as_str(), arguments)?,
            )),
            ToolName::CompleteBooking => payment::complete_booking(
                validation::parse_arguments(tool.as_str(), arguments)?,
                record,
                &self.pricing,
            ),
        }
    }
}
