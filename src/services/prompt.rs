//! System prompt construction. The prompt names the currently-available
//! tools explicitly so the model is steered along the step machine instead
//! of calling arbitrary tools.

use std::fmt::Write as _;

use crate::core::conversation::ConversationRecord;

pub fn build_system_prompt(record: &ConversationRecord) -> String {
    let customer_name = record
        .context
        .customer
        .as_ref()
        .and_then(|c| c.name.as_deref())
        .unwrap_or("the customer");
    let booking = record.context.booking.clone().unwrap_or_default();
    let reference = booking.reference.as_deref().unwrap_or("unknown");
    let origin = booking.origin.as_deref().unwrap_or("unknown");
    let destination = booking.destination.as_deref().unwrap_or("unknown");

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are a stopover booking assistant helping {customer_name} add a Doha stopover to \
         an existing itinerary (booking reference {reference}, route {origin} to {destination})."
    );
    let _ = writeln!(
        prompt,
        "The booking currently sits at the `{}` step.",
        record.current_step
    );

    let available = record.current_step.available_tools();
    if available.is_empty() {
        let _ = writeln!(
            prompt,
            "The booking is complete. No tools are available; answer follow-up questions \
             conversationally and suggest starting a new conversation for another booking."
        );
    } else {
        let _ = writeln!(
            prompt,
            "To move the booking forward you MUST use exactly these tools, never any other:"
        );
        for tool in available {
            let _ = writeln!(prompt, "- `{}`: {}", tool.as_str(), tool.description());
        }
        let _ = writeln!(
            prompt,
            "Call a tool as soon as the customer has given you what it needs; do not invent \
             prices or availability yourself, the tools are authoritative. Keep replies short \
             and friendly."
        );
    }

    if let Some(category) = &record.selection.category_name {
        let _ = writeln!(prompt, "Selected category: {category}.");
    }
    if let Some(hotel) = &record.selection.hotel_name {
        let _ = writeln!(prompt, "Selected hotel: {hotel}.");
    }
    if let (Some(timing), Some(duration)) =
        (record.selection.timing, record.selection.duration)
    {
        let _ = writeln!(
            prompt,
            "Stopover: {} leg, {duration} night(s).",
            timing.as_str()
        );
    }

    prompt
}
