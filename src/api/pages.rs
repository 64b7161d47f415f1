//! Server-rendered chat page

use crate::conversation::{ConversationSnapshot, Role};
use crate::orchestrator::SubmitError;
use std::fmt::Write;

/// Render the full conversation page.
///
/// While a reply is outstanding the input is disabled and the page refreshes
/// itself until the reply lands.
pub fn render_conversation(id: &str, conversation: &ConversationSnapshot, failed: bool) -> String {
    let mut html = String::new();
    let id = escape_html(id);

    html.push_str("<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if conversation.awaiting_response {
        let _ = writeln!(html, "<meta http-equiv=\"refresh\" content=\"2;url=/c/{id}\">");
    }
    html.push_str("<title>Travel Concierge</title>\n");
    html.push_str("<link rel=\"stylesheet\" href=\"/assets/style.css\">\n</head>\n<body>\n");
    html.push_str("<main class=\"chat\">\n<section class=\"history\">\n");

    for message in &conversation.messages {
        // The persona prompt never reaches the browser
        if message.role() == Role::System {
            continue;
        }
        let _ = writeln!(
            html,
            "<div class=\"message {}\">{}</div>",
            message.role(),
            escape_html(message.content())
        );
    }
    html.push_str("</section>\n");

    // Generic failure text; error details stay in the logs
    if failed && !conversation.awaiting_response {
        let _ = writeln!(html, "<p class=\"notice\">{}</p>", SubmitError::Failed);
    }
    if conversation.awaiting_response {
        html.push_str("<p class=\"waiting\">…</p>\n");
    }

    let disabled = if conversation.awaiting_response {
        " disabled"
    } else {
        ""
    };
    let _ = writeln!(
        html,
        "<form class=\"input\" method=\"post\" action=\"/c/{id}/chat\">\n\
         <input type=\"text\" name=\"text\" placeholder=\"Type your message here...\" autocomplete=\"off\" autofocus{disabled}>\n\
         <button type=\"submit\"{disabled}>Send</button>\n\
         </form>"
    );
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// Escape text for an HTML element body or quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
