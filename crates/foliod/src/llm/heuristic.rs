//! Static heuristic replies: the floor of the fallback chain.
//!
//! Pure keyword matching over the message, no I/O, cannot fail. Also used
//! by the cascade controller to degrade store failures into a helpful
//! answer instead of an error.

const GREETINGS: &[&str] = &["hello", "hi", "hey", "good morning", "good afternoon", "good evening"];

pub fn canned_reply(message: &str) -> String {
    let m = message.trim().to_lowercase();

    if GREETINGS.iter().any(|g| m == *g || m.starts_with(&format!("{} ", g))) {
        return "Hello! I can answer questions about your clients, projects, meetings, and leads."
            .to_string();
    }

    if m.contains("help") || m.contains("what can you do") {
        return "I can answer CRM questions like \"how many clients do I have\", \"what is \
                <name> client address\", \"projects due today\", or \"how many leads this week\"."
            .to_string();
    }

    if m.contains("client") {
        return "I can look up your clients. Try \"list my clients\" or \"what is <name> client \
                address\"."
            .to_string();
    }

    if m.contains("project") {
        return "I can check your projects. Try \"projects due today\" or \"how many projects\"."
            .to_string();
    }

    if m.contains("meeting") {
        return "I can check your schedule. Try \"meetings today\" or \"upcoming meetings\"."
            .to_string();
    }

    if m.contains("lead") {
        return "I can check your leads. Try \"how many leads this week\" or \"status of lead \
                <name or email>\"."
            .to_string();
    }

    format!(
        "I'm here to help with your CRM data, but I couldn't find an answer for \"{}\". Try \
         asking about clients, projects, meetings, or leads.",
        message.trim()
    )
}
