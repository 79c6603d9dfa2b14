//! Deterministic intent classifier for chat messages.
//!
//! Maps a raw message to a closed set of intents with an ordered list of
//! regex rules, first match wins. The classifier is total: it never errors,
//! performs no I/O, and unmatched input always lands on `Intent::General`,
//! which signals "fall through to the structured dispatcher".

use once_cell::sync::Lazy;
use regex::Regex;

/// Known message intents with dedicated resolvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Address/location question about a named client
    ClientAddress,
    /// Projects due today
    ProjectToday,
    /// Lead count over the trailing week
    LeadsThisWeek,
    /// Status of a specific lead
    LeadStatus,
    /// No specific match: defer to dispatcher / LLM tiers
    General,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ClientAddress => "client_address",
            Self::ProjectToday => "project_today",
            Self::LeadsThisWeek => "leads_this_week",
            Self::LeadStatus => "lead_status",
            Self::General => "general",
        };
        write!(f, "{}", s)
    }
}

/// One classification rule: the intent fires when every pattern matches.
struct Rule {
    intent: Intent,
    patterns: Vec<Regex>,
}

fn rule(intent: Intent, patterns: &[&str]) -> Rule {
    Rule {
        intent,
        patterns: patterns
            .iter()
            .map(|p| Regex::new(p).expect("static classifier pattern"))
            .collect(),
    }
}

/// Ordered rule list. Order is part of the contract: the first rule whose
/// patterns all match wins, so more specific rules sit above broader ones.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(
            Intent::ClientAddress,
            &[r"\b(address|location|located|where)\b", r"\bclients?\b"],
        ),
        rule(Intent::ProjectToday, &[r"\b(today|current)\b", r"\bprojects?\b"]),
        rule(
            Intent::LeadsThisWeek,
            &[
                r"\b(how many|count)\b",
                r"\bleads?\b",
                r"\b(this week|past 7 days|last 7 days|past week|last week)\b",
            ],
        ),
        rule(Intent::LeadStatus, &[r"\bstatus\b", r"\bleads?\b"]),
    ]
});

/// Classify a message. Lower-cases and trims first; empty input is General.
pub fn classify(message: &str) -> Intent {
    let m = message.trim().to_lowercase();
    if m.is_empty() {
        return Intent::General;
    }

    for rule in RULES.iter() {
        if rule.patterns.iter().all(|p| p.is_match(&m)) {
            return rule.intent;
        }
    }

    Intent::General
}

/// Words that can trail or precede a name token without being part of it.
const NAME_STOPWORDS: &[&str] = &[
    "the", "a", "an", "my", "our", "this", "that", "of", "for", "is", "was", "what", "whats",
    "where", "address", "location", "located", "named", "called", "please",
];

static NAME_AFTER_CLIENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bclient\s+([a-z][a-z' -]*)").expect("static pattern"));

static NAME_BEFORE_CLIENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z][a-z'-]*)\s+client\b").expect("static pattern"));

/// Best-effort entity-name extraction: `client <name>` first, then the
/// literal word in front of "client" ("abbas client address"). Returns None
/// when nothing plausible is found; callers substitute their own default or
/// escalate.
pub fn extract_entity_name(message: &str) -> Option<String> {
    let m = message.trim().to_lowercase();

    if let Some(caps) = NAME_AFTER_CLIENT.captures(&m) {
        let words: Vec<&str> = caps[1]
            .split_whitespace()
            .take_while(|w| !NAME_STOPWORDS.contains(w))
            .collect();
        if !words.is_empty() {
            return Some(words.join(" "));
        }
    }

    if let Some(caps) = NAME_BEFORE_CLIENT.captures(&m) {
        let word = caps[1].to_string();
        if !NAME_STOPWORDS.contains(&word.as_str()) {
            return Some(word);
        }
    }

    None
}
