//! Intent resolvers: one deterministic answer generator per specific intent.
//!
//! Each resolver reads the store (always scoped to the requesting user) and
//! renders a fixed-format natural-language answer. "Not found" is a designed
//! terminal answer, not an error; only unexpected store failures propagate,
//! and the cascade controller degrades those to the heuristic tier.

use crate::store::CrmStore;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Fixed answer when no project is due today.
pub const NO_PROJECTS_TODAY: &str = "No projects due today.";

/// Fixed answer when the trailing week has no leads.
pub const NO_LEADS_THIS_WEEK: &str = "No leads in the last 7 days.";

/// Address question about a named client. Exact-name semantics: the lookup
/// is anchored equality, so a client named "Abbas Ali" never answers a
/// query for "Abbas".
pub async fn resolve_client_address(store: &CrmStore, name: &str, user_id: &str) -> Result<String> {
    let name = name.trim();

    let Some(client) = store.find_client_by_exact_name(user_id, name)? else {
        return Ok(format!("No client found matching \"{}\".", name));
    };

    Ok(match client.address {
        Some(address) => format!("{}'s address is {}.", client.name, address),
        None => format!("{} has no address on file.", client.name),
    })
}

/// First project due today, enriched with the owning client's name when
/// that lookup succeeds. Enrichment absence (no client attached, or the
/// lookup itself failing) is not a failure.
pub async fn resolve_project_today(store: &CrmStore, user_id: &str) -> Result<String> {
    let (start, end) = today_bounds(Utc::now());

    let Some(project) = store.first_project_due_between(user_id, start, end)? else {
        return Ok(NO_PROJECTS_TODAY.to_string());
    };

    let client_name = project.client_id.as_deref().and_then(|cid| {
        store
            .client_name_by_id(user_id, cid)
            .map_err(|e| debug!("Client-name enrichment failed: {}", e))
            .ok()
            .flatten()
    });

    Ok(match client_name {
        Some(client) => format!("Project due today: {} (client: {}).", project.name, client),
        None => format!("Project due today: {}.", project.name),
    })
}

/// Lead count over the trailing 7-day window, broken down by source in
/// descending count order. Output format is load-bearing:
/// `Leads last 7 days: N. By source: src: n, src: n.`
pub async fn resolve_leads_this_week(store: &CrmStore, user_id: &str) -> Result<String> {
    let cutoff = Utc::now() - Duration::days(7);
    let by_source = store.leads_by_source_since(user_id, cutoff)?;

    let total: i64 = by_source.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Ok(NO_LEADS_THIS_WEEK.to_string());
    }

    let parts: Vec<String> = by_source
        .iter()
        .map(|(source, n)| format!("{}: {}", source, n))
        .collect();

    Ok(format!(
        "Leads last 7 days: {}. By source: {}.",
        total,
        parts.join(", ")
    ))
}

static EMAIL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").expect("static pattern"));

static NAME_AFTER_LEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:lead|for|of)\s+([a-z][a-z' -]*)").expect("static pattern"));

const LEAD_STOPWORDS: &[&str] = &[
    "the", "a", "an", "my", "status", "lead", "leads", "named", "called", "with", "email", "name",
    "for", "of", "is", "what",
];

/// Status question about a specific lead: exact case-insensitive email
/// match first, then case-insensitive substring match on the full name.
pub async fn resolve_lead_status(store: &CrmStore, message: &str, user_id: &str) -> Result<String> {
    let m = message.trim().to_lowercase();
    let identifier = extract_lead_identifier(&m);

    let lead = match &identifier {
        Some(id) if id.contains('@') => store.find_lead_by_email(user_id, id)?,
        Some(id) => store.find_lead_by_name_substring(user_id, id)?,
        None => None,
    };

    let echo = identifier.unwrap_or_else(|| m.clone());
    let Some(lead) = lead else {
        return Ok(format!("No lead found for \"{}\".", echo));
    };

    let owner = lead.owner.as_deref().unwrap_or("unassigned");
    Ok(format!(
        "Lead {}: status {}, priority {}, owner {}.",
        lead.full_name, lead.status, lead.priority, owner
    ))
}

/// Pull a lead identifier out of a status question: an email token wins,
/// otherwise the name words following "lead"/"for"/"of".
fn extract_lead_identifier(message: &str) -> Option<String> {
    if let Some(m) = EMAIL_TOKEN.find(message) {
        return Some(m.as_str().to_string());
    }

    // The capture can start with more filler ("of lead jane" captures
    // "lead jane"); skip leading stopwords, then take the name run.
    if let Some(caps) = NAME_AFTER_LEAD.captures(message) {
        let words: Vec<&str> = caps[1]
            .split_whitespace()
            .skip_while(|w| LEAD_STOPWORDS.contains(w))
            .take_while(|w| !LEAD_STOPWORDS.contains(w))
            .collect();
        if !words.is_empty() {
            return Some(words.join(" "));
        }
    }

    None
}

/// Inclusive [start-of-day, end-of-day] bounds around `now`. The end bound
/// is the last representable instant before the next midnight, so due dates
/// with sub-second precision anywhere inside the day still count as today.
pub(crate) fn today_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc();
    let end = start + Duration::days(1) - Duration::nanoseconds(1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CrmStore {
        CrmStore::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn client_address_found() {
        let s = store();
        s.insert_client("u1", "Abbas", Some("123 Street"), "pending")
            .unwrap();

        let reply = resolve_client_address(&s, "abbas", "u1").await.unwrap();
        assert!(reply.contains("123 Street"), "got: {}", reply);
    }

    #[tokio::test]
    async fn client_exact_match_does_not_widen() {
        let s = store();
        s.insert_client("u1", "Abbas Ali", Some("42 Harbor Rd"), "pending")
            .unwrap();

        let reply = resolve_client_address(&s, "Abbas", "u1").await.unwrap();
        assert_eq!(reply, "No client found matching \"Abbas\".");
    }

    #[tokio::test]
    async fn client_without_address_on_file() {
        let s = store();
        s.insert_client("u1", "Acme", None, "pending").unwrap();

        let reply = resolve_client_address(&s, "Acme", "u1").await.unwrap();
        assert_eq!(reply, "Acme has no address on file.");
    }

    #[tokio::test]
    async fn project_today_with_client_enrichment() {
        let s = store();
        let client_id = s.insert_client("u1", "Acme", None, "pending").unwrap();
        s.insert_project("u1", "Launch", "started", Some(Utc::now()), Some(&client_id))
            .unwrap();

        let reply = resolve_project_today(&s, "u1").await.unwrap();
        assert_eq!(reply, "Project due today: Launch (client: Acme).");
    }

    #[tokio::test]
    async fn project_today_none_due() {
        let s = store();
        s.insert_project("u1", "Later", "started", Some(Utc::now() + Duration::days(2)), None)
            .unwrap();

        let reply = resolve_project_today(&s, "u1").await.unwrap();
        assert_eq!(reply, NO_PROJECTS_TODAY);
    }

    #[tokio::test]
    async fn project_enrichment_absence_is_not_failure() {
        let s = store();
        // client_id points nowhere; the answer must still render.
        s.insert_project("u1", "Solo", "started", Some(Utc::now()), Some("ghost"))
            .unwrap();

        let reply = resolve_project_today(&s, "u1").await.unwrap();
        assert_eq!(reply, "Project due today: Solo.");
    }

    #[tokio::test]
    async fn leads_week_window_and_format() {
        let s = store();
        let now = Utc::now();
        s.insert_lead("u1", "Ana", "ana@x.io", "new", "high", None, "referral", now - Duration::days(1))
            .unwrap();
        s.insert_lead("u1", "Old", "old@x.io", "new", "low", None, "web", now - Duration::days(10))
            .unwrap();

        let reply = resolve_leads_this_week(&s, "u1").await.unwrap();
        assert_eq!(reply, "Leads last 7 days: 1. By source: referral: 1.");
    }

    #[tokio::test]
    async fn leads_week_descending_by_source() {
        let s = store();
        let now = Utc::now();
        for (name, email, source) in [
            ("A", "a@x.io", "web"),
            ("B", "b@x.io", "web"),
            ("C", "c@x.io", "referral"),
        ] {
            s.insert_lead("u1", name, email, "new", "low", None, source, now - Duration::days(1))
                .unwrap();
        }

        let reply = resolve_leads_this_week(&s, "u1").await.unwrap();
        assert_eq!(reply, "Leads last 7 days: 3. By source: web: 2, referral: 1.");
    }

    #[tokio::test]
    async fn leads_week_empty() {
        let s = store();
        let reply = resolve_leads_this_week(&s, "u1").await.unwrap();
        assert_eq!(reply, NO_LEADS_THIS_WEEK);
    }

    #[tokio::test]
    async fn lead_status_by_email() {
        let s = store();
        s.insert_lead("u1", "Jane Roe", "jane@x.io", "qualified", "high", Some("sam"), "web", Utc::now())
            .unwrap();

        let reply = resolve_lead_status(&s, "status of lead JANE@x.io", "u1")
            .await
            .unwrap();
        assert_eq!(reply, "Lead Jane Roe: status qualified, priority high, owner sam.");
    }

    #[tokio::test]
    async fn lead_status_by_name_substring_and_unassigned() {
        let s = store();
        s.insert_lead("u1", "Jane Roe", "jane@x.io", "new", "medium", None, "web", Utc::now())
            .unwrap();

        let reply = resolve_lead_status(&s, "what is the status of lead jane", "u1")
            .await
            .unwrap();
        assert_eq!(reply, "Lead Jane Roe: status new, priority medium, owner unassigned.");
    }

    #[tokio::test]
    async fn lead_status_not_found_echoes_identifier() {
        let s = store();
        let reply = resolve_lead_status(&s, "status of lead nobody@x.io", "u1")
            .await
            .unwrap();
        assert_eq!(reply, "No lead found for \"nobody@x.io\".");
    }

    #[test]
    fn today_bounds_cover_the_whole_day() {
        let now = Utc::now();
        let (start, end) = today_bounds(now);
        assert!(start <= now && now <= end);
        assert!(end < start + Duration::days(1));

        // A due date in the fractional tail of the last second is today.
        let late = start + Duration::days(1) - Duration::milliseconds(1);
        assert!(late <= end);
    }
}
