//! Structured CRM dispatcher: the keyword-containment tier.
//!
//! A coarser second layer behind the intent classifier. Entity blocks are
//! evaluated in a fixed order (client, project, meeting, lead, then the
//! cross-entity statistics fallback) and the first block that matches a
//! recognized keyword group answers. `Ok(None)` means "no recognized CRM
//! pattern" and tells the controller to move on to the LLM tier — it is not
//! an error, and it is returned even when an entity noun is present without
//! any recognized sub-keyword.

use crate::resolvers::today_bounds;
use crate::store::CrmStore;
use anyhow::Result;
use chrono::Utc;

const COUNT_WORDS: &[&str] = &["how many", "count", "total"];
const LIST_WORDS: &[&str] = &["list", "show", "all"];
const DUE_WORDS: &[&str] = &["due", "today", "upcoming"];
const STATS_WORDS: &[&str] = &["statistics", "summary", "stats"];
const BREAKDOWN_WORDS: &[&str] = &["breakdown", "by status"];

/// Pitch statuses recognized inside the client block.
const CLIENT_STATUSES: &[&str] = &["pending", "to-be-pitched", "closed-won", "lost", "cancelled"];

/// Project statuses recognized inside the project block.
const PROJECT_STATUSES: &[&str] = &["started", "in-progress", "on-hold", "completed"];

/// Lead statuses recognized inside the lead block.
const LEAD_STATUSES: &[&str] = &["new", "contacted", "qualified", "converted", "lost"];

/// List caps. Lists append a "showing first N of M" suffix when truncated.
const CLIENT_LIST_CAP: usize = 10;
const PROJECT_LIST_CAP: usize = 10;
const LEAD_LIST_CAP: usize = 10;
const MEETING_LIST_CAP: usize = 5;
const DUE_TODAY_CAP: usize = 5;

/// Route a CRM-looking message to a structured answer. All store reads are
/// scoped by `user_id`; this is the second enforcement point of the
/// owning-user invariant.
pub async fn dispatch(store: &CrmStore, message: &str, user_id: &str) -> Result<Option<String>> {
    let m = message.trim().to_lowercase();

    if m.contains("client") {
        if let Some(reply) = client_block(store, &m, user_id)? {
            return Ok(Some(reply));
        }
    }

    if m.contains("project") {
        if let Some(reply) = project_block(store, &m, user_id)? {
            return Ok(Some(reply));
        }
    }

    if m.contains("meeting") {
        if let Some(reply) = meeting_block(store, &m, user_id)? {
            return Ok(Some(reply));
        }
    }

    if m.contains("lead") {
        if let Some(reply) = lead_block(store, &m, user_id)? {
            return Ok(Some(reply));
        }
    }

    if contains_any(&m, STATS_WORDS) {
        let stats = store.stats_summary(user_id)?;
        return Ok(Some(format!(
            "CRM summary: {} {}, {} {}, {} {}, {} {}.",
            stats.clients,
            plural(stats.clients, "client"),
            stats.projects,
            plural(stats.projects, "project"),
            stats.meetings,
            plural(stats.meetings, "meeting"),
            stats.leads,
            plural(stats.leads, "lead")
        )));
    }

    Ok(None)
}

fn client_block(store: &CrmStore, m: &str, user_id: &str) -> Result<Option<String>> {
    if let Some(status) = CLIENT_STATUSES.iter().find(|s| m.contains(*s)) {
        let n = store.count_clients_with_status(user_id, status)?;
        return Ok(Some(format!(
            "You have {} {} with status {}.",
            n,
            plural(n, "client"),
            status
        )));
    }

    if contains_any(m, BREAKDOWN_WORDS) {
        let rows = store.clients_status_breakdown(user_id)?;
        if rows.is_empty() {
            return Ok(Some("You have no clients yet.".to_string()));
        }
        return Ok(Some(format!("Clients by status: {}.", render_breakdown(&rows))));
    }

    if contains_any(m, COUNT_WORDS) {
        let n = store.count_clients(user_id)?;
        return Ok(Some(format!("You have {} {}.", n, plural(n, "client"))));
    }

    if contains_any(m, LIST_WORDS) {
        let (clients, total) = store.list_clients(user_id, CLIENT_LIST_CAP)?;
        if clients.is_empty() {
            return Ok(Some("You have no clients yet.".to_string()));
        }
        let names: Vec<&str> = clients.iter().map(|c| c.name.as_str()).collect();
        return Ok(Some(render_list("Your clients", &names, total, CLIENT_LIST_CAP)));
    }

    Ok(None)
}

fn project_block(store: &CrmStore, m: &str, user_id: &str) -> Result<Option<String>> {
    if let Some(status) = PROJECT_STATUSES.iter().find(|s| m.contains(*s)) {
        let n = store.count_projects_with_status(user_id, status)?;
        return Ok(Some(format!(
            "You have {} {} {}.",
            n,
            status,
            plural(n, "project")
        )));
    }

    if contains_any(m, DUE_WORDS) {
        let (start, end) = today_bounds(Utc::now());
        let (projects, total) = store.projects_due_between(user_id, start, end, DUE_TODAY_CAP)?;
        if projects.is_empty() {
            return Ok(Some("You have no projects due today.".to_string()));
        }
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        return Ok(Some(render_list(
            "Projects due today",
            &names,
            total,
            DUE_TODAY_CAP,
        )));
    }

    if contains_any(m, COUNT_WORDS) {
        let n = store.count_projects(user_id)?;
        return Ok(Some(format!("You have {} {}.", n, plural(n, "project"))));
    }

    if contains_any(m, LIST_WORDS) {
        let (projects, total) = store.list_projects(user_id, PROJECT_LIST_CAP)?;
        if projects.is_empty() {
            return Ok(Some("You have no projects yet.".to_string()));
        }
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        return Ok(Some(render_list(
            "Your projects",
            &names,
            total,
            PROJECT_LIST_CAP,
        )));
    }

    Ok(None)
}

fn meeting_block(store: &CrmStore, m: &str, user_id: &str) -> Result<Option<String>> {
    if m.contains("today") {
        let (start, end) = today_bounds(Utc::now());
        let n = store.count_meetings_between(user_id, start, end)?;
        return Ok(Some(format!(
            "You have {} {} today.",
            n,
            plural(n, "meeting")
        )));
    }

    if contains_any(m, DUE_WORDS) || contains_any(m, LIST_WORDS) {
        let (meetings, total) = store.upcoming_meetings(user_id, Utc::now(), MEETING_LIST_CAP)?;
        if meetings.is_empty() {
            return Ok(Some("You have no upcoming meetings.".to_string()));
        }
        let entries: Vec<String> = meetings
            .iter()
            .map(|mt| format!("{} ({})", mt.title, mt.scheduled_at.format("%Y-%m-%d %H:%M")))
            .collect();
        let refs: Vec<&str> = entries.iter().map(|e| e.as_str()).collect();
        return Ok(Some(render_list(
            "Upcoming meetings",
            &refs,
            total,
            MEETING_LIST_CAP,
        )));
    }

    if contains_any(m, COUNT_WORDS) {
        let n = store.count_meetings(user_id)?;
        return Ok(Some(format!("You have {} {}.", n, plural(n, "meeting"))));
    }

    Ok(None)
}

fn lead_block(store: &CrmStore, m: &str, user_id: &str) -> Result<Option<String>> {
    if let Some(status) = LEAD_STATUSES.iter().find(|s| m.contains(*s)) {
        let n = store.count_leads_with_status(user_id, status)?;
        return Ok(Some(format!(
            "You have {} {} {}.",
            n,
            status,
            plural(n, "lead")
        )));
    }

    if contains_any(m, BREAKDOWN_WORDS) {
        let rows = store.leads_status_breakdown(user_id)?;
        if rows.is_empty() {
            return Ok(Some("You have no leads yet.".to_string()));
        }
        return Ok(Some(format!("Leads by status: {}.", render_breakdown(&rows))));
    }

    if contains_any(m, COUNT_WORDS) {
        let n = store.count_leads(user_id)?;
        return Ok(Some(format!("You have {} {}.", n, plural(n, "lead"))));
    }

    if contains_any(m, LIST_WORDS) {
        let (leads, total) = store.list_leads(user_id, LEAD_LIST_CAP)?;
        if leads.is_empty() {
            return Ok(Some("You have no leads yet.".to_string()));
        }
        let entries: Vec<String> = leads
            .iter()
            .map(|l| format!("{} ({})", l.full_name, l.email))
            .collect();
        let refs: Vec<&str> = entries.iter().map(|e| e.as_str()).collect();
        return Ok(Some(render_list("Your leads", &refs, total, LEAD_LIST_CAP)));
    }

    Ok(None)
}

fn contains_any(m: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| m.contains(n))
}

fn plural(n: i64, noun: &str) -> String {
    if n == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    }
}

fn render_breakdown(rows: &[(String, i64)]) -> String {
    rows.iter()
        .map(|(k, n)| format!("{}: {}", k, n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_list(label: &str, items: &[&str], total: i64, cap: usize) -> String {
    let body = items.join(", ");
    if total as usize > cap {
        format!(
            "{}: {} (showing first {} of {}).",
            label,
            body,
            items.len(),
            total
        )
    } else {
        format!("{}: {}.", label, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store() -> CrmStore {
        CrmStore::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn count_clients() {
        let s = store();
        s.insert_client("u1", "Acme", None, "pending").unwrap();
        s.insert_client("u1", "Globex", None, "lost").unwrap();

        let reply = dispatch(&s, "how many clients do I have?", "u1")
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("You have 2 clients."));
    }

    #[tokio::test]
    async fn client_status_count() {
        let s = store();
        s.insert_client("u1", "Acme", None, "pending").unwrap();
        s.insert_client("u1", "Globex", None, "lost").unwrap();

        let reply = dispatch(&s, "pending clients?", "u1").await.unwrap();
        assert_eq!(
            reply.as_deref(),
            Some("You have 1 client with status pending.")
        );
    }

    #[tokio::test]
    async fn list_truncation_suffix() {
        let s = store();
        for i in 0..12 {
            s.insert_client("u1", &format!("Client {:02}", i), None, "pending")
                .unwrap();
        }

        let reply = dispatch(&s, "list my clients", "u1").await.unwrap().unwrap();
        assert!(
            reply.ends_with("(showing first 10 of 12)."),
            "got: {}",
            reply
        );
    }

    #[tokio::test]
    async fn empty_list_has_dedicated_message() {
        let s = store();
        let reply = dispatch(&s, "show all leads", "u1").await.unwrap();
        assert_eq!(reply.as_deref(), Some("You have no leads yet."));
    }

    #[tokio::test]
    async fn projects_due_today() {
        let s = store();
        s.insert_project("u1", "Launch", "started", Some(Utc::now()), None)
            .unwrap();
        s.insert_project("u1", "Later", "started", Some(Utc::now() + Duration::days(3)), None)
            .unwrap();

        let reply = dispatch(&s, "projects due today", "u1").await.unwrap();
        assert_eq!(reply.as_deref(), Some("Projects due today: Launch."));
    }

    #[tokio::test]
    async fn meetings_today_count() {
        let s = store();
        s.insert_meeting("u1", "Standup", Utc::now()).unwrap();

        let reply = dispatch(&s, "meetings today?", "u1").await.unwrap();
        assert_eq!(reply.as_deref(), Some("You have 1 meeting today."));
    }

    #[tokio::test]
    async fn entity_order_client_wins_over_project() {
        let s = store();
        s.insert_client("u1", "Acme", None, "pending").unwrap();

        // Both entity nouns present with a count keyword: client block is
        // evaluated first and answers.
        let reply = dispatch(&s, "how many clients and projects?", "u1")
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("You have 1 client."));
    }

    #[tokio::test]
    async fn entity_noun_without_group_falls_to_next_block() {
        let s = store();
        s.insert_project("u1", "Launch", "completed", None, None).unwrap();

        // "client" matches no client-block group ("completed" is a project
        // status); the project block still gets its chance.
        let reply = dispatch(&s, "client completed projects", "u1")
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("You have 1 completed project."));
    }

    #[tokio::test]
    async fn unrecognized_returns_none() {
        let s = store();
        assert!(dispatch(&s, "client philosophy", "u1").await.unwrap().is_none());
        assert!(dispatch(&s, "tell me a joke", "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn statistics_fallback() {
        let s = store();
        s.insert_client("u1", "Acme", None, "pending").unwrap();
        s.insert_lead("u1", "Ana", "a@x.io", "new", "low", None, "web", Utc::now())
            .unwrap();

        let reply = dispatch(&s, "give me a summary", "u1").await.unwrap();
        assert_eq!(
            reply.as_deref(),
            Some("CRM summary: 1 client, 0 projects, 0 meetings, 1 lead.")
        );
    }

    #[tokio::test]
    async fn client_status_breakdown_mixed_statuses() {
        let s = store();
        s.insert_client("u1", "Acme", None, "pending").unwrap();
        s.insert_client("u1", "Globex", None, "pending").unwrap();
        s.insert_client("u1", "Initech", None, "closed-won").unwrap();

        let reply = dispatch(&s, "clients breakdown", "u1").await.unwrap();
        assert_eq!(
            reply.as_deref(),
            Some("Clients by status: pending: 2, closed-won: 1.")
        );
    }

    #[tokio::test]
    async fn empty_breakdown_has_dedicated_message() {
        let s = store();
        let reply = dispatch(&s, "leads by status", "u1").await.unwrap();
        assert_eq!(reply.as_deref(), Some("You have no leads yet."));
    }

    #[tokio::test]
    async fn upcoming_meetings_truncate_past_the_cap() {
        let s = store();
        let now = Utc::now();
        for i in 1..=7i64 {
            s.insert_meeting("u1", &format!("Sync {}", i), now + Duration::days(i))
                .unwrap();
        }

        let reply = dispatch(&s, "show upcoming meetings", "u1")
            .await
            .unwrap()
            .unwrap();
        assert!(reply.starts_with("Upcoming meetings: Sync 1"), "got: {}", reply);
        assert!(reply.ends_with("(showing first 5 of 7)."), "got: {}", reply);
    }

    #[tokio::test]
    async fn tenancy_is_enforced_per_block() {
        let s = store();
        s.insert_client("u1", "Mine", None, "pending").unwrap();
        s.insert_client("u2", "Theirs", None, "pending").unwrap();

        let reply = dispatch(&s, "list clients", "u1").await.unwrap().unwrap();
        assert!(reply.contains("Mine"));
        assert!(!reply.contains("Theirs"));
    }
}
