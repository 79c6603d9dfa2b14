//! folioctl subcommand implementations.

use anyhow::{Context, Result};
use folio_shared::{ChatReply, ChatRequest, HealthResponse};
use owo_colors::OwoColorize;

pub async fn chat(addr: &str, message: &str, user: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/v1/chat", addr))
        .header("x-folio-user", user)
        .json(&ChatRequest {
            message: message.to_string(),
        })
        .send()
        .await
        .context("Failed to reach foliod - is the daemon running?")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("foliod returned {}: {}", status, body);
    }

    let reply: ChatReply = response
        .json()
        .await
        .context("Failed to parse chat reply")?;

    println!("{} {}", "folio:".cyan().bold(), reply.reply);
    Ok(())
}

pub async fn health(addr: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let health: HealthResponse = client
        .get(format!("{}/v1/health", addr))
        .send()
        .await
        .context("Failed to reach foliod - is the daemon running?")?
        .json()
        .await
        .context("Failed to parse health response")?;

    println!(
        "{} {} (v{}, up {}s)",
        "status:".cyan().bold(),
        health.status.green(),
        health.version,
        health.uptime_seconds
    );
    Ok(())
}
