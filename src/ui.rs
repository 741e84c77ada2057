// UI layer: prompts with `dialoguer`, spinners with `indicatif` and plain
// `println!` output for each workflow stage. All remote work is delegated
// to `workflow::Session`.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{ContentInfo, RetrievalStatus};
use crate::poll::{PollEvent, PollOutcome, Sleeper};
use crate::preview::MAX_PREVIEW_CHARS;
use crate::workflow::{RetrievalParams, Session, DEFAULT_TARGET_URL};

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

pub fn print_banner() {
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║          ViewEngine REST API Demo                        ║");
    println!("║  Demonstrates using the MCP endpoints with an API key    ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();
}

pub fn print_usage() {
    println!("❌ Error: API key is required");
    println!();
    println!("Usage:");
    println!("  viewengine-cli <api-key>");
    println!("  OR");
    println!("  viewengine-cli   (you'll be prompted for the API key)");
}

/// Ask for the API key without echoing it. An empty answer is returned
/// as-is so the caller can print the usage message.
pub fn prompt_api_key() -> Result<String> {
    let key = Password::new()
        .with_prompt("Enter your API key")
        .allow_empty_password(true)
        .interact()?;
    Ok(key)
}

/// Collect the target URL, refresh flag and processing mode.
pub fn prompt_params() -> Result<RetrievalParams> {
    let url: String = Input::new()
        .with_prompt(format!(
            "Enter a URL to retrieve (or press Enter for {DEFAULT_TARGET_URL})"
        ))
        .allow_empty(true)
        .interact_text()?;
    println!();
    let force: String = Input::new()
        .with_prompt("Force fresh retrieval? (y/n, default: n - use cache if available)")
        .allow_empty(true)
        .interact_text()?;
    println!();
    let mode: String = Input::new()
        .with_prompt("Processing mode (private/community, default: private)")
        .allow_empty(true)
        .interact_text()?;
    Ok(RetrievalParams::from_answers(&url, &force, &mode))
}

/// Run every stage in order, printing as we go. Stage failures are
/// reported and end the run early; only prompt I/O errors propagate.
pub async fn run_demo<Z: Sleeper>(session: &Session<Z>) -> Result<()> {
    println!("🔍 Step 1: Discovering available MCP tools...");
    println!();

    let discovery = session.discover_tools().await;
    if let Some(err) = &discovery.failure {
        println!("Error getting tools: {err}");
    }
    if discovery.tools.is_empty() {
        println!("⚠️  No tools found or API not responding");
    } else {
        println!("✅ Found {} available tools:", discovery.tools.len());
        for tool in &discovery.tools {
            println!("   • {}: {}", tool.name, tool.description);
        }
    }

    print_separator();

    let params = prompt_params()?;

    println!();
    println!("🌐 Step 2: Submitting retrieval request for {}...", params.url);
    if params.force_refresh {
        println!("   (Forcing fresh retrieval, bypassing cache)");
    } else {
        println!("   (Will use cached results if available)");
    }
    println!("   Mode: {}", params.mode);
    println!();

    let pb = spinner("Submitting...");
    let submitted = session.submit(&params).await;
    pb.finish_and_clear();
    let submission = match submitted {
        Ok(submission) => submission,
        Err(err) => {
            println!("Error submitting retrieval request: {err}");
            println!("❌ Failed to submit retrieval request");
            return Ok(());
        }
    };

    println!("✅ Request submitted successfully!");
    println!("   Request ID: {}", submission.request_id);
    println!("   Status: {}", submission.status);
    println!("   Estimated wait: {}s", submission.estimated_wait_time_seconds);

    print_separator();
    println!("⏳ Step 3: Polling for results (this may take a while)...");
    println!();

    let outcome = session.poll(submission.request_id, print_poll_event).await;
    let result = match outcome {
        PollOutcome::Complete(status) => status,
        PollOutcome::Terminal(status) => {
            println!(
                "   Error: {}",
                status.error.as_deref().unwrap_or("(no error message)")
            );
            println!("❌ Retrieval {}", status.status);
            return Ok(());
        }
        PollOutcome::TimedOut { .. } => {
            println!("⚠️  Timeout: Maximum polling attempts reached");
            println!("❌ Failed to get results");
            return Ok(());
        }
    };

    print_result(&result);

    if let Some(content) = &result.content {
        print_content(content);
        println!();
        let download = Confirm::new()
            .with_prompt("Download page content?")
            .default(false)
            .interact()?;
        if download {
            download_content(session, content).await;
        }
    }

    print_separator();
    println!("✅ Demo completed successfully!");
    Ok(())
}

/// Block until any key is pressed.
pub fn wait_for_keypress() -> Result<()> {
    println!();
    println!("Press any key to exit...");
    terminal::enable_raw_mode()?;
    let read = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
            Ok(_) => continue,
            Err(err) => break Err(err),
        }
    };
    terminal::disable_raw_mode()?;
    read?;
    Ok(())
}

fn print_separator() {
    println!();
    println!("{SEPARATOR}");
    println!();
}

fn print_poll_event(event: &PollEvent) {
    match event {
        PollEvent::Attempt {
            attempt,
            max_attempts,
            status,
        } => println!(
            "   [{attempt}/{max_attempts}] Status: {} - {}",
            status.status,
            status.message.as_deref().unwrap_or_default()
        ),
        PollEvent::AttemptFailed {
            attempt,
            max_attempts,
            error,
        } => println!("   [{attempt}/{max_attempts}] Error: {error}"),
    }
}

fn print_result(result: &RetrievalStatus) {
    println!("✅ Retrieval completed!");
    println!("   Status: {}", result.status);
    println!("   URL: {}", result.url);
    match result.completed_at {
        Some(at) => println!("   Completed at: {}", at.to_rfc3339()),
        None => println!("   Completed at: -"),
    }
}

fn print_content(content: &ContentInfo) {
    println!();
    println!("📄 Content available:");
    println!("   Page Data URL: {}", content.page_data_url);
    println!(
        "   Content Hash: {}",
        content.content_hash.as_deref().unwrap_or_default()
    );
    if let Some(artifacts) = content.artifacts.as_ref().filter(|a| !a.is_empty()) {
        let names: Vec<&str> = artifacts.keys().map(String::as_str).collect();
        println!("   Artifacts: {}", names.join(", "));
    }
    if let Some(metrics) = content.metrics.as_ref().filter(|m| !m.is_empty()) {
        let names: Vec<&str> = metrics.keys().map(String::as_str).collect();
        println!("   Metrics: {}", names.join(", "));
    }
}

async fn download_content<Z: Sleeper>(session: &Session<Z>, content: &ContentInfo) {
    println!();
    println!("⬇️  Downloading page content...");
    let pb = spinner("Downloading...");
    let downloaded = session.download_preview(content).await;
    pb.finish_and_clear();
    match downloaded {
        Ok(preview) => {
            println!();
            println!("📄 Page Content (first {MAX_PREVIEW_CHARS} chars):");
            println!("{SEPARATOR}");
            println!("{preview}");
            println!("{SEPARATOR}");
        }
        Err(err) => println!("Error downloading page data: {err}"),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
