// ABOUTME: Terminal front end for feedsync - renders feed pages and turns typed
// ABOUTME: commands into dashboard intents. Runs against RPC or an in-memory demo.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use feedsync::prelude::*;

/// "Clipboard" for a terminal: the link is printed for the user to copy.
struct TerminalClipboard;

#[async_trait]
impl Clipboard for TerminalClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "  copy: {}", text)?;
        out.flush()?;
        Ok(())
    }
}

fn render_post(post: &Post) {
    let heart = if post.liked_by_viewer { "♥" } else { "♡" };
    println!(
        "#{:<5} {}  [{}]  {} {}",
        post.index,
        post.author.short(),
        post.created_at,
        heart,
        post.like_count
    );
    println!("       {}", post.content);
}

fn render(event: &Event) {
    match event {
        Event::Profile(profile) => {
            let name = if profile.username.is_empty() {
                "(unnamed)"
            } else {
                profile.username.as_str()
            };
            println!("Signed in as {} ({})", name, profile.identity);
            if let Some(url) = &profile.avatar_url {
                println!("Avatar: {}", url);
            }
            println!();
        }
        Event::PageLoaded(page) => {
            for post in &page.posts {
                render_post(post);
            }
            println!("-- page {} ({} posts) --", page.page, page.posts.len());
        }
        Event::FeedExhausted => println!("-- end of feed --"),
        Event::LikeUpdated(outcome) => {
            let verb = if outcome.liked { "Liked" } else { "Unliked" };
            println!("{} #{} ({} likes)", verb, outcome.index, outcome.like_count);
        }
        Event::PostCreated(post) => render_post(post),
        Event::LinkCopied { .. } => {}
        Event::Notice(notice) => {
            let tag = match notice.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Success => "ok",
                NoticeLevel::Error => "error",
            };
            println!("[{}] {}", tag, notice.message);
        }
    }
}

fn parse_index(arg: &str) -> Option<u64> {
    arg.trim().trim_start_matches('#').parse().ok()
}

/// Map a typed line to an intent. `None` for unknown or malformed commands.
fn parse_command(line: &str) -> Option<Intent> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    match cmd {
        "more" | "m" | "" => Some(Intent::LoadMore),
        "like" | "l" => parse_index(rest).map(|index| Intent::ToggleLike { index }),
        "share" | "s" => parse_index(rest).map(|index| Intent::Share { index }),
        "post" | "p" => Some(Intent::CreatePost {
            content: rest.to_string(),
        }),
        "reload" | "r" => Some(Intent::Reload),
        _ => None,
    }
}

async fn demo_session(config: &FeedConfig) -> Result<Session> {
    let viewer = Identity::parse("0x1111111111111111111111111111111111111111")?;
    let friend = Identity::parse("0x2222222222222222222222222222222222222222")?;

    let ledger = Arc::new(MemoryLedger::new());
    ledger.set_profile(&viewer, "you", "QmDemoViewer").await;
    ledger.set_profile(&friend, "friend", "QmDemoFriend").await;
    for i in 0..23u64 {
        let author = if i % 3 == 0 { &viewer } else { &friend };
        ledger
            .seed_post(author, format!("demo post number {}", i), 1_700_000_000 + i * 60)
            .await;
    }

    Ok(Session::with_gateway(
        viewer,
        ledger.clone(),
        ledger,
        &config.gateway_origin,
    ))
}

async fn rpc_session(config: &FeedConfig) -> Result<Session> {
    config.require_contracts()?;
    let ledger = Arc::new(RpcLedger::new(config)?);

    let identity = match std::env::var("FEED_IDENTITY") {
        Ok(raw) => Identity::parse(&raw)?,
        Err(_) => ledger
            .current_identity()
            .await
            .context("no wallet account available")?,
    };

    Ok(Session::with_gateway(
        identity,
        ledger.clone(),
        ledger,
        &config.gateway_origin,
    ))
}

async fn run_feed_loop(dashboard: &Dashboard) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("Commands: more, like <n>, share <n>, post <text>, reload, list, quit\n");
    for event in dashboard.dispatch(Intent::Open).await {
        render(&event);
    }

    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(_) => break,
        };

        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        if line == "list" {
            for post in dashboard.coordinator().posts().await {
                render_post(&post);
            }
            continue;
        }
        if !line.is_empty() {
            let _ = rl.add_history_entry(line);
        }

        let Some(intent) = parse_command(line) else {
            println!("Unknown command: {}", line);
            continue;
        };
        for event in dashboard.dispatch(intent).await {
            render(&event);
        }
    }

    dashboard.dispatch(Intent::NavigateAway).await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = FeedConfig::from_env()?;
    let demo = std::env::args().any(|arg| arg == "--demo");

    let session = if demo {
        demo_session(&config).await?
    } else {
        rpc_session(&config).await?
    };
    tracing::info!(identity = %session.identity(), demo, "starting feed");

    let dashboard = Dashboard::new(session, config, Arc::new(TerminalClipboard));
    run_feed_loop(&dashboard).await
}
