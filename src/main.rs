use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hacker_news_search::cli::{render, Args, Command, HELP};
use hacker_news_search::db::{PreferenceStore, SqlitePreferenceStore};
use hacker_news_search::hn_client::{FixtureSource, HackerNewsClient, StorySource};
use hacker_news_search::orchestrator::FetchOrchestrator;
use hacker_news_search::{Config, SearchApp};

/// Logs go to stderr so they do not interleave with the rendered list.
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hacker_news_search=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn redraw<S: PreferenceStore>(app: &mut SearchApp<S>) {
    print!("{}", render(&app.view(), Utc::now()));
}

/// Applies one line of user input. Returns false when the user quits.
fn handle_line<S: PreferenceStore>(app: &mut SearchApp<S>, line: &str) -> bool {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(message) => {
            println!("{}", message);
            return true;
        }
    };

    match command {
        Command::Search(term) => {
            app.on_search_input(&term);
            if app.on_search_submit().is_none() {
                println!("Type something to search for.");
            }
        }
        Command::Type(text) => app.on_search_input(&text),
        Command::Submit => {
            if app.on_search_submit().is_none() {
                println!("Type something to search for.");
            }
        }
        Command::Recent(n) => {
            let recent = app.view().recent_terms;
            match recent.get(n - 1) {
                Some(term) => {
                    app.on_recent_search_selected(term);
                }
                None => println!("No recent search #{}", n),
            }
        }
        Command::Remove(id) => app.on_remove_item(&id),
        Command::Open(n) => {
            let view = app.view();
            match view.visible_items.get(n - 1) {
                Some(story) if !story.url.is_empty() => {
                    if let Err(e) = open::that(&story.url) {
                        tracing::warn!(url = %story.url, error = %e, "failed to open URL");
                    }
                }
                Some(story) => println!("Story {} has no link", story.id),
                None => println!("No story #{}", n),
            }
            return true;
        }
        Command::Help => {
            println!("{}", HELP);
            return true;
        }
        Command::Quit => return false,
    }

    redraw(app);
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let default_dir = SqlitePreferenceStore::default_data_dir()?;
    let config_dir = args.data_dir.clone().unwrap_or_else(|| default_dir.clone());
    let config = Config::load(args.config.as_deref(), &config_dir)?;

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or(default_dir);
    let store = SqlitePreferenceStore::open(&data_dir).context("opening preference store")?;

    let source: Arc<dyn StorySource> = if args.offline {
        tracing::info!("offline mode, serving canned stories");
        Arc::new(FixtureSource::default())
    } else {
        Arc::new(HackerNewsClient::new(config.request_timeout())?)
    };

    let mut app = SearchApp::new(config.clone(), store);
    let (orchestrator, mut events) = FetchOrchestrator::new(source, config.request_timeout());
    let listener = orchestrator.listen(app.subscribe());

    println!("My Hacker Stories\n{}", HELP);
    redraw(&mut app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if app.handle_fetch_event(event) {
                    redraw(&mut app);
                }
            }
            line = lines.next_line() => {
                match line.context("reading stdin")? {
                    Some(line) => {
                        if !handle_line(&mut app, &line) {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    listener.abort();
    Ok(())
}
