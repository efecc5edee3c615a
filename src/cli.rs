//! Terminal front end: command parsing and plain-text rendering.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::app::ViewState;

#[derive(Debug, Parser)]
#[command(name = "hn-search", version, about = "Search Hacker News stories from the terminal")]
pub struct Args {
    /// Config file (defaults to <data-dir>/config.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for the preference database (defaults to ~/.hn_search)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Serve two canned stories instead of calling the search endpoint
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Type a term and submit it.
    Search(String),
    /// Type without submitting.
    Type(String),
    Submit,
    /// 1-based index into the recent searches.
    Recent(usize),
    Remove(String),
    /// 1-based index into the visible stories.
    Open(usize),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let index = |what: &str| -> Result<usize, String> {
            match rest.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(format!("{} expects a number starting at 1", what)),
            }
        };

        match word {
            "search" | "s" => Ok(Command::Search(rest.to_string())),
            "type" | "t" => Ok(Command::Type(rest.to_string())),
            "submit" => Ok(Command::Submit),
            "recent" | "r" => index("recent").map(Command::Recent),
            "rm" | "remove" if !rest.is_empty() => Ok(Command::Remove(rest.to_string())),
            "rm" | "remove" => Err("remove expects a story id".to_string()),
            "open" | "o" => index("open").map(Command::Open),
            "help" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{}', try 'help'", other)),
        }
    }
}

pub const HELP: &str = "\
commands:
  search <term>   type a term and search for it
  type <text>     change the search term without searching
  submit          search for the current term
  recent <n>      repeat the n-th recent search
  rm <id>         hide a story by id
  open <n>        open the n-th story in the browser
  quit";

/// Renders one frame. Loading, error and the list never show together.
pub fn render(view: &ViewState, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Search: {}", view.search_term);
    if !view.recent_terms.is_empty() {
        let recent: Vec<String> = view
            .recent_terms
            .iter()
            .enumerate()
            .map(|(i, term)| format!("[{}] {}", i + 1, term))
            .collect();
        let _ = writeln!(out, "Recent: {}", recent.join("  "));
    }
    let _ = writeln!(out, "{}", "-".repeat(60));

    if view.is_loading {
        let _ = writeln!(out, "Loading ...");
        return out;
    }
    if view.is_error {
        let _ = writeln!(out, "Something went wrong ...");
        return out;
    }

    for (i, story) in view.visible_items.iter().enumerate() {
        let domain = story.domain();
        let _ = write!(out, "{:>3}. {}", i + 1, story.title);
        if !domain.is_empty() {
            let _ = write!(out, " ({})", domain);
        }
        let _ = writeln!(out);
        let _ = write!(
            out,
            "     {} points by {} | {} comments | id {}",
            story.points, story.author, story.comment_count, story.id
        );
        let age = story.time_ago(now);
        if !age.is_empty() {
            let _ = write!(out, " | {}", age);
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{} stories, {} comments", view.visible_items.len(), view.total_comments);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoryRecord;
    use std::sync::Arc;

    fn view(items: Vec<StoryRecord>) -> ViewState {
        ViewState {
            items: Arc::from(items.clone()),
            visible_items: items,
            is_loading: false,
            is_error: false,
            search_term: "React".to_string(),
            current_query: "q".to_string(),
            recent_terms: vec!["React".to_string(), "Redux".to_string()],
            total_comments: 5,
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("search rust lang"), Ok(Command::Search("rust lang".into())));
        assert_eq!(Command::parse("  t  re "), Ok(Command::Type("re".into())));
        assert_eq!(Command::parse("type"), Ok(Command::Type(String::new())));
        assert_eq!(Command::parse("recent 2"), Ok(Command::Recent(2)));
        assert_eq!(Command::parse("rm 123"), Ok(Command::Remove("123".into())));
        assert_eq!(Command::parse("open 1"), Ok(Command::Open(1)));
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(Command::parse("recent 0").is_err());
        assert!(Command::parse("open x").is_err());
        assert!(Command::parse("rm").is_err());
        assert!(Command::parse("").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }

    #[test]
    fn loading_hides_list() {
        let mut v = view(vec![StoryRecord {
            id: "0".into(),
            title: "React".into(),
            url: "https://reactjs.org/".into(),
            author: "Jordan Walke".into(),
            comment_count: 3,
            points: 4,
            created_at: None,
        }]);
        let shown = render(&v, Utc::now());
        assert!(shown.contains("React (reactjs.org)"));
        assert!(shown.contains("[2] Redux"));

        v.is_loading = true;
        let shown = render(&v, Utc::now());
        assert!(shown.contains("Loading ..."));
        assert!(!shown.contains("Jordan Walke"));

        v.is_loading = false;
        v.is_error = true;
        let shown = render(&v, Utc::now());
        assert!(shown.contains("Something went wrong"));
        assert!(!shown.contains("Jordan Walke"));
    }
}
