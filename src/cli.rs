use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use time::macros::format_description;
use tokio::sync::Mutex;

use crate::core::config::AppConfig;
use crate::core::errors::Error;
use crate::models::search::DEFAULT_MAX_RESULTS;
use crate::models::{
    EditorKind, EditorSettings, HistoryEntry, SearchOutcome, SearchRequest, SearchResult,
};
use crate::server::{self, AppState, DEFAULT_BIND};
use crate::services::editor::EditorLauncher;
use crate::services::fs::{self, DirectoryEntryDto, ListParams};
use crate::services::store::{run_recorded, EditorSettingsStore, HistoryStore};

#[derive(Debug, Parser)]
#[command(
    name = "rgdesk",
    version,
    about = "Run ripgrep searches, replay them from history and open matches in your editor"
)]
pub struct Cli {
    #[command(flatten)]
    pub config: AppConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search a directory tree.
    Search(SearchArgs),
    /// Report whether the search tool can be run.
    Doctor,
    /// Inspect and replay past searches.
    #[command(subcommand)]
    History(HistoryCommand),
    /// Open a file in the preferred editor.
    Open {
        file: PathBuf,
        #[arg(short, long)]
        line: Option<u64>,
    },
    /// Show or change the preferred editor.
    #[command(subcommand)]
    Editor(EditorCommand),
    /// Browse directories to search in.
    #[command(subcommand)]
    Dirs(DirsCommand),
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: SocketAddr,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub pattern: String,

    #[arg(default_value = ".")]
    pub directory: String,

    /// Include/exclude globs; repeat the flag or separate with commas.
    #[arg(short, long = "glob", value_name = "GLOBS")]
    pub globs: Vec<String>,

    #[arg(short = 's', long)]
    pub case_sensitive: bool,

    #[arg(short, long)]
    pub word: bool,

    /// Search hidden files and directories.
    #[arg(long)]
    pub hidden: bool,

    /// Lines of context around each match.
    #[arg(short = 'C', long, default_value_t = 0)]
    pub context: u32,

    /// Maximum number of files returned.
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Maximum number of matches per file; defaults to --max-results.
    #[arg(long)]
    pub max_per_file: Option<usize>,

    #[arg(long)]
    pub json: bool,

    /// Do not record this search in history.
    #[arg(long)]
    pub no_history: bool,
}

impl SearchArgs {
    fn request(&self) -> SearchRequest {
        SearchRequest {
            pattern: self.pattern.clone(),
            directory: self.directory.clone(),
            file_type_globs: self
                .globs
                .iter()
                .flat_map(|globs| SearchRequest::parse_globs(globs))
                .collect(),
            case_sensitive: self.case_sensitive,
            whole_word: self.word,
            include_hidden: self.hidden,
            context_lines: self.context,
            max_results: self.max_results,
            max_matches_per_file: self.max_per_file,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    List {
        #[arg(long)]
        json: bool,
    },
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Run a past search again.
    Rerun {
        id: String,
        #[arg(long)]
        json: bool,
    },
    Remove {
        id: String,
    },
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum EditorCommand {
    Show,
    Set {
        #[arg(value_enum)]
        kind: EditorKind,
        /// Executable for the custom editor.
        #[arg(long)]
        path: Option<String>,
        /// Argument template for the custom editor; {0} is the file, {1} the line.
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,
    },
    /// Probe which editors are installed.
    Check,
}

#[derive(Debug, Subcommand)]
pub enum DirsCommand {
    Common,
    List {
        path: String,
        #[arg(long)]
        hidden: bool,
        #[arg(long, default_value_t = fs::listing::DEFAULT_PAGE_SIZE)]
        limit: usize,
        #[arg(long)]
        cursor: Option<String>,
    },
    Parent {
        path: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.config;
        match self.command {
            Command::Search(args) => search(&config, args).await,
            Command::Doctor => doctor(&config).await,
            Command::History(command) => history(&config, command).await,
            Command::Open { file, line } => {
                let settings = EditorSettingsStore::load(config.settings_path()?);
                EditorLauncher::new(settings.settings().clone())
                    .launch(&file, line)
                    .await?;
                Ok(())
            }
            Command::Editor(command) => editor(&config, command).await,
            Command::Dirs(command) => browse_dirs(command).await,
            Command::Serve { bind } => server::serve(bind, AppState::from_config(&config)?).await,
        }
    }
}

async fn search(config: &AppConfig, args: SearchArgs) -> Result<()> {
    let runner = config.runner();
    let request = args.request();
    let outcome = if args.no_history {
        runner.execute(&request).await
    } else {
        let history = Mutex::new(HistoryStore::load(
            config.history_path()?,
            config.history_limit,
        ));
        run_recorded(&runner, &history, request).await
    };
    print_outcome(&with_hint(outcome, config)?, args.json)
}

async fn doctor(config: &AppConfig) -> Result<()> {
    let runner = config.runner();
    if let Some(version) = runner.tool_version().await {
        println!("{}: {version}", runner.program());
        return Ok(());
    }
    if runner.is_tool_available().await {
        println!("{}: available", runner.program());
        return Ok(());
    }
    bail!(
        "{} is not installed or not runnable; install ripgrep or pass --rg-path",
        runner.program()
    )
}

async fn history(config: &AppConfig, command: HistoryCommand) -> Result<()> {
    let mut store = HistoryStore::load(config.history_path()?, config.history_limit);
    match command {
        HistoryCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.entries())?);
            } else if store.entries().is_empty() {
                println!("no searches recorded");
            } else {
                for entry in store.entries() {
                    println!("{}", history_line(entry));
                }
            }
        }
        HistoryCommand::Show { id, json } => {
            let entry = store
                .get(&id)
                .with_context(|| format!("no history entry '{id}'"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(entry)?);
            } else {
                println!("{}", history_line(entry));
                println!("command: {}", entry.command_line);
                if entry.has_error {
                    println!("error: {}", entry.error_message);
                }
                print_results(&entry.results);
            }
        }
        HistoryCommand::Rerun { id, json } => {
            let request = store
                .get(&id)
                .map(|entry| entry.request.clone())
                .with_context(|| format!("no history entry '{id}'"))?;
            let runner = config.runner();
            let history = Mutex::new(store);
            let outcome = run_recorded(&runner, &history, request).await;
            print_outcome(&with_hint(outcome, config)?, json)?;
        }
        HistoryCommand::Remove { id } => {
            if !store.remove(&id).await? {
                bail!("no history entry '{id}'");
            }
            println!("removed {id}");
        }
        HistoryCommand::Clear => {
            store.clear().await?;
            println!("history cleared");
        }
    }
    Ok(())
}

async fn editor(config: &AppConfig, command: EditorCommand) -> Result<()> {
    let mut store = EditorSettingsStore::load(config.settings_path()?);
    match command {
        EditorCommand::Show => print_settings(store.settings()),
        EditorCommand::Set { kind, path, args } => {
            let current = store.settings().clone();
            let settings = EditorSettings {
                preferred_editor: kind,
                custom_editor_path: path.or(current.custom_editor_path),
                custom_editor_args: args.or(current.custom_editor_args),
            };
            store
                .save(settings)
                .await
                .with_context(|| format!("failed to write {}", store.path().display()))?;
            print_settings(store.settings());
        }
        EditorCommand::Check => {
            let launcher = EditorLauncher::new(store.settings().clone());
            for (kind, available) in launcher.check_availability().await {
                let mark = if available { "yes" } else { "no" };
                println!("{:<20} {mark}", kind.display_name());
            }
        }
    }
    Ok(())
}

async fn browse_dirs(command: DirsCommand) -> Result<()> {
    match command {
        DirsCommand::Common => {
            for dir in fs::common_directories() {
                println!("{}", dir.display());
            }
        }
        DirsCommand::List {
            path,
            hidden,
            limit,
            cursor,
        } => {
            let listed = fs::list_subdirectories(ListParams {
                path: &path,
                limit,
                cursor: cursor.as_deref(),
                include_hidden: hidden,
            })
            .await?;
            for DirectoryEntryDto { path, .. } in &listed.entries {
                println!("{path}");
            }
            if let Some(next) = listed.next_cursor {
                println!("-- more: --cursor {next}");
            }
        }
        DirsCommand::Parent { path } => match fs::parent_directory(&path) {
            Some(parent) => println!("{}", parent.display()),
            None => bail!("'{path}' has no parent directory"),
        },
    }
    Ok(())
}

fn with_hint(
    outcome: std::result::Result<SearchOutcome, Error>,
    config: &AppConfig,
) -> Result<SearchOutcome> {
    match outcome {
        Err(e @ Error::SearchToolUnavailable { .. }) => Err(anyhow::Error::new(e).context(format!(
            "could not run '{}'; install ripgrep or pass --rg-path",
            config.rg_path
        ))),
        other => Ok(other?),
    }
}

fn print_outcome(outcome: &SearchOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    print_results(&outcome.results);
    println!(
        "{} matches in {} files ({} ms)",
        outcome.match_count(),
        outcome.results.len(),
        outcome.duration_ms
    );
    println!("command: {}", outcome.command_line);
    Ok(())
}

fn print_results(results: &[SearchResult]) {
    for result in results {
        println!("{}", result.file_path);
        for m in &result.matches {
            let sep = if m.is_context_only { '-' } else { ':' };
            println!("{:>6}{sep} {}", m.line_number, m.content);
        }
        println!();
    }
}

fn history_line(entry: &HistoryEntry) -> String {
    let when = entry
        .timestamp
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| entry.timestamp.to_string());
    let status = if entry.has_error {
        "failed".to_string()
    } else {
        format!("{} matches", entry.result_count)
    };
    format!(
        "{}  {when}  {:?} in {}  ({status})",
        entry.id, entry.request.pattern, entry.request.directory
    )
}

fn print_settings(settings: &EditorSettings) {
    println!("editor: {}", settings.preferred_editor);
    if let Some(path) = &settings.custom_editor_path {
        println!("custom path: {path}");
    }
    if let Some(args) = &settings.custom_editor_args {
        println!("custom args: {args}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_args_split_comma_separated_globs() {
        let cli = Cli::parse_from([
            "rgdesk", "search", "foo", "/src", "-g", "*.rs, *.toml", "--glob", "!target/**", "-w",
            "-C", "2", "--max-per-file", "5",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        let request = args.request();
        assert_eq!(request.file_type_globs, vec!["*.rs", "*.toml", "!target/**"]);
        assert!(request.whole_word);
        assert!(!request.case_sensitive);
        assert_eq!(request.context_lines, 2);
        assert_eq!(request.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(request.max_matches_per_file, Some(5));
    }

    #[test]
    fn search_directory_defaults_to_current() {
        let cli = Cli::parse_from(["rgdesk", "search", "foo"]);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.directory, ".");
    }

    #[test]
    fn global_config_flags_parse_after_subcommand() {
        let cli = Cli::parse_from([
            "rgdesk",
            "history",
            "list",
            "--data-dir",
            "/tmp/rgdesk",
            "--rg-path",
            "/opt/rg",
        ]);
        assert_eq!(cli.config.data_dir, Some(PathBuf::from("/tmp/rgdesk")));
        assert_eq!(cli.config.rg_path, "/opt/rg");
    }

    #[test]
    fn editor_set_accepts_kebab_names() {
        let cli = Cli::parse_from(["rgdesk", "editor", "set", "notepad-plus-plus"]);
        let Command::Editor(EditorCommand::Set { kind, .. }) = cli.command else {
            panic!("expected editor set");
        };
        assert_eq!(kind, EditorKind::NotepadPlusPlus);
    }
}
