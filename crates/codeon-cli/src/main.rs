use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use codeon_application::{ConversationEngine, FixPlan, FixUsecase};
use codeon_core::clients::{GenerationClient, RetrievalClient};
use codeon_core::error::CodeonError;
use codeon_core::fix::DiffLine;
use codeon_infrastructure::paths::CodeonPaths;
use codeon_infrastructure::{JsonHistoryRepository, apply_file_change};
use codeon_interaction::{ApiConfig, GeminiClient, HttpRetrievalClient};

#[derive(Parser)]
#[command(name = "codeon")]
#[command(about = "CodeOn - CLI code improvement and debugging assistant", long_about = None)]
struct Cli {
    /// Chat history file (defaults to ./chat_history.json)
    #[arg(long, value_name = "PATH", global = true)]
    history: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Propose and apply fixes for an issue in a file or directory
    Fix {
        /// File or directory to scan for source files
        path: PathBuf,

        /// Description of the issue to fix, in free words
        #[arg(required = true, num_args = 1..)]
        issue: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ApiConfig::load()?;
    let generation: Arc<dyn GenerationClient> = Arc::new(GeminiClient::from_config(&config));

    match cli.command {
        Some(Commands::Fix { path, issue }) => run_fix(generation, &path, &issue.join(" ")).await,
        None => run_chat(generation, &config, cli.history).await,
    }
}

/// Logging goes to stderr so it never mixes into conversation output.
/// `RUST_LOG` takes precedence when set; otherwise dependencies stay at
/// warn and our own crates log at info, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let fallback = format!(
        "warn,codeon_core={level},codeon_infrastructure={level},codeon_interaction={level},codeon_application={level},codeon_cli={level}"
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

// ============================================================================
// Chat mode
// ============================================================================

async fn run_chat(
    generation: Arc<dyn GenerationClient>,
    config: &ApiConfig,
    history_override: Option<PathBuf>,
) -> Result<()> {
    let history_path = history_override.unwrap_or_else(CodeonPaths::default_history_path);
    let history = Arc::new(JsonHistoryRepository::new(history_path));

    let retrieval = HttpRetrievalClient::from_config(config)
        .map(|client| Arc::new(client) as Arc<dyn RetrievalClient>);
    if retrieval.is_none() {
        println!(
            "{}",
            "No snippet search service configured; answering without code context.".bright_black()
        );
    }

    let mut engine = ConversationEngine::new(generation, retrieval, history).await?;

    println!("{}", "=== CodeOn ===".bright_magenta().bold());
    println!(
        "{}",
        "Ask about your code. To request fixes, run: codeon fix <file_or_dir> '<issue>'"
            .bright_black()
    );
    println!("{}", "Type 'exit' or 'quit' to end the session.".bright_black());
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
                    println!("{}", "Exiting CodeOn. See you later!".bright_green());
                    break;
                }

                let _ = rl.add_history_entry(&line);

                match engine.turn(query).await {
                    Ok(answer) => {
                        println!();
                        println!("{}", "CodeOn:".bright_magenta());
                        for line in answer.lines() {
                            println!("{}", line.bright_blue());
                        }
                        println!();
                    }
                    Err(err) => report_error(&err),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", "Exiting CodeOn. See you later!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}

/// Prints a turn failure without leaving the session, with a retry hint
/// when the failure looks temporary.
fn report_error(err: &CodeonError) {
    eprintln!("{}", format!("Error: {err}").red());
    match err {
        CodeonError::ServiceUnavailable {
            retry_after_secs: Some(secs),
            ..
        } => {
            eprintln!(
                "{}",
                format!("The service asked us to retry in about {secs}s.").yellow()
            );
        }
        _ if err.is_retryable() => {
            eprintln!(
                "{}",
                "This looks temporary; asking the same question again may work.".yellow()
            );
        }
        _ => {}
    }
}

// ============================================================================
// Fix mode
// ============================================================================

async fn run_fix(generation: Arc<dyn GenerationClient>, path: &Path, issue: &str) -> Result<()> {
    println!(
        "{}",
        format!("Analyzing '{}' for issue: {issue}", path.display()).bold()
    );

    let usecase = FixUsecase::new(generation);
    let plan = usecase.plan(path, issue).await?;

    if plan.is_empty() {
        println!("{}", "No changes were proposed.".bright_black());
        return Ok(());
    }

    print_plan(&plan);

    println!();
    println!("{}", "=".repeat(80));
    if !confirm("Apply ALL the changes listed above? (yes/no): ")? {
        println!("{}", "No changes were made.".yellow());
        return Ok(());
    }

    apply_plan(&plan);

    println!();
    println!("{}", "Fix command completed.".bright_green());
    Ok(())
}

fn print_plan(plan: &FixPlan) {
    println!();
    println!("{}", "=".repeat(80));
    println!("{}", "PROPOSED FIXES".bold());
    println!("{}", "=".repeat(80));

    let total = plan.len();
    for (index, planned) in plan.changes().iter().enumerate() {
        let change = &planned.change;
        println!();
        println!("[{}/{total}] File: {}", index + 1, change.file_path.bold());

        if change.summary_of_changes.is_empty() {
            println!("   - No detailed summary provided.");
        }
        for note in &change.summary_of_changes {
            let line = note
                .line
                .map_or_else(|| "?".to_string(), |line| line.to_string());
            println!(
                "   - {} {}",
                format!("Line ~{line}:").bright_blue(),
                note.description
            );
            println!("     {}", format!("Reason: {}", note.reason).bright_black());
        }

        println!();
        println!("   --- DIFF ---");
        match &planned.diff {
            None => println!(
                "{}",
                format!(
                    "Warning: {} was not part of the scanned codebase; it will not be applied.",
                    change.file_path
                )
                .yellow()
            ),
            Some(diff) if diff.is_empty() => {
                println!("{}", "   (No difference in content)".bright_black());
            }
            Some(diff) => print_diff(diff),
        }
        println!("   ------------");
    }
}

fn print_diff(diff: &[DiffLine]) {
    for line in diff {
        match line {
            DiffLine::Added(text) => println!("{}", format!("+ {text}").green()),
            DiffLine::Removed(text) => println!("{}", format!("- {text}").red()),
            DiffLine::Context(text) => println!("{}", format!("  {text}").bright_black()),
        }
    }
}

/// One confirmation covers the whole plan; only `yes` or `y` (any case)
/// proceeds.
fn confirm(question: &str) -> Result<bool> {
    print!("{question}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(is_affirmative(&input))
}

fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "yes" | "y")
}

/// Applies every change in order. A failing file is reported and skipped;
/// it never blocks the remaining files. Changes naming a file outside the
/// scanned codebase are never written.
fn apply_plan(plan: &FixPlan) {
    println!();
    println!("Applying changes...");

    for planned in plan.changes() {
        if planned.diff.is_none() {
            println!(
                "{}",
                format!(
                    "Skipped '{}': not part of the scanned codebase.",
                    planned.change.file_path
                )
                .yellow()
            );
            continue;
        }
        match apply_file_change(&planned.change) {
            Ok(applied) => {
                println!(
                    "{}",
                    format!(
                        "Updated '{}' (backup at '{}')",
                        applied.path.display(),
                        applied.backup_path.display()
                    )
                    .green()
                );
            }
            Err(err) => {
                eprintln!(
                    "{}",
                    format!("Failed to apply {}: {err}", planned.change.file_path).red()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use codeon_core::clients::GenerateOptions;
    use codeon_infrastructure::apply::backup_path_for;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Scripted GenerationClient: replays canned replies in order.
    struct ScriptedGenerationClient {
        replies: Mutex<Vec<String>>,
    }

    impl ScriptedGenerationClient {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            })
        }
    }

    #[async_trait::async_trait]
    impl GenerationClient for ScriptedGenerationClient {
        async fn generate(
            &self,
            _prompt: &str,
            _options: &GenerateOptions,
        ) -> codeon_core::error::Result<String> {
            Ok(self.replies.lock().unwrap().remove(0))
        }
    }

    #[test]
    fn test_cli_declaration_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fix_subcommand_collects_issue_words() {
        let cli = Cli::parse_from(["codeon", "fix", "src/", "add", "error", "handling"]);
        match cli.command {
            Some(Commands::Fix { path, issue }) => {
                assert_eq!(path, PathBuf::from("src/"));
                assert_eq!(issue.join(" "), "add error handling");
            }
            None => panic!("expected the fix subcommand"),
        }
    }

    #[test]
    fn test_confirmation_accepts_only_yes_forms() {
        assert!(is_affirmative("yes\n"));
        assert!(is_affirmative("  Y  \n"));
        assert!(is_affirmative("YES"));
        assert!(!is_affirmative("no\n"));
        assert!(!is_affirmative("yeah\n"));
        assert!(!is_affirmative("\n"));
    }

    #[tokio::test]
    async fn test_apply_plan_skips_changes_outside_the_scanned_codebase() {
        let scanned = TempDir::new().unwrap();
        fs::write(scanned.path().join("app.py"), "print('inside')\n").unwrap();

        // An existing file the model names even though it was never sent
        let elsewhere = TempDir::new().unwrap();
        let outside = elsewhere.path().join("config.py");
        fs::write(&outside, "TIMEOUT = 30\n").unwrap();

        let proposal = serde_json::json!({
            "changes": [{
                "file_path": outside.display().to_string(),
                "summary_of_changes": [],
                "fixed_code": "TIMEOUT = 60\n"
            }]
        });
        let generation: Arc<dyn GenerationClient> =
            ScriptedGenerationClient::new(&[&format!("```json\n{proposal}\n```")]);

        let plan = FixUsecase::new(generation)
            .plan(scanned.path(), "raise the timeout")
            .await
            .expect("Should plan from the scripted proposal");
        assert!(plan.changes()[0].diff.is_none());

        apply_plan(&plan);

        assert_eq!(fs::read_to_string(&outside).unwrap(), "TIMEOUT = 30\n");
        assert!(!backup_path_for(&outside).exists());
    }
}
