use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_assistant::{AssistantConfig, ContextStore, Explanation, IntentEngine, UserId};
use tally_protocol::{serialize_json, ChatResponse};

mod http_api;
mod repl;
mod server;
mod server_security;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Expense tracker assistant: chat endpoint and intent tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Assistant config file (TOML): threshold, default response, fallback catalog
    #[arg(long, global = true, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the chat endpoint over HTTP (POST /chatbot/message)
    ServeHttp(ServeArgs),

    /// Resolve a single message and print the reply
    Ask(AskArgs),

    /// Interactive chat on stdin, one message per line (/quit to stop)
    Chat(ChatArgs),

    /// Show how a message is resolved: rule verdict, fallback scores, threshold
    Explain(ExplainArgs),

    /// List the fallback catalog in priority order
    Catalog(CatalogArgs),

    /// Print JSON Schemas of the chat API payloads
    Schema,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:5000
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: String,

    /// Allow binding to non-loopback addresses (requires --auth-token)
    #[arg(long)]
    public: bool,

    /// Require Authorization: Bearer <token> on all requests (env: TALLY_AUTH_TOKEN)
    #[arg(long)]
    auth_token: Option<String>,
}

#[derive(Args)]
struct AskArgs {
    /// Message text
    message: String,

    /// User id the turn is recorded for
    #[arg(long, default_value = "cli")]
    user: String,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ChatArgs {
    /// User id the session is recorded for
    #[arg(long, default_value = "cli")]
    user: String,
}

#[derive(Args)]
struct ExplainArgs {
    /// Message text
    message: String,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CatalogArgs {
    /// Output JSON format
    #[arg(long)]
    json: bool,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout is reserved for JSON when a command emits it
    let json_output = match &cli.command {
        Commands::Ask(args) => args.json,
        Commands::Explain(args) => args.json,
        Commands::Catalog(args) => args.json,
        Commands::Schema => true,
        _ => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    if let Commands::Schema = cli.command {
        let schemas = tally_protocol::schemas()?;
        return print_stdout(&serde_json::to_string_pretty(&schemas)?);
    }

    let engine = build_engine(cli.config.as_deref())?;
    match cli.command {
        Commands::ServeHttp(args) => serve_http(args, engine).await?,
        Commands::Ask(args) => run_ask(args, &engine)?,
        Commands::Chat(args) => run_chat(args, &engine)?,
        Commands::Explain(args) => run_explain(args, &engine)?,
        Commands::Catalog(args) => run_catalog(args, &engine)?,
        Commands::Schema => {}
    }

    Ok(())
}

fn build_engine(config_path: Option<&Path>) -> Result<IntentEngine> {
    let config = match config_path {
        Some(path) => AssistantConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AssistantConfig::default(),
    };
    log::debug!(
        "assistant ready: threshold={} catalog_entries={}",
        config.threshold,
        config.catalog.len()
    );
    IntentEngine::new(config, Arc::new(ContextStore::new())).context("Invalid assistant config")
}

async fn serve_http(args: ServeArgs, engine: IntentEngine) -> Result<()> {
    let guard =
        server_security::ServerGuard::resolve(&args.bind, args.public, args.auth_token.as_deref())
            .await?;
    if args.public {
        let addrs = guard
            .addrs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        print_stdout(&format!(
            "Public bind enabled (--public). Resolved addresses: {addrs}"
        ))?;
    }
    log::info!(
        "starting chat server on {} (threshold {})",
        args.bind,
        engine.threshold()
    );
    server::serve(&args.bind, Arc::new(engine), guard, print_stdout).await
}

fn run_ask(args: AskArgs, engine: &IntentEngine) -> Result<()> {
    let resolution = engine.resolve(&args.message, &UserId::from(args.user));
    if args.json {
        let response = ChatResponse {
            response: resolution.text,
            intent: resolution.intent.as_str().to_string(),
        };
        print_stdout(&serialize_json(&response)?)
    } else {
        print_stdout(&resolution.text)
    }
}

fn run_chat(args: ChatArgs, engine: &IntentEngine) -> Result<()> {
    let user = UserId::from(args.user);
    let stdin = io::stdin();
    repl::run(engine, &user, stdin.lock(), io::stdout())?;
    Ok(())
}

fn run_explain(args: ExplainArgs, engine: &IntentEngine) -> Result<()> {
    let explanation = engine.explain(&args.message);
    if args.json {
        return print_stdout(&serde_json::to_string_pretty(&explanation)?);
    }
    print_stdout(&render_explanation(&explanation))
}

fn render_explanation(explanation: &Explanation) -> String {
    let mut lines = vec![format!("normalized: {:?}", explanation.normalized)];
    match explanation.rule {
        Some(rule) => lines.push(format!("rule: {rule}")),
        None => {
            lines.push("rule: none, fallback scores:".to_string());
            for entry in &explanation.scores {
                lines.push(format!("  {:>3}  {}", entry.score, entry.keyword));
            }
            lines.push(format!("threshold: > {}", explanation.threshold));
        }
    }
    lines.push(format!("intent: {}", explanation.resolution.intent));
    lines.push(format!("response: {}", explanation.resolution.text));
    lines.join("\n")
}

fn run_catalog(args: CatalogArgs, engine: &IntentEngine) -> Result<()> {
    let catalog = engine.catalog();
    if args.json {
        return print_stdout(&serde_json::to_string_pretty(catalog)?);
    }
    for (idx, entry) in catalog.entries().iter().enumerate() {
        print_stdout(&format!("{}. {} -> {}", idx + 1, entry.keyword, entry.response))?;
    }
    Ok(())
}
