//! gitremote - list and classify the git remotes of a repository.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitremote_core::client::GitClient;
use gitremote_core::{
    AliasResolver, IdentityResolver, RemoteDescriptor, RemoteParser, Settings, SshAliasResolver,
    context,
};

mod exit_codes {
    pub const OK: i32 = 0;
    pub const ERROR: i32 = 1;
}

/// List and classify git remotes.
#[derive(Debug, Parser)]
#[command(name = "gitremote", version, about = "List and classify git remotes")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Do not resolve SSH host aliases with `ssh -G`.
    #[arg(long, global = true)]
    no_resolve: bool,

    /// Timeout for one `ssh -G` lookup, in milliseconds.
    #[arg(
        long,
        global = true,
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    ssh_timeout: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the remotes of a repository.
    List(ListArgs),
    /// Classify remote URLs into scheme, domain and path.
    Classify(ClassifyArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Repository directory.
    #[arg(short = 'R', long, default_value = ".")]
    repo: PathBuf,

    /// Read `git remote -v` output from a file (`-` for stdin) instead of running git.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output JSON.
    #[arg(long)]
    json: bool,

    /// Sort upstream first, then origin, then the rest.
    #[arg(long)]
    sort: bool,
}

#[derive(Debug, Args)]
struct ClassifyArgs {
    /// URLs to classify.
    #[arg(required = true, value_name = "URL")]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GITREMOTE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            exit_codes::ERROR
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    let mut settings = Settings::from_env().context("invalid environment")?;
    if cli.global.no_resolve {
        settings.resolve_aliases = false;
    }
    if let Some(ms) = cli.global.ssh_timeout {
        settings.ssh_timeout = Duration::from_millis(ms);
    }

    if settings.resolve_aliases {
        let parser =
            RemoteParser::with_settings(SshAliasResolver::from_settings(&settings), &settings);
        run_command(cli.command, &parser).await
    } else {
        run_command(cli.command, &RemoteParser::with_settings(IdentityResolver, &settings)).await
    }
}

async fn run_command<R: AliasResolver>(cmd: Commands, parser: &RemoteParser<R>) -> Result<i32> {
    match cmd {
        Commands::List(args) => list(args, parser).await,
        Commands::Classify(args) => Ok(classify(args, parser).await),
    }
}

async fn list<R: AliasResolver>(args: ListArgs, parser: &RemoteParser<R>) -> Result<i32> {
    let mut remotes = match &args.input {
        Some(input) => {
            let listing = read_input(input)?;
            parser.parse(&listing, &args.repo).await
        }
        None => {
            let client = GitClient::new()?.with_repo_dir(&args.repo);
            client
                .remotes(parser)
                .await
                .with_context(|| format!("failed to list remotes of {}", args.repo.display()))?
        }
    };

    if args.sort {
        context::sort_by_weight(&mut remotes);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&remotes)?);
    } else {
        for remote in &remotes {
            println!("{}", format_remote(remote));
        }
    }
    Ok(exit_codes::OK)
}

async fn classify<R: AliasResolver>(args: ClassifyArgs, parser: &RemoteParser<R>) -> i32 {
    let mut code = exit_codes::OK;
    for url in &args.urls {
        match parser.resolve_url(url).await {
            Some((scheme, domain, path)) => {
                println!("{}\t{domain}\t{path}", display_scheme(&scheme));
            }
            None => {
                eprintln!("{url}: unrecognized");
                code = exit_codes::ERROR;
            }
        }
    }
    code
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

fn display_scheme(scheme: &str) -> &str {
    if scheme.is_empty() { "ssh" } else { scheme }
}

fn format_remote(remote: &RemoteDescriptor) -> String {
    let directions: Vec<&str> = remote
        .entries()
        .iter()
        .map(|e| e.direction.as_str())
        .collect();
    format!(
        "{}\t{}\t{}\t{}\t{}",
        remote.name(),
        display_scheme(remote.scheme()),
        remote.domain(),
        remote.path(),
        directions.join(","),
    )
}
