#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use sopline_core::config::load_user_config;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "sop",
    author,
    version,
    about = "sop: explore the sopline development backend",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Data",
        about = "List store tables",
        long_about = "List every table in the development store with its row count.",
        after_help = "EXAMPLES:\n    # Show tables and row counts\n    sop tables\n\n    # Emit machine-readable output\n    sop tables --format json"
    )]
    Tables,

    #[command(
        next_help_heading = "Data",
        about = "Run a query against a table",
        long_about = "Build a query from flags and resolve it against the development store.\nMutations are echoed back but never persisted.",
        after_help = "EXAMPLES:\n    # Active procedures of the demo company\n    sop query sops --eq is_archived=false\n\n    # First matching profile\n    sop query profiles --eq role=owner --single\n\n    # Emulate an insert\n    sop query sops --insert '{\"title\":\"X\"}' --single"
    )]
    Query(cmd::query::QueryArgs),

    #[command(
        next_help_heading = "Identity",
        about = "Show the signed-in user",
        long_about = "Show the fixed development identity with its profile and organization."
    )]
    Whoami,

    #[command(
        next_help_heading = "Training",
        about = "Show training progress",
        long_about = "Show checklist progress for one person, per-member team progress, or the organization summary.",
        after_help = "EXAMPLES:\n    # Your own checklist\n    sop progress\n\n    # Someone else's checklist\n    sop progress --employee u0000000-0000-0000-0000-000000000003\n\n    # Dashboard counters\n    sop progress --org"
    )]
    Progress(cmd::progress::ProgressArgs),

    #[command(
        next_help_heading = "Team",
        about = "Invite a team member",
        long_about = "Send an invitation with a one-time sign-in link, or check whether an address has one pending.\nInvitations expire after seven days.",
        after_help = "EXAMPLES:\n    # Invite a new employee\n    sop invite new.hire@example.com\n\n    # Invite a manager\n    sop invite lead@example.com --role manager\n\n    # Is an invitation waiting for this address?\n    sop invite lead@example.com --check"
    )]
    Invite(cmd::invite::InviteArgs),

    #[command(
        next_help_heading = "Billing",
        about = "Show plans and limit checks",
        after_help = "EXAMPLES:\n    # Plan catalogue\n    sop plans\n\n    # Can a starter org with 10 employees add another?\n    sop plans --plan starter --employees 10"
    )]
    Plans(cmd::plans::PlansArgs),

    #[command(next_help_heading = "Maintenance", about = "Show effective configuration")]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    sop completions bash"
    )]
    Completions {
        /// Target shell for completion script generation.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SOPLINE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "sopline=debug,info"
        } else {
            "sopline=info,warn"
        })
    });

    let format = env::var("SOPLINE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays parseable.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

async fn run(command: &Commands, project_root: &Path, output: OutputMode) -> anyhow::Result<()> {
    match command {
        Commands::Tables => cmd::tables::run_tables(project_root, output),
        Commands::Query(args) => cmd::query::run_query(args, project_root, output).await,
        Commands::Whoami => cmd::whoami::run_whoami(project_root, output).await,
        Commands::Progress(args) => cmd::progress::run_progress(args, project_root, output).await,
        Commands::Invite(args) => cmd::invite::run_invite(args, project_root, output).await,
        Commands::Plans(args) => cmd::plans::run_plans(args, project_root, output),
        Commands::Config(args) => cmd::config::run_config(args, project_root, output),
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "sop", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let user_output = load_user_config().ok().and_then(|cfg| cfg.output);
    let output = resolve_output_mode(cli.format, cli.json, user_output.as_deref());
    debug!(?output, "resolved output mode");

    let result = match env::current_dir() {
        Ok(project_root) => run(&cli.command, &project_root, output).await,
        Err(err) => Err(anyhow::Error::new(err).context("Failed to read current directory")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Err(render_err) = render_error(output, &CliError::from(&err)) {
                eprintln!("error: {err:#} ({render_err})");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_and_after_subcommand() {
        let cli = Cli::parse_from(["sop", "--json", "tables"]);
        assert!(cli.json);
        let cli = Cli::parse_from(["sop", "tables", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_accepts_modes() {
        let cli = Cli::parse_from(["sop", "--format", "text", "whoami"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(Cli::try_parse_from(["sop", "--format", "yaml", "whoami"]).is_err());
    }

    #[test]
    fn query_subcommand_parses_filters() {
        let cli = Cli::parse_from([
            "sop", "query", "sops", "--eq", "is_archived=false", "--limit", "2", "--single",
        ]);
        let Commands::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.table, "sops");
        assert_eq!(args.eq, vec!["is_archived=false".to_string()]);
        assert_eq!(args.limit, Some(2));
        assert!(args.single);
    }

    #[test]
    fn mutation_flags_conflict() {
        let result = Cli::try_parse_from(["sop", "query", "sops", "--insert", "{}", "--delete"]);
        assert!(result.is_err());
    }

    #[test]
    fn progress_scopes_conflict() {
        assert!(Cli::try_parse_from(["sop", "progress", "--org", "--team"]).is_err());
        assert!(Cli::try_parse_from(["sop", "progress", "--employee", "x", "--org"]).is_err());
        assert!(Cli::try_parse_from(["sop", "progress", "--org"]).is_ok());
    }

    #[test]
    fn all_subcommands_parse() {
        let subcommands = [
            vec!["sop", "tables"],
            vec!["sop", "query", "profiles"],
            vec!["sop", "whoami"],
            vec!["sop", "progress"],
            vec!["sop", "invite", "a@b.c", "--role", "manager"],
            vec!["sop", "invite", "a@b.c", "--check"],
            vec!["sop", "plans", "--employees", "3"],
            vec!["sop", "config"],
            vec!["sop", "completions", "bash"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse: {args:?} - error: {:?}", result.err());
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
