use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, ExitCode};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use envfile::{EnvLoader, is_representable};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Run commands with variables loaded from dotenv files.
#[derive(Debug, Parser)]
#[command(name = "envfile", version)]
struct Cli {
    /// Print loader diagnostics to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load dotenv sources and execute a command.
    Run(RunArgs),
    /// Print the parsed variables as dotenv lines.
    Print(SourceArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Dotenv file path(s). Repeat or pass comma-separated paths. Defaults to .env.
    #[arg(short = 'f', long = "file", value_name = "PATHS", value_delimiter = ',')]
    files: Vec<PathBuf>,

    /// Fetch a dotenv document over HTTP(S). Read after the files.
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Ignore missing dotenv files.
    #[arg(short = 'i', long = "ignore-missing", visible_alias = "ignore")]
    ignore_missing: bool,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    sources: SourceArgs,

    /// Override existing environment variables.
    #[arg(short = 'o', long = "override", visible_alias = "overload")]
    override_existing: bool,

    /// Command to execute, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<OsString>,
}

impl SourceArgs {
    fn loader(&self) -> EnvLoader {
        let mut loader = EnvLoader::new()
            .paths(&self.files)
            .required(!self.ignore_missing);
        for url in &self.urls {
            loader = loader.url(url);
        }
        loader
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("envfile: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("envfile=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Run(args) => execute_run(args),
        Commands::Print(args) => {
            let parsed = args
                .loader()
                .parse_only()
                .context("failed to load env sources")?;
            let rendered = parsed
                .to_dotenv()
                .context("failed to render parsed variables")?;
            print!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn execute_run(args: RunArgs) -> Result<ExitCode> {
    let parsed = args
        .sources
        .loader()
        .parse_only()
        .context("failed to load env sources")?;

    let (program, program_args) = args
        .command
        .split_first()
        .context("missing command after `run`")?;
    let mut command = Command::new(program);
    command.args(program_args);
    let mut skipped_existing = 0usize;
    for (key, value) in parsed.iter() {
        if !is_representable(key, value) {
            warn!(key, "skipping entry that cannot be set in the environment");
            continue;
        }
        // Existing variables that are kept are inherited byte for byte.
        if args.override_existing || std::env::var_os(key).is_none() {
            command.env(key, value);
        } else {
            skipped_existing += 1;
        }
    }
    debug!(skipped_existing, "prepared child environment");

    execute_command(command, program)
}

#[cfg(unix)]
fn execute_command(mut command: Command, program: &OsString) -> Result<ExitCode> {
    let err = command.exec();
    Err(err).with_context(|| format!("failed to execute `{}`", program.to_string_lossy()))
}

#[cfg(not(unix))]
fn execute_command(mut command: Command, program: &OsString) -> Result<ExitCode> {
    let status = command
        .status()
        .with_context(|| format!("failed to execute `{}`", program.to_string_lossy()))?;
    let code = status.code().unwrap_or(1);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("envfile").chain(args.iter().copied()))
            .expect("parse should succeed")
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_uses_defaults() {
        let Commands::Run(args) = parse(&["run", "printenv", "FOO"]).command else {
            panic!("expected run");
        };

        assert!(args.sources.files.is_empty());
        assert!(!args.sources.ignore_missing);
        assert!(!args.override_existing);
        assert_eq!(
            args.command,
            vec![OsString::from("printenv"), OsString::from("FOO")]
        );
    }

    #[test]
    fn run_supports_repeated_and_comma_separated_files() {
        let Commands::Run(args) = parse(&[
            "run",
            "-f",
            ".env.local,.env",
            "--file",
            "custom.env",
            "--",
            "printenv",
            "FOO",
        ])
        .command
        else {
            panic!("expected run");
        };

        assert_eq!(
            args.sources.files,
            vec![
                PathBuf::from(".env.local"),
                PathBuf::from(".env"),
                PathBuf::from("custom.env"),
            ]
        );
    }

    #[test]
    fn run_passes_hyphenated_arguments_to_the_command() {
        let Commands::Run(args) = parse(&["run", "-o", "ls", "-la"]).command else {
            panic!("expected run");
        };

        assert!(args.override_existing);
        assert_eq!(args.command, vec![OsString::from("ls"), OsString::from("-la")]);
    }

    #[test]
    fn run_requires_a_command() {
        let err = Cli::try_parse_from(["envfile", "run", "-f", ".env"]).expect_err("should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn empty_file_list_is_rejected() {
        assert!(Cli::try_parse_from(["envfile", "print", "-f", ","]).is_err());
    }

    #[test]
    fn print_collects_urls_after_files() {
        let Commands::Print(args) =
            parse(&["print", "-i", "-f", "a.env", "--url", "http://localhost/env"]).command
        else {
            panic!("expected print");
        };

        assert!(args.ignore_missing);
        assert_eq!(args.files, vec![PathBuf::from("a.env")]);
        assert_eq!(args.urls, vec!["http://localhost/env".to_owned()]);
    }
}
