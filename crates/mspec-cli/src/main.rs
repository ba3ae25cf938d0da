//! # mspec CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mspec_cli::inspect::{run_inspect, InspectArgs};
use mspec_cli::roundtrip::{run_roundtrip, RoundtripArgs};
use mspec_cli::validate::{run_validate, ValidateArgs};

/// mspec: validate and normalize JSON/YAML documents against declared
/// record schemas.
#[derive(Parser, Debug)]
#[command(name = "mspec", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a document against a declared record.
    Validate(ValidateArgs),
    /// Validate a document and print its normalized serialized form.
    Roundtrip(RoundtripArgs),
    /// Show the compiled view of a schema document.
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the -v count picks the level.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Roundtrip(args) => run_roundtrip(args),
        Commands::Inspect(args) => run_inspect(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn cli_parse_verbose_levels() {
        let cli = Cli::try_parse_from(["mspec", "inspect", "--schema", "s.yaml"]).unwrap();
        assert_eq!(cli.verbose, 0);
        let cli = Cli::try_parse_from(["mspec", "-v", "inspect", "--schema", "s.yaml"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let cli = Cli::try_parse_from(["mspec", "-vvv", "inspect", "--schema", "s.yaml"]).unwrap();
        assert_eq!(cli.verbose, 3);
        let cli =
            Cli::try_parse_from(["mspec", "inspect", "--schema", "s.yaml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parse_validate() {
        let cli = Cli::try_parse_from([
            "mspec", "validate", "--schema", "s.yaml", "--record", "Holder", "data.json", "--json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Validate(_)));
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.schema, Path::new("s.yaml"));
            assert_eq!(args.record, "Holder");
            assert_eq!(args.document, Path::new("data.json"));
            assert!(args.json);
        }
    }

    #[test]
    fn cli_parse_validate_requires_record() {
        let result = Cli::try_parse_from(["mspec", "validate", "--schema", "s.yaml", "data.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_roundtrip_yaml() {
        let cli = Cli::try_parse_from([
            "mspec", "roundtrip", "--schema", "s.yaml", "--record", "Holder", "data.yml", "--yaml",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Roundtrip(_)));
        if let Commands::Roundtrip(args) = cli.command {
            assert_eq!(args.document, Path::new("data.yml"));
            assert!(args.yaml);
        }
    }

    #[test]
    fn cli_parse_inspect_optional_record() {
        let cli = Cli::try_parse_from(["mspec", "inspect", "--schema", "s.yaml"]).unwrap();
        if let Commands::Inspect(args) = cli.command {
            assert!(args.record.is_none());
        } else {
            panic!("expected inspect");
        }
        let cli =
            Cli::try_parse_from(["mspec", "inspect", "--schema", "s.yaml", "--record", "PartA"])
                .unwrap();
        if let Commands::Inspect(args) = cli.command {
            assert_eq!(args.record.as_deref(), Some("PartA"));
        } else {
            panic!("expected inspect");
        }
    }

    #[test]
    fn cli_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["mspec"]).is_err());
        assert!(Cli::try_parse_from(["mspec", "-v"]).is_err());
    }
}
