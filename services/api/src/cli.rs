use crate::demo::{
    run_audit, run_combine, run_demo, run_generate, AuditArgs, CombineArgs, GenerateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use va_ratings::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "VA Ratings",
    about = "Combine VA disability ratings and synthesize, audit or serve veteran populations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Combine individual condition ratings into a combined disability rating
    Combine(CombineArgs),
    /// Synthesize a seeded veteran population
    Generate(GenerateArgs),
    /// Audit a JSON array of veteran profiles for consistency
    Audit(AuditArgs),
    /// Walk through rating, compensation and audit behavior end to end
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Combine(args) => run_combine(args),
        Command::Generate(args) => run_generate(args).await,
        Command::Audit(args) => run_audit(args),
        Command::Demo => run_demo(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_a_subcommand() {
        let cli = Cli::try_parse_from(["va-ratings-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_combine_pairs() {
        let cli = Cli::try_parse_from(["va-ratings-api", "combine", "F43.10=70", "M54.5=20"])
            .expect("parses");
        match cli.command {
            Some(Command::Combine(args)) => {
                assert_eq!(args.conditions.len(), 2);
                assert_eq!(args.conditions[0].code, "F43.10");
                assert_eq!(args.conditions[0].rating, 70);
            }
            other => panic!("expected combine, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_combine_pairs() {
        assert!(Cli::try_parse_from(["va-ratings-api", "combine", "F43.10"]).is_err());
        assert!(Cli::try_parse_from(["va-ratings-api", "combine", "F43.10=abc"]).is_err());
    }

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "va-ratings-api",
            "generate",
            "--count",
            "25",
            "--seed",
            "7",
            "--baseline",
            "--json",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Generate(args)) => {
                assert_eq!(args.count, Some(25));
                assert_eq!(args.seed, Some(7));
                assert!(args.baseline);
                assert!(args.json);
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }
}
