use clap::Parser;
use depimpact::cli::{self, Args};
use depimpact::error::RunError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    match cli::run(&args, &mut stdout).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            if let RunError::Validation(errors) = &err {
                eprintln!("Project validation failed:");
                for error in errors {
                    eprintln!("  - {error}");
                }
            } else {
                eprintln!("error: {err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
