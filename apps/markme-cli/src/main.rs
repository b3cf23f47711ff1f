//! mark binary
//!
//! Logs go to stderr; the result line or JSON report goes to stdout.

use clap::Parser;
use markme_cli::{run, Args, Config};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = Config::load(args.config.as_deref())
        .and_then(|config| run(&args, &config))
        .and_then(|outcome| Ok((outcome.render(args.json)?, outcome.exit_code())));

    match result {
        Ok((text, 0)) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Ok((text, code)) => {
            if args.json {
                println!("{}", text);
            } else {
                eprintln!("{}", text);
            }
            ExitCode::from(code)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
