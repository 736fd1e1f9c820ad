use anyhow::bail;
use clap::Parser;

mod cli;
mod config;
mod extract;
mod platform;
mod record;
mod scrape;
#[cfg(test)]
mod tests;
mod web;

use config::Config;
use extract::Pipeline;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();

    let mut config = Config::load_with(&args.config);

    match args.command {
        cli::Command::Daemon { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            web::start_daemon(config);
            Ok(())
        }

        cli::Command::Extract {
            url,
            no_primary,
            no_secondary,
        } => {
            // stop the shared browser even on an interrupted one-shot run
            ctrlc::set_handler(|| {
                scrape::shutdown_browser();
                std::process::exit(130);
            })
            .expect("failed to set Ctrl+C handler");

            let mut pipeline = Pipeline::new(&config);
            if no_primary {
                pipeline.disable_primary();
            }
            if no_secondary {
                pipeline.disable_secondary();
            }

            let result = pipeline.run(&url);
            scrape::shutdown_browser();

            match result {
                Ok(record) => {
                    println!("{}", serde_json::to_string_pretty(&record).unwrap());
                    Ok(())
                }
                Err(err) => bail!("extraction failed: {err}"),
            }
        }
    }
}
