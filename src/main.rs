use std::fs::File;
use std::io::stdout;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use log::error;

use deptstats::reader::HeaderMode;
use deptstats::{summarize, Config};

/// Per-department order counts and first-order percentages
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Product catalog CSV (product id in column 0, department id in column 3)
    products: PathBuf,

    /// Order lines CSV (product id in column 1, reordered flag in column 3)
    orders: PathBuf,

    /// Report CSV to write; printed to stdout when omitted
    output: Option<PathBuf>,

    /// Malformed rows skipped per file before giving up [default: unlimited]
    #[arg(short, long)]
    tolerance: Option<usize>,

    /// Whether the input files start with a header line
    #[arg(long, value_enum, default_value_t = HeaderMode::Auto)]
    header: HeaderMode,

    /// Send log output to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = parse_args();

    let logs_to_file = args.log_file.is_some();
    if let Err(e) = init_logging(args.log_file.as_deref()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        error!("Aborting: {:#}", e);
        if logs_to_file {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

// Usage errors exit with 1 like every other failure; help and version exit 0
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file `{}`", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn build_config(args: Args) -> Config {
    let mut config = Config::new(args.products, args.orders).with_header(args.header);
    if let Some(tolerance) = args.tolerance {
        config = config.with_tolerance(tolerance);
    }
    if let Some(output) = args.output {
        config = config.with_output(output);
    }
    config
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = build_config(args);
    let to_stdout = config.output.is_none();

    // File reads block, keep them off the runtime's worker threads
    let report = tokio::task::spawn_blocking(move || summarize(&config))
        .await
        .context("summary task panicked")??;

    if to_stdout {
        report
            .write_csv(stdout())
            .context("cannot write report to stdout")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::parse_from([
            "deptstats",
            "products.csv",
            "orders.csv",
            "report.csv",
            "--tolerance",
            "5",
            "--header",
            "present",
        ]);
        let config = build_config(args);

        assert_eq!(config.products, PathBuf::from("products.csv"));
        assert_eq!(config.orders, PathBuf::from("orders.csv"));
        assert_eq!(config.output, Some(PathBuf::from("report.csv")));
        assert_eq!(config.tolerance, 5);
        assert_eq!(config.header, HeaderMode::Present);
    }

    #[test]
    fn test_parse_defaults() {
        let config = build_config(Args::parse_from(["deptstats", "p.csv", "o.csv"]));

        assert_eq!(config.output, None);
        assert_eq!(config.tolerance, usize::MAX);
        assert_eq!(config.header, HeaderMode::Auto);
    }

    #[test]
    fn test_missing_orders_argument() {
        assert!(Args::try_parse_from(["deptstats", "p.csv"]).is_err());
    }
}
