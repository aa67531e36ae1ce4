use std::{
    fs::File,
    io::{self, BufWriter, Write},
    net::Ipv4Addr,
    path::PathBuf,
    process,
};

use clap::{Parser, Subcommand};
use fibeq::prelude::*;
use fibeq::ver::DiffOptions;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Check two IPv4 forwarding tables for equivalence", long_about = None)]
struct Args {
    /// Log filter, a level such as `debug` or directives like `fibeq_io=trace`
    #[arg(long, value_name = "FILTER", env = "FEQ_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every block where the two tables forward differently
    Diff {
        table_a: PathBuf,
        table_b: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Do not merge sibling blocks with the same hops
        #[arg(long)]
        raw: bool,

        /// Exit with status 1 when the tables differ
        #[arg(long)]
        exit_code: bool,
    },
    /// Resolve addresses by longest prefix match
    Lookup {
        table: PathBuf,

        #[arg(required = true, value_name = "ADDRESS")]
        addresses: Vec<Ipv4Addr>,
    },
    /// Print the trie a table loads into
    Dump { table: PathBuf },
}

#[derive(Error, Debug)]
enum FeqError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("could not write to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write to stdout: {0}")]
    Stdout(#[from] io::Error),
}

fn main() {
    let args = Args::parse();
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|err| {
        eprintln!("feq: ignoring log filter `{}`: {err}", args.log_level);
        EnvFilter::new("warn")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(args.command) {
        Ok(status) => process::exit(status),
        Err(err) => {
            error!(%err, "feq failed");
            eprintln!("feq: {err}");
            process::exit(2);
        }
    }
}

fn run(command: Command) -> Result<i32, FeqError> {
    let loader = DefaultTableLoader::default();
    match command {
        Command::Diff {
            table_a,
            table_b,
            output,
            raw,
            exit_code,
        } => {
            let a = loader.load_file(&table_a)?;
            let b = loader.load_file(&table_b)?;
            let report = a.diff_with(&b, DiffOptions { coalesce: !raw });
            info!(
                equivalent = report.is_equivalent(),
                records = report.len(),
                addresses = report.divergent_addresses(),
                "compared {} with {}",
                table_a.display(),
                table_b.display()
            );
            match output {
                Some(path) => {
                    let file = File::create(&path).map_err(|source| FeqError::Output {
                        path: path.clone(),
                        source,
                    })?;
                    write_report(BufWriter::new(file), &report)
                        .map_err(|source| FeqError::Output { path, source })?;
                }
                None => write_report(io::stdout().lock(), &report)?,
            }
            Ok(if exit_code && !report.is_equivalent() { 1 } else { 0 })
        }
        Command::Lookup { table, addresses } => {
            let trie = loader.load_file(&table)?;
            let mut out = io::stdout().lock();
            for addr in addresses {
                match trie.lookup_match(addr) {
                    Some((prefix, hop)) => writeln!(out, "{addr} -> {hop} ({prefix})")?,
                    None => writeln!(out, "{addr} -> {NO_ENTRY} (no entry)")?,
                }
            }
            out.flush()?;
            Ok(0)
        }
        Command::Dump { table } => {
            let trie = loader.load_file(&table)?;
            let mut out = io::stdout().lock();
            write!(out, "{}", trie.dump())?;
            out.flush()?;
            Ok(0)
        }
    }
}
