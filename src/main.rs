// reflgen: reflection metadata generator for C++-like sources

use anyhow::{Context, Result};
use clap::Parser;
use reflgen::{driver, init_logging, Config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source tree to scan
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Directory for the per-file artifacts
    #[arg(short, long, default_value = "generated")]
    out: PathBuf,

    /// File-spanning declarations artifact [default: <OUT>/reflection_decls.h]
    #[arg(short, long)]
    aggregate: Option<PathBuf>,

    /// Include used for the reflection support header
    #[arg(long, default_value = "reflection.h")]
    support_header: String,

    /// Namespace wrapping the generated definitions
    #[arg(long, default_value = "reflect")]
    namespace: String,

    /// Log at debug level and print every unparsed construct
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            aggregate: self
                .aggregate
                .unwrap_or_else(|| self.out.join("reflection_decls.h")),
            root: self.root,
            out_dir: self.out,
            support_header: self.support_header,
            namespace: self.namespace,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let verbose = args.verbose;
    let config = args.into_config();

    let summary = driver::run(&config)
        .with_context(|| format!("generating reflection for {}", config.root.display()))?;

    if verbose {
        for line in &summary.diagnostics {
            eprintln!("{line}");
        }
    }
    eprintln!(
        "Processed {} files, wrote {} artifacts ({} unparsed constructs).",
        summary.files,
        summary.written,
        summary.diagnostics.len()
    );
    Ok(())
}
