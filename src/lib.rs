//! # Introduction
//!
//! reflgen scans C++-like headers and implementation files and generates
//! reflection metadata for every struct, class, union and enum it finds:
//! per-field string and UI serializers, offset/size field tables, and
//! enum-value-to-name tables.
//!
//! It is not a compiler front end. Only the shapes needed for the tables are
//! parsed; method bodies, initializers and everything else are skipped by
//! balancing brackets.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Scanner → Parser → ParseOutput → Codegen → Artifacts
//! ```
//!
//! 1. [`parser`] tokenises the source lazily and collects types, forward
//!    declarations and diagnostics.
//! 2. [`codegen`] renders the collected shapes as text.
//! 3. [`generator`] picks the mode for one file and produces its artifact;
//!    [`generator::Aggregate`] assembles the file-spanning declarations.
//! 4. [`driver`] walks a source tree, generates files in parallel and writes
//!    only the artifacts that changed.
//! 5. [`config`] holds the run settings and the file-role rules.

pub mod codegen;
pub mod config;
pub mod driver;
pub mod generator;
pub mod parser;

pub use config::{Config, FileRole};
pub use generator::{generate, Aggregate, FileOutput, GenerateError, Mode};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "reflgen=debug" } else { "reflgen=info" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
