use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use pohead::catalog::reader::MessageReader;
use pohead::catalog::writer::PoWriter;
use pohead::catalog::{CatalogEntry, CatalogError, Message};
use pohead::config::PoheadConfig;
use pohead::header::codec::{self, Diagnostic};
use pohead::header::extract::{extract_charset, extract_plural_count};
use pohead::header::fields::HeaderFields;
use pohead::header::stamp;
use pohead::oracle::msgcat::MsgcatOracle;
use pohead::oracle::{self, VerifyError};

#[derive(Parser)]
#[command(name = "pohead", version, about = "Inspect and edit the header of gettext PO catalogs")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print header fields, plural count and charset
    Show { file: PathBuf },
    /// Set a header field, appending it if missing
    Set {
        #[command(flatten)]
        target: Target,
        key: String,
        value: String,
    },
    /// Remove a header field
    Unset {
        #[command(flatten)]
        target: Target,
        key: String,
    },
    /// Stamp PO-Revision-Date with the current local time
    Stamp {
        #[command(flatten)]
        target: Target,
        /// Stamp POT-Creation-Date as well
        #[arg(long)]
        creation: bool,
    },
    /// Check that rewriting the header is lossless under the configured canonicalizer
    Verify { file: PathBuf },
}

#[derive(Args)]
struct Target {
    file: PathBuf,
    /// Rewrite the file instead of printing to stdout
    #[arg(long)]
    in_place: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("{0} malformed header line(s)")]
    Strict(usize),

    #[error("canonicalizer {0} not found")]
    OracleUnavailable(String),
}

/// A parsed catalog with the position of its header entry, if any.
struct Catalog {
    messages: Vec<Message>,
    header: Option<usize>,
}

impl Catalog {
    fn load(path: &Path) -> Result<Self, CliError> {
        let text = read(path)?;
        let messages = MessageReader::new(&text).collect::<Result<Vec<_>, _>>()?;
        let header = messages.iter().position(Message::is_header);
        Ok(Self { messages, header })
    }

    fn fields(&self) -> (HeaderFields, Vec<Diagnostic>) {
        match self.header {
            Some(idx) => codec::decode_entry(&self.messages[idx]),
            None => (HeaderFields::new(), Vec::new()),
        }
    }

    /// A catalog without a header only gets one when there is something to put in it.
    fn store(&mut self, fields: &HeaderFields) {
        match self.header {
            Some(idx) => codec::encode_into(fields, &mut self.messages[idx]),
            None if fields.iter().next().is_none() => {}
            None => {
                self.messages.insert(0, codec::fresh_header(fields));
                self.header = Some(0);
            }
        }
    }

    fn render(&self) -> Result<Vec<u8>, CliError> {
        let mut writer = PoWriter::new();
        let mut out = Vec::new();
        for msg in &self.messages {
            writer.write(msg, &mut out).map_err(CatalogError::from)?;
        }
        Ok(out)
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn report(diagnostics: &[Diagnostic], strict: bool) -> Result<(), CliError> {
    for diagnostic in diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    if strict && !diagnostics.is_empty() {
        return Err(CliError::Strict(diagnostics.len()));
    }
    Ok(())
}

fn show(path: &Path, cfg: &PoheadConfig) -> Result<(), CliError> {
    let catalog = Catalog::load(path)?;
    let (fields, diagnostics) = catalog.fields();
    report(&diagnostics, cfg.strict)?;

    let Some(idx) = catalog.header else {
        println!("(no header entry)");
        return Ok(());
    };
    for (key, value) in fields.iter() {
        println!("{key}: {value}");
    }

    let payload = catalog.messages[idx].text();
    if let Some(n) = extract_plural_count(payload) {
        println!("# plural forms: {n}");
    }
    if let Some(charset) = extract_charset(payload) {
        println!("# charset: {charset}");
    }
    Ok(())
}

fn edit<F>(target: &Target, cfg: &PoheadConfig, apply: F) -> Result<(), CliError>
where
    F: FnOnce(&mut HeaderFields),
{
    let mut catalog = Catalog::load(&target.file)?;
    let (mut fields, diagnostics) = catalog.fields();
    report(&diagnostics, cfg.strict)?;

    apply(&mut fields);
    catalog.store(&fields);
    let out = catalog.render()?;

    if target.in_place {
        fs::write(&target.file, &out).map_err(|source| CliError::Write {
            path: target.file.clone(),
            source,
        })?;
        tracing::info!(path = %target.file.display(), "header updated");
        return Ok(());
    }
    io::stdout().write_all(&out).map_err(|source| CliError::Write {
        path: PathBuf::from("<stdout>"),
        source,
    })
}

fn verify(path: &Path, cfg: &PoheadConfig) -> Result<(), CliError> {
    let oracle = MsgcatOracle::new(cfg.oracle.clone());
    if !oracle.is_available() {
        return Err(CliError::OracleUnavailable(cfg.oracle.program.clone()));
    }

    let text = read(path)?;
    match oracle::verify_round_trip(&oracle, &text) {
        Ok(trip) => {
            report(&trip.diagnostics, cfg.strict)?;
            println!("{}: ok", path.display());
            Ok(())
        }
        Err(VerifyError::Mismatch { expected, actual }) => {
            if let Some((line, (want, got))) = expected
                .lines()
                .zip(actual.lines())
                .enumerate()
                .find(|(_, (a, b))| a != b)
            {
                eprintln!("first difference at canonical line {}:", line + 1);
                eprintln!("  original:      {want}");
                eprintln!("  round-tripped: {got}");
            }
            Err(VerifyError::Mismatch { expected, actual }.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = cli
        .config
        .as_deref()
        .map(PoheadConfig::from_file)
        .unwrap_or_default();

    match cli.command {
        Command::Show { file } => show(&file, &cfg),
        Command::Set { target, key, value } => edit(&target, &cfg, |f| f.set(&key, &value)),
        Command::Unset { target, key } => edit(&target, &cfg, |f| f.remove(&key)),
        Command::Stamp { target, creation } => {
            let now = chrono::Local::now();
            edit(&target, &cfg, |f| {
                if creation {
                    stamp::stamp_creation_date(f, &now);
                }
                stamp::stamp_revision_date(f, &now);
            })
        }
        Command::Verify { file } => verify(&file, &cfg),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pohead=warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pohead: {err}");
            ExitCode::FAILURE
        }
    }
}
