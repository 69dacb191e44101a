//! Round-trip verification against a trusted catalog canonicalizer.
//!
//! The original catalog text and the text produced by [`round_trip`] are each
//! canonicalized on their own; the two results must be byte-identical. The
//! canonicalizer is injected through [`Canonicalizer`], so the check runs the
//! same against `msgcat` ([`msgcat::MsgcatOracle`]) or a test double.

pub mod msgcat;

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::reader::MessageReader;
use crate::catalog::writer::PoWriter;
use crate::catalog::CatalogError;
use crate::header::codec::{self, Diagnostic};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to run {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("I/O error talking to canonicalizer: {0}")]
    Io(#[from] io::Error),

    #[error("canonicalizer reported errors:\n{0}")]
    Diagnostics(String),

    #[error("canonicalizer exited with {0}")]
    Status(String),

    #[error("canonicalizer output is not UTF-8")]
    Encoding,

    #[error("canonicalizer did not finish within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("round-tripped catalog differs from the original after canonicalization")]
    Mismatch { expected: String, actual: String },
}

/// Turns catalog text into a canonical form, or fails with the tool's diagnostics.
pub trait Canonicalizer {
    fn canonicalize(&self, text: &str) -> Result<String, OracleError>;
}

impl<F> Canonicalizer for F
where
    F: Fn(&str) -> Result<String, OracleError>,
{
    fn canonicalize(&self, text: &str) -> Result<String, OracleError> {
        self(text)
    }
}

/// Result of pushing a catalog through the header codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Re-read a catalog, decode and re-encode its header payload, and write
/// every entry back out.
pub fn round_trip(text: &str) -> Result<RoundTrip, CatalogError> {
    let mut writer = PoWriter::new();
    let mut out: Vec<u8> = Vec::with_capacity(text.len());
    let mut diagnostics = Vec::new();

    for msg in MessageReader::new(text) {
        let mut msg = msg?;
        if msg.is_header() {
            let (fields, diags) = codec::decode_entry(&msg);
            diagnostics.extend(diags);
            codec::encode_into(&fields, &mut msg);
        }
        writer.write(&msg, &mut out)?;
    }

    Ok(RoundTrip {
        text: String::from_utf8_lossy(&out).into_owned(),
        diagnostics,
    })
}

/// Check that `text` survives [`round_trip`] unchanged in canonical form.
pub fn verify_round_trip<C>(oracle: &C, text: &str) -> Result<RoundTrip, VerifyError>
where
    C: Canonicalizer + ?Sized,
{
    let expected = oracle.canonicalize(text)?;
    let trip = round_trip(text)?;
    let actual = oracle.canonicalize(&trip.text)?;

    if expected != actual {
        tracing::warn!(
            expected_len = expected.len(),
            actual_len = actual.len(),
            "canonical forms differ"
        );
        return Err(VerifyError::Mismatch { expected, actual });
    }
    Ok(trip)
}
