//! Canonicalizer backed by an external process, `msgcat -` by default.
//!
//! The catalog is written to the child's stdin from a separate task while
//! stdout and stderr are drained concurrently, so large catalogs cannot
//! deadlock on a full pipe. The whole exchange is bounded by the configured
//! timeout; on expiry the child is killed.
//!
//! Any output on stderr is treated as a failure, even if the exit status is
//! zero.

use std::io;
use std::path::Path;

use async_std::future;
use async_std::prelude::*;
use async_std::process::{Command, Stdio};
use async_std::task;

use crate::config::OracleConfig;
use crate::oracle::{Canonicalizer, OracleError};

pub struct MsgcatOracle {
    config: OracleConfig,
}

impl MsgcatOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    /// Whether the configured program can be found, either as a path or on `PATH`.
    pub fn is_available(&self) -> bool {
        let program = Path::new(&self.config.program);
        if program.components().count() > 1 {
            return program.is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false)
    }

    /// Async form of [`Canonicalizer::canonicalize`], for callers already
    /// running on an executor.
    pub async fn canonicalize_async(&self, text: &str) -> Result<String, OracleError> {
        let limit = self.config.timeout;
        future::timeout(limit, self.run(text))
            .await
            .map_err(|_| OracleError::Timeout(limit))?
    }

    async fn run(&self, text: &str) -> Result<String, OracleError> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OracleError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdin not captured"))?;
        let input = text.as_bytes().to_vec();

        // Feed stdin from its own task while output() drains stdout and stderr.
        let feeder = task::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.flush().await?;
            // closing stdin signals end of input
            drop(stdin);
            Ok::<(), io::Error>(())
        });

        let output = child.output().await?;
        let fed = feeder.await;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(program = %self.config.program, "canonicalizer wrote to stderr");
            return Err(OracleError::Diagnostics(stderr.into_owned()));
        }
        fed?;
        if !output.status.success() {
            return Err(OracleError::Status(output.status.to_string()));
        }

        String::from_utf8(output.stdout).map_err(|_| OracleError::Encoding)
    }
}

impl Canonicalizer for MsgcatOracle {
    /// Blocks the current thread. Must not be called from inside an async task;
    /// use [`MsgcatOracle::canonicalize_async`] there.
    fn canonicalize(&self, text: &str) -> Result<String, OracleError> {
        task::block_on(self.canonicalize_async(text))
    }
}
