//! Archive download over HTTP(S)
//!
//! ## Timeouts
//!
//! Requests time out after 30 seconds by default. Override with
//! `transport.timeout_secs` in the recipe or the environment:
//! ```bash
//! export STAGE_HTTP_TIMEOUT=120
//! ```

use super::tls;
use crate::core::error::{Result, StageError};
use crate::core::output;
use crate::helpers::internal::progress::{self, upgrade_to_bytes};
use crate::helpers::internal::{fs_utils, url_utils};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// Default HTTP timeout in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Accepted timeout range in seconds
const MIN_HTTP_TIMEOUT_SECS: u64 = 5;
const MAX_HTTP_TIMEOUT_SECS: u64 = 300;

const USER_AGENT: &str = concat!("stage-recipe/", env!("CARGO_PKG_VERSION"));

/// How the archive is fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Skip server certificate verification. `None` leaves the choice to
    /// the layer below; verification stays on if nobody sets it.
    pub insecure: Option<bool>,
    /// Request timeout in seconds; `None` means env var or default.
    pub timeout_secs: Option<u64>,
}

impl TransportOptions {
    /// Whether certificate verification is switched off.
    pub fn is_insecure(&self) -> bool {
        self.insecure.unwrap_or(false)
    }

    /// Effective request timeout, clamped to a sane range.
    pub fn timeout(&self) -> Duration {
        let secs = self
            .timeout_secs
            .or_else(|| {
                std::env::var("STAGE_HTTP_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
            })
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        Duration::from_secs(secs.clamp(MIN_HTTP_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS))
    }

    /// Values set here win; unset values fall back to `base`.
    pub fn or(self, base: &TransportOptions) -> TransportOptions {
        TransportOptions {
            insecure: self.insecure.or(base.insecure),
            timeout_secs: self.timeout_secs.or(base.timeout_secs),
        }
    }
}

fn build_agent(options: &TransportOptions) -> Result<ureq::Agent> {
    let mut builder = ureq::AgentBuilder::new()
        .timeout(options.timeout())
        .user_agent(USER_AGENT);

    if options.is_insecure() {
        output::warning("TLS certificate verification is disabled for this download");
        builder = builder.tls_config(tls::insecure_client_config()?);
    }

    Ok(builder.build())
}

/// Download `url` to `dest`, returning the number of bytes written.
///
/// Any transport failure or non-2xx status is a [`StageError::Fetch`].
pub fn download(url: &str, dest: &Path, options: &TransportOptions) -> Result<u64> {
    fs_utils::ensure_parent_dir(dest)?;

    let agent = build_agent(options)?;
    let fetch_err = |reason: String| StageError::Fetch {
        url: url.to_string(),
        reason,
    };

    let filename = url_utils::extract_filename(url);
    let pb = progress::create_spinner(&format!("downloading {}", filename));

    let response = agent.get(url).call().map_err(|e| {
        pb.finish_and_clear();
        match e {
            ureq::Error::Status(code, _) => fetch_err(format!("server returned status {}", code)),
            ureq::Error::Transport(t) => fetch_err(t.to_string()),
        }
    })?;

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        upgrade_to_bytes(&pb, len);
    }

    let mut file = std::fs::File::create(dest)
        .map_err(|e| StageError::io(format!("cannot create {}", dest.display()), e))?;

    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(n) => n,
            Err(e) => {
                pb.finish_and_clear();
                return Err(fetch_err(format!("read error: {}", e)));
            }
        };

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| StageError::io(format!("write error for {}", dest.display()), e))?;

        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    pb.finish_and_clear();
    output::detail(&format!("downloaded {} ({} bytes)", filename, total_bytes));
    Ok(total_bytes)
}
