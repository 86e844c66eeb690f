//! URL Guard: scheme and host policy for remote fetches.
//!
//! Validation is pure. The input is parsed with the `url` crate (WHATWG
//! rules), so numeric host spellings such as `http://2130706433/` or
//! `http://0x7f.1/` are normalised to dotted IPv4 before the host check runs.
//!
//! Only literal hosts are inspected. A hostname that resolves to a private
//! address at fetch time is not caught here, and IPv6 hosts are never
//! refused.

use crate::config::FetchPolicy;
use crate::error::UrlError;
use std::fmt;
use std::net::Ipv4Addr;
use tracing::debug;
use url::{Host, Url};

/// A URL that passed every guard check.
///
/// Only [`UrlGuard`] constructs one, so holding a `ValidatedUrl` is proof the
/// policy was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(Url);

impl ValidatedUrl {
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_url(self) -> Url {
        self.0
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Applies a [`FetchPolicy`]'s scheme and host rules.
#[derive(Debug, Clone)]
pub struct UrlGuard {
    policy: FetchPolicy,
}

impl UrlGuard {
    pub fn new(policy: FetchPolicy) -> Self {
        Self { policy }
    }

    /// Parse and check `input`.
    pub fn validate(&self, input: &str) -> Result<ValidatedUrl, UrlError> {
        let trimmed = input.trim();
        let url = Url::parse(trimmed).map_err(|e| {
            debug!("Rejecting '{}': {}", trimmed, e);
            UrlError::InvalidFormat {
                input: trimmed.to_string(),
            }
        })?;
        self.check_url(&url)?;
        Ok(ValidatedUrl(url))
    }

    /// Check an already-parsed URL. Also used for every redirect hop.
    pub fn check_url(&self, url: &Url) -> Result<(), UrlError> {
        let scheme = url.scheme();
        if !self
            .policy
            .allowed_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
        {
            return Err(UrlError::UnsupportedScheme {
                scheme: scheme.to_string(),
            });
        }

        let host = url.host().ok_or_else(|| UrlError::InvalidFormat {
            input: url.to_string(),
        })?;

        if (self.policy.blocked_host)(&host) {
            return Err(UrlError::ForbiddenHost {
                host: host.to_string(),
            });
        }
        Ok(())
    }
}

/// Default host rule: `localhost`, `0.0.0.0`, and IPv4 in `127.0.0.0/8`,
/// `10.0.0.0/8`, `172.16.0.0/12` or `192.168.0.0/16`.
pub fn is_forbidden_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.strip_suffix('.').unwrap_or(name);
            if name.eq_ignore_ascii_case("localhost") {
                return true;
            }
            // Opaque hosts are not normalised by the url crate.
            name.parse::<Ipv4Addr>().is_ok_and(|ip| is_forbidden_ipv4(&ip))
        }
        Host::Ipv4(ip) => is_forbidden_ipv4(ip),
        Host::Ipv6(_) => false,
    }
}

fn is_forbidden_ipv4(ip: &Ipv4Addr) -> bool {
    ip.is_unspecified() || ip.is_loopback() || ip.is_private()
}
