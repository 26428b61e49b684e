//! Live NuGet v3 registry client.
//!
//! Resolving the dependencies of one package takes three requests:
//!
//! 1. The service index, to find the `PackageBaseAddress/3.0.0` resource
//!    (fetched once per client).
//! 2. `<base><id>/index.json`, listing published versions. The last one is
//!    taken as the latest.
//! 3. `<base><id>/<version>/<id>.nuspec`, the package manifest.
//!
//! Ids are lowercased in URLs as the protocol requires. A registry cannot
//! list all of its packages, so this client only implements
//! [`PackageSource`].

use super::{nuspec, PackageSource};
use crate::domain::PackageName;
use crate::error::SourceError;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Resource type of the flat-container endpoint in the service index.
pub const PACKAGE_BASE_ADDRESS: &str = "PackageBaseAddress/3.0.0";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("depscope/", env!("CARGO_PKG_VERSION"));

/// HTTP timeout, configurable via `DEPSCOPE_HTTP_TIMEOUT` (seconds).
fn http_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let secs = std::env::var("DEPSCOPE_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        // Clamp to reasonable range (5-300 seconds)
        Duration::from_secs(secs.clamp(5, 300))
    })
}

#[derive(Debug, Deserialize)]
struct ServiceIndex {
    #[serde(default)]
    resources: Vec<ServiceResource>,
}

#[derive(Debug, Deserialize)]
struct ServiceResource {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct VersionIndex {
    #[serde(default)]
    versions: Vec<String>,
}

/// Client for a NuGet v3 registry.
pub struct RegistryClient {
    agent: ureq::Agent,
    index_url: String,
    base_address: OnceLock<String>,
}

impl RegistryClient {
    /// Create a client for the registry at `url`.
    ///
    /// `url` may point at the service index itself (ending in `.json`) or at
    /// the directory holding `index.json`. No request is made until the first
    /// lookup.
    pub fn new(url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(http_timeout())
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            index_url: service_index_url(url),
            base_address: OnceLock::new(),
        }
    }

    /// URL of the service index this client reads.
    pub fn service_index_url(&self) -> &str {
        &self.index_url
    }

    fn get(&self, url: &str, package: &PackageName) -> Result<ureq::Response, SourceError> {
        tracing::debug!(url, "GET");
        self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(404, _) => SourceError::NotFound(package.to_string()),
            ureq::Error::Status(code, _) => {
                SourceError::Transient(format!("HTTP {code} from {url}"))
            }
            ureq::Error::Transport(t) => SourceError::Transient(format!("{url}: {t}")),
        })
    }

    /// Flat-container base address, fetched from the service index once.
    fn package_base_address(&self, package: &PackageName) -> Result<&str, SourceError> {
        if let Some(base) = self.base_address.get() {
            return Ok(base.as_str());
        }
        let index: ServiceIndex = self
            .get(&self.index_url, package)
            .map_err(|e| match e {
                // A missing index is a registry problem, not a missing package.
                SourceError::NotFound(_) => {
                    SourceError::Transient(format!("service index not found at {}", self.index_url))
                }
                other => other,
            })?
            .into_json()
            .map_err(|e| SourceError::Parse(format!("service index: {e}")))?;
        let base = find_package_base_address(&index).ok_or_else(|| {
            SourceError::Parse(format!(
                "service index at {} has no {PACKAGE_BASE_ADDRESS} resource",
                self.index_url
            ))
        })?;
        Ok(self.base_address.get_or_init(|| base).as_str())
    }

    /// Latest published version of `package`.
    fn latest_version(&self, base: &str, package: &PackageName) -> Result<String, SourceError> {
        let url = format!("{base}{}/index.json", package.as_str().to_lowercase());
        let index: VersionIndex = self
            .get(&url, package)?
            .into_json()
            .map_err(|e| SourceError::Parse(format!("version index for {package}: {e}")))?;
        index
            .versions
            .last()
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("{package} (no published versions)")))
    }
}

impl PackageSource for RegistryClient {
    fn get_dependencies(
        &self,
        name: &PackageName,
    ) -> std::result::Result<Vec<PackageName>, SourceError> {
        let base = self.package_base_address(name)?;
        let version = self.latest_version(base, name)?;
        let url = nuspec_url(base, name, &version);
        let xml = self
            .get(&url, name)?
            .into_string()
            .map_err(|e| SourceError::Transient(format!("reading {url}: {e}")))?;
        let manifest = nuspec::parse(&xml)?;
        tracing::debug!(
            package = %name,
            version = %version,
            dependencies = manifest.dependencies.len(),
            "Fetched manifest"
        );
        Ok(manifest.dependencies)
    }
}

/// Service index URL for a registry URL.
fn service_index_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.ends_with(".json") {
        url.to_string()
    } else {
        format!("{url}/index.json")
    }
}

fn find_package_base_address(index: &ServiceIndex) -> Option<String> {
    index
        .resources
        .iter()
        .find(|r| r.kind == PACKAGE_BASE_ADDRESS)
        .map(|r| {
            if r.id.ends_with('/') {
                r.id.clone()
            } else {
                format!("{}/", r.id)
            }
        })
}

fn nuspec_url(base: &str, package: &PackageName, version: &str) -> String {
    let id = package.as_str().to_lowercase();
    format!("{base}{id}/{}/{id}.nuspec", version.to_lowercase())
}
