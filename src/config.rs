use crate::error::{Error, Result};

/// The name of the backend serving the site bucket. See the `Hosts` section of the
/// Fastly service UI for more information.
pub const BACKEND_NAME: &str = "site_bucket";

/// The name of the bucket holding the deployed site assets.
pub const BUCKET_NAME: &str = "site-assets";

/// The host that the bucket is served on. This is used to make requests to the backend.
pub const BUCKET_HOST: &str = "s3.us-east-1.amazonaws.com";

/// The storage service to sign requests for.
pub const BUCKET_SERVICE: &str = "s3";

/// The storage service region to use.
pub const BUCKET_REGION: &str = "us-east-1";

/// Access key ID for the storage service. Only read when the `auth` feature is on.
pub const BUCKET_ACCESS_KEY_ID: &str = "AKIA...<access key>";

/// Secret access key for the storage service.
/// Generated alongside the access key ID.
pub const BUCKET_SECRET_ACCESS_KEY: &str = "<secret key>";

/// A cache behavior of the distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Behavior {
    /// CloudFront path pattern. `*` is the default behavior.
    pub path_pattern: &'static str,
    /// Serve with zero TTLs so deploys show up immediately.
    pub no_ttl: bool,
    /// Add the security headers to responses for this behavior.
    pub security_headers: bool,
}

impl Behavior {
    pub fn is_default(&self) -> bool {
        self.path_pattern == DEFAULT_PATH_PATTERN
    }
}

pub const DEFAULT_PATH_PATTERN: &str = "*";

pub static BEHAVIORS: [Behavior; 4] = [
    Behavior { path_pattern: DEFAULT_PATH_PATTERN, no_ttl: false, security_headers: true },
    Behavior { path_pattern: "index.html", no_ttl: true, security_headers: true },
    Behavior { path_pattern: "robots.txt", no_ttl: true, security_headers: false },
    Behavior { path_pattern: "favicon.ico", no_ttl: true, security_headers: false },
];

/// Deploy-time parameters of the site stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// The domain name for the site, also the certificate subject.
    pub domain_name: String,
    /// Location of the built site assets to upload into the bucket.
    pub deployment_source: String,
}

impl SiteConfig {
    pub fn new(domain_name: impl Into<String>, deployment_source: impl Into<String>) -> Result<Self> {
        let config = Self { domain_name: domain_name.into(), deployment_source: deployment_source.into() };
        match config.is_valid() {
            Some(err) => Err(Error::InvalidSite(err)),
            None => Ok(config),
        }
    }

    pub fn is_valid(&self) -> Option<String> {
        if self.domain_name.is_empty() {
            return Some("Must provide a domain name".into());
        }
        if self.domain_name.ends_with('.') {
            return Some(format!("Invalid domain name {:?}\nMust not end with a dot", self.domain_name));
        }
        let wildcards = self.domain_name.matches('*').count();
        if wildcards > 1 {
            return Some(format!("Must only provide 1 wildcard. {} is invalid.", self.domain_name));
        }
        if wildcards == 1 && !self.domain_name.starts_with("*.") {
            return Some(format!(
                "If using a wildcard, it must be the first component of your domain, eg: \"*.something.com\". {} is invalid.",
                self.domain_name
            ));
        }
        if self.deployment_source.is_empty() {
            return Some("Must provide the location of the site assets to deploy".into());
        }
        None
    }
}
