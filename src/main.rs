//! Compute@Edge static site program.

use fastly::http::header::{ALLOW, AUTHORIZATION, HOST};
use fastly::http::{Method, StatusCode};
use fastly::{Error, Request, Response};
use secure_site_edge::config::BACKEND_NAME;
use secure_site_edge::headers::SECURITY_HEADERS;
use secure_site_edge::site::{self, FALLBACK_PATH};

cfg_if::cfg_if! {
    if #[cfg(feature = "auth")] {
        use secure_site_edge::awsv4::{self, BucketCredentials, EMPTY_PAYLOAD_HASH};

        fn origin_host() -> String {
            BucketCredentials::from_config().bucket_host()
        }

        /// Signs the bucket request so a private bucket will serve it.
        fn sign(bereq: &mut Request, method: &Method, path: &str) -> Result<(), Error> {
            let creds = BucketCredentials::from_config();
            let now = time::OffsetDateTime::now_utc();
            bereq.set_header("x-amz-content-sha256", EMPTY_PAYLOAD_HASH);
            bereq.set_header("x-amz-date", awsv4::amz_date(now)?);
            bereq.set_header(AUTHORIZATION, awsv4::aws_v4_auth(&creds, method.as_str(), path, now)?);
            Ok(())
        }
    } else {
        use secure_site_edge::config::{BUCKET_HOST, BUCKET_NAME};

        fn origin_host() -> String {
            format!("{}.{}", BUCKET_NAME, BUCKET_HOST)
        }

        fn sign(_bereq: &mut Request, _method: &Method, _path: &str) -> Result<(), Error> {
            Ok(())
        }
    }
}

/// Fetches `path` from the bucket backend, bypassing the cache when `pass` is set.
fn fetch(method: &Method, path: &str, pass: bool) -> Result<Response, Error> {
    let host = origin_host();
    let mut bereq = Request::new(method.clone(), format!("https://{}{}", host, path));
    bereq.set_header(HOST, host.as_str());
    if pass {
        bereq.set_pass(true);
    }
    sign(&mut bereq, method, path)?;
    Ok(bereq.send(BACKEND_NAME)?)
}

/// The entry point for the site.
///
/// Directory paths serve their `index.html`. Objects the bucket reports as missing or
/// forbidden are answered with the root `index.html` so client-side routes resolve.
/// Page responses leave with the security headers set.
///
/// If `main` returns an error, a 500 error response will be delivered to the client.
#[fastly::main]
fn main(req: Request) -> Result<Response, Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .without_time()
        .init();

    let method = req.get_method().clone();
    if method != Method::GET && method != Method::HEAD {
        return Ok(Response::from_status(StatusCode::METHOD_NOT_ALLOWED).with_header(ALLOW, "GET, HEAD"));
    }

    let mut path = site::resolve_path(req.get_path());
    let mut behavior = site::behavior_for(&path);
    let mut beresp = fetch(&method, &path, behavior.no_ttl)?;

    if site::is_fallback_status(beresp.get_status().as_u16()) {
        tracing::debug!(%path, status = beresp.get_status().as_u16(), "serving fallback page");
        path = FALLBACK_PATH.to_string();
        behavior = site::behavior_for(&path);
        beresp = fetch(&method, &path, behavior.no_ttl)?;
        if beresp.get_status().is_success() {
            beresp.set_status(StatusCode::OK);
        }
    }

    if behavior.security_headers {
        for (name, value) in SECURITY_HEADERS {
            beresp.set_header(name, value);
        }
    }

    Ok(beresp)
}
