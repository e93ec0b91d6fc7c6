use std::string::FromUtf8Error;

use hmac_sha256::{Hash, HMAC};
use thiserror::Error;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::config::{
    BUCKET_ACCESS_KEY_ID, BUCKET_HOST, BUCKET_NAME, BUCKET_REGION, BUCKET_SECRET_ACCESS_KEY,
    BUCKET_SERVICE,
};

/// Hash of an empty payload.
pub const EMPTY_PAYLOAD_HASH: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

#[derive(Debug, Error)]
pub enum SignError {
    #[error("failed to format request date: {0}")]
    Date(#[from] time::error::Format),
    #[error("request path is not UTF-8 once decoded: {0}")]
    Path(#[from] FromUtf8Error),
}

/// Where and as whom requests to the bucket are signed.
#[derive(Debug, Clone, Copy)]
pub struct BucketCredentials<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub bucket: &'a str,
    pub host: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

impl BucketCredentials<'static> {
    pub const fn from_config() -> Self {
        Self {
            access_key_id: BUCKET_ACCESS_KEY_ID,
            secret_access_key: BUCKET_SECRET_ACCESS_KEY,
            bucket: BUCKET_NAME,
            host: BUCKET_HOST,
            region: BUCKET_REGION,
            service: BUCKET_SERVICE,
        }
    }
}

impl BucketCredentials<'_> {
    /// Virtual-hosted style host of the bucket.
    pub fn bucket_host(&self) -> String {
        format!("{}.{}", self.bucket, self.host)
    }
}

/// SHA256 HMAC
fn sign<K: AsRef<[u8]>, I: AsRef<[u8]>>(key: &K, input: I) -> [u8; 32] {
    HMAC::mac(input.as_ref(), key.as_ref())
}

/// Create a hex output of the hash
pub fn hash(input: &str) -> String {
    hex::encode(Hash::hash(input.as_bytes()))
}

/// `x-amz-date` value for `now`.
pub fn amz_date(now: OffsetDateTime) -> Result<String, time::error::Format> {
    now.format(format_description!("[year][month][day]T[hour][minute][second]Z"))
}

/// Canonical URI of a request path as it arrived on the wire.
///
/// The path is decoded first so `%XX` sequences are not encoded twice, then everything
/// outside the unreserved set is encoded again, except `/`.
pub fn canonical_uri(path: &str) -> Result<String, FromUtf8Error> {
    let decoded = urlencoding::decode(path)?;
    Ok(urlencoding::encode(&decoded).replace("%2F", "/"))
}

/// Generate an AWSv4 signature for a given request.
/// Requests with payloads are not supported.
pub fn aws_v4_auth(
    creds: &BucketCredentials<'_>,
    method: &str,
    path: &str,
    now: OffsetDateTime,
) -> Result<String, SignError> {
    let x_amz_date = amz_date(now)?;
    let x_amz_today = now.format(format_description!("[year][month][day]"))?;

    let encoded_path = canonical_uri(path)?;

    // These must be sorted alphabetically
    let canonical_headers = format!(
        "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
        creds.bucket_host(),
        EMPTY_PAYLOAD_HASH,
        x_amz_date
    );
    let signed_headers = "host;x-amz-content-sha256;x-amz-date";

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, encoded_path, "", canonical_headers, signed_headers, EMPTY_PAYLOAD_HASH
    );

    let credential_scope = format!(
        "{}/{}/{}/aws4_request",
        x_amz_today, creds.region, creds.service
    );

    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        x_amz_date,
        credential_scope,
        hash(&canonical_request)
    );

    // Derive the signing key, then sign
    let signature = [creds.region, creds.service, "aws4_request", string_to_sign.as_str()]
        .iter()
        .fold(
            sign(&format!("AWS4{}", creds.secret_access_key), &x_amz_today),
            |acc, x| sign(&acc, x),
        );

    Ok(format!(
        "AWS4-HMAC-SHA256 Credential={}/{},SignedHeaders={},Signature={}",
        creds.access_key_id,
        credential_scope,
        signed_headers,
        hex::encode(signature)
    ))
}
