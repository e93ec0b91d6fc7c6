//! Security headers added to every site response before it leaves the edge.

use crate::error::{Error, Result};
use crate::event::{Event, HeaderEntry, Headers, Response};

/// Header name (lowercase) and the value it is always set to.
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("strict-transport-security", "max-age=63072000; includeSubDomains; preload"),
    ("x-xss-protection", "1; mode=block"),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "strict-origin"),
];

/// Sets the owned headers, replacing whatever was there. Other keys are left alone.
pub fn apply(headers: &mut Headers) {
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name.to_string(), vec![HeaderEntry::new(name, value)]);
    }
}

pub fn inject(mut response: Response) -> Response {
    apply(&mut response.headers);
    response
}

/// Takes the response out of the first record and returns it with the security headers set.
pub fn handle(event: Event) -> Result<Response> {
    let record = event.records.into_iter().next().ok_or(Error::MissingRecord)?;
    let response = record.cf.response.ok_or(Error::MissingResponse)?;
    Ok(inject(response))
}
