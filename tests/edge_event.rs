use secure_site_edge::event::Event;
use secure_site_edge::{headers, Error};
use serde_json::json;

#[test]
fn origin_response_gets_security_headers() {
    let event = Event::from_value(json!({
        "Records": [{"cf": {"response": {"headers": {
            "content-type": [{"key": "Content-Type", "value": "text/html"}]
        }}}}]
    }))
    .unwrap();

    let response = headers::handle(event).unwrap();
    let out = serde_json::to_value(&response).unwrap();

    assert_eq!(
        out,
        json!({"headers": {
            "content-type": [{"key": "Content-Type", "value": "text/html"}],
            "strict-transport-security": [{
                "key": "strict-transport-security",
                "value": "max-age=63072000; includeSubDomains; preload"
            }],
            "x-xss-protection": [{"key": "x-xss-protection", "value": "1; mode=block"}],
            "x-content-type-options": [{"key": "x-content-type-options", "value": "nosniff"}],
            "x-frame-options": [{"key": "x-frame-options", "value": "SAMEORIGIN"}],
            "referrer-policy": [{"key": "referrer-policy", "value": "strict-origin"}]
        }})
    );
}

#[test]
fn full_origin_response_round_trips() {
    let raw = br#"{
        "Records": [{"cf": {
            "config": {"distributionDomainName": "d111111abcdef8.cloudfront.net", "eventType": "origin-response"},
            "request": {"method": "GET", "uri": "/index.html", "headers": {}},
            "response": {
                "status": "200",
                "statusDescription": "OK",
                "headers": {
                    "x-frame-options": [{"key": "X-Frame-Options", "value": "DENY"}],
                    "last-modified": [{"key": "Last-Modified", "value": "Tue, 01 Jan 2019 00:00:00 GMT"}]
                }
            }
        }}]
    }"#;

    let response = headers::handle(Event::from_slice(raw).unwrap()).unwrap();
    let out = serde_json::to_value(&response).unwrap();

    assert_eq!(out["status"], "200");
    assert_eq!(out["statusDescription"], "OK");
    assert_eq!(out["headers"]["x-frame-options"], json!([{"key": "x-frame-options", "value": "SAMEORIGIN"}]));
    assert_eq!(
        out["headers"]["last-modified"],
        json!([{"key": "Last-Modified", "value": "Tue, 01 Jan 2019 00:00:00 GMT"}])
    );
    assert_eq!(out["headers"].as_object().unwrap().len(), 6);
}

#[test]
fn request_event_is_an_invocation_failure() {
    let event = Event::from_value(json!({
        "Records": [{"cf": {"request": {"method": "GET", "uri": "/"}}}]
    }))
    .unwrap();
    assert!(matches!(headers::handle(event), Err(Error::MissingResponse)));
}

#[test]
fn event_without_header_mapping_is_rejected() {
    let result = Event::from_value(json!({"Records": [{"cf": {"response": {"status": "200"}}}]}));
    assert!(matches!(result, Err(Error::Malformed(_))));
}
