//! CloudFormation template for the site: bucket, certificate, distribution, and
//! whichever mechanism attaches the security headers.

use serde_json::{json, Map, Value};

use crate::config::{Behavior, SiteConfig, BEHAVIORS};
use crate::headers::SECURITY_HEADERS;
use crate::site::FALLBACK_PATH;

pub const BUCKET: &str = "SiteBucket";
pub const BUCKET_POLICY: &str = "SiteBucketPolicy";
pub const CERTIFICATE: &str = "SiteCertificate";
pub const ORIGIN_ACCESS_IDENTITY: &str = "SiteOriginAccessIdentity";
pub const DISTRIBUTION: &str = "SiteDistribution";
pub const HEADERS_FUNCTION: &str = "HeadersFunction";
pub const HEADERS_FUNCTION_ROLE: &str = "HeadersFunctionRole";
pub const HEADERS_FUNCTION_VERSION: &str = "HeadersFunctionVersion";
pub const HEADERS_FUNCTION_LOGS: &str = "HeadersFunctionLogGroup";
pub const HEADERS_POLICY: &str = "SecurityHeadersPolicy";

const ORIGIN_ID: &str = "SiteBucketOrigin";
/// Edge functions only run on managed runtimes.
pub const EDGE_RUNTIME: &str = "nodejs20.x";
pub const EDGE_HANDLER: &str = "index.handler";
const LOG_RETENTION_DAYS: u32 = 5;

/// How the security headers get onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HeaderMode {
    /// An edge function on the origin-response trigger.
    #[value(name = "edge")]
    EdgeFunction,
    /// A managed response headers policy carrying the same values.
    #[default]
    #[value(name = "policy")]
    ResponseHeadersPolicy,
}

pub fn template(site: &SiteConfig, mode: HeaderMode) -> Value {
    let mut resources = Map::new();
    resources.insert(BUCKET.into(), bucket());
    resources.insert(BUCKET_POLICY.into(), bucket_policy());
    resources.insert(CERTIFICATE.into(), certificate(&site.domain_name));
    resources.insert(ORIGIN_ACCESS_IDENTITY.into(), origin_access_identity());
    resources.insert(DISTRIBUTION.into(), distribution(&site.domain_name, mode));

    match mode {
        HeaderMode::EdgeFunction => {
            resources.insert(HEADERS_FUNCTION_ROLE.into(), function_role());
            resources.insert(HEADERS_FUNCTION.into(), function());
            resources.insert(HEADERS_FUNCTION_VERSION.into(), function_version());
            resources.insert(HEADERS_FUNCTION_LOGS.into(), function_log_group());
        }
        HeaderMode::ResponseHeadersPolicy => {
            resources.insert(HEADERS_POLICY.into(), headers_policy());
        }
    }

    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": format!("Static website for {}", site.domain_name),
        "Metadata": {
            "SiteAssets": {
                "Source": site.deployment_source,
                "Destination": { "Ref": BUCKET },
                "InvalidateDistribution": { "Ref": DISTRIBUTION },
            }
        },
        "Resources": resources,
        "Outputs": {
            "Certificate": { "Value": { "Ref": CERTIFICATE } },
            "DistributionId": { "Value": { "Ref": DISTRIBUTION } },
            "DistributionDomainname": { "Value": { "Fn::GetAtt": [DISTRIBUTION, "DomainName"] } },
        },
    })
}

fn bucket() -> Value {
    json!({
        "Type": "AWS::S3::Bucket",
        "DeletionPolicy": "Delete",
        "UpdateReplacePolicy": "Delete",
        "Properties": {
            "WebsiteConfiguration": { "IndexDocument": "index.html" }
        }
    })
}

fn bucket_policy() -> Value {
    json!({
        "Type": "AWS::S3::BucketPolicy",
        "Properties": {
            "Bucket": { "Ref": BUCKET },
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {
                        "CanonicalUser": { "Fn::GetAtt": [ORIGIN_ACCESS_IDENTITY, "S3CanonicalUserId"] }
                    },
                    "Action": "s3:GetObject",
                    "Resource": { "Fn::Sub": format!("${{{BUCKET}.Arn}}/*") }
                }]
            }
        }
    })
}

fn certificate(domain_name: &str) -> Value {
    json!({
        "Type": "AWS::CertificateManager::Certificate",
        "Properties": {
            "DomainName": domain_name,
            "ValidationMethod": "DNS"
        }
    })
}

fn origin_access_identity() -> Value {
    json!({
        "Type": "AWS::CloudFront::CloudFrontOriginAccessIdentity",
        "Properties": {
            "CloudFrontOriginAccessIdentityConfig": { "Comment": "site bucket access" }
        }
    })
}

fn distribution(domain_name: &str, mode: HeaderMode) -> Value {
    let mut default_behavior = Value::Null;
    let mut cache_behaviors = Vec::new();
    for behavior in BEHAVIORS.iter() {
        let mut rendered = cache_behavior(behavior, mode);
        if behavior.is_default() {
            default_behavior = rendered;
        } else {
            rendered["PathPattern"] = json!(behavior.path_pattern);
            cache_behaviors.push(rendered);
        }
    }

    let error_responses: Vec<Value> = [403, 404]
        .iter()
        .map(|code| json!({ "ErrorCode": code, "ResponseCode": 200, "ResponsePagePath": FALLBACK_PATH }))
        .collect();

    json!({
        "Type": "AWS::CloudFront::Distribution",
        "Properties": {
            "DistributionConfig": {
                "Enabled": true,
                "Aliases": [domain_name],
                "ViewerCertificate": {
                    "AcmCertificateArn": { "Ref": CERTIFICATE },
                    "SslSupportMethod": "sni-only",
                    "MinimumProtocolVersion": "TLSv1.2_2018"
                },
                "CustomErrorResponses": error_responses,
                "Origins": [{
                    "Id": ORIGIN_ID,
                    "DomainName": { "Fn::GetAtt": [BUCKET, "RegionalDomainName"] },
                    "S3OriginConfig": {
                        "OriginAccessIdentity": {
                            "Fn::Sub": format!("origin-access-identity/cloudfront/${{{ORIGIN_ACCESS_IDENTITY}}}")
                        }
                    }
                }],
                "DefaultCacheBehavior": default_behavior,
                "CacheBehaviors": cache_behaviors
            }
        }
    })
}

fn cache_behavior(behavior: &Behavior, mode: HeaderMode) -> Value {
    let mut out = json!({
        "TargetOriginId": ORIGIN_ID,
        "ViewerProtocolPolicy": "redirect-to-https",
        "ForwardedValues": { "QueryString": false }
    });
    if behavior.no_ttl {
        out["MinTTL"] = json!(0);
        out["MaxTTL"] = json!(0);
        out["DefaultTTL"] = json!(0);
    }
    if behavior.security_headers {
        match mode {
            HeaderMode::EdgeFunction => {
                out["LambdaFunctionAssociations"] = json!([{
                    "EventType": "origin-response",
                    "LambdaFunctionARN": { "Ref": HEADERS_FUNCTION_VERSION }
                }]);
            }
            HeaderMode::ResponseHeadersPolicy => {
                out["ResponseHeadersPolicyId"] = json!({ "Ref": HEADERS_POLICY });
            }
        }
    }
    out
}

fn function_role() -> Value {
    json!({
        "Type": "AWS::IAM::Role",
        "Properties": {
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": ["lambda.amazonaws.com", "edgelambda.amazonaws.com"] },
                    "Action": ["sts:AssumeRole"]
                }]
            },
            "ManagedPolicyArns": [
                "arn:aws:iam::aws:policy/CloudFrontFullAccess",
                "arn:aws:iam::aws:policy/AWSLambdaExecute"
            ]
        }
    })
}

fn function() -> Value {
    json!({
        "Type": "AWS::Lambda::Function",
        "Properties": {
            "Runtime": EDGE_RUNTIME,
            "Handler": EDGE_HANDLER,
            "Code": { "ZipFile": edge_function_source() },
            "Role": { "Fn::GetAtt": [HEADERS_FUNCTION_ROLE, "Arn"] }
        }
    })
}

/// Inline source of the origin-response function, generated from [`SECURITY_HEADERS`].
pub fn edge_function_source() -> String {
    let mut src = String::from(
        "'use strict';\n\
         exports.handler = async (event) => {\n\
         \x20 const response = event.Records[0].cf.response;\n\
         \x20 const headers = response.headers;\n",
    );
    for (name, value) in SECURITY_HEADERS {
        // JSON string literals are valid JavaScript string literals
        let name = Value::from(name);
        let value = Value::from(value);
        src.push_str(&format!("  headers[{name}] = [{{ key: {name}, value: {value} }}];\n"));
    }
    src.push_str("  return response;\n};\n");
    src
}

fn function_version() -> Value {
    json!({
        "Type": "AWS::Lambda::Version",
        "Properties": { "FunctionName": { "Ref": HEADERS_FUNCTION } }
    })
}

fn function_log_group() -> Value {
    json!({
        "Type": "AWS::Logs::LogGroup",
        "Properties": {
            "LogGroupName": { "Fn::Sub": format!("/aws/lambda/${{{HEADERS_FUNCTION}}}") },
            "RetentionInDays": LOG_RETENTION_DAYS
        }
    })
}

fn header_value(name: &str) -> &'static str {
    SECURITY_HEADERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .unwrap_or_default()
}

/// Parses `max-age=N` out of the transport security value.
fn hsts_max_age(value: &str) -> u64 {
    value
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("max-age="))
        .find_map(|n| n.parse().ok())
        .unwrap_or(0)
}

fn headers_policy() -> Value {
    let hsts = header_value("strict-transport-security");
    let xss = header_value("x-xss-protection");
    json!({
        "Type": "AWS::CloudFront::ResponseHeadersPolicy",
        "Properties": {
            "ResponseHeadersPolicyConfig": {
                "Name": { "Fn::Sub": "${AWS::StackName}-security-headers" },
                "SecurityHeadersConfig": {
                    "StrictTransportSecurity": {
                        "AccessControlMaxAgeSec": hsts_max_age(hsts),
                        "IncludeSubdomains": hsts.contains("includeSubDomains"),
                        "Preload": hsts.contains("preload"),
                        "Override": true
                    },
                    "XSSProtection": {
                        "Protection": xss.starts_with('1'),
                        "ModeBlock": xss.contains("mode=block"),
                        "Override": true
                    },
                    "ContentTypeOptions": { "Override": true },
                    "FrameOptions": {
                        "FrameOption": header_value("x-frame-options"),
                        "Override": true
                    },
                    "ReferrerPolicy": {
                        "ReferrerPolicy": header_value("referrer-policy"),
                        "Override": true
                    }
                }
            }
        }
    })
}
