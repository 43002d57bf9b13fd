//! Token request construction for the supported password transforms.

use crate::model::{AuthScheme, Credentials};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const LANGUAGE: &str = "en";

/// Query string and JSON body for `/account/v1.0/token`.
#[derive(Debug)]
pub struct TokenRequest {
    pub query: Vec<(&'static str, String)>,
    pub body: Value,
}

pub fn token_request(
    scheme: AuthScheme,
    credentials: &Credentials,
    timestamp_ms: u64,
) -> TokenRequest {
    match scheme {
        AuthScheme::Plaintext => TokenRequest {
            query: Vec::new(),
            body: json!({
                "appId": credentials.app_id,
                "appSecret": credentials.app_secret,
                "email": credentials.email,
                "password": credentials.password,
            }),
        },
        AuthScheme::Sha256 => TokenRequest {
            query: app_query(credentials),
            body: json!({
                "email": credentials.email,
                "password": sha256_hex(&credentials.password),
                "appSecret": credentials.app_secret,
            }),
        },
        AuthScheme::Md5Signature => {
            let timestamp = timestamp_ms.to_string();
            let params = BTreeMap::from([
                ("appId", credentials.app_id.as_str()),
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
                ("timestamp", timestamp.as_str()),
            ]);
            TokenRequest {
                query: app_query(credentials),
                body: json!({
                    "appId": credentials.app_id,
                    "timestamp": timestamp_ms,
                    "sign": md5_sign(&params, &credentials.app_secret),
                }),
            }
        }
    }
}

fn app_query(credentials: &Credentials) -> Vec<(&'static str, String)> {
    vec![
        ("appId", credentials.app_id.to_owned()),
        ("language", LANGUAGE.to_owned()),
    ]
}

pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    format!("{:x}", digest)
}

/// `key=value` pairs joined with `&` in key order.
pub fn canonical(params: &BTreeMap<&str, &str>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn md5_sign(params: &BTreeMap<&str, &str>, secret: &str) -> String {
    let digest = md5::compute(format!("{}{}", canonical(params), secret).as_bytes());
    format!("{:x}", digest)
}
