//! Input sanitization middleware.
//!
//! Every string leaf in the request body and query string is NUL-stripped
//! and HTML-escaped before it reaches business logic. Sanitization is
//! silent and total: non-string values pass through untouched, structure
//! and key order are preserved, and the request always continues to the
//! next stage. Escaping applies to every textual field, credentials
//! included; register and login both see the escaped form, so equality
//! comparisons stay consistent.

use axum::{
    body::Body,
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::utils::errors::AppError;

/// Matches the JSON payload limit the route handlers accept.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Escape one string: drop NUL bytes, then HTML-escape the five reserved
/// characters plus forward slash.
pub fn sanitize_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\0' => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Recursively sanitize a JSON value, preserving shape and key order.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, sanitize_value(item)))
                .collect(),
        ),
        other => other,
    }
}

fn sanitize_query(query: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
    let sanitized: Vec<(String, String)> = pairs
        .into_iter()
        .map(|(key, value)| (key, sanitize_str(&value)))
        .collect();
    serde_urlencoded::to_string(&sanitized).ok()
}

pub async fn sanitize_request(req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    if let Some(query) = parts.uri.query() {
        if let Some(new_query) = sanitize_query(query) {
            let path = parts.uri.path();
            let path_and_query = if new_query.is_empty() {
                path.to_string()
            } else {
                format!("{}?{}", path, new_query)
            };
            if let Ok(uri) = path_and_query.parse() {
                parts.uri = uri;
            }
        }
    }

    let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => return AppError::bad_request("Invalid request body").into_response(),
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => {
            let sanitized = sanitize_value(value);
            match serde_json::to_vec(&sanitized) {
                Ok(buf) => {
                    parts.headers.insert(header::CONTENT_LENGTH, buf.len().into());
                    Body::from(buf)
                }
                Err(_) => Body::from(bytes),
            }
        }
        // Not JSON (or empty): pass the original bytes through untouched.
        Err(_) => Body::from(bytes),
    };

    next.run(Request::from_parts(parts, body)).await
}
