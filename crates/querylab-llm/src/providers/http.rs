use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

use crate::error::{LlmError, Result};

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Send the request and fail on a non-2xx status, keeping the error body.
pub(crate) fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(LlmError::Api { status: status.as_u16(), body });
    }
    Ok(response)
}

pub(crate) fn send_json(request: RequestBuilder) -> Result<Value> {
    Ok(send(request)?.json()?)
}

/// Follow a JSON pointer to a string, or report what was missing.
pub(crate) fn text_at(value: &Value, pointer: &str) -> Result<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::MalformedResponse(format!("missing {pointer}")))
}
