//! Helpers for asserting on requests captured by a `wiremock` server.

use wiremock::Request;

/// Text fields of a captured `multipart/form-data` request, in order.
///
/// Returns an empty list when the request is not multipart.
pub fn multipart_fields(request: &Request) -> Vec<(String, String)> {
    let Some(boundary) = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split("boundary=").nth(1))
        .map(|b| b.trim_matches('"').to_string())
    else {
        return Vec::new();
    };

    let body = String::from_utf8_lossy(&request.body);
    let delimiter = format!("--{}", boundary);

    body.split(delimiter.as_str())
        .filter_map(|part| {
            let (headers, value) = part.split_once("\r\n\r\n")?;
            let name = headers
                .split("name=\"")
                .nth(1)?
                .split('"')
                .next()?
                .to_string();
            let value = value.strip_suffix("\r\n").unwrap_or(value).to_string();
            Some((name, value))
        })
        .collect()
}

/// Value of the first multipart field with this name.
pub fn multipart_field(request: &Request, name: &str) -> Option<String> {
    multipart_fields(request)
        .into_iter()
        .find(|(field, _)| field == name)
        .map(|(_, value)| value)
}
