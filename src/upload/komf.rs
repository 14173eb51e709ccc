//! `komf` upload client, grounded in `upload/komf.go`.
//!
//! komf answers with an HTML anchor (`<a href="...">name</a>`) rather than
//! JSON, so the response is scraped with the same regex the original uses.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::multipart;

use crate::error::UploadError;

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<a href="[^"]*">([^<]*)</a>"#).expect("valid regex"))
}

/// Upload a media file to the configured komf instance and return a
/// download URL built from `komf_public_url` (falling back to `komf_base`
/// when blank, per the config defaulting rule).
pub async fn upload(
    client: &reqwest::Client,
    komf_base: &str,
    komf_public_url: &str,
    komf_date: &str,
    local_path: &Path,
    remote_url: &str,
    file_name: &str,
) -> Result<String, UploadError> {
    if komf_base.trim().is_empty() {
        return Err(UploadError::NotConfigured);
    }

    let bytes = super::load_bytes(client, local_path, remote_url).await?;
    let part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
    let form = multipart::Form::new()
        .part("file", part)
        .text("date", komf_date.to_string());

    let resp = client.post(make_komf_url(komf_base)).multipart(form).send().await?;
    let body = resp
        .text()
        .await
        .map_err(|e| UploadError::BadResponse(e.to_string()))?;

    let name = anchor_regex()
        .captures(&body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| UploadError::BadResponse("komf response had no download link".into()))?;

    let base = if komf_public_url.trim().is_empty() {
        komf_base
    } else {
        komf_public_url
    };

    Ok(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        name.trim_start_matches('/')
    ))
}

fn make_komf_url(base: &str) -> String {
    if base.ends_with('/') {
        format!("{base}upload")
    } else {
        format!("{base}/upload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_upload() {
        assert_eq!(make_komf_url("https://komf.example"), "https://komf.example/upload");
    }

    #[test]
    fn scrapes_download_anchor() {
        let html = r#"<a href="/f/abc.png">abc.png</a>"#;
        let captured = anchor_regex().captures(html).unwrap();
        assert_eq!(&captured[1], "abc.png");
    }
}
