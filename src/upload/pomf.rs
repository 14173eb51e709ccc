//! `pomf`-clone upload client, grounded in `upload/pomf.go`.

use std::path::Path;

use reqwest::multipart;
use serde::Deserialize;

use crate::error::UploadError;

#[derive(Debug, Deserialize)]
struct PomfResponse {
    #[allow(dead_code)]
    success: bool,
    files: Vec<PomfFile>,
}

#[derive(Debug, Deserialize)]
struct PomfFile {
    url: String,
}

/// Upload a media file (from `local_path` if already downloaded, otherwise
/// fetched fresh from `remote_url`) to the configured pomf clone and return
/// the hosted URL.
pub async fn upload(
    client: &reqwest::Client,
    pomf_base: &str,
    local_path: &Path,
    remote_url: &str,
    file_name: &str,
) -> Result<String, UploadError> {
    if pomf_base.trim().is_empty() {
        return Err(UploadError::NotConfigured);
    }

    let bytes = super::load_bytes(client, local_path, remote_url).await?;
    let part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
    let form = multipart::Form::new().part("files[]", part);

    let resp = client.post(make_pomf_url(pomf_base)).multipart(form).send().await?;
    let parsed: PomfResponse = resp
        .json()
        .await
        .map_err(|e| UploadError::BadResponse(e.to_string()))?;

    parsed
        .files
        .into_iter()
        .next()
        .map(|f| f.url)
        .ok_or_else(|| UploadError::BadResponse("pomf response had no files".into()))
}

fn make_pomf_url(base: &str) -> String {
    if base.ends_with('/') {
        format!("{base}upload.php")
    } else {
        format!("{base}/upload.php")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_upload_php() {
        assert_eq!(
            make_pomf_url("https://p.fuwafuwa.moe"),
            "https://p.fuwafuwa.moe/upload.php"
        );
        assert_eq!(
            make_pomf_url("https://p.fuwafuwa.moe/"),
            "https://p.fuwafuwa.moe/upload.php"
        );
    }
}
