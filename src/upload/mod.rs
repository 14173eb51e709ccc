//! Media upload clients for the `pomf`/`komf` storage backends.
//!
//! Both mirror the shape of `upload/pomf.go` and `upload/komf.go`: check
//! whether the file was already downloaded locally before re-fetching it
//! from Telegram, then POST it as `multipart/form-data`.

mod komf;
mod pomf;

pub use komf::upload as komf_upload;
pub use pomf::upload as pomf_upload;

use std::path::Path;

use crate::error::UploadError;

/// Bytes for a media item, either read from `local_path` if it already
/// exists (downloaded by the Telegram driver) or streamed in fresh from
/// Telegram's file URL.
pub(crate) async fn load_bytes(
    client: &reqwest::Client,
    local_path: &Path,
    remote_url: &str,
) -> Result<bytes::Bytes, UploadError> {
    if local_path.exists() {
        let data = tokio::fs::read(local_path)
            .await
            .map_err(|e| UploadError::BadResponse(e.to_string()))?;
        return Ok(bytes::Bytes::from(data));
    }

    let resp = client.get(remote_url).send().await?;
    Ok(resp.bytes().await?)
}

/// Extract the file extension (including the leading dot) from a Telegram
/// file URL's final path segment, matching `pomf.go`'s `strings.Split` on
/// `/` then `.`.
pub(crate) fn extension_from_url(url: &str) -> String {
    let name = url.rsplit('/').next().unwrap_or("");
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!(".{ext}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_extension() {
        assert_eq!(
            extension_from_url("https://t.me/file/photos/file_1.jpg"),
            ".jpg"
        );
        assert_eq!(extension_from_url("https://t.me/file/photos/noext"), "");
    }
}
