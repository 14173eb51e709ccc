//! Media storage dispatch, grounded in `upload/upload.go`'s `storage` switch.
//!
//! Four backends: `pomf`/`komf` always re-upload to a public paste host;
//! `server` downloads into `data_dir` and serves it back out through
//! [`crate::http`]; anything else just honors `downloadmedia` for a local
//! copy with no public URL.

use std::path::{Path, PathBuf};

use crate::config::TelegramConfig;
use crate::upload;

fn local_path(data_dir: &Path, media_id: &str, ext: &str) -> PathBuf {
    data_dir.join(format!("{media_id}{ext}"))
}

/// Store one piece of media per the configured backend, returning the
/// public URL the message should carry (if any).
pub async fn store(
    client: &reqwest::Client,
    config: &TelegramConfig,
    data_dir: &Path,
    media_id: &str,
    ext: &str,
    remote_url: &str,
    file_name: &str,
) -> Option<String> {
    match config.storage.as_str() {
        "pomf" => {
            let local = local_path(data_dir, media_id, ext);
            match upload::pomf_upload(client, &config.pomf, &local, remote_url, file_name).await {
                Ok(url) => Some(url),
                Err(err) => {
                    tracing::warn!(target: "telegram", %err, "pomf upload failed");
                    None
                }
            }
        }

        "komf" => {
            let local = local_path(data_dir, media_id, ext);
            match upload::komf_upload(
                client,
                &config.komf,
                &config.komf_public_url,
                &config.komf_date,
                &local,
                remote_url,
                file_name,
            )
            .await
            {
                Ok(url) => Some(url),
                Err(err) => {
                    tracing::warn!(target: "telegram", %err, "komf upload failed");
                    None
                }
            }
        }

        "server" if config.download_media => {
            download_to_disk(client, data_dir, media_id, ext, remote_url).await;
            Some(format!(
                "{}/{media_id}{ext}",
                config.base_url.trim_end_matches('/')
            ))
        }

        _ => {
            if config.download_media {
                download_to_disk(client, data_dir, media_id, ext, remote_url).await;
            }
            None
        }
    }
}

/// Fetch `remote_url` into `data_dir/<media_id><ext>`, skipping the request
/// entirely if the file is already there from a prior run.
async fn download_to_disk(client: &reqwest::Client, data_dir: &Path, media_id: &str, ext: &str, remote_url: &str) {
    let path = local_path(data_dir, media_id, ext);
    if path.exists() {
        return;
    }

    let bytes = match client.get(remote_url).send().await {
        Ok(resp) => match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(target: "telegram", %err, "failed to read media body");
                return;
            }
        },
        Err(err) => {
            tracing::warn!(target: "telegram", %err, "failed to download media");
            return;
        }
    };

    if let Err(err) = tokio::fs::create_dir_all(data_dir).await {
        tracing::warn!(target: "telegram", %err, "failed to create media data dir");
        return;
    }
    if let Err(err) = tokio::fs::write(&path, &bytes).await {
        tracing::warn!(target: "telegram", %err, "failed to write media to disk");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_path_joins_id_and_extension() {
        let p = local_path(Path::new("/data"), "AgAD1", ".jpg");
        assert_eq!(p, PathBuf::from("/data/AgAD1.jpg"));
    }
}
