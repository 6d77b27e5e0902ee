use axum::body::Bytes;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::image_host::ImageHost;
use crate::core::error::IngestError;
use crate::images::data_uri::to_data_uri;

/// A raw file part taken from a multipart request
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl ImageFile {
    pub fn new(bytes: impl Into<Bytes>, mime_type: &str) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.to_string(),
        }
    }
}

/// Uploads an ingestion batch to the image host.
///
/// All uploads of a batch run concurrently and the call returns once every one
/// of them has settled. The result is index-aligned with the input regardless of
/// completion order. A single failed upload fails the whole batch; no partial
/// URL list is ever returned.
///
/// Count and size limits are the caller's job.
#[derive(Clone)]
pub struct ImageIngestor {
    host: Arc<dyn ImageHost>,
}

impl ImageIngestor {
    pub fn new(host: Arc<dyn ImageHost>) -> Self {
        Self { host }
    }

    pub async fn ingest(&self, files: &[ImageFile]) -> Result<Vec<String>, IngestError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let uploads = files.iter().enumerate().map(|(index, file)| {
            let host = Arc::clone(&self.host);
            async move {
                let data_uri = to_data_uri(&file.bytes, &file.mime_type);
                host.upload(&data_uri).await.map_err(|source| {
                    warn!(index, mime_type = %file.mime_type, error = %source, "Image upload failed");
                    IngestError::Upload { index, source }
                })
            }
        });

        let settled = join_all(uploads).await;
        let urls = settled.into_iter().collect::<Result<Vec<_>, _>>()?;

        debug!(count = urls.len(), "Ingestion batch uploaded");
        Ok(urls)
    }
}
