//! Payload files on local disk.
//!
//! Layout: `{root}/{namespace}/{bucket}/{key}`. The key is split on `/` and
//! every segment but the last becomes a directory, so `logs/2024/app.log`
//! lands in `logs/2024/` as file `app.log%`.
//!
//! Component encoding keeps the mapping injective and inside the bucket:
//!
//! - `%`, `\`, controls, non-ASCII and a leading `.` are percent-encoded, so
//!   no component is `.`, `..` or starts like a temp file;
//! - an empty segment becomes `%`, which encoding never produces;
//! - the leaf carries a trailing `%`, so `a` (a file) and `a/b` (a directory
//!   `a`) never clash;
//! - a segment whose encoding exceeds [`MAX_COMPONENT_BYTES`] is replaced by
//!   `%h` plus its hex MD5, keeping every component under `NAME_MAX`.

use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use bytes::Bytes;
use cloudmock_core::Namespace;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::{debug, trace};

use crate::{
    checksums::compute_md5,
    error::{DataPlaneError, DataPlaneResult},
};

const SEGMENT: &AsciiSet = &CONTROLS.add(b'%').add(b'/').add(b'\\');

/// Longest encoded component kept verbatim. Leaves room for the leaf marker
/// below the common 255-byte `NAME_MAX`.
pub const MAX_COMPONENT_BYTES: usize = 200;

/// Stand-in for an empty segment. Encoding never yields a bare `%`.
const EMPTY_COMPONENT: &str = "%";

/// Suffix of the component holding the payload.
const LEAF_MARKER: char = '%';

/// Prefix of hashed components. `%h` is never a valid escape.
const HASHED_PREFIX: &str = "%h";

/// Prefix of in-flight temp files. Encoded components never start with `.`.
const TEMP_PREFIX: &str = ".upload-";

fn encode_component(raw: &str) -> String {
    if raw.is_empty() {
        return EMPTY_COMPONENT.to_owned();
    }
    let encoded = match raw.strip_prefix('.') {
        Some(rest) => format!("%2E{}", utf8_percent_encode(rest, SEGMENT)),
        None => utf8_percent_encode(raw, SEGMENT).to_string(),
    };
    if encoded.len() > MAX_COMPONENT_BYTES {
        format!("{HASHED_PREFIX}{}", compute_md5(raw.as_bytes()))
    } else {
        encoded
    }
}

/// Filesystem store for object payloads.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// A store rooted at `root`. Directories are created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every payload of one bucket.
    #[must_use]
    pub fn bucket_dir(&self, namespace: &Namespace, bucket: &str) -> PathBuf {
        self.root
            .join(encode_component(namespace.as_str()))
            .join(encode_component(bucket))
    }

    /// File holding one object's payload.
    #[must_use]
    pub fn object_path(&self, namespace: &Namespace, bucket: &str, key: &str) -> PathBuf {
        let mut path = self.bucket_dir(namespace, bucket);
        let mut segments = key.split('/').peekable();
        while let Some(segment) = segments.next() {
            let mut component = encode_component(segment);
            if segments.peek().is_none() {
                component.push(LEAF_MARKER);
            }
            path.push(component);
        }
        path
    }

    /// Durably write a payload, replacing any previous one atomically.
    pub async fn write(
        &self,
        namespace: &Namespace,
        bucket: &str,
        key: &str,
        data: Bytes,
    ) -> DataPlaneResult<PathBuf> {
        let path = self.object_path(namespace, bucket, key);
        let dir = path
            .parent()
            .map_or_else(|| self.bucket_dir(namespace, bucket), Path::to_path_buf);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DataPlaneError::io(&dir, e))?;

        let target = path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &target, &data))
            .await
            .map_err(|e| DataPlaneError::io(&path, std::io::Error::other(e)))??;

        trace!(path = %path.display(), "payload written");
        Ok(path)
    }

    /// Read a payload. `None` when the file does not exist.
    pub async fn read(
        &self,
        namespace: &Namespace,
        bucket: &str,
        key: &str,
    ) -> DataPlaneResult<Option<Bytes>> {
        let path = self.object_path(namespace, bucket, key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DataPlaneError::io(path, e)),
        }
    }

    /// Whether a payload file exists, without reading it.
    pub async fn exists(&self, namespace: &Namespace, bucket: &str, key: &str) -> DataPlaneResult<bool> {
        let path = self.object_path(namespace, bucket, key);
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DataPlaneError::io(path, e)),
        }
    }

    /// Remove a payload. Absence is not an error.
    pub async fn remove(&self, namespace: &Namespace, bucket: &str, key: &str) -> DataPlaneResult<()> {
        let path = self.object_path(namespace, bucket, key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DataPlaneError::io(path, e)),
        }
    }

    /// Remove a bucket directory and anything left in it.
    pub async fn remove_bucket(&self, namespace: &Namespace, bucket: &str) -> DataPlaneResult<()> {
        let dir = self.bucket_dir(namespace, bucket);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(dir = %dir.display(), "bucket directory removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DataPlaneError::io(dir, e)),
        }
    }
}

fn write_atomic(dir: &Path, target: &Path, data: &[u8]) -> DataPlaneResult<()> {
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| DataPlaneError::io(dir, e))?;
    temp.write_all(data)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| DataPlaneError::io(temp.path(), e))?;
    temp.persist(target)
        .map_err(|e| DataPlaneError::io(target, e.error))?;
    Ok(())
}
