//! Object data-plane for CloudMock.
//!
//! An object is two things kept in step: a metadata row in the resource store
//! (`s3`/`object`, id `{bucket}/{key}`) and a payload file under a
//! per-namespace directory tree. Buckets are plain `s3`/`bucket` resources.
//!
//! [`ObjectDataPlane`] is the only way handlers touch either half.

pub mod checksums;
pub mod content;
pub mod content_type;
mod error;
mod plane;
pub mod state;
pub mod validation;

pub use content::ContentStore;
pub use error::{DataPlaneError, DataPlaneResult};
pub use plane::{ObjectData, ObjectDataPlane};
pub use state::{BucketAttributes, ObjectAttributes};
