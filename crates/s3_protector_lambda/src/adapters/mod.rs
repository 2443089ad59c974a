pub mod aws;
pub mod control_plane;
pub mod dry_run;
pub mod error;
pub mod identity;

pub use control_plane::{BucketAclUpdate, StorageControlPlane};
pub use error::RemoteCallError;
pub use identity::IdentityResolver;
