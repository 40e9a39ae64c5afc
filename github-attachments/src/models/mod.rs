pub mod policy;
pub mod repository;

pub use policy::{Asset, UploadPolicy, UploadPolicyRequest};
pub use repository::Repository;
