pub mod dsl;
pub mod error;
pub mod ids;
pub mod manifest;
pub mod package;
pub mod project;

pub use dsl::builder::{block, BlockBuilder, Fragment, InputSpec, LiteralSpec};
pub use dsl::script::Script;
pub use error::{BuildError, BuildResult};
pub use project::Project;
pub use project::asset::{AssetHandle, AssetIdCache, Costume, Sound};
pub use project::target::Target;
