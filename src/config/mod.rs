//! Configuration loading
//!
//! Two sources feed a build: the optional `redone.toml` describing the project
//! and its tools, and the `.env.<environment>` file whose entries are passed
//! through to the subprocesses.

pub mod env_file;
pub mod project;

pub use env_file::EnvConfig;
pub use project::ProjectConfig;
