//! Configuration for the publish pipeline.
//!
//! Values are read once from an [`EnvSource`] into a [`ConfigResolver`];
//! nothing downstream touches the process environment.

mod http;
pub mod resolver;
mod source;
mod target;

pub use http::{AdminSettings, HttpSettings};
pub use resolver::ConfigResolver;
pub use source::{EnvSource, MapEnv, ProcessEnv};
pub use target::{BuildMode, DeploymentTarget};
