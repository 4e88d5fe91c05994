//! Parse dotenv-style environment files and merge them into an environment.
//!
//! Parsing is pure: [`parse_str`] and friends turn `KEY=VALUE` (or YAML-style
//! `KEY: VALUE`) lines into an ordered [`EnvMap`], expanding `${NAME}`
//! references against the lines above them.
//!
//! Writing into the live process environment is a separate step: [`merge`],
//! [`dotenv`], [`from_path`] and [`from_paths`] are `unsafe`, because callers
//! must guarantee no concurrent process-environment access. [`EnvLoader`]
//! with a [`TargetEnv::memory`] target stays process-isolated.

mod env;
mod error;
mod expand;
mod loader;
mod model;
mod parser;
mod render;
mod source;

pub use env::{TargetEnv, is_representable, merge};
pub use error::{Error, ParseError, ParseErrorKind, RenderError};
pub use loader::{EnvLoader, dotenv, from_path, from_paths};
pub use model::{EnvMap, LoadReport, MergeReport, Source};
pub use parser::{parse_bytes, parse_lines, parse_reader, parse_str};
pub use render::render_line;
pub use source::{URL_TIMEOUT, from_file, from_reader, from_url};
