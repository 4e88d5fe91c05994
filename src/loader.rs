use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::env::TargetEnv;
use crate::error::Error;
use crate::model::{EnvMap, LoadReport, Source};

const DEFAULT_FILE: &str = ".env";

/// Load `.env` from the current working directory into the process
/// environment, keeping variables that are already set.
///
/// # Safety
///
/// The caller must ensure no other threads concurrently read or write the
/// process environment.
pub unsafe fn dotenv() -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    unsafe { from_path(DEFAULT_FILE) }
}

/// Load a `.env` file from a specific path into the process environment.
///
/// # Safety
///
/// See [`dotenv`].
pub unsafe fn from_path(path: impl AsRef<Path>) -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    let target = unsafe { TargetEnv::process() };
    EnvLoader::new().path(path).target(target).load()
}

/// Load multiple `.env` files into the process environment. Later files win.
///
/// # Safety
///
/// See [`dotenv`].
pub unsafe fn from_paths<I, P>(paths: I) -> Result<LoadReport, Error>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    // SAFETY: forwarded to the caller.
    let target = unsafe { TargetEnv::process() };
    EnvLoader::new().paths(paths).target(target).load()
}

/// Builder-style dotenv loader.
///
/// Sources are parsed one by one, each expanding references against its own
/// entries only, then folded together with later sources winning.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    sources: Vec<Source>,
    required: bool,
    override_existing: bool,
    target: TargetEnv,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(Source::Path(path.as_ref().to_path_buf()));
        self
    }

    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.sources.extend(
            paths
                .into_iter()
                .map(|path| Source::Path(path.as_ref().to_path_buf())),
        );
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.sources.push(Source::Url(url.into()));
        self
    }

    pub fn source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// When false, missing files are skipped instead of failing the load.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn target(mut self, target: TargetEnv) -> Self {
        self.target = target;
        self
    }

    pub fn target_env(&self) -> &TargetEnv {
        &self.target
    }

    pub fn into_target(self) -> TargetEnv {
        self.target
    }

    /// Read and fold every source without touching the target.
    pub fn parse_only(&self) -> Result<EnvMap, Error> {
        let (map, _) = self.collect()?;
        Ok(map)
    }

    pub fn load(&mut self) -> Result<LoadReport, Error> {
        let (map, sources_read) = self.collect()?;
        let merged = self.target.merge(&map, self.override_existing);
        debug!(
            sources_read,
            loaded = merged.loaded,
            skipped_existing = merged.skipped_existing,
            "loaded env sources"
        );

        Ok(LoadReport {
            sources_read,
            merged,
        })
    }

    fn collect(&self) -> Result<(EnvMap, usize), Error> {
        let mut merged = EnvMap::new();
        let mut sources_read = 0usize;

        for source in self.effective_sources() {
            let parsed = match source.read() {
                Ok(parsed) => parsed,
                Err(Error::Io(err)) if !self.required && err.kind() == ErrorKind::NotFound => {
                    debug!(?source, "skipping missing source");
                    continue;
                }
                Err(err) => return Err(err),
            };

            sources_read += 1;
            merged.extend(parsed);
        }

        Ok((merged, sources_read))
    }

    fn effective_sources(&self) -> Vec<Source> {
        if self.sources.is_empty() {
            vec![Source::Path(PathBuf::from(DEFAULT_FILE))]
        } else {
            self.sources.clone()
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            required: true,
            override_existing: false,
            target: TargetEnv::memory(),
        }
    }
}
