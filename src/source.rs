//! Byte sources handed to the parser: readers, files and HTTP URLs.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::error::Error;
use crate::model::{EnvMap, Source};
use crate::parser::{parse_bytes, parse_reader};

/// Deadline for the whole URL request, body included.
pub const URL_TIMEOUT: Duration = Duration::from_secs(60);

/// Read and parse dotenv text from a reader.
pub fn from_reader<R: Read>(reader: R) -> Result<EnvMap, Error> {
    parse_reader(reader)
}

/// Read and parse a dotenv file.
pub fn from_file(path: impl AsRef<Path>) -> Result<EnvMap, Error> {
    let path = path.as_ref();
    let file = File::open(path)?;
    debug!(path = %path.display(), "reading env file");
    from_reader(BufReader::new(file))
}

/// Fetch and parse a dotenv document over HTTP.
///
/// Any non-2xx status is an error; the body is only parsed once it has been
/// received completely.
pub fn from_url(url: &str) -> Result<EnvMap, Error> {
    let body = fetch(url)?;
    parse_bytes(&body)
}

fn fetch(url: &str) -> Result<Vec<u8>, Error> {
    let client = reqwest::blocking::Client::builder()
        .timeout(URL_TIMEOUT)
        .build()?;

    let response = client.get(url).send()?;
    let status = response.status();
    debug!(url, status = status.as_u16(), "fetched env document");
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_owned(),
            status: status.as_u16(),
        });
    }

    Ok(response.bytes()?.to_vec())
}

impl Source {
    pub(crate) fn read(&self) -> Result<EnvMap, Error> {
        match self {
            Self::Path(path) => from_file(path),
            Self::Url(url) => from_url(url),
        }
    }
}
