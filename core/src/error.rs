use snafu::Snafu;
use std::{io, path::PathBuf};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to load config at {}: {}", path.display(), source))]
    ConfigLoad { source: io::Error, path: PathBuf },

    #[snafu(display("Unable to parse config at {}: {}", path.display(), source))]
    ConfigParse {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[snafu(display("Unable to serialize config at {}: {}", path.display(), source))]
    ConfigWriteFormat {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[snafu(display("Unable to write config at {}: {}", path.display(), source))]
    ConfigWrite { source: io::Error, path: PathBuf },

    #[snafu(display("Unable to build http client: {}", source))]
    ClientBuild { source: reqwest::Error },

    #[snafu(display("Error '{}' getting url {}: {}", get_status_code(source), url, source))]
    ApiGetUrl { source: reqwest::Error, url: String },

    #[snafu(display("Error reading response body from url {}: {}", url, source))]
    ApiReadBody { source: reqwest::Error, url: String },

    #[snafu(display("Error deserializing response from url {}: {}", url, source))]
    ApiDeserialize {
        source: serde_json::Error,
        url: String,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// From: https://github.com/awslabs/tough/blob/develop/tuftool/src/error.rs
// Extracts the status code from a reqwest::Error and converts it to a string to be displayed
fn get_status_code(source: &reqwest::Error) -> String {
    source
        .status()
        .as_ref()
        .map_or("Unknown", reqwest::StatusCode::as_str)
        .to_string()
}
