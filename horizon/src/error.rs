//! Error types for the rotation engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring filters, processing frames or
/// persisting rotation timelines.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to create file '{path}': {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Frame buffer holds {actual} pixels, expected {width}x{height} = {expected}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read config file '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    ConfigFormat(#[from] common::FileExtensionError),

    #[error("Failed to parse config: {0}")]
    ParseConfig(#[from] common::SerdeFormatError),
}

pub type Result<T> = std::result::Result<T, Error>;
