#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use pond_snap_core::{AttackMode, GridSize};
use serde::{Deserialize, Serialize};

const CODE_DOMAIN: &str = "pond";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded run payload.
pub(crate) const CODE_HEADER: &str = "pond:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Summary of a finished run, encoded as a single shareable line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ScoreCode {
    /// Grid the run was played on.
    pub(crate) grid: GridSize,
    /// Kill count the run ended with.
    pub(crate) kills: u32,
    /// Length of the run in milliseconds of session time.
    pub(crate) duration_ms: u64,
    /// Snap mode the run was played in.
    pub(crate) attack_mode: AttackMode,
}

impl ScoreCode {
    /// Encodes the run summary into a single-line string suitable for sharing.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializablePayload {
            kills: self.kills,
            duration_ms: self.duration_ms,
            attack_mode: self.attack_mode,
        };
        let json = serde_json::to_vec(&payload).expect("score payload serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!(
            "{CODE_HEADER}:{}x{}:{encoded}",
            self.grid.columns(),
            self.grid.rows()
        )
    }

    /// Decodes a run summary from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ScoreCodeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScoreCodeError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ScoreCodeError::MissingPrefix)?;
        let version = parts.next().ok_or(ScoreCodeError::MissingVersion)?;
        let dimensions = parts.next().ok_or(ScoreCodeError::MissingDimensions)?;
        let payload = parts.next().ok_or(ScoreCodeError::MissingPayload)?;

        if domain != CODE_DOMAIN {
            return Err(ScoreCodeError::InvalidPrefix(domain.to_owned()));
        }
        if version != CODE_VERSION {
            return Err(ScoreCodeError::UnsupportedVersion(version.to_owned()));
        }

        let grid = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ScoreCodeError::InvalidEncoding)?;
        let decoded: SerializablePayload =
            serde_json::from_slice(&bytes).map_err(ScoreCodeError::InvalidPayload)?;

        Ok(Self {
            grid,
            kills: decoded.kills,
            duration_ms: decoded.duration_ms,
            attack_mode: decoded.attack_mode,
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct SerializablePayload {
    kills: u32,
    duration_ms: u64,
    attack_mode: AttackMode,
}

fn parse_dimensions(value: &str) -> Result<GridSize, ScoreCodeError> {
    let mut parts = value.split('x');
    let columns = parts
        .next()
        .and_then(|part| part.parse::<u32>().ok())
        .ok_or_else(|| ScoreCodeError::InvalidDimensions(value.to_owned()))?;
    let rows = parts
        .next()
        .and_then(|part| part.parse::<u32>().ok())
        .ok_or_else(|| ScoreCodeError::InvalidDimensions(value.to_owned()))?;
    if parts.next().is_some() {
        return Err(ScoreCodeError::InvalidDimensions(value.to_owned()));
    }
    Ok(GridSize::new(columns, rows))
}

/// Reasons a share code fails to decode.
#[derive(Debug)]
pub(crate) enum ScoreCodeError {
    /// The provided string was empty after trimming.
    EmptyPayload,
    /// No domain prefix was present.
    MissingPrefix,
    /// No version field was present.
    MissingVersion,
    /// No grid dimension field was present.
    MissingDimensions,
    /// No payload field was present.
    MissingPayload,
    /// The domain prefix did not match.
    InvalidPrefix(String),
    /// The version field named an unsupported revision.
    UnsupportedVersion(String),
    /// The grid dimension field did not parse as `<columns>x<rows>`.
    InvalidDimensions(String),
    /// The payload was not valid base64.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload was not a valid run summary.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for ScoreCodeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(formatter, "share code is empty"),
            Self::MissingPrefix => write!(formatter, "share code is missing its prefix"),
            Self::MissingVersion => write!(formatter, "share code is missing its version"),
            Self::MissingDimensions => {
                write!(formatter, "share code is missing its grid dimensions")
            }
            Self::MissingPayload => write!(formatter, "share code is missing its payload"),
            Self::InvalidPrefix(prefix) => {
                write!(formatter, "unrecognized share code prefix: {prefix}")
            }
            Self::UnsupportedVersion(version) => {
                write!(formatter, "unsupported share code version: {version}")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(formatter, "invalid grid dimensions: {dimensions}")
            }
            Self::InvalidEncoding(error) => {
                write!(formatter, "share code payload is not base64: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(formatter, "share code payload is malformed: {error}")
            }
        }
    }
}

impl Error for ScoreCodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
