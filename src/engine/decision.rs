//! Decision and block status types.

use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Status sent with a blocked request.
///
/// `Gone` is the default: scanners tend not to retry it and search engines
/// drop the URL faster than for 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum BlockStatus {
    #[default]
    Gone,
    NotFound,
    Forbidden,
}

impl BlockStatus {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Gone => 410,
            Self::NotFound => 404,
            Self::Forbidden => 403,
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            Self::Gone => StatusCode::GONE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

/// Rejected block status value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("block status must be one of 410, 404, 403 (got {0})")]
pub struct InvalidBlockStatus(pub u16);

impl TryFrom<u16> for BlockStatus {
    type Error = InvalidBlockStatus;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            410 => Ok(Self::Gone),
            404 => Ok(Self::NotFound),
            403 => Ok(Self::Forbidden),
            other => Err(InvalidBlockStatus(other)),
        }
    }
}

impl From<BlockStatus> for u16 {
    fn from(status: BlockStatus) -> Self {
        status.as_u16()
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Outcome of evaluating one request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Block(BlockStatus),
}

impl Decision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block(_))
    }
}
