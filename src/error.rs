// Error types shared by the push path and the provider contract

use thiserror::Error;

use crate::models::CspKind;

#[derive(Error, Debug)]
pub enum Error {
    /// Connection refused, timeout, or a failure reading the response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A provider capability with no backend behind it yet.
    #[error("{provider} provider: {operation} is not implemented")]
    NotImplemented {
        provider: CspKind,
        operation: &'static str,
    },
}

impl Error {
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
