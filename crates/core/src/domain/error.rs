// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Application id '{value}' is {len} characters long, at most {max} allowed")]
    AppIdTooLong {
        value: String,
        len: usize,
        max: usize,
    },

    #[error("Job id must not be empty")]
    EmptyJobId,
}

pub type Result<T> = std::result::Result<T, DomainError>;
