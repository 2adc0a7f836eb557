use crate::Gender;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InductionError {
    #[error("occurrence references noun `{noun}` which is not in the inventory")]
    DataIntegrity { noun: String },
    #[error("invalid noun `{noun}`: {reason}")]
    InvalidNoun { noun: String, reason: String },
    #[error("noun `{noun}` was added to the inventory twice")]
    DuplicateNoun { noun: String },
    #[error("noun `{noun}` already labeled {existing}, refusing to relabel it {attempted}")]
    Relabel {
        noun: String,
        existing: Gender,
        attempted: Gender,
    },
    #[error("unknown noun `{noun}`")]
    UnknownNoun { noun: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
