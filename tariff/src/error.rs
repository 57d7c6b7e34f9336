use thiserror::Error;

#[derive(Error, Debug)]
pub enum TariffError {
    #[error("malformed amount: {0}")]
    MalformedAmount(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid rate: {0} is outside [0, 1]")]
    InvalidRate(String),

    #[error("negative amount: {0}")]
    NegativeAmount(String),

    #[error("unknown fee policy: {0}")]
    UnknownPolicy(String),

    #[error("invalid fee policy {id}: {reason}")]
    InvalidPolicy { id: String, reason: String },

    #[error("{requested} is below the {policy} minimum of {minimum}")]
    BelowMinimum {
        policy: String,
        requested: String,
        minimum: String,
    },

    #[error("{requested} is above the {policy} maximum of {maximum}")]
    AboveMaximum {
        policy: String,
        requested: String,
        maximum: String,
    },

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: String, available: String },

    #[error("fee {fee} exceeds amount {amount} under policy {policy}")]
    FeeExceedsAmount {
        policy: String,
        amount: String,
        fee: String,
    },

    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("policy file error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, TariffError>;
