use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Invalid corpus: {0}")]
    InvalidCorpus(#[from] insights_protocol::ProtocolError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
