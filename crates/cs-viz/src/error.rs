use thiserror::Error;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("visualiser I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("visualiser address `{0}` did not resolve")]
    Resolve(String),

    #[error("short datagram: sent {sent} of {len} bytes")]
    ShortWrite { sent: usize, len: usize },

    #[error("visualiser is not connected")]
    NotConnected,
}

pub type VizResult<T> = Result<T, VizError>;
