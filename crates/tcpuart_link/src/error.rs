use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("cannot listen on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("no client connected")]
    NotConnected,
    /// The client is being swapped by the network thread.
    #[error("client link busy")]
    Busy,
    #[error("failed to start network thread: {0}")]
    Spawn(#[source] io::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LinkError {
    /// Status a link ends up in when this error stops it.
    pub(crate) fn terminal_status(&self) -> crate::Status {
        match self {
            LinkError::Bind { source, .. } if source.kind() == io::ErrorKind::AddrInUse => {
                crate::Status::BindError
            }
            _ => crate::Status::Error,
        }
    }
}
