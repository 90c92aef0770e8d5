use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

/// The result type used in the entire channel module.
pub type Result<T> = std::result::Result<T, ChannelErr>;

/// The channel module's error type.
#[derive(Debug)]
pub enum ChannelErr {
    UnsupportedChannelVariant(String),
    InvalidConfiguration {
        what: &'static str,
        reason: String,
    },
    TraceIo {
        path: PathBuf,
        source: io::Error,
    },
    TraceFormat {
        path: PathBuf,
        reason: String,
    },
    TraceExhausted {
        user: usize,
        iteration: usize,
        len: usize,
    },
}

impl Display for ChannelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelErr::UnsupportedChannelVariant(name) => {
                write!(f, "unsupported channel variant '{name}'")
            }
            ChannelErr::InvalidConfiguration { what, reason } => {
                write!(f, "invalid configuration for {what}: {reason}")
            }
            ChannelErr::TraceIo { path, source } => {
                write!(f, "failed to read trace {}: {source}", path.display())
            }
            ChannelErr::TraceFormat { path, reason } => {
                write!(f, "malformed trace {}: {reason}", path.display())
            }
            ChannelErr::TraceExhausted {
                user,
                iteration,
                len,
            } => write!(
                f,
                "trace of user {user} has {len} blocks, iteration {iteration} is out of range"
            ),
        }
    }
}

impl Error for ChannelErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChannelErr::TraceIo { source, .. } => Some(source),
            _ => None,
        }
    }
}
