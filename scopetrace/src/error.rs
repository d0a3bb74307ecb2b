use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("profiling session already opened: {name}")]
    SessionAlreadyOpen { name: String },

    #[error("could not open file: {}", .path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no opened profiling session")]
    NoActiveSession,

    #[error("failed to write to the trace sink")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages_name_the_culprit() {
        let err = ProfilerError::SessionAlreadyOpen {
            name: "startup".to_owned(),
        };
        assert_eq!(err.to_string(), "profiling session already opened: startup");

        let err = ProfilerError::SinkOpen {
            path: PathBuf::from("nowhere/result.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "could not open file: nowhere/result.json");
        assert!(err.source().is_some());
    }
}
