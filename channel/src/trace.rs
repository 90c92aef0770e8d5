use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use log::debug;
use matfile::{MatFile, NumericData};
use ndarray::{Array2, ShapeBuilder};

use crate::{ChannelErr, Phase, Result};

/// The name of the matrix holding the magnitude response inside a trace file.
pub const TRACE_FIELD: &str = "h_channel_response_mag";

/// A source of empirical channel traces, one magnitude matrix per user.
pub trait TraceSource {
    /// Loads the raw magnitude matrix of a user, as it is stored.
    ///
    /// # Arguments
    /// * `phase` - The simulation phase the trace belongs to.
    /// * `user` - The user's number, starting from 1.
    ///
    /// # Returns
    /// The stored matrix or an error if it could not be read.
    fn load(&self, phase: Phase, user: usize) -> Result<Array2<f32>>;
}

/// Reads traces from MATLAB files laid out as `<root>/<phase>/h_omni_<user>.mat`.
///
/// Every call reads the file again, nothing is cached.
#[derive(Debug, Clone)]
pub struct MatTraceSource {
    root: PathBuf,
}

impl MatTraceSource {
    /// Creates a new `MatTraceSource`.
    ///
    /// # Arguments
    /// * `root` - The directory containing one subdirectory per phase.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Returns the path of the trace file of a user.
    pub fn path(&self, phase: Phase, user: usize) -> PathBuf {
        self.root
            .join(phase.as_str())
            .join(format!("h_omni_{user}.mat"))
    }
}

impl TraceSource for MatTraceSource {
    fn load(&self, phase: Phase, user: usize) -> Result<Array2<f32>> {
        let path = self.path(phase, user);
        debug!(user = user; "reading trace {}", path.display());

        let file = File::open(&path).map_err(|source| ChannelErr::TraceIo {
            path: path.clone(),
            source,
        })?;

        let mat = MatFile::parse(BufReader::new(file))
            .map_err(|e| format_err(&path, format!("{e:?}")))?;
        let array = mat
            .find_by_name(TRACE_FIELD)
            .ok_or_else(|| format_err(&path, format!("missing field {TRACE_FIELD}")))?;

        let &[rows, cols] = array.size().as_slice() else {
            let reason = format!("expected a matrix, got {} dimensions", array.size().len());
            return Err(format_err(&path, reason));
        };

        let data: Vec<f32> = match array.data() {
            NumericData::Double { real, .. } => real.iter().map(|&x| x as f32).collect(),
            NumericData::Single { real, .. } => real.clone(),
            _ => return Err(format_err(&path, "expected floating point data")),
        };

        // MATLAB stores matrices in column major order.
        Array2::from_shape_vec((rows, cols).f(), data)
            .map_err(|e| format_err(&path, e.to_string()))
    }
}

fn format_err<S: Into<String>>(path: &Path, reason: S) -> ChannelErr {
    ChannelErr::TraceFormat {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_paths_follow_phase_and_user() {
        let source = MatTraceSource::new("resources");

        assert_eq!(
            source.path(Phase::Test, 3),
            Path::new("resources").join("test").join("h_omni_3.mat")
        );
    }

    #[test]
    fn missing_trace_is_an_io_error() {
        let source = MatTraceSource::new("definitely/not/here");
        let err = source.load(Phase::Train, 1).unwrap_err();

        assert!(matches!(err, ChannelErr::TraceIo { .. }));
    }
}
