use thiserror::Error;

/// Everything that can go wrong between a file being handed to the viewer
/// and its mesh becoming active.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error("'{file_name}' is not an .obj file")]
    FileType { file_name: String },

    #[error("could not read '{file_name}': {reason}")]
    Read { file_name: String, reason: String },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("line {line}: face references vertex {index} but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        line: usize,
        index: i64,
        vertex_count: usize,
    },

    #[error("mesh has a zero-size bounding box and was not rescaled")]
    DegenerateMesh,

    #[error("graphics error: {0}")]
    Gpu(String),
}

impl ViewerError {
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_line() {
        let err = ViewerError::parse(7, "expected 3 coordinates, found 2");
        assert_eq!(err.to_string(), "line 7: expected 3 coordinates, found 2");

        let err = ViewerError::IndexOutOfRange {
            line: 12,
            index: 5,
            vertex_count: 4,
        };
        assert!(err.to_string().starts_with("line 12:"));
    }
}
