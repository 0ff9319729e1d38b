use crate::error::ViewerError;

/// Something the host should show the user.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerNotice {
    Loading { file_name: String, size: String },
    Loaded { file_name: String, triangles: usize },
    Warning(ViewerError),
    Failed(ViewerError),
}

impl ViewerNotice {
    pub fn message(&self) -> String {
        match self {
            Self::Loading { file_name, size } => format!("Loading {} ({})...", file_name, size),
            Self::Loaded {
                file_name,
                triangles,
            } => format!("Loaded {} ({} triangles)", file_name, triangles),
            Self::Warning(e) => format!("Warning: {}", e),
            Self::Failed(e) => format!("Error: {}", e),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedFile {
    pub file_name: String,
    pub size: String,
    pub triangles: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewerStatus {
    pub loaded: Option<LoadedFile>,
    /// Name of the most recent file handed to the loader that has not
    /// finished yet.
    pub loading: Option<String>,
    /// File the loader thread is building right now.
    pub parsing: Option<String>,
    /// The loader still has queued, running or undelivered work. Stays set
    /// while superseded loads drain.
    pub loader_busy: bool,
    pub last_error: Option<String>,
    pub warning: Option<String>,
}

impl ViewerStatus {
    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }
}

/// Human-readable byte count: base 1024, at most two decimals, trailing
/// zeros dropped ("0 Bytes", "1.5 KB", "2 MB").
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let mut text = format!("{:.2}", value);
    if text.contains('.') {
        text = text.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", text, UNITS[unit])
}
