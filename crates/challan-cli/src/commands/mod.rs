//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod fallback;
pub mod schema;

use std::path::Path;

use challan_core::ChallanConfig;

/// Media type from the file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Load configuration from an explicit path, or use defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ChallanConfig> {
    match config_path {
        Some(path) => Ok(ChallanConfig::from_file(Path::new(path))?),
        None => Ok(ChallanConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/b.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("scan.png")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("doc.pdf")), Some("application/pdf"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }
}
