use anyhow::{Result, bail};
use std::path::Path;

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

/// 匯出目的地的上層資料夾必須存在
pub fn validate_output_parent(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("輸出路徑不可為空");
    }
    if path.is_dir() {
        bail!("輸出路徑是資料夾: {}", path.display());
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => validate_directory_exists(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_output_parent() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_output_parent(&temp_dir.path().join("out.mp4")).is_ok());
        assert!(validate_output_parent(Path::new("combined.mp4")).is_ok());
        assert!(validate_output_parent(&temp_dir.path().join("missing/out.mp4")).is_err());
        assert!(validate_output_parent(temp_dir.path()).is_err());
        assert!(validate_output_parent(Path::new("")).is_err());
    }
}
