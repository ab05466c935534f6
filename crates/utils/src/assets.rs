use std::path::PathBuf;

use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");
const ASSET_DIR_ENV: &str = "KANBAN_ASSET_DIR";

/// Per-user data directory holding the default SQLite database and the board log.
///
/// `KANBAN_ASSET_DIR` wins when set; debug builds otherwise use `dev_assets/`
/// at the workspace root so development data stays out of the home directory.
pub fn asset_dir() -> std::io::Result<PathBuf> {
    let override_dir = std::env::var(ASSET_DIR_ENV).ok();
    let path = resolve_asset_dir(override_dir.as_deref())?;

    if !path.exists() {
        std::fs::create_dir_all(&path)?;
    }

    Ok(path)
}

fn resolve_asset_dir(override_dir: Option<&str>) -> std::io::Result<PathBuf> {
    if let Some(dir) = override_dir.map(str::trim).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    if cfg!(debug_assertions) {
        return Ok(PathBuf::from(PROJECT_ROOT).join("../../dev_assets"));
    }

    // macOS → ~/Library/Application Support/ProTask, Linux → ~/.local/share/protask
    ProjectDirs::from("dev", "protask", "protask")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "OS didn't give us a home directory",
            )
        })
}

pub fn default_database_url() -> std::io::Result<String> {
    Ok(format!(
        "sqlite://{}?mode=rwc",
        asset_dir()?.join("db.sqlite").to_string_lossy()
    ))
}

pub fn board_log_path() -> std::io::Result<PathBuf> {
    Ok(asset_dir()?.join("board.log"))
}

#[cfg(test)]
mod tests {
    use super::resolve_asset_dir;

    #[test]
    fn override_dir_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_asset_dir(Some(dir.path().to_str().unwrap())).unwrap();
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn blank_override_is_ignored() {
        let resolved = resolve_asset_dir(Some("   ")).unwrap();
        assert_ne!(resolved, std::path::PathBuf::from("   "));
        if cfg!(debug_assertions) {
            assert!(resolved.ends_with("dev_assets"));
        }
    }
}
