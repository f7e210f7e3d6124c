pub mod ask;
pub mod doctor;
pub mod init;

use std::path::PathBuf;

use finsight_config::AppConfig;

/// Load configuration from the given path or the default location. The
/// `FINSIGHT_API_KEY` environment variable always wins over the file.
pub(crate) fn load_config(
    path: Option<PathBuf>,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = match &path {
        Some(p) => AppConfig::load_from(p)?,
        None => AppConfig::load()?,
    };
    if path.is_some()
        && let Ok(key) = std::env::var("FINSIGHT_API_KEY")
    {
        config.api_key = Some(key);
    }
    Ok(config)
}
