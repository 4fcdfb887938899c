use std::path::PathBuf;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("stresslab/", env!("CARGO_PKG_VERSION"));

pub(crate) fn default_charts_path() -> String {
    default_base_dir()
        .join("results")
        .to_string_lossy()
        .into_owned()
}

fn default_base_dir() -> PathBuf {
    if let Some(home) = user_home_dir() {
        return home.join(".stresslab");
    }

    PathBuf::from(".stresslab")
}

fn user_home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        if let Some(value) = std::env::var_os("USERPROFILE") {
            return Some(PathBuf::from(value));
        }
    }

    std::env::var_os("HOME").map(PathBuf::from)
}
