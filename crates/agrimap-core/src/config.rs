use std::path::PathBuf;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "AGRIMAP_DATA_DIR";

/// Runtime configuration shared by the binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where farms and crop plans are stored.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// `~/.agrimap/`, or `./.agrimap/` when there is no home directory.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".agrimap")
}

impl Config {
    /// Resolve from `--data-dir=PATH`, then `AGRIMAP_DATA_DIR`, then the default.
    pub fn from_args(args: &[String]) -> Self {
        Self::resolve(args, std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn resolve(args: &[String], env_dir: Option<PathBuf>) -> Self {
        let flag = args
            .iter()
            .find_map(|a| a.strip_prefix("--data-dir="))
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let data_dir = flag
            .or(env_dir.filter(|p| !p.as_os_str().is_empty()))
            .unwrap_or_else(default_data_dir);
        Self { data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_wins_over_env() {
        let cfg = Config::resolve(&args(&["agrimap-mcp", "--data-dir=/tmp/a"]), Some("/tmp/b".into()));
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/a"));
    }

    #[test]
    fn env_used_without_flag() {
        let cfg = Config::resolve(&args(&["agrimap-mcp"]), Some("/tmp/b".into()));
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/b"));
    }

    #[test]
    fn falls_back_to_home() {
        let cfg = Config::resolve(&args(&["agrimap-mcp", "--data-dir="]), None);
        assert_eq!(cfg.data_dir, default_data_dir());
        assert!(cfg.data_dir.ends_with(".agrimap"));
    }
}
