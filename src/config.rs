use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default merge executable, looked up on `PATH`.
pub const DEFAULT_MERGE_TOOL: &str = "N_m3u8DL-RE";

/// Default container format produced by the merge tool.
pub const DEFAULT_MERGE_FORMAT: &str = "mkv";

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub is_dev: bool,
    /// Root directory under which every conversion gets its own job directory
    pub download_dir: PathBuf,
    /// Merge executable (path or name on `PATH`)
    pub merge_tool: PathBuf,
    /// Container format passed to the merge tool, also the output extension
    pub merge_format: String,
    /// Manifest fetch timeout
    pub fetch_timeout: Duration,
    /// Merge subprocess timeout
    pub merge_timeout: Duration,
    /// Accept manifest URLs pointing at private or loopback hosts
    pub allow_private_urls: bool,
}

impl Config {
    /// Load configuration from environment variables
    /// In DEV mode, provides sensible defaults. In PROD mode, PORT and DOWNLOAD_DIR are required.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let is_dev = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        // Port: required in prod, defaults to 3000 in dev
        let port = if is_dev {
            env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?
        } else {
            env::var("PORT")
                .map_err(|_| "PORT is required in production")?
                .parse()?
        };

        // Download dir: required in prod, defaults to ./downloads in dev
        let download_dir = if is_dev {
            env::var("DOWNLOAD_DIR").unwrap_or_else(|_| "downloads".to_string())
        } else {
            env::var("DOWNLOAD_DIR").map_err(|_| "DOWNLOAD_DIR is required in production")?
        };

        let merge_tool = env::var("MERGE_TOOL").unwrap_or_else(|_| DEFAULT_MERGE_TOOL.to_string());

        let merge_format = env::var("MERGE_FORMAT")
            .unwrap_or_else(|_| DEFAULT_MERGE_FORMAT.to_string())
            .to_lowercase();
        if merge_format.is_empty() || !merge_format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("MERGE_FORMAT must be alphanumeric, got '{}'", merge_format).into());
        }

        let fetch_timeout_secs: u64 = env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let merge_timeout_secs: u64 = env::var("MERGE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "1800".to_string())
            .parse()
            .unwrap_or(1800);

        let allow_private_urls = env::var("ALLOW_PRIVATE_URLS")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        Ok(Config {
            port,
            is_dev,
            download_dir: PathBuf::from(download_dir),
            merge_tool: PathBuf::from(merge_tool),
            merge_format,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            merge_timeout: Duration::from_secs(merge_timeout_secs),
            allow_private_urls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serialize all env-var tests to prevent races between parallel test threads.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: &[&str] = &[
        "DEV_MODE",
        "PORT",
        "DOWNLOAD_DIR",
        "MERGE_TOOL",
        "MERGE_FORMAT",
        "FETCH_TIMEOUT_SECS",
        "MERGE_TIMEOUT_SECS",
        "ALLOW_PRIVATE_URLS",
    ];

    /// Clear every config var, set `set`, run `f`, then restore original state.
    fn with_env(set: &[(&str, &str)], f: impl FnOnce()) {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());

        let saved: Vec<(&str, Option<String>)> =
            ALL_VARS.iter().map(|k| (*k, env::var(k).ok())).collect();

        for k in ALL_VARS {
            // SAFETY: serialized by ENV_LOCK, no other thread touches these vars concurrently.
            unsafe { env::remove_var(k) };
        }
        for (k, v) in set {
            unsafe { env::set_var(k, v) };
        }

        f();

        for (k, old) in saved {
            match old {
                Some(v) => unsafe { env::set_var(k, v) },
                None => unsafe { env::remove_var(k) },
            }
        }
    }

    #[test]
    fn dev_mode_uses_defaults() {
        with_env(&[("DEV_MODE", "true")], || {
            let config = Config::from_env().expect("should succeed in dev mode");
            assert!(config.is_dev);
            assert_eq!(config.port, 3000);
            assert_eq!(config.download_dir, PathBuf::from("downloads"));
            assert_eq!(config.merge_tool, PathBuf::from(DEFAULT_MERGE_TOOL));
            assert_eq!(config.merge_format, "mkv");
            assert_eq!(config.fetch_timeout, Duration::from_secs(30));
            assert_eq!(config.merge_timeout, Duration::from_secs(1800));
            assert!(!config.allow_private_urls);
        });
    }

    #[test]
    fn prod_mode_requires_port() {
        with_env(&[("DOWNLOAD_DIR", "/var/lib/segmux")], || {
            let result = Config::from_env();
            assert!(result.is_err(), "Should fail without PORT in prod mode");
        });
    }

    #[test]
    fn prod_mode_requires_download_dir() {
        with_env(&[("PORT", "8080")], || {
            let result = Config::from_env();
            assert!(result.is_err(), "Should fail without DOWNLOAD_DIR in prod mode");
        });
    }

    #[test]
    fn prod_mode_with_required_vars() {
        with_env(&[("PORT", "8080"), ("DOWNLOAD_DIR", "/srv/out")], || {
            let config = Config::from_env().unwrap();
            assert!(!config.is_dev);
            assert_eq!(config.port, 8080);
            assert_eq!(config.download_dir, PathBuf::from("/srv/out"));
        });
    }

    #[test]
    fn invalid_port_is_error() {
        with_env(&[("DEV_MODE", "true"), ("PORT", "not-a-port")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn merge_settings_parsed() {
        with_env(
            &[
                ("DEV_MODE", "true"),
                ("MERGE_TOOL", "/opt/bin/N_m3u8DL-RE"),
                ("MERGE_FORMAT", "MP4"),
                ("MERGE_TIMEOUT_SECS", "60"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.merge_tool, PathBuf::from("/opt/bin/N_m3u8DL-RE"));
                assert_eq!(config.merge_format, "mp4");
                assert_eq!(config.merge_timeout, Duration::from_secs(60));
            },
        );
    }

    #[test]
    fn merge_format_rejects_path_characters() {
        with_env(&[("DEV_MODE", "true"), ("MERGE_FORMAT", "../mkv")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn bad_timeout_falls_back_to_default() {
        with_env(&[("DEV_MODE", "true"), ("FETCH_TIMEOUT_SECS", "soon")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        });
    }

    #[test]
    fn allow_private_urls_parsed() {
        with_env(&[("DEV_MODE", "true"), ("ALLOW_PRIVATE_URLS", "true")], || {
            let config = Config::from_env().unwrap();
            assert!(config.allow_private_urls);
        });
    }
}
