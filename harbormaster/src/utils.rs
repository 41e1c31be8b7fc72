//! Utility functions

use serde::{Deserialize, Serialize};

/// Build metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Parse `--key=value`, `--key value` and bare `--flag` arguments.
///
/// A flag followed by another flag (or by nothing) is recorded as `"true"`.
pub fn parse_cli_args<I>(args: I) -> std::collections::HashMap<String, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli_args = std::collections::HashMap::new();
    let mut args = args.into_iter().peekable();

    while let Some(arg) = args.next() {
        if !arg.starts_with('-') {
            continue;
        }
        if let Some((key, value)) = arg.split_once('=') {
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
            continue;
        }

        let clean_key = arg.trim_start_matches('-').to_string();
        let value = match args.next_if(|next| !next.starts_with('-')) {
            Some(value) => value,
            None => "true".to_string(),
        };
        cli_args.insert(clean_key, value);
    }

    cli_args
}
