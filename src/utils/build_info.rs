use std::fmt;

/// Compile-time build metadata produced by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
}

/// Returns the statically-embedded build metadata.
pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("SMS_JOURNALS_BUILD_HASH").unwrap_or("unknown"),
        timestamp: option_env!("SMS_JOURNALS_BUILD_TIMESTAMP").unwrap_or("unknown"),
        target: option_env!("SMS_JOURNALS_BUILD_TARGET").unwrap_or("unknown"),
        profile: option_env!("SMS_JOURNALS_BUILD_PROFILE").unwrap_or("unknown"),
    }
}

impl fmt::Display for BuildMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sms_journals {} ({} {}, {} build, {})",
            self.version, self.git_hash, self.target, self.profile, self.timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_reports_package_version() {
        let meta = current();
        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
        assert!(meta.to_string().starts_with("sms_journals "));
    }
}
