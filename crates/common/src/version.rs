use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Build metadata, stamped in by the consuming crate's build script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub build_profile: String,
    pub build_features: String,
    pub version: String,
    pub build_timestamp: String,
    pub rust_version: String,
}

impl BuildInfo {
    pub fn new(
        build_profile: &str,
        build_features: &str,
        version: &str,
        build_timestamp: &str,
        rust_version: &str,
    ) -> Self {
        Self {
            build_profile: build_profile.to_string(),
            build_features: build_features.to_string(),
            version: version.to_string(),
            build_timestamp: build_timestamp.to_string(),
            rust_version: rust_version.to_string(),
        }
    }
}

impl Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "version: {}\nprofile: {}\nfeatures: {}\nbuilt: {}\nrustc: {}",
            self.version,
            self.build_profile,
            self.build_features,
            self.build_timestamp,
            self.rust_version
        )
    }
}

/// Collect [`BuildInfo`] from the calling crate's compile-time environment.
///
/// Expects `BUILD_PROFILE`, `BUILD_FEATURES`, `REPO_VERSION`,
///  `BUILD_TIMESTAMP` and `RUST_VERSION` to be set by its `build.rs`.
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo::new(
            env!("BUILD_PROFILE"),
            env!("BUILD_FEATURES"),
            env!("REPO_VERSION"),
            env!("BUILD_TIMESTAMP"),
            env!("RUST_VERSION"),
        )
    };
}
