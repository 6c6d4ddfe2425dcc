//! Configuration for the alignment engine
//! Compile-time limits are generated from TOML by build.rs; runtime preferences come from the environment

/// Limits generated by build.rs from `config/<profile>.toml`
pub mod constants {
    include!(concat!(env!("OUT_DIR"), "/constants.rs"));
}

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("ASTSYNC_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("ASTSYNC_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::constants::compile_time::{alignment, batch_processing, file_processing, logging};

    #[test]
    fn test_generated_limits_are_consistent() {
        assert!(alignment::MAX_NESTING_DEPTH > 0);
        assert!(alignment::MAX_WORKLIST_LEN >= alignment::MAX_NESTING_DEPTH);
        assert!(file_processing::LARGE_FILE_THRESHOLD <= file_processing::MAX_FILE_SIZE);
        assert!(batch_processing::MAX_WORKER_THREADS >= 1);
        assert!(logging::MAX_LOG_EVENTS_PER_FILE <= logging::LOG_BUFFER_SIZE);
    }

    #[test]
    fn test_source_info_names_profile() {
        let info = super::build_info::source_info();
        assert!(info.contains(super::build_info::profile()));
        assert!(info.ends_with(".toml"));
    }
}
