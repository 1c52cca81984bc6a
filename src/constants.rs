//! Application-wide constants
//!
//! Single source of truth for file locations, external command lines and
//! connector naming conventions.

/// File and directory names under the XDG base directories
pub mod files {
    /// Subdirectory used below both the config and the data directory
    pub const APP_DIR: &str = "screendock";

    /// Config file name (below the config directory)
    pub const CONFIG_FILENAME: &str = "config.toml";

    /// Preference store file name (below the data directory)
    pub const STORE_FILENAME: &str = "preferences.sqlite";
}

/// Topology reporter invocation
pub mod report {
    pub const COMMAND: &str = "xrandr";

    /// Verbose query mode; the verbose part is what makes EDID blocks and
    /// preferred markers show up
    pub const ARGS: [&str; 2] = ["-q", "--verbose"];
}

/// Connector naming conventions
pub mod connectors {
    /// Common name prefixes of laptop panels
    pub const INTERNAL_PREFIXES: [&str; 2] = ["LVDS", "eDP"];

    /// Suffix variants seen across drivers, tried per prefix
    pub const INTERNAL_SUFFIXES: [&str; 5] = ["", "0", "1", "-0", "-1"];

    /// Outputs with this prefix are synthetic and never configured
    pub const VIRTUAL_PREFIX: &str = "VIRTUAL";
}

/// Preference store schema
pub mod store {
    /// Highest schema version this build understands
    pub const SCHEMA_VERSION: i64 = 1;
}
