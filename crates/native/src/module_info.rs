//! Build and platform details for diagnostics.
//!
//! The values come from a table the build script writes into `OUT_DIR`. Nothing here
//! is computed at run time apart from mapping the target names onto the labels the
//! host runtime expects.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

mod build_info {
    include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
}

/// Operating system label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Win32,
    Darwin,
    Linux,
    Unknown,
}

impl Platform {
    /// Map a `target_os` value.
    pub fn from_target_os(os: &str) -> Self {
        match os {
            "windows" => Self::Win32,
            "macos" => Self::Darwin,
            "linux" => Self::Linux,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Win32 => "win32",
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    Ia32,
    Arm64,
    Unknown,
}

impl Arch {
    /// Map a `target_arch` value.
    pub fn from_target_arch(arch: &str) -> Self {
        match arch {
            "x86_64" => Self::X64,
            "x86" => Self::Ia32,
            "aarch64" => Self::Arm64,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Ia32 => "ia32",
            Self::Arm64 => "arm64",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the module's entry points are exported from the shared library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolVisibility {
    Dllexport,
    Default,
}

impl SymbolVisibility {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Win32 => Self::Dllexport,
            _ => Self::Default,
        }
    }
}

/// Module metadata as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub platform: Platform,
    pub arch: Arch,
    /// `Mmm dd yyyy`, day padded with a space.
    pub build_date: &'static str,
    /// `hh:mm:ss`, UTC.
    pub build_time: &'static str,
    pub symbol_visibility: SymbolVisibility,
}

impl ModuleInfo {
    fn from_build_table() -> Self {
        let platform = Platform::from_target_os(build_info::TARGET_OS);
        Self {
            name: build_info::MODULE_NAME,
            version: build_info::MODULE_VERSION,
            platform,
            arch: Arch::from_target_arch(build_info::TARGET_ARCH),
            build_date: build_info::BUILD_DATE,
            build_time: build_info::BUILD_TIME,
            symbol_visibility: SymbolVisibility::for_platform(platform),
        }
    }
}

/// The module information for this build.
pub fn module_info() -> &'static ModuleInfo {
    static INFO: OnceLock<ModuleInfo> = OnceLock::new();
    INFO.get_or_init(ModuleInfo::from_build_table)
}
