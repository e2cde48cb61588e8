/// Operating system family a build targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Windows,
    MacOs,
    Linux,
}

/// CPU architecture family a build targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    Arm,
    Other,
}

/// The single active platform of a build.
///
/// Everything platform-dependent (flags, file suffixes, `if` conditions)
/// asks this value instead of consulting `cfg!`, so one binary can describe
/// builds for any of the supported platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// The platform this binary was compiled for
    pub fn host() -> Self {
        let os = if cfg!(windows) {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Linux
        };
        let arch = if cfg!(any(target_arch = "x86", target_arch = "x86_64")) {
            Arch::X86
        } else if cfg!(any(target_arch = "arm", target_arch = "aarch64")) {
            Arch::Arm
        } else {
            Arch::Other
        };
        Self { os, arch }
    }

    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Stable lowercase identifier, also used as fingerprint input
    pub fn name(&self) -> &'static str {
        match self.os {
            Os::Windows => "windows",
            Os::MacOs => "macos",
            Os::Linux => "linux",
        }
    }

    /// Evaluate an `if` condition identifier. `None` means the identifier
    /// is not known.
    pub fn condition(&self, ident: &str) -> Option<bool> {
        match ident {
            "windows" => Some(self.os == Os::Windows),
            "macos" => Some(self.os == Os::MacOs),
            "linux" => Some(self.os == Os::Linux),
            "x86" => Some(self.arch == Arch::X86),
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn executable_extension(&self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }

    pub fn static_library_extension(&self) -> &'static str {
        if self.is_windows() { ".lib" } else { ".a" }
    }

    pub fn dynamic_library_extension(&self) -> &'static str {
        match self.os {
            Os::Windows => ".dll",
            Os::MacOs => ".dylib",
            Os::Linux => ".so",
        }
    }

    pub fn dynamic_library_prefix(&self) -> &'static str {
        if self.is_windows() { "" } else { "lib" }
    }
}
