//! Target platform descriptors.
//!
//! A target string has the form `arch-bits-os[-feature...]`, e.g.
//! `x86-64-linux-avx2` or `x86-64-windows-mingw`. The single token `host`
//! stands for the platform gengen itself runs on and may be followed by
//! extra features (`host-debug`).

use std::{collections::BTreeSet, fmt, str::FromStr};

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Windows,
    Osx,
    Android,
    Ios,
    NaCl,
    NoOs,
}

/// Target architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    Arm,
    Mips,
    PowerPC,
    Hexagon,
    /// Portable bitcode; the object artifact is bitcode for this architecture.
    PNaCl,
}

/// Optional target feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Avx,
    Avx2,
    Cuda,
    Debug,
    Metal,
    MinGW,
    NoAsserts,
    NoBoundsQuery,
    OpenCL,
    Sse41,
}

macro_rules! token_table {
    ($ty:ident { $($variant:ident => $token:literal),* $(,)? }) => {
        impl $ty {
            const TOKENS: &'static [($ty, &'static str)] = &[$(($ty::$variant, $token)),*];

            /// Get the target-string token for this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $token),*
                }
            }

            fn from_token(token: &str) -> Option<Self> {
                Self::TOKENS
                    .iter()
                    .find(|(_, t)| *t == token)
                    .map(|(v, _)| *v)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

token_table!(Os {
    Linux => "linux",
    Windows => "windows",
    Osx => "osx",
    Android => "android",
    Ios => "ios",
    NaCl => "nacl",
    NoOs => "noos",
});

token_table!(Arch {
    X86 => "x86",
    Arm => "arm",
    Mips => "mips",
    PowerPC => "powerpc",
    Hexagon => "hexagon",
    PNaCl => "pnacl",
});

token_table!(Feature {
    Avx => "avx",
    Avx2 => "avx2",
    Cuda => "cuda",
    Debug => "debug",
    Metal => "metal",
    MinGW => "mingw",
    NoAsserts => "no_asserts",
    NoBoundsQuery => "no_bounds_query",
    OpenCL => "opencl",
    Sse41 => "sse41",
});

/// A platform a module is compiled for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub os: Os,
    pub arch: Arch,
    /// Pointer width; 0 for architectures without one (pnacl).
    pub bits: u8,
    pub features: BTreeSet<Feature>,
}

impl Target {
    pub fn new(os: Os, arch: Arch, bits: u8) -> Self {
        Self {
            os,
            arch,
            bits,
            features: BTreeSet::new(),
        }
    }

    /// The platform this process is running on.
    pub fn host() -> Self {
        let os = if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::Osx
        } else if cfg!(target_os = "android") {
            Os::Android
        } else if cfg!(target_os = "ios") {
            Os::Ios
        } else {
            Os::Linux
        };
        let arch = if cfg!(any(target_arch = "arm", target_arch = "aarch64")) {
            Arch::Arm
        } else if cfg!(any(target_arch = "mips", target_arch = "mips64")) {
            Arch::Mips
        } else if cfg!(any(target_arch = "powerpc", target_arch = "powerpc64")) {
            Arch::PowerPC
        } else {
            Arch::X86
        };
        let bits = if cfg!(target_pointer_width = "64") {
            64
        } else {
            32
        };
        Self::new(os, arch, bits)
    }

    /// Add a feature flag.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Windows targets that emit COFF objects, i.e. Windows without MinGW.
    pub fn is_windows_coff(&self) -> bool {
        self.os == Os::Windows && !self.has_feature(Feature::MinGW)
    }

    /// Architectures whose object artifact is portable bitcode.
    pub fn is_portable_bitcode(&self) -> bool {
        self.arch == Arch::PNaCl
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.arch, self.bits, self.os)?;
        for feature in &self.features {
            write!(f, "-{}", feature)?;
        }
        Ok(())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut os = None;
        let mut arch = None;
        let mut bits = None;
        let mut features = BTreeSet::new();

        for (i, token) in s.split('-').enumerate() {
            if token == "host" && i == 0 {
                let host = Target::host();
                os = Some(host.os);
                arch = Some(host.arch);
                bits = Some(host.bits);
            } else if let Some(a) = Arch::from_token(token).filter(|_| arch.is_none()) {
                arch = Some(a);
            } else if let Some(o) = Os::from_token(token).filter(|_| os.is_none()) {
                os = Some(o);
            } else if let Some(b) = parse_bits(token).filter(|_| bits.is_none()) {
                bits = Some(b);
            } else if let Some(feature) = Feature::from_token(token) {
                features.insert(feature);
            } else {
                return Err(format!(
                    "did not understand '{}' in target string '{}'",
                    token, s
                ));
            }
        }

        match (os, arch, bits) {
            (Some(os), Some(arch), Some(bits)) => Ok(Target {
                os,
                arch,
                bits,
                features,
            }),
            _ => Err(format!(
                "target string '{}' must name an architecture, bit width and os (e.g. x86-64-linux)",
                s
            )),
        }
    }
}

fn parse_bits(token: &str) -> Option<u8> {
    match token {
        "0" => Some(0),
        "32" => Some(32),
        "64" => Some(64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let target: Target = "x86-64-linux".parse().unwrap();
        assert_eq!(target, Target::new(Os::Linux, Arch::X86, 64));
    }

    #[test]
    fn test_parse_features_canonical_order() {
        let target: Target = "x86-64-windows-sse41-mingw".parse().unwrap();
        assert!(target.has_feature(Feature::MinGW));
        assert!(!target.is_windows_coff());
        assert_eq!(target.to_string(), "x86-64-windows-mingw-sse41");
    }

    #[test]
    fn test_features_print_sorted_by_token() {
        let target: Target = "arm-64-ios-mingw-metal-debug".parse().unwrap();
        assert_eq!(target.to_string(), "arm-64-ios-debug-metal-mingw");

        let tokens: Vec<_> = Feature::TOKENS.iter().map(|(_, t)| *t).collect();
        let mut sorted = tokens.clone();
        sorted.sort_unstable();
        assert_eq!(tokens, sorted);
    }

    #[test]
    fn test_windows_coff() {
        let target: Target = "x86-32-windows".parse().unwrap();
        assert!(target.is_windows_coff());
    }

    #[test]
    fn test_pnacl() {
        let target: Target = "pnacl-0-nacl".parse().unwrap();
        assert!(target.is_portable_bitcode());
        assert_eq!(target.bits, 0);
    }

    #[test]
    fn test_host_with_features() {
        let target: Target = "host-debug".parse().unwrap();
        let host = Target::host();
        assert_eq!(target.os, host.os);
        assert_eq!(target.arch, host.arch);
        assert!(target.has_feature(Feature::Debug));
    }

    #[test]
    fn test_round_trip_display() {
        for s in ["arm-32-android", "x86-64-osx-avx-avx2", "hexagon-32-noos"] {
            let target: Target = s.parse().unwrap();
            assert_eq!(target.to_string(), s);
        }
    }

    #[test]
    fn test_rejects_unknown_token() {
        let err = "x86-64-linux-turbo".parse::<Target>().unwrap_err();
        assert!(err.contains("'turbo'"));
    }

    #[test]
    fn test_rejects_incomplete() {
        assert!("x86-linux".parse::<Target>().is_err());
        assert!("".parse::<Target>().is_err());
    }
}
