//! Named test profiles

use std::fmt;
use std::str::FromStr;

/// Batch profile selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestProfile {
    Quick,
    Standard,
    Comprehensive,
    Stress,
    Performance,
}

impl TestProfile {
    pub const ALL: [TestProfile; 5] = [
        Self::Quick,
        Self::Standard,
        Self::Comprehensive,
        Self::Stress,
        Self::Performance,
    ];

    /// Every profile sends its inputs to the remote system
    pub const TEST_REMOTE: bool = true;

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Comprehensive => "comprehensive",
            Self::Stress => "stress",
            Self::Performance => "performance",
        }
    }

    /// Number of generated inputs
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Quick => 5,
            Self::Standard => 20,
            Self::Comprehensive => 50,
            Self::Stress => 100,
            Self::Performance => 30,
        }
    }


    /// Whether the batch runs in parallel waves
    #[must_use]
    pub fn parallel(&self) -> bool {
        matches!(self, Self::Comprehensive | Self::Stress | Self::Performance)
    }

    /// One-line description for help output
    #[must_use]
    pub fn about(&self) -> &'static str {
        match self {
            Self::Quick => "Quick smoke test (5 inputs, sequential)",
            Self::Standard => "Standard run (20 inputs, sequential)",
            Self::Comprehensive => "Comprehensive run (50 inputs, parallel waves)",
            Self::Stress => "Stress run (100 inputs, parallel waves)",
            Self::Performance => "Performance run (30 inputs, parallel waves)",
        }
    }
}

impl fmt::Display for TestProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown profile: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parameters() {
        let table = [
            (TestProfile::Quick, 5, false),
            (TestProfile::Standard, 20, false),
            (TestProfile::Comprehensive, 50, true),
            (TestProfile::Stress, 100, true),
            (TestProfile::Performance, 30, true),
        ];
        for (profile, count, parallel) in table {
            assert_eq!(profile.count(), count, "{profile}");
            assert_eq!(profile.parallel(), parallel, "{profile}");
            assert_eq!(profile.as_str().parse::<TestProfile>().unwrap(), profile);
        }
    }
}
