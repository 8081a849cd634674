//! Capabilities the controller checks against the registry

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute name marking a KYC/AML-cleared mint recipient
pub const KYC_ATTRIBUTE: &str = "hasPassedKYC/AML";
/// Attribute name marking an identity allowed to approve mints
pub const APPROVER_ATTRIBUTE: &str = "isMintApprover";
/// Attribute name marking a guardian allowed to pause and declare holidays
pub const CHECKER_ATTRIBUTE: &str = "isMintChecker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May receive minted units
    KycPassed,
    /// May co-sign a pending mint
    MintApprover,
    /// Guardian: may pause mints and declare holidays
    MintChecker,
}

impl Capability {
    pub fn attribute_name(&self) -> &'static str {
        match self {
            Capability::KycPassed => KYC_ATTRIBUTE,
            Capability::MintApprover => APPROVER_ATTRIBUTE,
            Capability::MintChecker => CHECKER_ATTRIBUTE,
        }
    }

    pub fn from_attribute(name: &str) -> Option<Self> {
        match name {
            KYC_ATTRIBUTE => Some(Capability::KycPassed),
            APPROVER_ATTRIBUTE => Some(Capability::MintApprover),
            CHECKER_ATTRIBUTE => Some(Capability::MintChecker),
            _ => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names_roundtrip() {
        for capability in [
            Capability::KycPassed,
            Capability::MintApprover,
            Capability::MintChecker,
        ] {
            assert_eq!(
                Capability::from_attribute(capability.attribute_name()),
                Some(capability)
            );
        }
        assert_eq!(Capability::from_attribute("isBlacklisted"), None);
    }
}
