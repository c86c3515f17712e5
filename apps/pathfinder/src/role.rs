use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Target job roles the backend knows how to plan for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetRole {
    DataScientist,
    MlEngineer,
    AiEngineer,
    CloudArchitect,
    DevopsEngineer,
    FullStackDeveloper,
    CybersecurityAnalyst,
    ProductManager,
}

impl TargetRole {
    pub const ALL: [TargetRole; 8] = [
        TargetRole::DataScientist,
        TargetRole::MlEngineer,
        TargetRole::AiEngineer,
        TargetRole::CloudArchitect,
        TargetRole::DevopsEngineer,
        TargetRole::FullStackDeveloper,
        TargetRole::CybersecurityAnalyst,
        TargetRole::ProductManager,
    ];

    /// Wire identifier, as sent in the `role` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetRole::DataScientist => "data-scientist",
            TargetRole::MlEngineer => "ml-engineer",
            TargetRole::AiEngineer => "ai-engineer",
            TargetRole::CloudArchitect => "cloud-architect",
            TargetRole::DevopsEngineer => "devops-engineer",
            TargetRole::FullStackDeveloper => "full-stack-developer",
            TargetRole::CybersecurityAnalyst => "cybersecurity-analyst",
            TargetRole::ProductManager => "product-manager",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TargetRole::DataScientist => "Data Scientist",
            TargetRole::MlEngineer => "ML Engineer",
            TargetRole::AiEngineer => "AI Engineer",
            TargetRole::CloudArchitect => "Cloud Architect",
            TargetRole::DevopsEngineer => "DevOps Engineer",
            TargetRole::FullStackDeveloper => "Full Stack Developer",
            TargetRole::CybersecurityAnalyst => "Cybersecurity Analyst",
            TargetRole::ProductManager => "Product Manager",
        }
    }
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetRole {
    type Err = ValidationError;

    /// Accepts only the exact wire identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::MissingRole);
        }
        TargetRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_parses_from_its_identifier() {
        for role in TargetRole::ALL {
            assert_eq!(role.as_str().parse::<TargetRole>(), Ok(role));
        }
    }

    #[test]
    fn test_empty_role_is_missing() {
        assert_eq!("  ".parse::<TargetRole>(), Err(ValidationError::MissingRole));
    }

    #[test]
    fn test_display_name_is_not_an_identifier() {
        assert_eq!(
            "Data Scientist".parse::<TargetRole>(),
            Err(ValidationError::UnknownRole("Data Scientist".to_string()))
        );
    }

    #[test]
    fn test_serializes_as_kebab_case() {
        let json = serde_json::to_string(&TargetRole::FullStackDeveloper).unwrap();
        assert_eq!(json, "\"full-stack-developer\"");
    }
}
