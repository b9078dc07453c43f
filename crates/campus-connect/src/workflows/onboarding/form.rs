use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::workflows::accounts::UserRole;

pub const MIN_DISPLAY_NAME_CHARS: usize = 2;

/// Roles a user may pick for themselves. Admin accounts are provisioned elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleChoice {
    Student,
    Alumni,
}

impl From<RoleChoice> for UserRole {
    fn from(value: RoleChoice) -> Self {
        match value {
            RoleChoice::Student => UserRole::Student,
            RoleChoice::Alumni => UserRole::Alumni,
        }
    }
}

/// Raw form state as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileForm {
    pub display_name: String,
    pub role: Option<RoleChoice>,
    pub department: String,
    pub batch: String,
    pub company: String,
    pub job_title: String,
    pub bio: String,
}

impl ProfileForm {
    /// Company and job title inputs are only offered to alumni.
    pub fn shows_alumni_fields(&self) -> bool {
        self.role == Some(RoleChoice::Alumni)
    }

    /// Switch role; alumni-only inputs keep whatever was typed into them.
    pub fn set_role(&mut self, role: RoleChoice) {
        self.role = Some(role);
    }

    pub fn validate(&self) -> Result<ValidatedProfile, FieldErrors> {
        let mut errors = FieldErrors::default();

        let display_name = self.display_name.trim();
        if display_name.chars().count() < MIN_DISPLAY_NAME_CHARS {
            errors.insert(
                ProfileField::DisplayName,
                format!("Name must be at least {MIN_DISPLAY_NAME_CHARS} characters"),
            );
        }

        let role = match self.role {
            Some(role) => Some(role),
            None => {
                errors.insert(ProfileField::Role, "Please select a role");
                None
            }
        };

        let (Some(role), true) = (role, errors.is_empty()) else {
            return Err(errors);
        };

        let alumni = role == RoleChoice::Alumni;
        Ok(ValidatedProfile {
            display_name: display_name.to_string(),
            role,
            department: optional(&self.department),
            batch: optional(&self.batch),
            company: if alumni { optional(&self.company) } else { None },
            job_title: if alumni { optional(&self.job_title) } else { None },
            bio: optional(&self.bio),
        })
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Form input that passed validation, normalized for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProfile {
    pub display_name: String,
    pub role: RoleChoice,
    pub department: Option<String>,
    pub batch: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    DisplayName,
    Role,
    Department,
    Batch,
    Company,
    JobTitle,
    Bio,
}

impl ProfileField {
    pub const fn name(self) -> &'static str {
        match self {
            ProfileField::DisplayName => "displayName",
            ProfileField::Role => "role",
            ProfileField::Department => "department",
            ProfileField::Batch => "batch",
            ProfileField::Company => "company",
            ProfileField::JobTitle => "jobTitle",
            ProfileField::Bio => "bio",
        }
    }
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<ProfileField, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: ProfileField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = ProfileField> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.name(), message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, role: Option<RoleChoice>) -> ProfileForm {
        ProfileForm {
            display_name: name.to_string(),
            role,
            ..ProfileForm::default()
        }
    }

    #[test]
    fn short_names_are_rejected_after_trimming() {
        let errors = form("  a  ", Some(RoleChoice::Student))
            .validate()
            .expect_err("too short");
        assert_eq!(
            errors.get(ProfileField::DisplayName),
            Some("Name must be at least 2 characters")
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn role_is_required() {
        let errors = form("Ada", None).validate().expect_err("role missing");
        assert_eq!(errors.get(ProfileField::Role), Some("Please select a role"));
    }

    #[test]
    fn every_violation_is_reported() {
        let errors = form("", None).validate().expect_err("both invalid");
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec![ProfileField::DisplayName, ProfileField::Role]);
    }

    #[test]
    fn two_character_names_pass_and_blank_optionals_become_none() {
        let mut input = form(" Al ", Some(RoleChoice::Student));
        input.department = "   ".to_string();
        input.batch = "2021".to_string();

        let valid = input.validate().expect("valid");
        assert_eq!(valid.display_name, "Al");
        assert_eq!(valid.department, None);
        assert_eq!(valid.batch.as_deref(), Some("2021"));
    }

    #[test]
    fn switching_away_from_alumni_keeps_inputs_but_drops_them_from_the_record() {
        let mut input = form("Ada", Some(RoleChoice::Alumni));
        input.company = "Analytical Engines".to_string();
        input.job_title = "Engineer".to_string();
        assert!(input.shows_alumni_fields());

        input.set_role(RoleChoice::Student);
        assert!(!input.shows_alumni_fields());
        assert_eq!(input.company, "Analytical Engines");

        let valid = input.validate().expect("valid");
        assert_eq!(valid.company, None);
        assert_eq!(valid.job_title, None);

        input.set_role(RoleChoice::Alumni);
        let valid = input.validate().expect("valid");
        assert_eq!(valid.company.as_deref(), Some("Analytical Engines"));
        assert_eq!(valid.job_title.as_deref(), Some("Engineer"));
    }
}
