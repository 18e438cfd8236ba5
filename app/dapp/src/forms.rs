use std::ops::RangeInclusive;

use ballot::{Action, Gender};

use crate::{error::AppError, utils::sanitize};

pub const SECONDS_PER_HOUR: u64 = 3600;
/// Registration age, the same bound for voters and candidates.
pub const AGE_RANGE: RangeInclusive<u64> = 18..=120;
/// One week.
pub const MAX_HOURS: u64 = 168;

fn required(field: &str, raw: &str) -> Result<String, AppError> {
    let value = sanitize(raw);
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} is required")));
    }

    Ok(value)
}

fn positive(field: &str, raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(AppError::InvalidInput(format!(
            "{field} must be a positive whole number, got '{}'",
            raw.trim()
        ))),
    }
}

fn bounded(field: &str, raw: &str, range: RangeInclusive<u64>) -> Result<u64, AppError> {
    let value = positive(field, raw)?;
    if !range.contains(&value) {
        return Err(AppError::InvalidInput(format!(
            "{field} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )));
    }

    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterForm {
    pub name: String,
    pub age: u64,
    pub gender: Gender,
}

impl VoterForm {
    pub fn parse(name: &str, age: &str, gender: Gender) -> Result<Self, AppError> {
        Ok(Self {
            name: required("Name", name)?,
            age: bounded("Age", age, AGE_RANGE)?,
            gender,
        })
    }

    pub fn into_action(self) -> Action {
        Action::RegisterVoter {
            name: self.name,
            age: self.age,
            gender: self.gender,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateForm {
    pub name: String,
    pub party: String,
    pub age: u64,
    pub gender: Gender,
}

impl CandidateForm {
    pub fn parse(name: &str, party: &str, age: &str, gender: Gender) -> Result<Self, AppError> {
        Ok(Self {
            name: required("Name", name)?,
            party: required("Party", party)?,
            age: bounded("Age", age, AGE_RANGE)?,
            gender,
        })
    }

    pub fn into_action(self) -> Action {
        Action::RegisterCandidate {
            name: self.name,
            party: self.party,
            age: self.age,
            gender: self.gender,
        }
    }
}

/// Voting period entered in hours, submitted in seconds. At most a week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodForm {
    pub hours: u64,
}

impl PeriodForm {
    pub fn parse(hours: &str) -> Result<Self, AppError> {
        Ok(Self {
            hours: bounded("Duration", hours, 1..=MAX_HOURS)?,
        })
    }

    pub fn duration_secs(&self) -> u64 {
        self.hours.saturating_mul(SECONDS_PER_HOUR)
    }

    pub fn into_action(self) -> Action {
        Action::SetVotingPeriod {
            duration_secs: self.duration_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voter_form() {
        let form = VoterForm::parse("  Alice  ", "30", Gender::Female).unwrap();
        assert_eq!(
            form.into_action(),
            Action::RegisterVoter {
                name: "Alice".into(),
                age: 30,
                gender: Gender::Female,
            }
        );

        assert!(matches!(
            VoterForm::parse("   ", "30", Gender::Male),
            Err(AppError::InvalidInput(_))
        ));
        assert!(VoterForm::parse("Bob", "thirty", Gender::Male).is_err());
        assert!(VoterForm::parse("Bob", "0", Gender::Male).is_err());
        assert!(VoterForm::parse("Bob", "-4", Gender::Male).is_err());
    }

    #[test]
    fn test_age_bounds() {
        assert!(VoterForm::parse("Kid", "5", Gender::Male).is_err());
        assert!(VoterForm::parse("Bob", "17", Gender::Male).is_err());
        assert_eq!(VoterForm::parse("Bob", "18", Gender::Male).unwrap().age, 18);
        assert_eq!(
            CandidateForm::parse("Dan", "Blue", "120", Gender::Male).unwrap().age,
            120
        );

        let Err(AppError::InvalidInput(message)) =
            CandidateForm::parse("Dan", "Blue", "900", Gender::Male)
        else {
            panic!("age 900 accepted");
        };
        assert_eq!(message, "Age must be between 18 and 120, got 900");
    }

    #[test]
    fn test_candidate_form() {
        let form = CandidateForm::parse("Carol", " Green   Party ", "45", Gender::Other).unwrap();
        assert_eq!(form.party, "Green Party");

        assert!(CandidateForm::parse("Carol", "", "45", Gender::Other).is_err());
    }

    #[test]
    fn test_period_in_seconds() {
        let form = PeriodForm::parse("1").unwrap();
        assert_eq!(
            form.into_action(),
            Action::SetVotingPeriod {
                duration_secs: 3600
            }
        );

        assert_eq!(PeriodForm::parse("24").unwrap().duration_secs(), 86_400);
        assert_eq!(PeriodForm::parse("168").unwrap().duration_secs(), 604_800);
        assert!(PeriodForm::parse("169").is_err());
        assert!(PeriodForm::parse("100000").is_err());
        assert!(PeriodForm::parse("0").is_err());
        assert!(PeriodForm::parse("").is_err());
    }
}
