use shared::protocol::PredictionRequest;
use thiserror::Error;

pub const START_HOUR_RANGE: std::ops::RangeInclusive<i64> = 0..=23;
pub const DURATION_MIN_RANGE: std::ops::RangeInclusive<i64> = 1..=300;

/// Raw field values as read from the hosting form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub machine_name: String,
    pub workout_day: String,
    pub workout_plan: String,
    pub muscle_group: String,
    pub start_hour: String,
    pub duration_min: String,
}

/// Prediction request before validation. Text fields are carried as typed;
/// `None` marks a numeric field with no leading integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormCandidate {
    pub machine_name: String,
    pub workout_day: String,
    pub workout_plan: String,
    pub muscle_group: String,
    pub start_hour: Option<i64>,
    pub duration_min: Option<i64>,
}

impl FormInput {
    pub fn to_candidate(&self) -> FormCandidate {
        FormCandidate {
            machine_name: self.machine_name.clone(),
            workout_day: self.workout_day.clone(),
            workout_plan: self.workout_plan.clone(),
            muscle_group: self.muscle_group.clone(),
            start_hour: parse_integer_field(&self.start_hour),
            duration_min: parse_integer_field(&self.duration_min),
        }
    }
}

/// Reads the leading base-10 integer: optional whitespace and sign, then the
/// longest run of digits. Trailing text is ignored, so "12.5" reads as 12 and
/// "7am" as 7. Digit runs too long for `i64` saturate and fail the range checks.
pub fn parse_integer_field(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = unsigned[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Machine name is required.")]
    MissingMachineName,
    #[error("Workout day is required.")]
    MissingWorkoutDay,
    #[error("Workout plan is required.")]
    MissingWorkoutPlan,
    #[error("Muscle group is required.")]
    MissingMuscleGroup,
    #[error("Start hour must be between 0 and 23.")]
    StartHourOutOfRange,
    #[error("Duration must be between 1 and 300 minutes.")]
    DurationOutOfRange,
}

/// Checks fields in form order and stops at the first failure.
pub fn validate_form(candidate: &FormCandidate) -> Result<PredictionRequest, ValidationError> {
    if candidate.machine_name.is_empty() {
        return Err(ValidationError::MissingMachineName);
    }
    if candidate.workout_day.is_empty() {
        return Err(ValidationError::MissingWorkoutDay);
    }
    if candidate.workout_plan.is_empty() {
        return Err(ValidationError::MissingWorkoutPlan);
    }
    if candidate.muscle_group.is_empty() {
        return Err(ValidationError::MissingMuscleGroup);
    }

    let start_hour = candidate
        .start_hour
        .filter(|hour| START_HOUR_RANGE.contains(hour))
        .and_then(|hour| u8::try_from(hour).ok())
        .ok_or(ValidationError::StartHourOutOfRange)?;
    let duration_min = candidate
        .duration_min
        .filter(|minutes| DURATION_MIN_RANGE.contains(minutes))
        .and_then(|minutes| u16::try_from(minutes).ok())
        .ok_or(ValidationError::DurationOutOfRange)?;

    Ok(PredictionRequest {
        machine_name: candidate.machine_name.clone(),
        workout_day: candidate.workout_day.clone(),
        workout_plan: candidate.workout_plan.clone(),
        muscle_group: candidate.muscle_group.clone(),
        start_hour,
        duration_min,
    })
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
