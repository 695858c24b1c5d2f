use chrono::NaiveDate;

use crate::{
    calendar::ExerciseDate,
    domain::{DomainError, Exercise, FieldValue, NewExercise, User},
    id::IdSequence,
    log_filter::LogFilter,
};

/// One user's exercises after filtering, borrowed from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseLog<'a> {
    pub user: &'a User,
    pub entries: Vec<&'a Exercise>,
}

/// Process-lifetime store for users and their exercises. Both collections are
/// append-only and keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Vec<User>,
    exercises: Vec<Exercise>,
    ids: IdSequence,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_user(&mut self, username: Option<String>) -> Result<User, DomainError> {
        let username = username
            .filter(|u| !u.is_empty())
            .ok_or(DomainError::MissingUsername)?;

        let user = User {
            username,
            id: self.ids.next_id(),
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn list_users(&self) -> Vec<User> {
        self.users.clone()
    }

    pub fn get_user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn require_user(&self, user_id: &str) -> Result<&User, DomainError> {
        self.get_user(user_id).ok_or_else(|| DomainError::UserNotFound {
            user_id: user_id.to_string(),
        })
    }

    /// Appends an exercise for `owner_id`. The owner is checked before the
    /// fields, so an unknown owner wins over a missing description.
    pub fn add_exercise(
        &mut self,
        owner_id: &str,
        input: NewExercise,
        today: NaiveDate,
    ) -> Result<(User, Exercise), DomainError> {
        let owner = self.require_user(owner_id)?.clone();

        let description = input.description.filter(FieldValue::is_present);
        let duration = input.duration_minutes.filter(FieldValue::is_present);
        let (Some(description), Some(duration)) = (description, duration) else {
            return Err(DomainError::MissingExerciseFields);
        };

        let exercise = Exercise {
            owner_id: owner.id.clone(),
            description: description.to_text(),
            duration_minutes: duration.minutes(),
            date: input
                .date
                .map_or(ExerciseDate::Day(today), |date| date.date(today)),
        };
        self.exercises.push(exercise.clone());
        Ok((owner, exercise))
    }

    pub fn exercise_log(
        &self,
        owner_id: &str,
        filter: &LogFilter,
    ) -> Result<ExerciseLog<'_>, DomainError> {
        let user = self.require_user(owner_id)?;
        let entries = filter.apply(self.exercises.iter().filter(|e| e.owner_id == user.id));
        Ok(ExerciseLog { user, entries })
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }
}
