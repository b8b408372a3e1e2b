use chrono::{DateTime, NaiveDate, SubsecRound, Utc};

/// Who is performing an operation and when.
///
/// `now` is captured once per operation so every timestamp written by that
/// operation agrees. It is kept at millisecond precision, like the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub user_id: String,
    pub now: DateTime<Utc>,
}

impl Caller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::at(user_id, Utc::now())
    }

    pub fn at(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            now: now.trunc_subsecs(3),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}
