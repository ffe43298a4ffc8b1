//! Resource accessors scoped to the selected student.

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde_json::Value;
use tracing::debug;

use crate::api::HttpClient;
use crate::auth::CredentialStore;
use crate::decode::decode_field;
use crate::dnevnik::Dnevnik;
use crate::error::{Error, Result};
use crate::models::{Announcement, Period, ANY_ID};
use crate::utils::query_date;

/// Optional filters for [`Dnevnik::get_estimate`].
///
/// Unset month and subject match everything; an unset year is the current
/// calendar year.
#[derive(Debug, Clone, Default)]
pub struct EstimateQuery {
    pub year: Option<i32>,
    pub month_id: Option<String>,
    pub subject_id: Option<String>,
}

/// Day to fetch homework for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HomeworkDate {
    #[default]
    Today,
    On(NaiveDate),
    /// Offset from now, e.g. one day for tomorrow
    In(Duration),
}

impl HomeworkDate {
    fn resolve(self) -> Result<NaiveDate> {
        match self {
            HomeworkDate::Today => Ok(Local::now().date_naive()),
            HomeworkDate::On(date) => Ok(date),
            HomeworkDate::In(offset) => Local::now()
                .checked_add_signed(offset)
                .map(|day| day.date_naive())
                .ok_or_else(|| {
                    Error::Configuration(format!("homework date offset {} is out of range", offset))
                }),
        }
    }
}

impl From<NaiveDate> for HomeworkDate {
    fn from(date: NaiveDate) -> Self {
        HomeworkDate::On(date)
    }
}

impl From<Duration> for HomeworkDate {
    fn from(offset: Duration) -> Self {
        HomeworkDate::In(offset)
    }
}

fn current_year() -> i32 {
    Local::now().year()
}

impl<S: CredentialStore, H: HttpClient> Dnevnik<S, H> {
    /// Fetch grading periods for the current school year
    pub async fn get_periods(&self) -> Result<Vec<Period>> {
        let query = [
            ("studentId", self.student().id.clone()),
            ("schoolYear", current_year().to_string()),
        ];
        let response = self.api.get("/estimate/periods", &query).await?;
        decode_field(response, "periods")
    }

    /// Fetch grades for a period. The payload is returned untyped.
    pub async fn get_estimate(&self, period_id: &str, filter: EstimateQuery) -> Result<Value> {
        let query = [
            ("studentId", self.student().id.clone()),
            ("schoolYear", filter.year.unwrap_or_else(current_year).to_string()),
            ("periodId", period_id.to_string()),
            ("monthId", filter.month_id.unwrap_or_else(|| ANY_ID.to_string())),
            ("subjectId", filter.subject_id.unwrap_or_else(|| ANY_ID.to_string())),
        ];
        self.api.get("/estimate", &query).await
    }

    /// Fetch homework for a day. The payload is returned untyped.
    pub async fn get_homework(&self, date: impl Into<HomeworkDate>) -> Result<Value> {
        let date = query_date(date.into().resolve()?);
        debug!(date = %date, student = %self.student().id, "Fetching homework");

        let query = [("studentId", self.student().id.clone()), ("date", date)];
        self.api.get("/homework", &query).await
    }

    pub async fn get_announcements(&self) -> Result<Vec<Announcement>> {
        let query = [("studentId", self.student().id.clone())];
        let response = self.api.get("/announcements", &query).await?;
        decode_field(response, "announcements")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homework_date_resolution() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert_eq!(HomeworkDate::from(date).resolve().unwrap(), date);

        let today = Local::now().date_naive();
        let tomorrow = HomeworkDate::from(Duration::days(1)).resolve().unwrap();
        assert!(tomorrow > today);
        assert_eq!(HomeworkDate::default(), HomeworkDate::Today);
    }

    #[test]
    fn test_homework_date_offset_out_of_range() {
        for offset in [Duration::MAX, Duration::MIN] {
            let err = HomeworkDate::In(offset).resolve().unwrap_err();
            assert!(matches!(err, Error::Configuration(_)), "{err:?}");
        }
    }
}
