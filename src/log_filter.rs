use serde::Deserialize;

use crate::{
    calendar::ExerciseDate,
    domain::{Exercise, parse_leading_int},
};

/// Raw `from` / `to` / `limit` query parameters of a log request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Keep the first `n` entries; a negative `n` drops the last `|n|` instead.
    First(i64),
    /// The limit had no leading integer, which keeps nothing.
    Unparseable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub from: Option<ExerciseDate>,
    pub to: Option<ExerciseDate>,
    pub limit: Option<Limit>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl LogFilter {
    pub fn from_query(query: &LogQuery) -> Self {
        Self {
            from: non_empty(&query.from).map(ExerciseDate::parse),
            to: non_empty(&query.to).map(ExerciseDate::parse),
            limit: non_empty(&query.limit).map(|raw| match parse_leading_int(raw) {
                Some(n) => Limit::First(n),
                None => Limit::Unparseable,
            }),
        }
    }

    /// Runs owner-filtered entries through `from`, then `to`, then `limit`.
    /// The limit always counts entries that survived the date bounds.
    pub fn apply<'a, I>(&self, entries: I) -> Vec<&'a Exercise>
    where
        I: IntoIterator<Item = &'a Exercise>,
    {
        let mut out: Vec<&Exercise> = entries
            .into_iter()
            .filter(|e| self.from.is_none_or(|from| e.date.on_or_after(&from)))
            .filter(|e| self.to.is_none_or(|to| e.date.on_or_before(&to)))
            .collect();

        if let Some(limit) = self.limit {
            truncate(&mut out, limit);
        }
        out
    }
}

fn truncate<T>(items: &mut Vec<T>, limit: Limit) {
    match limit {
        Limit::Unparseable => items.clear(),
        Limit::First(n) if n >= 0 => {
            items.truncate(usize::try_from(n).unwrap_or(usize::MAX));
        }
        Limit::First(n) => {
            let drop = usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX);
            let keep = items.len().saturating_sub(drop);
            items.truncate(keep);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn exercise(description: &str, date: &str) -> Exercise {
        Exercise {
            owner_id: "1".to_string(),
            description: description.to_string(),
            duration_minutes: Some(10),
            date: ExerciseDate::parse(date),
        }
    }

    fn query(from: Option<&str>, to: Option<&str>, limit: Option<&str>) -> LogQuery {
        LogQuery {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    fn descriptions(entries: Vec<&Exercise>) -> Vec<&str> {
        entries.into_iter().map(|e| e.description.as_str()).collect()
    }

    fn sample() -> Vec<Exercise> {
        vec![
            exercise("a", "2024-01-01"),
            exercise("b", "2024-01-02"),
            exercise("c", "2024-01-03"),
            exercise("d", "2024-01-04"),
        ]
    }

    #[test]
    fn empty_query_keeps_everything_in_order() {
        let entries = sample();
        let filter = LogFilter::from_query(&LogQuery::default());
        assert_eq!(filter, LogFilter::default());
        assert_eq!(descriptions(filter.apply(&entries)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn empty_strings_are_ignored() {
        let entries = sample();
        let filter = LogFilter::from_query(&query(Some(""), Some(""), Some("")));
        assert_eq!(filter, LogFilter::default());
        assert_eq!(filter.apply(&entries).len(), 4);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let entries = sample();
        let filter = LogFilter::from_query(&query(Some("2024-01-02"), Some("2024-01-03"), None));
        assert_eq!(descriptions(filter.apply(&entries)), vec!["b", "c"]);
        assert_eq!(
            filter.from,
            Some(ExerciseDate::Day(
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
            ))
        );
    }

    #[test]
    fn limit_counts_date_filtered_entries() {
        let entries = sample();
        let filter = LogFilter::from_query(&query(Some("2024-01-02"), None, Some("2")));
        assert_eq!(descriptions(filter.apply(&entries)), vec!["b", "c"]);
    }

    #[test]
    fn limit_larger_than_log_keeps_all() {
        let entries = sample();
        let filter = LogFilter::from_query(&query(None, None, Some("100")));
        assert_eq!(filter.apply(&entries).len(), 4);
    }

    #[test]
    fn oversized_limit_saturates_and_keeps_all() {
        let entries = sample();
        let filter = LogFilter::from_query(&query(None, None, Some("99999999999999999999")));
        assert_eq!(filter.limit, Some(Limit::First(i64::MAX)));
        assert_eq!(filter.apply(&entries).len(), 4);

        let filter = LogFilter::from_query(&query(None, None, Some("-99999999999999999999")));
        assert!(filter.apply(&entries).is_empty());
    }

    #[test]
    fn zero_or_unparseable_limit_keeps_nothing() {
        let entries = sample();
        for raw in ["0", "many"] {
            let filter = LogFilter::from_query(&query(None, None, Some(raw)));
            assert!(filter.apply(&entries).is_empty(), "limit={raw}");
        }
    }

    #[test]
    fn negative_limit_drops_from_the_end() {
        let entries = sample();
        let filter = LogFilter::from_query(&query(None, None, Some("-1")));
        assert_eq!(descriptions(filter.apply(&entries)), vec!["a", "b", "c"]);

        let filter = LogFilter::from_query(&query(None, None, Some("-10")));
        assert!(filter.apply(&entries).is_empty());
    }

    #[test]
    fn invalid_dates_never_match_bounds() {
        let mut entries = sample();
        entries.push(exercise("bad", "not a date"));

        let unbounded = LogFilter::default();
        assert_eq!(unbounded.apply(&entries).len(), 5);

        let bounded = LogFilter::from_query(&query(Some("2000-01-01"), None, None));
        assert_eq!(descriptions(bounded.apply(&entries)), vec!["a", "b", "c", "d"]);

        let bad_bound = LogFilter::from_query(&query(None, Some("whenever"), None));
        assert!(bad_bound.apply(&entries).is_empty());
    }
}
