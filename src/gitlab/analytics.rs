//! Aggregations over fetched pipelines and issues.
//!
//! Everything here is a pure fold; fetching lives in the session methods.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{Issue, IssueState, Pipeline, PipelineStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessRateReport {
    pub total: usize,
    pub successful: usize,
    /// Percentage (0-100); 0 when there are no pipelines
    pub rate: f64,
}

/// Mean wall-clock run time of finished pipelines.
///
/// `mean_seconds` divides by `timed_pipelines`, the pipelines that have both
/// a start and a finish time, not by everything fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunTimeReport {
    pub total_pipelines: usize,
    pub timed_pipelines: usize,
    pub total_seconds: i64,
    pub mean_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueLatency {
    pub iid: u64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueCompletionReport {
    pub closed_issues: usize,
    pub mean_seconds: Option<f64>,
    pub issues: Vec<IssueLatency>,
}

#[allow(clippy::cast_precision_loss)]
pub fn success_rate(pipelines: &[Pipeline]) -> SuccessRateReport {
    let total = pipelines.len();
    let successful = pipelines
        .iter()
        .filter(|p| p.status == PipelineStatus::Success)
        .count();

    let rate = if total == 0 {
        0.0
    } else {
        successful as f64 / total as f64 * 100.0
    };

    SuccessRateReport {
        total,
        successful,
        rate,
    }
}

/// Seconds between start and finish, if the pipeline has both.
pub fn pipeline_seconds(pipeline: &Pipeline) -> Option<i64> {
    let started = pipeline.started_at?;
    let finished = pipeline.finished_at?;
    Some((finished - started).num_seconds())
}

#[allow(clippy::cast_precision_loss)]
pub fn run_time(pipelines: &[Pipeline]) -> RunTimeReport {
    let durations: Vec<i64> = pipelines.iter().filter_map(pipeline_seconds).collect();
    let total_seconds: i64 = durations.iter().sum();

    let mean_seconds = if durations.is_empty() {
        None
    } else {
        Some(total_seconds as f64 / durations.len() as f64)
    };

    RunTimeReport {
        total_pipelines: pipelines.len(),
        timed_pipelines: durations.len(),
        total_seconds,
        mean_seconds,
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn issue_completion(issues: &[Issue]) -> IssueCompletionReport {
    let latencies: Vec<IssueLatency> = issues
        .iter()
        .filter(|issue| issue.state == IssueState::Closed)
        .filter_map(|issue| {
            let closed_at = issue.closed_at?;
            Some(IssueLatency {
                iid: issue.iid,
                title: issue.title.clone(),
                created_at: issue.created_at,
                closed_at,
                seconds: (closed_at - issue.created_at).num_seconds(),
            })
        })
        .collect();

    let mean_seconds = if latencies.is_empty() {
        None
    } else {
        let total: i64 = latencies.iter().map(|l| l.seconds).sum();
        Some(total as f64 / latencies.len() as f64)
    };

    IssueCompletionReport {
        closed_issues: latencies.len(),
        mean_seconds,
        issues: latencies,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::gitlab::timestamp::parse_timestamp;

    fn pipeline(id: u64, status: PipelineStatus) -> Pipeline {
        Pipeline {
            id,
            ref_: "main".to_string(),
            status,
            created_at: None,
            started_at: None,
            finished_at: None,
            web_url: None,
        }
    }

    fn timed(id: u64, started: &str, finished: Option<&str>) -> Pipeline {
        Pipeline {
            started_at: Some(parse_timestamp(started).unwrap()),
            finished_at: finished.map(|f| parse_timestamp(f).unwrap()),
            ..pipeline(id, PipelineStatus::Success)
        }
    }

    fn issue(iid: u64, state: IssueState, created: &str, closed: Option<&str>) -> Issue {
        Issue {
            iid,
            title: format!("issue {iid}"),
            state,
            created_at: parse_timestamp(created).unwrap(),
            closed_at: closed.map(|c| parse_timestamp(c).unwrap()),
            labels: vec![],
            web_url: None,
        }
    }

    mod success_rate {
        use super::*;

        #[test]
        fn counts_only_exact_success() {
            let pipelines = vec![
                pipeline(1, PipelineStatus::Success),
                pipeline(2, PipelineStatus::Success),
                pipeline(3, PipelineStatus::Failed),
                pipeline(4, PipelineStatus::Running),
            ];

            let report = success_rate(&pipelines);

            assert_eq!(report.total, 4);
            assert_eq!(report.successful, 2);
            assert_eq!(report.rate, 50.0);
        }

        #[test]
        fn empty_collection_is_zero() {
            let report = success_rate(&[]);
            assert_eq!(report.total, 0);
            assert_eq!(report.rate, 0.0);
            assert!(!report.rate.is_nan());
        }
    }

    mod run_time {
        use super::*;

        #[test]
        fn divides_by_pipelines_with_both_timestamps() {
            let pipelines = vec![
                timed(1, "2024-01-01T00:00:00Z", Some("2024-01-01T00:10:00Z")),
                timed(2, "2024-01-01T01:00:00Z", Some("2024-01-01T01:20:00Z")),
                timed(3, "2024-01-01T02:00:00Z", None),
                pipeline(4, PipelineStatus::Pending),
            ];

            let report = run_time(&pipelines);

            assert_eq!(report.total_pipelines, 4);
            assert_eq!(report.timed_pipelines, 2);
            assert_eq!(report.total_seconds, 1800);
            assert_eq!(report.mean_seconds, Some(900.0));
        }

        #[test]
        fn no_finished_pipelines_gives_no_mean() {
            let pipelines = vec![timed(1, "2024-01-01T00:00:00Z", None)];
            let report = run_time(&pipelines);

            assert_eq!(report.timed_pipelines, 0);
            assert_eq!(report.total_seconds, 0);
            assert_eq!(report.mean_seconds, None);
        }

        #[test]
        fn accepts_timestamps_without_zone_marker() {
            let pipelines = vec![timed(1, "2024-01-01T00:00:00", Some("2024-01-01T00:01:30Z"))];
            assert_eq!(run_time(&pipelines).mean_seconds, Some(90.0));
        }
    }

    mod issue_completion {
        use super::*;

        #[test]
        fn one_day_latency_is_exact() {
            let issues = vec![issue(
                1,
                IssueState::Closed,
                "2024-01-01T00:00:00Z",
                Some("2024-01-02T00:00:00Z"),
            )];

            let report = issue_completion(&issues);

            assert_eq!(report.closed_issues, 1);
            assert_eq!(report.issues[0].seconds, 24 * 60 * 60);
            assert_eq!(report.mean_seconds, Some(86_400.0));
        }

        #[test]
        fn open_issues_are_not_part_of_the_closed_set() {
            let issues = vec![
                issue(1, IssueState::Opened, "2024-01-01T00:00:00Z", None),
                issue(
                    2,
                    IssueState::Closed,
                    "2024-01-01T00:00:00Z",
                    Some("2024-01-01T12:00:00Z"),
                ),
                issue(
                    3,
                    IssueState::Closed,
                    "2024-01-01T00:00:00Z",
                    Some("2024-01-02T12:00:00Z"),
                ),
            ];

            let report = issue_completion(&issues);

            assert_eq!(report.closed_issues, 2);
            assert_eq!(report.mean_seconds, Some(86_400.0));
        }

        #[test]
        fn no_closed_issues_gives_no_mean() {
            let issues = vec![issue(1, IssueState::Opened, "2024-01-01T00:00:00Z", None)];
            let report = issue_completion(&issues);

            assert_eq!(report.closed_issues, 0);
            assert_eq!(report.mean_seconds, None);
            assert!(report.issues.is_empty());
        }
    }
}
