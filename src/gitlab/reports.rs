//! Session-level reports: fetch, then fold with [`super::analytics`].

use log::info;
use serde::Serialize;

use super::analytics::{self, IssueCompletionReport, RunTimeReport, SuccessRateReport};
use super::client::Session;
use super::timer::ScopedTimer;
use super::types::{Commit, Issue, IssueState, Pipeline, PipelineStatus, Project};
use crate::error::Result;

const SUMMARY_COMMITS: usize = 5;

/// Receives progress of a report that fetches each pipeline in turn.
///
/// `()` ignores every event.
pub trait DetailObserver {
    fn listed(&mut self, _count: usize) {}
    fn fetched(&mut self) {}
    fn finished(&mut self, _timed: usize) {}
}

impl DetailObserver for () {}

/// Dashboard view of a single project.
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub project: Project,
    pub failing_pipelines: Vec<Pipeline>,
    pub open_issues: Vec<Issue>,
    pub recent_commits: Vec<Commit>,
}

impl Session {
    pub async fn pipeline_success_report(&self, project_id: u64) -> Result<SuccessRateReport> {
        let _timer = ScopedTimer::operation("pipeline_success_report");

        let pipelines = self.list_pipelines(project_id, None).await?;
        let report = analytics::success_rate(&pipelines);

        info!(
            "Project {project_id}: {}/{} pipelines succeeded ({:.1}%)",
            report.successful, report.total, report.rate
        );
        Ok(report)
    }

    /// Lists pipelines, then fetches each one for its start and finish times.
    pub async fn pipeline_run_time_report(
        &self,
        project_id: u64,
        observer: &mut impl DetailObserver,
    ) -> Result<RunTimeReport> {
        let _timer = ScopedTimer::operation("pipeline_run_time_report");

        let listed = self.list_pipelines(project_id, None).await?;
        observer.listed(listed.len());

        let mut detailed = Vec::with_capacity(listed.len());
        for pipeline in &listed {
            detailed.push(self.get_pipeline(project_id, pipeline.id).await?);
            observer.fetched();
        }

        let report = analytics::run_time(&detailed);
        observer.finished(report.timed_pipelines);

        Ok(report)
    }

    pub async fn issue_completion_report(&self, project_id: u64) -> Result<IssueCompletionReport> {
        let _timer = ScopedTimer::operation("issue_completion_report");

        let closed = self.list_issues(project_id, Some(IssueState::Closed)).await?;
        Ok(analytics::issue_completion(&closed))
    }

    pub async fn project_summary(&self, project_id: u64) -> Result<ProjectSummary> {
        let _timer = ScopedTimer::operation("project_summary");

        let project = self.get_project(project_id).await?;
        let failing_pipelines = self
            .list_pipelines(project_id, Some(PipelineStatus::Failed))
            .await?;
        let open_issues = self.list_issues(project_id, Some(IssueState::Opened)).await?;
        let recent_commits = self.list_recent_commits(project_id, SUMMARY_COMMITS).await?;

        Ok(ProjectSummary {
            project,
            failing_pipelines,
            open_issues,
            recent_commits,
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use mockito::Matcher;

    use super::DetailObserver;
    use crate::error::LabError;
    use crate::gitlab::client::testing::connected;

    #[derive(Default)]
    struct Recorder {
        listed: Option<usize>,
        fetched: usize,
        finished: Option<usize>,
    }

    impl DetailObserver for Recorder {
        fn listed(&mut self, count: usize) {
            self.listed = Some(count);
        }

        fn fetched(&mut self) {
            self.fetched += 1;
        }

        fn finished(&mut self, timed: usize) {
            self.finished = Some(timed);
        }
    }

    #[tokio::test]
    async fn success_report_counts_across_pages() {
        let mut server = mockito::Server::new_async().await;
        let session = connected(&mut server).await;

        let list = server
            .mock("GET", "/api/v4/projects/7/pipelines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "")
            .with_body(
                r#"[
                    {"id":1,"ref":"main","status":"success"},
                    {"id":2,"ref":"main","status":"success"},
                    {"id":3,"ref":"main","status":"failed"},
                    {"id":4,"ref":"main","status":"running"}
                ]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let report = session.pipeline_success_report(7).await.unwrap();

        assert_eq!(report.total, 4);
        assert_eq!(report.rate, 50.0);
        list.assert_async().await;
    }

    #[tokio::test]
    async fn run_time_report_fetches_each_pipeline() {
        let mut server = mockito::Server::new_async().await;
        let session = connected(&mut server).await;

        let _list = server
            .mock("GET", "/api/v4/projects/7/pipelines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "")
            .with_body(r#"[{"id":1,"status":"success"},{"id":2,"status":"running"}]"#)
            .create_async()
            .await;
        let first = server
            .mock("GET", "/api/v4/projects/7/pipelines/1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":1,"status":"success",
                    "started_at":"2024-01-01T00:00:00Z",
                    "finished_at":"2024-01-01T00:05:00Z"}"#,
            )
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/api/v4/projects/7/pipelines/2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":2,"status":"running",
                    "started_at":"2024-01-01T00:00:00Z",
                    "finished_at":null}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let report = session.pipeline_run_time_report(7, &mut ()).await.unwrap();

        assert_eq!(report.total_pipelines, 2);
        assert_eq!(report.timed_pipelines, 1);
        assert_eq!(report.mean_seconds, Some(300.0));
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn run_time_report_notifies_observer() {
        let mut server = mockito::Server::new_async().await;
        let session = connected(&mut server).await;

        let _list = server
            .mock("GET", "/api/v4/projects/7/pipelines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "")
            .with_body(r#"[{"id":1,"status":"success"},{"id":2,"status":"skipped"}]"#)
            .create_async()
            .await;
        let _detail = server
            .mock("GET", Matcher::Regex(r"^/api/v4/projects/7/pipelines/\d+$".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":1,"status":"success",
                    "started_at":"2024-01-01T00:00:00Z",
                    "finished_at":"2024-01-01T00:01:00Z"}"#,
            )
            .expect(2)
            .create_async()
            .await;

        let mut recorder = Recorder::default();
        session
            .pipeline_run_time_report(7, &mut recorder)
            .await
            .unwrap();

        assert_eq!(recorder.listed, Some(2));
        assert_eq!(recorder.fetched, 2);
        assert_eq!(recorder.finished, Some(2));
    }

    #[tokio::test]
    async fn issue_report_requests_closed_issues() {
        let mut server = mockito::Server::new_async().await;
        let session = connected(&mut server).await;

        let list = server
            .mock("GET", "/api/v4/projects/7/issues")
            .match_query(Matcher::UrlEncoded("state".into(), "closed".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "")
            .with_body(
                r#"[{"iid":1,"title":"a","state":"closed",
                     "created_at":"2024-01-01T00:00:00Z",
                     "closed_at":"2024-01-02T00:00:00Z"}]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let report = session.issue_completion_report(7).await.unwrap();

        assert_eq!(report.closed_issues, 1);
        assert_eq!(report.mean_seconds, Some(86_400.0));
        list.assert_async().await;
    }

    #[tokio::test]
    async fn summary_fails_for_unknown_project() {
        let mut server = mockito::Server::new_async().await;
        let session = connected(&mut server).await;

        let _missing = server
            .mock("GET", "/api/v4/projects/404")
            .with_status(404)
            .with_body(r#"{"message":"404 Project Not Found"}"#)
            .create_async()
            .await;

        let err = session.project_summary(404).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn summary_collects_failures_issues_and_commits() {
        let mut server = mockito::Server::new_async().await;
        let session = connected(&mut server).await;

        let _project = server
            .mock("GET", "/api/v4/projects/7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":7,"name":"app","name_with_namespace":"Team / app"}"#)
            .create_async()
            .await;
        let _pipelines = server
            .mock("GET", "/api/v4/projects/7/pipelines")
            .match_query(Matcher::UrlEncoded("status".into(), "failed".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "")
            .with_body(r#"[{"id":9,"ref":"main","status":"failed"}]"#)
            .create_async()
            .await;
        let _issues = server
            .mock("GET", "/api/v4/projects/7/issues")
            .match_query(Matcher::UrlEncoded("state".into(), "opened".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "")
            .with_body(r#"[{"iid":3,"title":"broken","state":"opened","created_at":"2024-01-01T00:00:00Z"}]"#)
            .create_async()
            .await;
        let commits = server
            .mock("GET", "/api/v4/projects/7/repository/commits")
            .match_query(Matcher::UrlEncoded("per_page".into(), "5".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"short_id":"abc1234","title":"Initial commit","author_name":"Dev"}]"#)
            .expect(1)
            .create_async()
            .await;

        let summary = session.project_summary(7).await.unwrap();

        assert_eq!(summary.project.display_name(), "Team / app");
        assert_eq!(summary.failing_pipelines.len(), 1);
        assert_eq!(summary.open_issues[0].iid, 3);
        assert_eq!(summary.recent_commits[0].short_id, "abc1234");
        commits.assert_async().await;
    }

    #[tokio::test]
    async fn failed_detail_fetch_fails_report() {
        let mut server = mockito::Server::new_async().await;
        let session = connected(&mut server).await;

        let _list = server
            .mock("GET", "/api/v4/projects/7/pipelines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "")
            .with_body(r#"[{"id":1,"status":"success"}]"#)
            .create_async()
            .await;
        let _detail = server
            .mock("GET", "/api/v4/projects/7/pipelines/1")
            .with_status(500)
            .create_async()
            .await;

        let err = session.pipeline_run_time_report(7, &mut ()).await.unwrap_err();
        assert!(matches!(err, LabError::Api { status: 500, .. }));
    }
}
