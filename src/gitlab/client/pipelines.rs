use super::core::Session;
use crate::error::Result;
use crate::gitlab::timer::ScopedTimer;
use crate::gitlab::types::{Pipeline, PipelineStatus};

impl Session {
    /// All pipelines of a project, optionally restricted to one status.
    ///
    /// List entries lack start and finish times; use
    /// [`Session::get_pipeline`] when durations are needed.
    pub async fn list_pipelines(
        &self,
        project_id: u64,
        status: Option<PipelineStatus>,
    ) -> Result<Vec<Pipeline>> {
        let _timer = ScopedTimer::operation("list_pipelines");

        let query: Vec<(&str, String)> = status
            .map(|s| vec![("status", s.as_str().to_string())])
            .unwrap_or_default();

        self.get_all(&format!("projects/{project_id}/pipelines"), &query)
            .await
    }

    pub async fn get_pipeline(&self, project_id: u64, pipeline_id: u64) -> Result<Pipeline> {
        self.get(&format!("projects/{project_id}/pipelines/{pipeline_id}"), &[])
            .await
    }
}
