use log::info;
use serde::Serialize;

use super::core::Session;
use crate::error::{Mutation, Result};
use crate::gitlab::timer::ScopedTimer;
use crate::gitlab::types::GroupVariable;

#[derive(Serialize)]
struct NewVariable<'a> {
    key: &'a str,
    value: &'a str,
    masked: bool,
}

impl Session {
    /// Stores a CI/CD variable on a group, inherited by all its projects.
    pub async fn create_group_variable(
        &self,
        group_id: u64,
        key: &str,
        value: &str,
        masked: bool,
    ) -> Result<GroupVariable> {
        let _timer = ScopedTimer::operation("create_group_variable");

        let body = NewVariable { key, value, masked };

        let variable: GroupVariable = self
            .post(&format!("groups/{group_id}/variables"), &body)
            .await
            .map_err(|e| e.rejected(Mutation::Create, format!("variable {key} on group {group_id}")))?;

        info!("Variable {} created on group {group_id}", variable.key);
        Ok(variable)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use crate::error::LabError;
    use crate::gitlab::client::testing::connected;

    #[tokio::test]
    async fn existing_variable_is_create_error() {
        let mut server = mockito::Server::new_async().await;
        let session = connected(&mut server).await;

        let create = server
            .mock("POST", "/api/v4/groups/5/variables")
            .match_body(Matcher::PartialJson(json!({"key": "GITLAB_PRIVATE_TOKEN", "masked": true})))
            .with_status(400)
            .with_body(r#"{"message":{"key":["(GITLAB_PRIVATE_TOKEN) has already been taken"]}}"#)
            .expect(1)
            .create_async()
            .await;

        let err = session
            .create_group_variable(5, "GITLAB_PRIVATE_TOKEN", "glpat-0123456789abcdef", true)
            .await
            .unwrap_err();

        assert!(matches!(err, LabError::Create { ref message, .. } if message.contains("already been taken")));
        create.assert_async().await;
    }
}
