use std::fmt;

use log::info;
use serde::Serialize;

use super::core::Session;
use crate::error::{Mutation, Result};
use crate::gitlab::access_level::AccessLevel;
use crate::gitlab::timer::ScopedTimer;
use crate::gitlab::types::Member;

/// The container whose membership is being managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberScope {
    Group(u64),
    Project(u64),
}

impl MemberScope {
    fn members_path(self) -> String {
        match self {
            Self::Group(id) => format!("groups/{id}/members"),
            Self::Project(id) => format!("projects/{id}/members"),
        }
    }

    fn member_path(self, user_id: u64) -> String {
        format!("{}/{user_id}", self.members_path())
    }
}

impl fmt::Display for MemberScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(id) => write!(f, "group {id}"),
            Self::Project(id) => write!(f, "project {id}"),
        }
    }
}

#[derive(Serialize)]
struct NewMember {
    user_id: u64,
    access_level: u8,
}

#[derive(Serialize)]
struct MemberUpdate {
    access_level: u8,
}

impl Session {
    pub async fn list_members(&self, scope: MemberScope) -> Result<Vec<Member>> {
        let _timer = ScopedTimer::operation("list_members");
        self.get_all(&scope.members_path(), &[]).await
    }

    /// Looks up a direct member; `NotFound` when the user is not one.
    pub async fn get_member(&self, scope: MemberScope, user_id: u64) -> Result<Member> {
        self.get(&scope.member_path(user_id), &[]).await
    }

    pub async fn add_member(
        &self,
        scope: MemberScope,
        user_id: u64,
        level: AccessLevel,
    ) -> Result<Member> {
        let _timer = ScopedTimer::operation("add_member");

        let body = NewMember {
            user_id,
            access_level: level.value(),
        };

        let member: Member = self
            .post(&scope.members_path(), &body)
            .await
            .map_err(|e| e.rejected(Mutation::Create, format!("member {user_id} of {scope}")))?;

        info!("User {user_id} added to {scope} with access level {level}");
        Ok(member)
    }

    /// Removes a direct member.
    ///
    /// The member is looked up first, so an absent member surfaces as
    /// `NotFound` while a refused deletion surfaces as `Delete`.
    pub async fn remove_member(&self, scope: MemberScope, user_id: u64) -> Result<()> {
        let _timer = ScopedTimer::operation("remove_member");

        let member = self.get_member(scope, user_id).await?;

        self.delete(&scope.member_path(user_id))
            .await
            .map_err(|e| e.rejected(Mutation::Delete, format!("member {user_id} of {scope}")))?;

        info!("User {} ({user_id}) removed from {scope}", member.username);
        Ok(())
    }

    /// Changes the access level of an existing member in place.
    ///
    /// Lookup failures are `NotFound`; a rejected save is `Update`.
    pub async fn change_member_access_level(
        &self,
        scope: MemberScope,
        user_id: u64,
        level: AccessLevel,
    ) -> Result<Member> {
        let _timer = ScopedTimer::operation("change_member_access_level");

        let current = self.get_member(scope, user_id).await?;

        let updated: Member = self
            .put(
                &scope.member_path(user_id),
                &MemberUpdate {
                    access_level: level.value(),
                },
            )
            .await
            .map_err(|e| e.rejected(Mutation::Update, format!("member {user_id} of {scope}")))?;

        info!(
            "Access level for {} ({user_id}) in {scope} changed from {} to {level}",
            current.username, current.access_level
        );
        Ok(updated)
    }
}
