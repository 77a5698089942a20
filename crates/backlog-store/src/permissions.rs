//! Permission checkers

use crate::error::StoreResult;
use crate::traits::{PermissionChecker, PermissionDecision};
use async_trait::async_trait;
use backlog_model::UserId;
use parking_lot::RwLock;
use std::collections::HashSet;

/// Message returned when a user may not create projects
pub const DENIED_MESSAGE: &str = "El usuario no tiene permisos para crear proyectos";

/// Lets every user create projects
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl PermissionChecker for AllowAll {
    async fn can_create_project(&self, _user: UserId) -> StoreResult<PermissionDecision> {
        Ok(PermissionDecision::allow())
    }
}

/// Explicit allow list of project creators
#[derive(Debug, Default)]
pub struct StaticPermissions {
    creators: RwLock<HashSet<UserId>>,
}

impl StaticPermissions {
    /// Empty allow list: nobody may create projects
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an allowed creator
    #[must_use]
    pub fn with_creator(self, user: UserId) -> Self {
        self.grant(user);
        self
    }

    /// Allow `user` to create projects
    pub fn grant(&self, user: UserId) {
        self.creators.write().insert(user);
    }

    /// Withdraw the right. Returns whether `user` had it.
    pub fn revoke(&self, user: UserId) -> bool {
        self.creators.write().remove(&user)
    }
}

#[async_trait]
impl PermissionChecker for StaticPermissions {
    async fn can_create_project(&self, user: UserId) -> StoreResult<PermissionDecision> {
        if self.creators.read().contains(&user) {
            Ok(PermissionDecision::allow())
        } else {
            tracing::debug!(%user, "project creation denied");
            Ok(PermissionDecision::deny(DENIED_MESSAGE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allow_all_allows() {
        let decision = AllowAll.can_create_project(UserId::new()).await.unwrap();
        assert!(decision.can_create);
        assert!(decision.reason.is_none());
    }

    #[tokio::test]
    async fn static_permissions_follow_the_list() {
        let alice = UserId::new();
        let bob = UserId::new();
        let checker = StaticPermissions::new().with_creator(alice);

        assert!(checker.can_create_project(alice).await.unwrap().can_create);

        let denied = checker.can_create_project(bob).await.unwrap();
        assert!(!denied.can_create);
        assert_eq!(denied.reason.as_deref(), Some(DENIED_MESSAGE));

        assert!(checker.revoke(alice));
        assert!(!checker.can_create_project(alice).await.unwrap().can_create);
    }
}
