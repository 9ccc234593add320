use infra::models::{Role, User};
use infra::repos::UserRepo;
use infra::Source;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::permissions::{has_capability, Capability};
use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// The caller of one request, resolved once and handed to every resolver.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    /// Anonymous caller acting as the stored demo user.
    pub demo: bool,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn can(&self, capability: Capability) -> bool {
        has_capability(self.user.role, capability)
    }

    /// Demo sessions keep their events out of the shared database.
    pub fn source(&self) -> Source {
        if self.demo {
            Source::LocalOnly
        } else {
            Source::Auto
        }
    }

    /// Token holders become their stored user. Without a token, demo mode
    /// hands out the demo user and otherwise the caller stays anonymous.
    pub async fn resolve(state: &AppState, claims: Option<&Claims>) -> Result<Option<Self>, AppError> {
        let users = UserRepo::new(state.store.clone());

        if let Some(claims) = claims {
            let user_id = claims.user_id()?;
            return match users.get_by_id(user_id).await? {
                Some(user) => Ok(Some(Self { user, demo: false })),
                None => {
                    warn!(user_id = %user_id, "token refers to an unknown user");
                    Ok(None)
                }
            };
        }

        if state.config.demo_mode {
            let user = users.ensure_demo_user(state.clock.now()).await?;
            debug!(user_id = %user.id, "demo session");
            return Ok(Some(Self { user, demo: true }));
        }
        Ok(None)
    }
}
