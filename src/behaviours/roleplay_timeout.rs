//! Stops roleplays nobody has posted in for a while.

use super::ContinuousBehaviour;
use crate::{core::roleplay, errors::Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{error, info};

/// Stops active roleplays idle for longer than the timeout.
pub struct RoleplayTimeoutBehaviour {
    db: DatabaseConnection,
    timeout: Duration,
}

impl RoleplayTimeoutBehaviour {
    /// Creates the behaviour.
    #[must_use]
    pub const fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl ContinuousBehaviour for RoleplayTimeoutBehaviour {
    fn name(&self) -> &'static str {
        "roleplay-timeout"
    }

    async fn tick(&self) -> Result<()> {
        let txn = self.db.begin().await?;
        let timed_out = roleplay::get_timed_out_roleplays(&txn, Utc::now(), self.timeout).await?;

        for rp in timed_out {
            match roleplay::stop_roleplay(&txn, rp.id).await {
                Ok(_) => info!(roleplay_id = rp.id, name = %rp.name, "Roleplay timed out"),
                Err(e) => error!(roleplay_id = rp.id, error = %e, "Failed to time out roleplay"),
            }
        }

        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::roleplay as roleplay_entity, test_utils::*};
    use sea_orm::{ActiveModelTrait, Set};

    async fn backdate(db: &DatabaseConnection, roleplay_id: i64, hours: i64) -> Result<()> {
        let model = roleplay::get_roleplay_by_id(db, roleplay_id).await?;
        let mut active: roleplay_entity::ActiveModel = model.into();
        active.last_updated = Set(Some(Utc::now() - Duration::hours(hours)));
        active.update(db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_tick_stops_only_idle_roleplays() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let idle = create_test_roleplay(&db, "Idle").await?;
        let busy = create_test_roleplay(&db, "Busy").await?;
        roleplay::start_roleplay(&db, idle.id, "100").await?;
        roleplay::start_roleplay(&db, busy.id, "200").await?;
        backdate(&db, idle.id, 100).await?;
        backdate(&db, busy.id, 1).await?;

        let behaviour = RoleplayTimeoutBehaviour::new(db.clone(), Duration::hours(72));
        behaviour.tick().await?;

        assert!(!roleplay::get_roleplay_by_id(&db, idle.id).await?.is_active);
        assert!(roleplay::get_roleplay_by_id(&db, busy.id).await?.is_active);

        // Nothing left to do on the next tick
        behaviour.tick().await?;
        Ok(())
    }
}
