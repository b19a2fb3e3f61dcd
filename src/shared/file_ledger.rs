use crate::model::configuration::LedgerConfiguration;
use crate::model::user_credit::{UserCreditUpdateInfo, UserCreditUpdateOpt, UserCredits};
use crate::model::user_roll::UserRolls;
use crate::shared::gacha::choose_reward;
use crate::shared::json_store::{load, lock_file, save};
use rand::Rng;
use std::path::PathBuf;
use time::{Duration, OffsetDateTime};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdjustOutcome {
    Updated { points: i64 },
    Insufficient { points: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    Granted { points: i64 },
    CoolingDown { remaining: Duration },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn { item: String, points: i64 },
    Insufficient { points: i64 },
    EmptyPool,
}

#[derive(Clone, Debug)]
pub struct FileLedger {
    users_path: PathBuf,
    items_path: PathBuf,
}

impl FileLedger {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(users_path: P, items_path: Q) -> Self {
        FileLedger {
            users_path: users_path.into(),
            items_path: items_path.into(),
        }
    }

    pub fn from_configuration(configuration: &LedgerConfiguration) -> Self {
        Self::new(&configuration.users_file, &configuration.items_file)
    }

    pub async fn balance(&self, user_id: &str) -> anyhow::Result<i64> {
        let users = load::<UserCredits>(&self.users_path).await?;
        Ok(users.get(user_id).map(|user| user.points).unwrap_or_default())
    }

    pub async fn adjust(
        &self,
        user_id: &str,
        info: UserCreditUpdateInfo,
        opt: UserCreditUpdateOpt,
    ) -> anyhow::Result<AdjustOutcome> {
        let _guard = lock_file(&self.users_path).await;
        let mut users = load::<UserCredits>(&self.users_path).await?;
        let user = users.entry(user_id.to_string()).or_default();

        let points = match opt {
            UserCreditUpdateOpt::Plus => user.points.saturating_add(info.credit),
            UserCreditUpdateOpt::Minus => {
                if user.points < info.credit {
                    return Ok(AdjustOutcome::Insufficient {
                        points: user.points,
                    });
                }
                user.points.saturating_sub(info.credit)
            }
        };
        user.points = points.max(0);
        let points = user.points;

        save(&self.users_path, &users).await?;
        Ok(AdjustOutcome::Updated { points })
    }

    pub async fn claim(
        &self,
        user_id: &str,
        now: OffsetDateTime,
        cooldown: Duration,
        reward: i64,
    ) -> anyhow::Result<ClaimOutcome> {
        let _guard = lock_file(&self.users_path).await;
        let mut users = load::<UserCredits>(&self.users_path).await?;
        let user = users.entry(user_id.to_string()).or_default();

        if let Some(last_claim) = user.last_claim {
            let elapsed = now - last_claim;
            if elapsed < cooldown {
                return Ok(ClaimOutcome::CoolingDown {
                    remaining: cooldown - elapsed,
                });
            }
        }

        user.points = user.points.saturating_add(reward).max(0);
        user.last_claim = Some(now);
        let points = user.points;

        save(&self.users_path, &users).await?;
        Ok(ClaimOutcome::Granted { points })
    }

    pub async fn draw<R: Rng + Send>(
        &self,
        user_id: &str,
        cost: i64,
        pool: &[String],
        rng: &mut R,
    ) -> anyhow::Result<DrawOutcome> {
        let _users_guard = lock_file(&self.users_path).await;
        let _items_guard = lock_file(&self.items_path).await;

        let mut users = load::<UserCredits>(&self.users_path).await?;
        let balance = users
            .get(user_id)
            .map(|user| user.points)
            .unwrap_or_default();
        if balance < cost {
            return Ok(DrawOutcome::Insufficient { points: balance });
        }

        let Some(item) = choose_reward(pool, rng) else {
            return Ok(DrawOutcome::EmptyPool);
        };

        let user = users.entry(user_id.to_string()).or_default();
        user.points = user.points.saturating_sub(cost).max(0);
        let points = user.points;

        let mut items = load::<UserRolls>(&self.items_path).await?;
        items
            .entry(user_id.to_string())
            .or_default()
            .push(item.clone());

        save(&self.users_path, &users).await?;
        save(&self.items_path, &items).await?;
        Ok(DrawOutcome::Drawn { item, points })
    }

    pub async fn items(&self, user_id: &str) -> anyhow::Result<Vec<String>> {
        let mut items = load::<UserRolls>(&self.items_path).await?;
        Ok(items.remove(user_id).unwrap_or_default())
    }
}
