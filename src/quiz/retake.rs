//! Retake cooldown between quiz submissions

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COOLDOWN_DAYS: u32 = 30;

/// Longest cooldown a config may set (ten years)
pub const MAX_COOLDOWN_DAYS: u32 = 3650;

/// Whether a user may submit the quiz again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub can_retake: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retake_date: Option<DateTime<Utc>>,
}

/// Minimum gap between two stored results for the same user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetakePolicy {
    cooldown_days: u32,
}

impl RetakePolicy {
    pub fn new(cooldown_days: u32) -> Self {
        Self { cooldown_days }
    }

    pub fn cooldown_days(&self) -> u32 {
        self.cooldown_days
    }

    pub fn cooldown(&self) -> Duration {
        Duration::days(i64::from(self.cooldown_days))
    }

    /// Earliest moment a user who last took the quiz at `last_taken_at` may
    /// retake it. Saturates at the latest representable time.
    pub fn next_eligible(&self, last_taken_at: DateTime<Utc>) -> DateTime<Utc> {
        last_taken_at
            .checked_add_signed(self.cooldown())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn eligibility(
        &self,
        last_taken_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Eligibility {
        let Some(last) = last_taken_at else {
            return Eligibility {
                can_retake: true,
                next_retake_date: None,
            };
        };
        let next = self.next_eligible(last);
        if now >= next {
            Eligibility {
                can_retake: true,
                next_retake_date: None,
            }
        } else {
            Eligibility {
                can_retake: false,
                next_retake_date: Some(next),
            }
        }
    }
}

impl Default for RetakePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_DAYS)
    }
}
