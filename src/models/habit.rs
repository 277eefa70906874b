//! # Habit Logs
//!
//! A daily habit log and the derived energy score.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;
use validator::Validate;

/// Measured habits a tier objective can be checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitSnapshot {
    pub water_ml: f64,
    pub sleep_h: f64,
    pub activity_min: f64,
    pub serenity_min: f64,
    pub nutrition_score: i32,
}

impl HabitSnapshot {
    /// Weighted percentage summarizing the day.
    ///
    /// Weights: hydration 25%, sleep 30%, nutrition 20%, activity 15%,
    /// serenity 10%. Each component is capped at its target.
    pub fn energy_score(&self) -> u8 {
        fn ratio(value: f64, target: f64) -> f64 {
            (value / target).clamp(0.0, 1.0)
        }

        let score = ratio(self.water_ml, 2000.0) * 25.0
            + ratio(self.sleep_h, 8.0) * 30.0
            + ratio(f64::from(self.nutrition_score), 100.0) * 20.0
            + ratio(self.activity_min, 30.0) * 15.0
            + ratio(self.serenity_min, 10.0) * 10.0;

        score.round() as u8
    }
}

/// Habit log submitted by a user for the current day.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HabitLogRequest {
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10000.0))]
    pub water_ml: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 24.0))]
    pub sleep_h: f64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub nutrition_score: i32,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1440.0))]
    pub activity_min: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1440.0))]
    pub serenity_min: f64,
    #[serde(default = "default_mood")]
    #[validate(range(min = 1, max = 10))]
    pub mood: i32,
    #[serde(default = "default_stress")]
    #[validate(range(min = 0, max = 10))]
    pub stress: i32,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

fn default_mood() -> i32 {
    5
}

fn default_stress() -> i32 {
    5
}

#[derive(Debug, Clone, FromRow)]
pub struct HabitLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day: Date,
    pub water_ml: f64,
    pub sleep_h: f64,
    pub nutrition_score: i32,
    pub activity_min: f64,
    pub serenity_min: f64,
    pub mood: i32,
    pub stress: i32,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

impl HabitLog {
    pub fn from_request(user_id: Uuid, request: HabitLogRequest) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            user_id,
            day: now.date(),
            water_ml: request.water_ml,
            sleep_h: request.sleep_h,
            nutrition_score: request.nutrition_score,
            activity_min: request.activity_min,
            serenity_min: request.serenity_min,
            mood: request.mood,
            stress: request.stress,
            notes: request.notes,
            created_at: now,
        }
    }

    pub fn snapshot(&self) -> HabitSnapshot {
        HabitSnapshot {
            water_ml: self.water_ml,
            sleep_h: self.sleep_h,
            activity_min: self.activity_min,
            serenity_min: self.serenity_min,
            nutrition_score: self.nutrition_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_score_is_weighted_and_capped() {
        assert_eq!(HabitSnapshot::default().energy_score(), 0);

        let perfect = HabitSnapshot {
            water_ml: 3000.0,
            sleep_h: 9.0,
            activity_min: 60.0,
            serenity_min: 20.0,
            nutrition_score: 100,
        };
        assert_eq!(perfect.energy_score(), 100);

        let hydration_and_sleep_only = HabitSnapshot {
            water_ml: 2000.0,
            sleep_h: 8.0,
            ..Default::default()
        };
        assert_eq!(hydration_and_sleep_only.energy_score(), 55);

        let half_water = HabitSnapshot {
            water_ml: 1000.0,
            ..Default::default()
        };
        assert_eq!(half_water.energy_score(), 13);
    }
}
