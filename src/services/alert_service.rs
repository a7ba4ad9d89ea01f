use chrono::{ DateTime, Duration, Utc };
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    Order,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

use crate::db::entity::{ alert, alert_history, alert_price_track };
use crate::enums::{ AlertKind, AlertStatus, NotificationChannel };
use crate::error::{ AppError, Result };

/// Minimum time between two trigger events of the same alert.
pub const TRIGGER_COOLDOWN_SECS: i64 = 300;

/// Callers read at most this many recent track samples.
pub const PRICE_TRACK_READ_LIMIT: u64 = 500;

#[derive(Debug, Clone)]
pub struct CreateAlertRequest {
    pub user_id: String,
    pub asset_id: Uuid,
    pub kind: AlertKind,
    pub threshold: Decimal,
    pub channels: Vec<NotificationChannel>,
}

/// What one pass observed for the alert's asset, already EUR-normalized.
#[derive(Debug, Clone, Default)]
pub struct AlertObservation {
    pub price_eur: Option<Decimal>,
    pub change_percent: Option<Decimal>,
    pub volume: Option<Decimal>,
}

/// Outcome decided for one alert in one pass. `Trigger` is the only plan
/// that notifies; a sustained breach keeps producing `Sample` until the
/// condition clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPlan {
    /// Missing data or no evaluation rule: leave the alert untouched.
    Skip,
    /// IDLE→TRACKING: trigger bundle plus notifications.
    Trigger,
    /// Still tracking: append one price sample.
    Sample,
    /// TRACKING→IDLE: condition cleared, stop tracking quietly.
    Reset,
    /// Idle and nothing to do (condition false, or true but cooling down).
    Hold,
}

/// Evaluate the alert's condition against an observation. `None` means the
/// data needed by this kind was missing this pass.
pub fn condition_met(
    kind: AlertKind,
    threshold: Decimal,
    observation: &AlertObservation
) -> Option<bool> {
    // No current price means the whole alert is skipped for the pass,
    // whatever the kind.
    let price = observation.price_eur?;

    match kind {
        AlertKind::PriceAbove => Some(price >= threshold),
        AlertKind::PriceBelow => Some(price <= threshold),
        AlertKind::PercentChange =>
            observation.change_percent.map(|change| change.abs() >= threshold),
        AlertKind::VolumeSpike => observation.volume.map(|volume| volume >= threshold),
        AlertKind::TechnicalSignal => None,
    }
}

/// Pure transition decision for one alert in one pass.
pub fn plan_transition(
    alert: &alert::Model,
    observation: &AlertObservation,
    now: DateTime<Utc>
) -> AlertPlan {
    let Ok(kind) = alert.kind.parse::<AlertKind>() else {
        return AlertPlan::Skip;
    };

    let Some(met) = condition_met(kind, alert.threshold, observation) else {
        return AlertPlan::Skip;
    };

    if alert.is_tracking {
        if met {
            return AlertPlan::Sample;
        }
        return AlertPlan::Reset;
    }

    if !met {
        return AlertPlan::Hold;
    }

    let cooled_down = match alert.last_triggered_at {
        Some(last) => now - last >= Duration::seconds(TRIGGER_COOLDOWN_SECS),
        None => true,
    };

    if cooled_down { AlertPlan::Trigger } else { AlertPlan::Hold }
}

/// Human-readable trigger message sent to the alert's channels.
pub fn format_trigger_message(
    kind: AlertKind,
    symbol: &str,
    price_eur: Decimal,
    threshold: Decimal
) -> String {
    let condition = match kind {
        AlertKind::PriceAbove => format!("rose above €{}", threshold),
        AlertKind::PriceBelow => format!("fell below €{}", threshold),
        AlertKind::PercentChange => format!("moved more than {}% today", threshold),
        AlertKind::VolumeSpike => format!("trading volume exceeded {}", threshold),
        AlertKind::TechnicalSignal => "triggered".to_string(),
    };

    format!("Price Alert: {} {} (current price €{})", symbol, condition, price_eur)
}

/// Parse the JSON channel array stored on an alert row. Unknown entries
/// are dropped with a debug log rather than failing the whole alert.
pub fn parse_channels(channels: &serde_json::Value) -> Vec<NotificationChannel> {
    let Some(entries) = channels.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| entry.as_str())
        .filter_map(|name| {
            match name.parse::<NotificationChannel>() {
                Ok(channel) => Some(channel),
                Err(_) => {
                    tracing::debug!("Dropping unknown notification channel '{}'", name);
                    None
                }
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct AlertService {
    db: DatabaseConnection,
}

impl AlertService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new alert. Kinds without an evaluation rule are rejected
    /// here rather than sitting forever un-evaluated.
    pub async fn create_alert(&self, req: CreateAlertRequest) -> Result<alert::Model> {
        if !req.kind.has_evaluation_rule() {
            return Err(AppError::UnsupportedAlertKind(req.kind.to_string()));
        }

        if req.threshold <= Decimal::ZERO {
            return Err(AppError::InvalidInput("Threshold must be positive".to_string()));
        }

        if req.channels.is_empty() {
            return Err(
                AppError::InvalidInput("At least one notification channel is required".to_string())
            );
        }

        let now = Utc::now();
        let channels: Vec<&str> = req.channels.iter().map(|c| c.as_str()).collect();

        let model = alert::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(req.user_id),
            asset_id: ActiveValue::Set(req.asset_id),
            kind: ActiveValue::Set(req.kind.to_string()),
            threshold: ActiveValue::Set(req.threshold),
            status: ActiveValue::Set(AlertStatus::Active.to_string()),
            channels: ActiveValue::Set(serde_json::json!(channels)),
            is_tracking: ActiveValue::Set(false),
            tracking_started_at: ActiveValue::Set(None),
            last_triggered_at: ActiveValue::Set(None),
            trigger_count: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let created = model.insert(&self.db).await?;
        Ok(created)
    }

    pub async fn get_alert(&self, id: Uuid, user_id: &str) -> Result<alert::Model> {
        alert::Entity
            ::find_by_id(id)
            .filter(alert::Column::UserId.eq(user_id))
            .one(&self.db).await?
            .ok_or(AppError::AlertNotFound)
    }

    pub async fn list_user_alerts(
        &self,
        user_id: &str,
        active_only: bool
    ) -> Result<Vec<alert::Model>> {
        let mut query = alert::Entity::find().filter(alert::Column::UserId.eq(user_id));

        if active_only {
            query = query.filter(alert::Column::Status.eq(AlertStatus::Active.as_str()));
        }

        let alerts = query.all(&self.db).await?;
        Ok(alerts)
    }

    pub async fn delete_alert(&self, id: Uuid, user_id: &str) -> Result<()> {
        alert::Entity
            ::delete_many()
            .filter(alert::Column::Id.eq(id))
            .filter(alert::Column::UserId.eq(user_id))
            .exec(&self.db).await?;
        Ok(())
    }

    /// User-facing status change. Any move away from `active` also stops
    /// tracking: a paused or expired alert must never keep sampling.
    pub async fn update_status(
        &self,
        id: Uuid,
        user_id: &str,
        status: AlertStatus
    ) -> Result<alert::Model> {
        let alert = self.get_alert(id, user_id).await?;

        let mut active: alert::ActiveModel = alert.into();
        active.status = ActiveValue::Set(status.to_string());
        if status != AlertStatus::Active {
            active.is_tracking = ActiveValue::Set(false);
            active.tracking_started_at = ActiveValue::Set(None);
        }
        active.updated_at = ActiveValue::Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    /// Every alert the evaluation pass considers.
    pub async fn get_active_alerts(&self) -> Result<Vec<alert::Model>> {
        let alerts = alert::Entity
            ::find()
            .filter(alert::Column::Status.eq(AlertStatus::Active.as_str()))
            .all(&self.db).await?;
        Ok(alerts)
    }

    /// The trigger bundle: counters, tracking flags, one history row and
    /// one track sample, committed as a single transaction. Notifications
    /// are dispatched by the caller after the commit.
    pub async fn apply_trigger(
        &self,
        alert: alert::Model,
        price_eur: Decimal,
        message: String,
        now: DateTime<Utc>
    ) -> Result<(alert::Model, alert_history::Model)> {
        let txn = self.db.begin().await?;

        let threshold = alert.threshold;
        let trigger_count = alert.trigger_count;
        let alert_id = alert.id;

        let mut active: alert::ActiveModel = alert.into();
        active.trigger_count = ActiveValue::Set(trigger_count + 1);
        active.last_triggered_at = ActiveValue::Set(Some(now));
        active.is_tracking = ActiveValue::Set(true);
        active.tracking_started_at = ActiveValue::Set(Some(now));
        active.updated_at = ActiveValue::Set(now);
        let updated = active.update(&txn).await?;

        let history = alert_history::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            alert_id: ActiveValue::Set(alert_id),
            price_at_trigger: ActiveValue::Set(price_eur),
            message: ActiveValue::Set(message),
            notified: ActiveValue::Set(false),
            triggered_at: ActiveValue::Set(now),
        };
        let history = history.insert(&txn).await?;

        let track = alert_price_track::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            alert_id: ActiveValue::Set(alert_id),
            price: ActiveValue::Set(price_eur),
            threshold: ActiveValue::Set(threshold),
            recorded_at: ActiveValue::Set(now),
        };
        track.insert(&txn).await?;

        txn.commit().await?;

        Ok((updated, history))
    }

    /// One price sample while a breach is being tracked.
    pub async fn apply_sample(
        &self,
        alert: &alert::Model,
        price_eur: Decimal,
        now: DateTime<Utc>
    ) -> Result<()> {
        let track = alert_price_track::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            alert_id: ActiveValue::Set(alert.id),
            price: ActiveValue::Set(price_eur),
            threshold: ActiveValue::Set(alert.threshold),
            recorded_at: ActiveValue::Set(now),
        };
        track.insert(&self.db).await?;
        Ok(())
    }

    /// TRACKING→IDLE. Quiet: no notification, no history row.
    pub async fn apply_reset(
        &self,
        alert: alert::Model,
        now: DateTime<Utc>
    ) -> Result<alert::Model> {
        let mut active: alert::ActiveModel = alert.into();
        active.is_tracking = ActiveValue::Set(false);
        active.tracking_started_at = ActiveValue::Set(None);
        active.updated_at = ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn mark_history_notified(&self, history: alert_history::Model) -> Result<()> {
        let mut active: alert_history::ActiveModel = history.into();
        active.notified = ActiveValue::Set(true);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Most recent track samples for an alert, newest first.
    pub async fn recent_price_track(
        &self,
        alert_id: Uuid
    ) -> Result<Vec<alert_price_track::Model>> {
        let samples = alert_price_track::Entity
            ::find()
            .filter(alert_price_track::Column::AlertId.eq(alert_id))
            .order_by(alert_price_track::Column::RecordedAt, Order::Desc)
            .limit(PRICE_TRACK_READ_LIMIT)
            .all(&self.db).await?;
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn alert_with(kind: AlertKind, threshold: Decimal) -> alert::Model {
        let now = Utc::now();
        alert::Model {
            id: Uuid::new_v4(),
            user_id: "42".to_string(),
            asset_id: Uuid::new_v4(),
            kind: kind.to_string(),
            threshold,
            status: AlertStatus::Active.to_string(),
            channels: serde_json::json!(["telegram"]),
            is_tracking: false,
            tracking_started_at: None,
            last_triggered_at: None,
            trigger_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn priced(price_eur: Decimal) -> AlertObservation {
        AlertObservation {
            price_eur: Some(price_eur),
            change_percent: None,
            volume: None,
        }
    }

    #[test]
    fn price_above_below_threshold_holds() {
        // €95 against a €100 threshold: nothing happens.
        let alert = alert_with(AlertKind::PriceAbove, dec!(100));
        assert_eq!(plan_transition(&alert, &priced(dec!(95)), Utc::now()), AlertPlan::Hold);
    }

    #[test]
    fn price_above_crossing_triggers_once() {
        let mut alert = alert_with(AlertKind::PriceAbove, dec!(100));
        let now = Utc::now();

        assert_eq!(plan_transition(&alert, &priced(dec!(101)), now), AlertPlan::Trigger);

        // Apply the trigger the way the evaluator would, then re-plan on a
        // later pass with the breach sustained: only a sample, no second
        // notification.
        alert.is_tracking = true;
        alert.last_triggered_at = Some(now);
        alert.trigger_count = 1;

        let later = now + Duration::seconds(60);
        assert_eq!(plan_transition(&alert, &priced(dec!(102)), later), AlertPlan::Sample);
    }

    #[test]
    fn tracking_resets_when_condition_clears() {
        let mut alert = alert_with(AlertKind::PriceAbove, dec!(100));
        alert.is_tracking = true;
        alert.last_triggered_at = Some(Utc::now());

        assert_eq!(
            plan_transition(&alert, &priced(dec!(99)), Utc::now()),
            AlertPlan::Reset
        );
    }

    #[test]
    fn cooldown_suppresses_immediate_retrigger() {
        let now = Utc::now();
        let mut alert = alert_with(AlertKind::PriceBelow, dec!(50));
        // Triggered and reset two minutes ago; condition true again.
        alert.last_triggered_at = Some(now - Duration::seconds(120));

        assert_eq!(plan_transition(&alert, &priced(dec!(49)), now), AlertPlan::Hold);

        let after_cooldown = now + Duration::seconds(TRIGGER_COOLDOWN_SECS);
        assert_eq!(
            plan_transition(&alert, &priced(dec!(49)), after_cooldown),
            AlertPlan::Trigger
        );
    }

    #[test]
    fn missing_price_skips_every_kind() {
        let alert = alert_with(AlertKind::PercentChange, dec!(5));
        let observation = AlertObservation {
            price_eur: None,
            change_percent: Some(dec!(9)),
            volume: None,
        };
        assert_eq!(plan_transition(&alert, &observation, Utc::now()), AlertPlan::Skip);
    }

    #[test]
    fn percent_change_uses_absolute_value() {
        let observation = AlertObservation {
            price_eur: Some(dec!(10)),
            change_percent: Some(dec!(-6.5)),
            volume: None,
        };
        assert_eq!(
            condition_met(AlertKind::PercentChange, dec!(5), &observation),
            Some(true)
        );
    }

    #[test]
    fn volume_spike_without_volume_data_skips() {
        let alert = alert_with(AlertKind::VolumeSpike, dec!(1000000));
        assert_eq!(plan_transition(&alert, &priced(dec!(10)), Utc::now()), AlertPlan::Skip);
    }

    #[test]
    fn technical_signal_rows_are_skipped() {
        let alert = alert_with(AlertKind::TechnicalSignal, dec!(1));
        assert_eq!(plan_transition(&alert, &priced(dec!(10)), Utc::now()), AlertPlan::Skip);
    }

    #[test]
    fn notifications_bounded_by_transitions_over_a_breach_cycle() {
        // A sustained breach, a clear, and a re-breach: two transitions,
        // so at most two notifications.
        let mut alert = alert_with(AlertKind::PriceAbove, dec!(100));
        let start = Utc::now();
        let series = [
            (dec!(95), 0i64),
            (dec!(101), 1),
            (dec!(103), 2),
            (dec!(104), 3),
            (dec!(98), 4),
            (dec!(102), 400), // past cooldown
            (dec!(105), 401),
        ];

        let mut notifications = 0;
        let mut transitions = 0;

        for (price, minutes) in series {
            let now = start + Duration::minutes(minutes);
            match plan_transition(&alert, &priced(price), now) {
                AlertPlan::Trigger => {
                    transitions += 1;
                    notifications += 1;
                    alert.is_tracking = true;
                    alert.last_triggered_at = Some(now);
                    alert.trigger_count += 1;
                }
                AlertPlan::Reset => {
                    alert.is_tracking = false;
                }
                _ => {}
            }
        }

        assert_eq!(transitions, 2);
        assert!(notifications <= transitions);
    }

    #[test]
    fn parse_channels_drops_unknown_entries() {
        let channels = serde_json::json!(["telegram", "smoke_signal", "email"]);
        assert_eq!(
            parse_channels(&channels),
            vec![NotificationChannel::Telegram, NotificationChannel::Email]
        );
    }
}
