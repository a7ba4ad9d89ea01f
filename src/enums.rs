use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ─── AlertKind ───────────────────────────────────────────────────────

/// Condition class of a price alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PriceAbove,
    PriceBelow,
    PercentChange,
    VolumeSpike,
    TechnicalSignal,
}

impl AlertKind {
    /// Canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::PriceAbove => "price_above",
            AlertKind::PriceBelow => "price_below",
            AlertKind::PercentChange => "percent_change",
            AlertKind::VolumeSpike => "volume_spike",
            AlertKind::TechnicalSignal => "technical_signal",
        }
    }

    /// Whether the evaluator has a rule for this kind. `technical_signal`
    /// is accepted by the schema but has no rule, so creation rejects it.
    pub fn has_evaluation_rule(&self) -> bool {
        !matches!(self, AlertKind::TechnicalSignal)
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "price_above" | "above" => Ok(AlertKind::PriceAbove),
            "price_below" | "below" => Ok(AlertKind::PriceBelow),
            "percent_change" | "percent" => Ok(AlertKind::PercentChange),
            "volume_spike" | "volume" => Ok(AlertKind::VolumeSpike),
            "technical_signal" => Ok(AlertKind::TechnicalSignal),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid alert kind: {}. Supported: price_above, price_below, percent_change, volume_spike, technical_signal",
                s
            ))),
        }
    }
}

// ─── AlertStatus ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Paused,
    Expired,
    Triggered,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Paused => "paused",
            AlertStatus::Expired => "expired",
            AlertStatus::Triggered => "triggered",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AlertStatus::Active),
            "paused" => Ok(AlertStatus::Paused),
            "expired" => Ok(AlertStatus::Expired),
            "triggered" => Ok(AlertStatus::Triggered),
            _ => Err(AppError::InvalidInput(format!("Invalid alert status: {}", s))),
        }
    }
}

// ─── AssetStatus ─────────────────────────────────────────────────────

/// Lifecycle state of a trading asset: watching → bought → sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Watching,
    Bought,
    Sold,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Watching => "watching",
            AssetStatus::Bought => "bought",
            AssetStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "watching" => Ok(AssetStatus::Watching),
            "bought" => Ok(AssetStatus::Bought),
            "sold" => Ok(AssetStatus::Sold),
            _ => Err(AppError::InvalidInput(format!("Invalid trading asset status: {}", s))),
        }
    }
}

// ─── SignalAction ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
            SignalAction::Hold => "HOLD",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(SignalAction::Buy),
            "SELL" => Ok(SignalAction::Sell),
            "HOLD" => Ok(SignalAction::Hold),
            _ => Err(AppError::InvalidInput(format!("Invalid signal action: {}", s))),
        }
    }
}

// ─── Confidence ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            _ => Err(AppError::InvalidInput(format!("Invalid confidence: {}", s))),
        }
    }
}

// ─── SuggestionStatus ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Dismissed,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Accepted => "accepted",
            SuggestionStatus::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuggestionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(SuggestionStatus::Pending),
            "accepted" => Ok(SuggestionStatus::Accepted),
            "dismissed" => Ok(SuggestionStatus::Dismissed),
            _ => Err(AppError::InvalidInput(format!("Invalid suggestion status: {}", s))),
        }
    }
}

// ─── Horizon ─────────────────────────────────────────────────────────

/// Investment horizon of a trading profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Short,
    Medium,
    Long,
}

impl Horizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::Short => "short",
            Horizon::Medium => "medium",
            Horizon::Long => "long",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(Horizon::Short),
            "medium" => Ok(Horizon::Medium),
            "long" => Ok(Horizon::Long),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid horizon: {}. Supported: short, medium, long",
                s
            ))),
        }
    }
}

// ─── RiskTolerance ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTolerance {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(RiskTolerance::Conservative),
            "moderate" => Ok(RiskTolerance::Moderate),
            "aggressive" => Ok(RiskTolerance::Aggressive),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid risk tolerance: {}. Supported: conservative, moderate, aggressive",
                s
            ))),
        }
    }
}

// ─── TradingStyle ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingStyle {
    Value,
    Growth,
    Momentum,
    Balanced,
}

impl TradingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingStyle::Value => "value",
            TradingStyle::Growth => "growth",
            TradingStyle::Momentum => "momentum",
            TradingStyle::Balanced => "balanced",
        }
    }
}

impl fmt::Display for TradingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradingStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "value" => Ok(TradingStyle::Value),
            "growth" => Ok(TradingStyle::Growth),
            "momentum" => Ok(TradingStyle::Momentum),
            "balanced" => Ok(TradingStyle::Balanced),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid trading style: {}. Supported: value, growth, momentum, balanced",
                s
            ))),
        }
    }
}

// ─── NotificationChannel ─────────────────────────────────────────────

/// Delivery channel configured on an alert or signal notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Telegram,
    Email,
    Push,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Telegram => "telegram",
            NotificationChannel::Email => "email",
            NotificationChannel::Push => "push",
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationChannel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "telegram" => Ok(NotificationChannel::Telegram),
            "email" => Ok(NotificationChannel::Email),
            "push" => Ok(NotificationChannel::Push),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid notification channel: {}. Supported: telegram, email, push",
                s
            ))),
        }
    }
}

// ─── MoverCategory ───────────────────────────────────────────────────

/// Market-mover list a suggestion candidate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoverCategory {
    Gainers,
    Losers,
    MostActive,
    Trending,
    Undervalued,
    Growth,
}

impl MoverCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoverCategory::Gainers => "gainers",
            MoverCategory::Losers => "losers",
            MoverCategory::MostActive => "most_active",
            MoverCategory::Trending => "trending",
            MoverCategory::Undervalued => "undervalued",
            MoverCategory::Growth => "growth",
        }
    }

    pub fn all() -> &'static [MoverCategory] {
        &[
            MoverCategory::Gainers,
            MoverCategory::Losers,
            MoverCategory::MostActive,
            MoverCategory::Trending,
            MoverCategory::Undervalued,
            MoverCategory::Growth,
        ]
    }
}

impl fmt::Display for MoverCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoverCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gainers" => Ok(MoverCategory::Gainers),
            "losers" => Ok(MoverCategory::Losers),
            "most_active" => Ok(MoverCategory::MostActive),
            "trending" => Ok(MoverCategory::Trending),
            "undervalued" => Ok(MoverCategory::Undervalued),
            "growth" => Ok(MoverCategory::Growth),
            _ => Err(AppError::InvalidInput(format!("Invalid mover category: {}", s))),
        }
    }
}

// ─── Indicator readings ──────────────────────────────────────────────

/// MACD crossover direction reported by the indicator supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    Bullish,
    Bearish,
}

impl FromStr for MacdSignal {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bullish" => Ok(MacdSignal::Bullish),
            "bearish" => Ok(MacdSignal::Bearish),
            _ => Err(AppError::InvalidInput(format!("Invalid MACD signal: {}", s))),
        }
    }
}

/// Position of the current price relative to a moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaPosition {
    Above,
    Below,
}

impl FromStr for MaPosition {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" => Ok(MaPosition::Above),
            "below" => Ok(MaPosition::Below),
            _ => Err(AppError::InvalidInput(format!("Invalid MA position: {}", s))),
        }
    }
}
