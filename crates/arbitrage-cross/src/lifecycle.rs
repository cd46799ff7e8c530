//! Trade lifecycle tiers.
//!
//! A trade attempt starts in [`TradeTier::Pending`] and moves through a closed
//! set of tiers as leg fills and follow-up actions are observed. This module
//! only records outcomes; it never decides which follow-up to take.
//!
//! ```text
//!                 BothLegsFilled ──> SUCCESS
//! PENDING ──────> NoLegsFilled ───> SKIPPED
//!                 OneLegFilled ───> UNHEDGED ──ImmediateExit────────> TIER2_EXIT
//!                                       │  ──ForcedUnwind─────────> TIER3_UNWIND
//!                                       │  ──RetryFilled──────────> RECOVERED
//!                                       │  ──OppositeHedged───────> TIER3_OPPOSITE_HEDGE
//!                                       │  ──OppositeOverweighted─> TIER3_OPPOSITE_OVERWEIGHT
//!                                       └──HeldDirectional──────> TIER3A_HOLD ──ForcedUnwind──> TIER3_UNWIND
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{LedgerError, Result};
use crate::types::LegFill;

// =============================================================================
// Tiers
// =============================================================================

/// Lifecycle classification of a trade attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TradeTier {
    /// Attempt created, leg outcomes not yet known.
    Pending,
    /// Both legs filled; the spread is locked in.
    Success,
    /// One leg filled, the other failed, filled leg closed out immediately.
    Tier2Exit,
    /// A held, unhedged leg was force-closed later.
    Tier3Unwind,
    /// One leg filled and deliberately held as a directional position.
    Tier3aHold,
    /// Opposite team bought on the other venue instead of unwinding.
    Tier3OppositeHedge,
    /// Opposite team bought in a larger size than the filled leg.
    Tier3OppositeOverweight,
    /// One leg filled, no offsetting action yet.
    Unhedged,
    /// A previously unhedged leg had its missing leg filled on retry.
    Recovered,
    /// Neither leg filled.
    Skipped,
}

impl TradeTier {
    /// All tiers, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Pending,
        Self::Success,
        Self::Tier2Exit,
        Self::Tier3Unwind,
        Self::Tier3aHold,
        Self::Tier3OppositeHedge,
        Self::Tier3OppositeOverweight,
        Self::Unhedged,
        Self::Recovered,
        Self::Skipped,
    ];

    /// Returns the wire label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Tier2Exit => "TIER2_EXIT",
            Self::Tier3Unwind => "TIER3_UNWIND",
            Self::Tier3aHold => "TIER3A_HOLD",
            Self::Tier3OppositeHedge => "TIER3_OPPOSITE_HEDGE",
            Self::Tier3OppositeOverweight => "TIER3_OPPOSITE_OVERWEIGHT",
            Self::Unhedged => "UNHEDGED",
            Self::Recovered => "RECOVERED",
            Self::Skipped => "SKIPPED",
        }
    }

    /// No further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Tier2Exit | Self::Tier3Unwind | Self::Skipped
        )
    }

    /// The trade still carries exposure that has not produced a realized
    /// figure: interim tiers plus holds and opposite hedges awaiting the
    /// event result.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(
            self,
            Self::Pending
                | Self::Unhedged
                | Self::Tier3aHold
                | Self::Tier3OppositeHedge
                | Self::Tier3OppositeOverweight
        )
    }

    /// The filled leg was closed out rather than held to settlement.
    #[must_use]
    pub fn is_unwind(self) -> bool {
        matches!(self, Self::Tier2Exit | Self::Tier3Unwind)
    }

    /// Positions of this tier are offset by a leg on the other venue.
    #[must_use]
    pub fn is_hedged(self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::Recovered
                | Self::Tier3OppositeHedge
                | Self::Tier3OppositeOverweight
        )
    }

    /// Applies an observed event.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidTransition`] when `event` cannot follow
    /// this tier.
    pub fn apply(self, event: LifecycleEvent) -> Result<Self> {
        use LifecycleEvent as E;

        let next = match self {
            Self::Pending => match event {
                E::BothLegsFilled => Some(Self::Success),
                E::OneLegFilled => Some(Self::Unhedged),
                E::NoLegsFilled => Some(Self::Skipped),
                E::ImmediateExit
                | E::ForcedUnwind
                | E::HeldDirectional
                | E::OppositeHedged
                | E::OppositeOverweighted
                | E::RetryFilled => None,
            },
            Self::Unhedged => match event {
                E::ImmediateExit => Some(Self::Tier2Exit),
                E::ForcedUnwind => Some(Self::Tier3Unwind),
                E::HeldDirectional => Some(Self::Tier3aHold),
                E::OppositeHedged => Some(Self::Tier3OppositeHedge),
                E::OppositeOverweighted => Some(Self::Tier3OppositeOverweight),
                E::RetryFilled => Some(Self::Recovered),
                E::BothLegsFilled | E::OneLegFilled | E::NoLegsFilled => None,
            },
            Self::Tier3aHold => match event {
                E::ForcedUnwind => Some(Self::Tier3Unwind),
                E::BothLegsFilled
                | E::OneLegFilled
                | E::NoLegsFilled
                | E::ImmediateExit
                | E::HeldDirectional
                | E::OppositeHedged
                | E::OppositeOverweighted
                | E::RetryFilled => None,
            },
            Self::Success
            | Self::Tier2Exit
            | Self::Tier3Unwind
            | Self::Tier3OppositeHedge
            | Self::Tier3OppositeOverweight
            | Self::Recovered
            | Self::Skipped => None,
        };

        next.ok_or(LedgerError::InvalidTransition { from: self, event })
    }
}

impl std::fmt::Display for TradeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TradeTier {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let tier = match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "ATTEMPT_CREATED" => Self::Pending,
            "SUCCESS" | "TIER1_HEDGE" => Self::Success,
            "TIER2_EXIT" => Self::Tier2Exit,
            "TIER3_UNWIND" => Self::Tier3Unwind,
            "TIER3A_HOLD" | "DIRECTIONAL" => Self::Tier3aHold,
            "TIER3_OPPOSITE_HEDGE" => Self::Tier3OppositeHedge,
            "TIER3_OPPOSITE_OVERWEIGHT" => Self::Tier3OppositeOverweight,
            "UNHEDGED" | "PM_NO_FILL" | "K_NO_FILL" => Self::Unhedged,
            "RECOVERED" => Self::Recovered,
            "SKIPPED" | "NO_FILL" => Self::Skipped,
            _ => return Err(LedgerError::UnknownTier(s.to_string())),
        };
        Ok(tier)
    }
}

impl TryFrom<String> for TradeTier {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TradeTier> for String {
    fn from(tier: TradeTier) -> Self {
        tier.as_str().to_string()
    }
}

// =============================================================================
// Events
// =============================================================================

/// An observed outcome that moves a trade between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    BothLegsFilled,
    OneLegFilled,
    NoLegsFilled,
    /// The lone filled leg was closed right after the other leg failed.
    ImmediateExit,
    /// A held leg was force-closed.
    ForcedUnwind,
    /// The lone filled leg is kept open on an external signal.
    HeldDirectional,
    OppositeHedged,
    OppositeOverweighted,
    /// The missing leg filled on a retry.
    RetryFilled,
}

// =============================================================================
// Leg Outcomes
// =============================================================================

/// What happened to one leg's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegOutcome {
    Filled,
    Failed,
    /// No report from the venue yet.
    Unknown,
}

impl LegOutcome {
    /// Reads a leg record: any fill counts as filled; a price with no fill
    /// means the order reached the venue and failed; otherwise unknown.
    #[must_use]
    pub fn from_leg(leg: &LegFill) -> Self {
        if leg.is_filled() {
            Self::Filled
        } else if leg.price_cents.is_some() {
            Self::Failed
        } else {
            Self::Unknown
        }
    }
}

/// Outcomes for both legs of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegOutcomes {
    pub polymarket: LegOutcome,
    pub kalshi: LegOutcome,
}

impl LegOutcomes {
    #[must_use]
    pub fn new(polymarket: LegOutcome, kalshi: LegOutcome) -> Self {
        Self { polymarket, kalshi }
    }

    /// The entry event implied by both outcomes, `None` while either leg is
    /// still unknown.
    #[must_use]
    pub fn entry_event(self) -> Option<LifecycleEvent> {
        use LegOutcome::{Failed, Filled, Unknown};

        match (self.polymarket, self.kalshi) {
            (Filled, Filled) => Some(LifecycleEvent::BothLegsFilled),
            (Filled, Failed) | (Failed, Filled) => Some(LifecycleEvent::OneLegFilled),
            (Failed, Failed) => Some(LifecycleEvent::NoLegsFilled),
            (Unknown, _) | (_, Unknown) => None,
        }
    }
}

/// Classifies an attempt from its leg outcomes and an optional follow-up.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidTransition`] when the follow-up does not
/// apply to the entry tier (e.g. an exit after both legs filled).
pub fn classify(outcomes: LegOutcomes, follow_up: Option<LifecycleEvent>) -> Result<TradeTier> {
    let Some(entry) = outcomes.entry_event() else {
        return Ok(TradeTier::Pending);
    };
    let tier = TradeTier::Pending.apply(entry)?;
    match follow_up {
        Some(event) => tier.apply(event),
        None => Ok(tier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LegOutcome::{Failed, Filled, Unknown};

    // ==================== Parsing Tests ====================

    #[test]
    fn test_parse_labels_and_aliases() {
        assert_eq!("SUCCESS".parse::<TradeTier>().unwrap(), TradeTier::Success);
        assert_eq!("tier1_hedge".parse::<TradeTier>().unwrap(), TradeTier::Success);
        assert_eq!("DIRECTIONAL".parse::<TradeTier>().unwrap(), TradeTier::Tier3aHold);
        assert_eq!("PM_NO_FILL".parse::<TradeTier>().unwrap(), TradeTier::Unhedged);
        assert_eq!("NO_FILL".parse::<TradeTier>().unwrap(), TradeTier::Skipped);
        assert_eq!(" TIER2_EXIT ".parse::<TradeTier>().unwrap(), TradeTier::Tier2Exit);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let err = "MAYBE_HEDGED".parse::<TradeTier>().unwrap_err();
        assert_eq!(err, LedgerError::UnknownTier("MAYBE_HEDGED".to_string()));
    }

    #[test]
    fn test_label_round_trip_for_every_tier() {
        for tier in TradeTier::ALL {
            assert_eq!(tier.as_str().parse::<TradeTier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&TradeTier::Tier3aHold).unwrap();
        assert_eq!(json, "\"TIER3A_HOLD\"");
        let tier: TradeTier = serde_json::from_str("\"TIER1_HEDGE\"").unwrap();
        assert_eq!(tier, TradeTier::Success);
        assert!(serde_json::from_str::<TradeTier>("\"BOGUS\"").is_err());
    }

    // ==================== Classification Tests ====================

    #[test]
    fn test_entry_classification() {
        assert_eq!(
            classify(LegOutcomes::new(Filled, Filled), None).unwrap(),
            TradeTier::Success
        );
        assert_eq!(
            classify(LegOutcomes::new(Failed, Filled), None).unwrap(),
            TradeTier::Unhedged
        );
        assert_eq!(
            classify(LegOutcomes::new(Failed, Failed), None).unwrap(),
            TradeTier::Skipped
        );
        assert_eq!(
            classify(LegOutcomes::new(Filled, Unknown), None).unwrap(),
            TradeTier::Pending
        );
    }

    #[test]
    fn test_follow_up_classification() {
        let one_leg = LegOutcomes::new(Failed, Filled);

        assert_eq!(
            classify(one_leg, Some(LifecycleEvent::ImmediateExit)).unwrap(),
            TradeTier::Tier2Exit
        );
        assert_eq!(
            classify(one_leg, Some(LifecycleEvent::HeldDirectional)).unwrap(),
            TradeTier::Tier3aHold
        );
        assert_eq!(
            classify(one_leg, Some(LifecycleEvent::RetryFilled)).unwrap(),
            TradeTier::Recovered
        );
        assert_eq!(
            classify(one_leg, Some(LifecycleEvent::OppositeOverweighted)).unwrap(),
            TradeTier::Tier3OppositeOverweight
        );
    }

    #[test]
    fn test_follow_up_on_hedged_trade_is_invalid() {
        let err = classify(
            LegOutcomes::new(Filled, Filled),
            Some(LifecycleEvent::ImmediateExit),
        )
        .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InvalidTransition {
                from: TradeTier::Success,
                event: LifecycleEvent::ImmediateExit,
            }
        );
    }

    #[test]
    fn test_leg_outcome_from_record() {
        assert_eq!(LegOutcome::from_leg(&LegFill::filled(52, 10)), Filled);
        assert_eq!(
            LegOutcome::from_leg(&LegFill {
                price_cents: Some(45),
                filled: 0,
                fee: None,
            }),
            Failed
        );
        assert_eq!(LegOutcome::from_leg(&LegFill::default()), Unknown);
    }

    // ==================== Transition Tests ====================

    #[test]
    fn test_hold_can_be_unwound_later() {
        let tier = TradeTier::Unhedged
            .apply(LifecycleEvent::HeldDirectional)
            .unwrap();
        assert!(tier.is_open());

        let tier = tier.apply(LifecycleEvent::ForcedUnwind).unwrap();
        assert_eq!(tier, TradeTier::Tier3Unwind);
        assert!(tier.is_terminal());
    }

    #[test]
    fn test_terminal_tiers_reject_every_event() {
        let events = [
            LifecycleEvent::BothLegsFilled,
            LifecycleEvent::OneLegFilled,
            LifecycleEvent::NoLegsFilled,
            LifecycleEvent::ImmediateExit,
            LifecycleEvent::ForcedUnwind,
            LifecycleEvent::HeldDirectional,
            LifecycleEvent::OppositeHedged,
            LifecycleEvent::OppositeOverweighted,
            LifecycleEvent::RetryFilled,
        ];

        for tier in TradeTier::ALL.into_iter().filter(|t| t.is_terminal()) {
            for event in events {
                assert!(tier.apply(event).is_err(), "{tier} accepted {event:?}");
            }
        }
    }

    #[test]
    fn test_tier_flags() {
        assert!(TradeTier::Tier2Exit.is_unwind());
        assert!(TradeTier::Tier3Unwind.is_unwind());
        assert!(!TradeTier::Success.is_unwind());
        assert!(TradeTier::Recovered.is_hedged());
        assert!(!TradeTier::Recovered.is_open());
        assert!(TradeTier::Unhedged.is_open());
        assert!(!TradeTier::Skipped.is_open());
    }
}
