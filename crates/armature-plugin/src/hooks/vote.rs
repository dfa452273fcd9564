//! Launch-gate votes and the reduced decision.

use std::collections::BTreeMap;

/// One participant's verdict from the launch gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartVote {
    /// The participant is ready for the server to start.
    Go,
    /// The participant vetoes the start.
    NoGo {
        /// Why the participant is not ready.
        reason: String,
    },
}

impl StartVote {
    /// Convenience constructor for a veto.
    pub fn no_go(reason: impl Into<String>) -> Self {
        Self::NoGo {
            reason: reason.into(),
        }
    }

    pub fn is_go(&self) -> bool {
        matches!(self, Self::Go)
    }
}

/// The reduced verdict across every launch-gate participant.
///
/// Go iff every participant voted go; a no-go decision carries one reason
/// per vetoing participant, keyed by name. Participants that voted go never
/// appear in the map, and with zero participants the vacuous decision is go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartDecision {
    /// Every participant voted go.
    Go,
    /// At least one participant vetoed.
    NoGo {
        /// Participant name to its stated reason.
        reasons: BTreeMap<String, String>,
    },
}

impl StartDecision {
    pub fn is_go(&self) -> bool {
        matches!(self, Self::Go)
    }

    /// Reduce an ordered list of participant votes into one decision.
    pub(crate) fn from_votes(votes: Vec<(String, StartVote)>) -> Self {
        let mut reasons = BTreeMap::new();
        for (plugin, vote) in votes {
            if let StartVote::NoGo { reason } = vote {
                reasons.insert(plugin, reason);
            }
        }

        if reasons.is_empty() {
            Self::Go
        } else {
            Self::NoGo { reasons }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vacuous_vote_list_is_go() {
        assert_eq!(StartDecision::from_votes(Vec::new()), StartDecision::Go);
    }

    #[test]
    fn all_go_votes_reduce_to_go() {
        let decision = StartDecision::from_votes(vec![
            ("a".to_string(), StartVote::Go),
            ("b".to_string(), StartVote::Go),
        ]);
        assert!(decision.is_go());
    }

    #[test]
    fn no_go_reasons_contain_only_vetoing_participants() {
        let decision = StartDecision::from_votes(vec![
            ("a".to_string(), StartVote::Go),
            ("b".to_string(), StartVote::no_go("x")),
        ]);

        let StartDecision::NoGo { reasons } = decision else {
            panic!("expected a no-go decision");
        };
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons.get("b").map(String::as_str), Some("x"));
        assert!(!reasons.contains_key("a"));
    }
}
