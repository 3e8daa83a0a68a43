//! Direct messages between two principals.

use serde::{Deserialize, Serialize};

use super::principal::Principal;
use super::time::Timestamp;

/// A single direct message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Principal,
    pub recipient: Principal,
    pub content: String,
    pub timestamp: Timestamp,
    pub read: bool,
}

impl Message {
    /// Whether `me` sent this message.
    #[must_use]
    pub fn is_from(&self, me: &Principal) -> bool {
        &self.sender == me
    }

    /// The other side of the conversation from `me`'s point of view.
    #[must_use]
    pub fn counterparty<'a>(&'a self, me: &Principal) -> &'a Principal {
        if self.is_from(me) {
            &self.recipient
        } else {
            &self.sender
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_counterparty_from_either_side() {
        let alice = Principal::parse("alice").unwrap();
        let bob = Principal::parse("bob").unwrap();
        let message = Message {
            sender: alice.clone(),
            recipient: bob.clone(),
            content: "Front nine at 7?".to_string(),
            timestamp: Timestamp::from_nanos(1),
            read: false,
        };

        assert!(message.is_from(&alice));
        assert_eq!(message.counterparty(&alice), &bob);
        assert_eq!(message.counterparty(&bob), &alice);
    }
}
