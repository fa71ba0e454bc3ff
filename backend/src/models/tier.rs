//! Demand-state tier assigned to every `(colony, resource)` pair.

use serde::{Deserialize, Serialize};

/// One of five demand states, totally ordered by urgency. `ActiveRequestor`
/// and `ActiveProvider` are the urgent poles; the classifier never produces
/// `ActiveRequestor` on its own — it is only set via an explicit
/// `requestResource` override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    ActiveRequestor,
    PassiveRequestor,
    Equilibrium,
    PassiveProvider,
    ActiveProvider,
    /// Reached only on a classifier logic bug; excluded from every
    /// bucket and logged rather than acted on.
    Error,
}

impl Tier {
    pub fn is_requestor(&self) -> bool {
        matches!(self, Tier::ActiveRequestor | Tier::PassiveRequestor)
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Tier::ActiveProvider | Tier::PassiveProvider)
    }

    /// Heading used when grouping colonies for the console summary.
    pub fn heading(&self) -> &'static str {
        match self {
            Tier::ActiveProvider => "active providers",
            Tier::PassiveProvider => "passive providers",
            Tier::Equilibrium => "equilibrium",
            Tier::PassiveRequestor => "passive requestors",
            Tier::ActiveRequestor => "active requestors",
            Tier::Error => "errored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requestor_and_provider_are_disjoint() {
        for tier in [
            Tier::ActiveRequestor,
            Tier::PassiveRequestor,
            Tier::Equilibrium,
            Tier::PassiveProvider,
            Tier::ActiveProvider,
        ] {
            assert!(!(tier.is_requestor() && tier.is_provider()));
        }
    }
}
