//! Incident scenarios the session can open with

use eyre::Result;
use rand::seq::IndexedRandom;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Incident {
    pub description: &'static str,
    pub severity: Severity,
}

pub static CATALOG: [Incident; 3] = [
    Incident {
        description: "A recent update by Da to the data pipeline is causing our recommendation models to \
                      malfunction. Users are seeing unrelated product suggestions.",
        severity: Severity::High,
    },
    Incident {
        description: "There's an anomaly in the way data is being stored post a change committed by Da. \
                      Our database integrity might be compromised.",
        severity: Severity::Medium,
    },
    Incident {
        description: "The recent machine learning model version deployed by Da to the prod environment is \
                      behaving erratically, affecting our predictive capabilities.",
        severity: Severity::Low,
    },
];

/// Pick incident `number` (1-based) from the catalog, or a random one
pub fn pick(number: Option<usize>) -> Result<&'static Incident> {
    match number {
        Some(n) => n
            .checked_sub(1)
            .and_then(|index| CATALOG.get(index))
            .ok_or_else(|| eyre::eyre!("No incident #{}; choose 1 to {}", n, CATALOG.len())),
        None => CATALOG
            .choose(&mut rand::rng())
            .ok_or_else(|| eyre::eyre!("Incident catalog is empty")),
    }
}
