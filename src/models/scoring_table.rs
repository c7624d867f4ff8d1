use std::path::Path;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Keyword lists and signal weights consumed by the extractor and rule scorer.
///
/// Every field has a default, so a tuned table only needs to carry the
/// entries it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringTable {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_tour_verbs")]
    pub tour_verbs: Vec<String>,
    #[serde(default = "default_time_keywords")]
    pub time_keywords: Vec<String>,
    #[serde(default = "default_vendor_keywords")]
    pub vendor_keywords: Vec<String>,
    #[serde(default = "default_job_keywords")]
    pub job_keywords: Vec<String>,
    #[serde(default = "default_receipt_keywords")]
    pub receipt_keywords: Vec<String>,
    #[serde(default = "default_seller_keywords")]
    pub seller_keywords: Vec<String>,
    #[serde(default = "default_portal_domains")]
    pub portal_domains: Vec<String>,
    #[serde(default)]
    pub weights: SignalWeights,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignalWeights {
    pub tour_verb: i32,
    pub address: i32,
    pub time_ask: i32,
    pub price: i32,
    pub phone: i32,
    pub portal: i32,
    pub vendor_penalty: i32,
    pub job_pitch_penalty: i32,
    pub receipt_penalty: i32,
    /// Minimum score forced when a tour verb meets any context entity.
    pub override_floor: i32,
}

impl SignalWeights {
    fn entries(&self) -> [(&'static str, i32); 10] {
        [
            ("tour_verb", self.tour_verb),
            ("address", self.address),
            ("time_ask", self.time_ask),
            ("price", self.price),
            ("phone", self.phone),
            ("portal", self.portal),
            ("vendor_penalty", self.vendor_penalty),
            ("job_pitch_penalty", self.job_pitch_penalty),
            ("receipt_penalty", self.receipt_penalty),
            ("override_floor", self.override_floor),
        ]
    }
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            tour_verb: 25,
            address: 10,
            time_ask: 10,
            price: 10,
            phone: 15,
            portal: 15,
            vendor_penalty: 25,
            job_pitch_penalty: 20,
            receipt_penalty: 20,
            override_floor: 85,
        }
    }
}

fn default_version() -> String {
    "builtin-1".to_string()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_tour_verbs() -> Vec<String> {
    strings(&[
        "tour",
        "tours",
        "touring",
        "showing",
        "show me",
        "see the house",
        "see the home",
        "see the property",
        "see the place",
        "see the unit",
        "viewing",
        "walkthrough",
        "walk through",
        "open house",
    ])
}

fn default_time_keywords() -> Vec<String> {
    strings(&[
        "tour",
        "showing",
        "schedule",
        "available",
        "availability",
        "today",
        "tomorrow",
        "this week",
        "next week",
        "weekend",
        "morning",
        "afternoon",
        "evening",
        "time",
    ])
}

fn default_vendor_keywords() -> Vec<String> {
    strings(&[
        "unsubscribe",
        "manage preferences",
        "newsletter",
        "promo",
        "sale",
        "limited time",
        "webinar",
        "sponsorship",
    ])
}

fn default_job_keywords() -> Vec<String> {
    strings(&[
        "resume",
        "cv",
        "candidate",
        "job",
        "position",
        "apply",
        "application",
        "hiring",
    ])
}

fn default_receipt_keywords() -> Vec<String> {
    strings(&[
        "receipt",
        "notification",
        "no-reply",
        "noreply",
        "do-not-reply",
    ])
}

fn default_seller_keywords() -> Vec<String> {
    strings(&[
        "listing",
        "list my",
        "sell",
        "selling",
        "sell my",
        "cma",
        "comparative market analysis",
        "home value",
        "what's my home worth",
    ])
}

fn default_portal_domains() -> Vec<String> {
    strings(&[
        "zillow.com",
        "realtor.com",
        "redfin.com",
        "trulia.com",
        "homes.com",
        "apartments.com",
        "hotpads.com",
        "streeteasy.com",
        "loopnet.com",
    ])
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            version: default_version(),
            tour_verbs: default_tour_verbs(),
            time_keywords: default_time_keywords(),
            vendor_keywords: default_vendor_keywords(),
            job_keywords: default_job_keywords(),
            receipt_keywords: default_receipt_keywords(),
            seller_keywords: default_seller_keywords(),
            portal_domains: default_portal_domains(),
            weights: SignalWeights::default(),
        }
    }
}

impl ScoringTable {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let table: ScoringTable = serde_json::from_str(json)?;
        let lists = [
            ("tour_verbs", &table.tour_verbs),
            ("time_keywords", &table.time_keywords),
            ("vendor_keywords", &table.vendor_keywords),
            ("job_keywords", &table.job_keywords),
            ("receipt_keywords", &table.receipt_keywords),
            ("seller_keywords", &table.seller_keywords),
            ("portal_domains", &table.portal_domains),
        ];
        for (name, list) in lists {
            if list.iter().all(|k| k.trim().is_empty()) {
                anyhow::bail!("scoring table list is empty: {name}");
            }
        }
        for (name, weight) in table.weights.entries() {
            anyhow::ensure!(
                (0..=100).contains(&weight),
                "scoring weight {name} must be within 0..=100, got {weight}"
            );
        }
        Ok(table)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scoring table {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("invalid scoring table {}", path.display()))
    }

    pub fn compile(self) -> anyhow::Result<ScoringRules> {
        Ok(ScoringRules {
            tour: KeywordSet::new(&self.tour_verbs)?,
            time: KeywordSet::new(&self.time_keywords)?,
            vendor: KeywordSet::new(&self.vendor_keywords)?,
            job: KeywordSet::new(&self.job_keywords)?,
            receipt: KeywordSet::new(&self.receipt_keywords)?,
            seller: KeywordSet::new(&self.seller_keywords)?,
            portals: self
                .portal_domains
                .iter()
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            table: self,
        })
    }
}

/// Case-insensitive whole-word matcher over a keyword list.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    regex: Regex,
}

impl KeywordSet {
    pub fn new(keywords: &[String]) -> anyhow::Result<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| {
                let mut pattern = String::new();
                if k.starts_with(|c: char| c.is_alphanumeric()) {
                    pattern.push_str(r"\b");
                }
                pattern.push_str(&regex::escape(k).replace(' ', r"\s+"));
                if k.ends_with(|c: char| c.is_alphanumeric()) {
                    pattern.push_str(r"\b");
                }
                pattern
            })
            .collect();
        anyhow::ensure!(!alternatives.is_empty(), "keyword list is empty");

        let regex = Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

}

/// A [`ScoringTable`] with its keyword lists compiled for matching.
#[derive(Debug, Clone)]
pub struct ScoringRules {
    pub table: ScoringTable,
    pub tour: KeywordSet,
    pub time: KeywordSet,
    pub vendor: KeywordSet,
    pub job: KeywordSet,
    pub receipt: KeywordSet,
    pub seller: KeywordSet,
    portals: Vec<String>,
}

static BUILTIN_RULES: Lazy<ScoringRules> = Lazy::new(|| {
    ScoringTable::default()
        .compile()
        .expect("built-in scoring table compiles")
});

impl Default for ScoringRules {
    fn default() -> Self {
        BUILTIN_RULES.clone()
    }
}

impl ScoringRules {
    /// Built-in rules, or the table stored at `path` when one is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let table = ScoringTable::from_path(path)?;
        tracing::info!(version = %table.version, path = %path.display(), "loaded scoring table");
        table.compile()
    }

    pub fn weights(&self) -> &SignalWeights {
        &self.table.weights
    }

    pub fn version(&self) -> &str {
        &self.table.version
    }

    /// First recognized portal domain appearing in `text`.
    pub fn portal_in(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.portals
            .iter()
            .find(|d| lower.contains(d.as_str()))
            .map(|d| d.as_str())
    }
}
