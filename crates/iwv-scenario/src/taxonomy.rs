//! Intent taxonomy and template text
//!
//! Fixed categories of strategic intents, each with template phrases, plus
//! the keyword tiers used to build complexity-targeted scenarios.

use iwv_model::{Complexity, HIGH_COMPLEXITY_KEYWORDS};
use std::fmt;
use std::str::FromStr;

/// Categories of strategic intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntentCategory {
    MarketExpansion,
    ProductLaunch,
    DigitalTransformation,
    CompetitiveResponse,
    Scaling,
    FinancialStrategy,
    Partnership,
    CrisisManagement,
}

impl IntentCategory {
    /// Every category, in batch cycling order
    pub const ALL: [IntentCategory; 8] = [
        Self::MarketExpansion,
        Self::ProductLaunch,
        Self::DigitalTransformation,
        Self::CompetitiveResponse,
        Self::Scaling,
        Self::FinancialStrategy,
        Self::Partnership,
        Self::CrisisManagement,
    ];

    /// Tag stored in `_category`
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketExpansion => "market_expansion",
            Self::ProductLaunch => "product_launch",
            Self::DigitalTransformation => "digital_transformation",
            Self::CompetitiveResponse => "competitive_response",
            Self::Scaling => "scaling",
            Self::FinancialStrategy => "financial_strategy",
            Self::Partnership => "partnership",
            Self::CrisisManagement => "crisis_management",
        }
    }

    /// Template phrases of this category
    #[must_use]
    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            Self::MarketExpansion => &[
                "Expand our SaaS platform into the European mid-market segment",
                "Enter the Southeast Asian market with our existing product line",
                "Pursue global expansion into three international markets under differing regulatory regimes",
                "Pilot a local market entry in two neighbouring cities",
            ],
            Self::ProductLaunch => &[
                "Launch a premium subscription tier for enterprise customers",
                "Develop and launch an AI-powered analytics product",
                "Improve the launch readiness of our mobile app relaunch",
                "Launch a regulated fintech product across international markets",
            ],
            Self::DigitalTransformation => &[
                "Lead a digital transformation of our legacy operations",
                "Migrate core systems to the cloud within 18 months",
                "Drive a global digital transformation across all business units",
                "Streamline internal workflows with automation tools",
            ],
            Self::CompetitiveResponse => &[
                "Respond to a new competitor undercutting our pricing",
                "Defend market share against a well-funded new entrant",
                "Counter a competitor's acquisition of our key supplier",
                "Improve differentiation of our core product against rivals",
            ],
            Self::Scaling => &[
                "Scale the engineering organization from 50 to 200 people",
                "Scale customer support operations to handle 10x volume",
                "Optimize infrastructure costs while scaling the user base",
                "Grow operations internationally through a merger with a regional player",
            ],
            Self::FinancialStrategy => &[
                "Prepare the company for a Series C funding round",
                "Develop a path to profitability within 24 months",
                "Evaluate an acquisition strategy to accelerate growth",
                "Restructure debt ahead of a regulatory capital review",
            ],
            Self::Partnership => &[
                "Partner with a major retailer for nationwide distribution",
                "Form a strategic alliance with a cloud infrastructure provider",
                "Develop a channel partner program for mid-market resellers",
                "Negotiate a joint venture for global market access under regulatory constraints",
            ],
            Self::CrisisManagement => &[
                "Manage a crisis following a major data breach",
                "Respond to a supply chain crisis affecting key components",
                "Handle reputational crisis and regulatory investigation after product recall",
                "Improve business continuity planning for regional outages",
            ],
        }
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown intent category: {s}"))
    }
}

/// Keywords marking low-complexity intents
pub const LOW_COMPLEXITY_KEYWORDS: &[&str] = &["improve", "optimize", "streamline", "local", "pilot"];

/// Keywords marking medium-complexity intents
pub const MEDIUM_COMPLEXITY_KEYWORDS: &[&str] = &["expand", "launch", "partner", "develop", "scale"];

/// Keyword tier for a complexity level
#[must_use]
pub fn tier_keywords(tier: Complexity) -> &'static [&'static str] {
    match tier {
        Complexity::Low => LOW_COMPLEXITY_KEYWORDS,
        Complexity::Medium => MEDIUM_COMPLEXITY_KEYWORDS,
        Complexity::High => HIGH_COMPLEXITY_KEYWORDS,
    }
}

/// Context paired with a complexity tier
#[must_use]
pub fn tier_context(tier: Complexity) -> &'static str {
    match tier {
        Complexity::Low => "Small team of five, limited budget, single region.",
        Complexity::Medium => "Mid-sized company, established customer base, moderate budget.",
        Complexity::High => {
            "Operating across multiple jurisdictions with a regulatory review pending and a \
             post-merger integration underway; the board expects a plan within the quarter."
        }
    }
}

/// General-purpose context descriptions
pub const CONTEXT_TEMPLATES: &[&str] = &[
    "We are a B2B software company with 200 employees and $30M ARR.",
    "Our main competitor just raised a large round and is cutting prices.",
    "Customer churn increased by 4 points over the last two quarters.",
    "Leadership wants results visible to investors within 12 months.",
    "The initiative must be funded from existing operating budget.",
];

/// Reference link strings
pub const LINK_TEMPLATES: &[&str] = &[
    "https://example.com/strategy/brief",
    "https://example.com/research/market-report.pdf",
    "https://example.com/intel/competitor-analysis, https://example.com/intel/pricing",
];

/// Every template with its category
pub fn all_templates() -> impl Iterator<Item = (IntentCategory, &'static str)> {
    IntentCategory::ALL
        .into_iter()
        .flat_map(|category| category.templates().iter().map(move |t| (category, *t)))
}
