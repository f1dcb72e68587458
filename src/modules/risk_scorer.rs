//! Risk Scorer - weighted multi-factor token risk scoring
//!
//! Pure computation over a snapshot of token attributes. Ten factors are
//! scored independently on a 0-100 sub-scale and combined by fixed weights
//! into an overall 0-100 score; no I/O, no state.

use serde::{Deserialize, Serialize};

/// Snapshot of token attributes fed into the scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRiskData {
    pub lp_locked: bool,
    pub ownership_renounced: bool,
    pub is_honeypot: bool,
    pub contract_verified: bool,
    /// Combined share of supply held by the top 10 wallets, percent
    pub top10_holder_percent: f64,
    pub buy_tax_percent: f64,
    pub sell_tax_percent: f64,
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    pub price_change_24h_percent: f64,
    pub holder_count: u64,
}

/// One scored factor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub name: &'static str,
    /// 0 (worst) to 100 (best)
    pub score: f64,
    pub weight: f64,
    pub detail: String,
}

/// Bucketed risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
    Critical,
}

impl RiskLevel {
    /// Fixed thresholds, no hysteresis
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::Safe
        } else if score >= 60.0 {
            RiskLevel::Warning
        } else if score >= 40.0 {
            RiskLevel::Danger
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Warning => "warning",
            RiskLevel::Danger => "danger",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Composite score with per-factor breakdown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    pub overall: f64,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
    pub summary: String,
    pub recommendations: Vec<String>,
}

// Factor weights. The overall score always divides by the full sum, so the
// result is deterministic regardless of which factors scored low.
const WEIGHT_LP_LOCK: f64 = 15.0;
const WEIGHT_OWNERSHIP: f64 = 12.0;
const WEIGHT_HONEYPOT: f64 = 15.0;
const WEIGHT_VERIFICATION: f64 = 8.0;
const WEIGHT_CONCENTRATION: f64 = 12.0;
const WEIGHT_TAX: f64 = 10.0;
const WEIGHT_LIQUIDITY: f64 = 10.0;
const WEIGHT_VOLUME: f64 = 8.0;
const WEIGHT_STABILITY: f64 = 5.0;
const WEIGHT_HOLDERS: f64 = 5.0;

const TOTAL_WEIGHT: f64 = WEIGHT_LP_LOCK
    + WEIGHT_OWNERSHIP
    + WEIGHT_HONEYPOT
    + WEIGHT_VERIFICATION
    + WEIGHT_CONCENTRATION
    + WEIGHT_TAX
    + WEIGHT_LIQUIDITY
    + WEIGHT_VOLUME
    + WEIGHT_STABILITY
    + WEIGHT_HOLDERS;

/// Compute the composite risk score for a token snapshot
pub fn calculate_risk_score(data: &TokenRiskData) -> RiskScore {
    let factors = vec![
        score_lp_lock(data),
        score_ownership(data),
        score_honeypot(data),
        score_verification(data),
        score_concentration(data),
        score_tax(data),
        score_liquidity(data),
        score_volume(data),
        score_stability(data),
        score_holder_count(data),
    ];

    let weighted_sum: f64 = factors.iter().map(|f| f.score * f.weight).sum();
    let overall = weighted_sum / TOTAL_WEIGHT;
    let level = RiskLevel::from_score(overall);

    let recommendations = build_recommendations(&factors);
    let summary = build_summary(overall, level, &recommendations);

    RiskScore {
        overall,
        level,
        factors,
        summary,
        recommendations,
    }
}

fn score_lp_lock(data: &TokenRiskData) -> RiskFactor {
    let (score, detail) = if data.lp_locked {
        (100.0, "Liquidity pool tokens are locked".to_string())
    } else {
        (0.0, "Liquidity is not locked".to_string())
    };
    RiskFactor {
        name: "lp_lock",
        score,
        weight: WEIGHT_LP_LOCK,
        detail,
    }
}

fn score_ownership(data: &TokenRiskData) -> RiskFactor {
    let (score, detail) = if data.ownership_renounced {
        (100.0, "Contract ownership renounced".to_string())
    } else {
        (0.0, "Owner retains contract control".to_string())
    };
    RiskFactor {
        name: "ownership",
        score,
        weight: WEIGHT_OWNERSHIP,
        detail,
    }
}

fn score_honeypot(data: &TokenRiskData) -> RiskFactor {
    let (score, detail) = if data.is_honeypot {
        (0.0, "Honeypot behavior detected - selling is blocked".to_string())
    } else {
        (100.0, "No honeypot behavior detected".to_string())
    };
    RiskFactor {
        name: "honeypot",
        score,
        weight: WEIGHT_HONEYPOT,
        detail,
    }
}

fn score_verification(data: &TokenRiskData) -> RiskFactor {
    let (score, detail) = if data.contract_verified {
        (100.0, "Contract source is verified".to_string())
    } else {
        (0.0, "Contract source is unverified".to_string())
    };
    RiskFactor {
        name: "verification",
        score,
        weight: WEIGHT_VERIFICATION,
        detail,
    }
}

fn score_concentration(data: &TokenRiskData) -> RiskFactor {
    let pct = data.top10_holder_percent;
    let score = if pct < 20.0 {
        100.0
    } else if pct < 35.0 {
        80.0
    } else if pct < 50.0 {
        60.0
    } else if pct < 70.0 {
        30.0
    } else {
        0.0
    };
    RiskFactor {
        name: "holder_concentration",
        score,
        weight: WEIGHT_CONCENTRATION,
        detail: format!("Top 10 wallets hold {:.1}% of supply", pct),
    }
}

fn score_tax(data: &TokenRiskData) -> RiskFactor {
    let total = data.buy_tax_percent + data.sell_tax_percent;
    let score = if total <= 2.0 {
        100.0
    } else if total <= 5.0 {
        80.0
    } else if total <= 10.0 {
        50.0
    } else if total <= 20.0 {
        20.0
    } else {
        0.0
    };
    RiskFactor {
        name: "tax",
        score,
        weight: WEIGHT_TAX,
        detail: format!(
            "Buy tax {:.1}%, sell tax {:.1}%",
            data.buy_tax_percent, data.sell_tax_percent
        ),
    }
}

fn score_liquidity(data: &TokenRiskData) -> RiskFactor {
    let usd = data.liquidity_usd;
    let score = if usd < 10_000.0 {
        0.0
    } else if usd < 50_000.0 {
        30.0
    } else if usd < 100_000.0 {
        60.0
    } else if usd < 500_000.0 {
        80.0
    } else {
        100.0
    };
    RiskFactor {
        name: "liquidity",
        score,
        weight: WEIGHT_LIQUIDITY,
        detail: format!("${:.0} pooled liquidity", usd),
    }
}

fn score_volume(data: &TokenRiskData) -> RiskFactor {
    let usd = data.volume_24h_usd;
    let score = if usd >= 100_000.0 {
        100.0
    } else if usd >= 50_000.0 {
        80.0
    } else if usd >= 10_000.0 {
        60.0
    } else if usd >= 1_000.0 {
        30.0
    } else {
        0.0
    };
    RiskFactor {
        name: "volume",
        score,
        weight: WEIGHT_VOLUME,
        detail: format!("${:.0} traded in 24h", usd),
    }
}

fn score_stability(data: &TokenRiskData) -> RiskFactor {
    let swing = data.price_change_24h_percent.abs();
    let score = if swing <= 10.0 {
        100.0
    } else if swing <= 25.0 {
        80.0
    } else if swing <= 50.0 {
        50.0
    } else if swing <= 80.0 {
        20.0
    } else {
        0.0
    };
    RiskFactor {
        name: "price_stability",
        score,
        weight: WEIGHT_STABILITY,
        detail: format!("{:.1}% price move in 24h", data.price_change_24h_percent),
    }
}

fn score_holder_count(data: &TokenRiskData) -> RiskFactor {
    let holders = data.holder_count;
    let score = if holders >= 1_000 {
        100.0
    } else if holders >= 500 {
        80.0
    } else if holders >= 250 {
        60.0
    } else if holders >= 100 {
        30.0
    } else {
        0.0
    };
    RiskFactor {
        name: "holder_count",
        score,
        weight: WEIGHT_HOLDERS,
        detail: format!("{} holders", holders),
    }
}

/// Recommendations come from low-scoring factors, heaviest weight first
fn build_recommendations(factors: &[RiskFactor]) -> Vec<String> {
    let mut weak: Vec<&RiskFactor> = factors.iter().filter(|f| f.score < 50.0).collect();
    weak.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));

    weak.iter()
        .map(|f| match f.name {
            "lp_lock" => "Liquidity is not locked - the pool can be pulled at any time".to_string(),
            "ownership" => "Ownership is not renounced - the contract can be modified".to_string(),
            "honeypot" => "Honeypot detected - do not buy, selling is blocked".to_string(),
            "verification" => "Unverified contract - behavior cannot be audited".to_string(),
            "holder_concentration" => {
                "Supply is concentrated in few wallets - dump risk is high".to_string()
            }
            "tax" => "Tax structure is punitive - expect heavy losses on trades".to_string(),
            "liquidity" => "Liquidity is too thin to exit a meaningful position".to_string(),
            "volume" => "Trading volume is negligible - the token may be abandoned".to_string(),
            "price_stability" => "Extreme price swings in the last 24h".to_string(),
            _ => format!("Weak signal: {}", f.detail),
        })
        .collect()
}

fn build_summary(overall: f64, level: RiskLevel, recommendations: &[String]) -> String {
    let headline = match level {
        RiskLevel::Safe => "Token passes the core safety checks",
        RiskLevel::Warning => "Token shows moderate risk signals",
        RiskLevel::Danger => "Token shows significant risk signals",
        RiskLevel::Critical => "Token fails critical safety checks",
    };

    if recommendations.is_empty() {
        format!("{} (score {:.0}/100)", headline, overall)
    } else {
        format!(
            "{} (score {:.0}/100). Primary concern: {}",
            headline, overall, recommendations[0]
        )
    }
}
