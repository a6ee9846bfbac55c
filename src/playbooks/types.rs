//! Data types for strategy playbooks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::stages::FrameworkType;

/// Industry a playbook targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndustryVertical {
    Technology,
    Healthcare,
    Financial,
    Retail,
    Manufacturing,
    Services,
    Other,
}

impl IndustryVertical {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndustryVertical::Technology => "Technology",
            IndustryVertical::Healthcare => "Healthcare",
            IndustryVertical::Financial => "Financial",
            IndustryVertical::Retail => "Retail",
            IndustryVertical::Manufacturing => "Manufacturing",
            IndustryVertical::Services => "Services",
            IndustryVertical::Other => "Other",
        }
    }
}

impl std::fmt::Display for IndustryVertical {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of problem a playbook addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemCategory {
    Strategic,
    Operational,
    MarketEntry,
    Digital,
    Innovation,
    Organizational,
}

impl ProblemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemCategory::Strategic => "Strategic",
            ProblemCategory::Operational => "Operational",
            ProblemCategory::MarketEntry => "MarketEntry",
            ProblemCategory::Digital => "Digital",
            ProblemCategory::Innovation => "Innovation",
            ProblemCategory::Organizational => "Organizational",
        }
    }
}

impl std::str::FromStr for ProblemCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "strategic" => Ok(ProblemCategory::Strategic),
            "operational" => Ok(ProblemCategory::Operational),
            "marketentry" => Ok(ProblemCategory::MarketEntry),
            "digital" => Ok(ProblemCategory::Digital),
            "innovation" => Ok(ProblemCategory::Innovation),
            "organizational" => Ok(ProblemCategory::Organizational),
            _ => Err(format!("Unknown problem category: {}", s)),
        }
    }
}

/// A framework bundled with a playbook, with its steps spelled out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub framework_type: FrameworkType,
    pub description: String,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub templates: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub industry_guidance: HashMap<IndustryVertical, String>,
}

/// Stance of a stakeholder towards the initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Engagement {
    Champion,
    Supporter,
    Neutral,
    Critic,
    Blocker,
}

/// Threshold on the 1-10 influence and interest scales.
pub const STAKEHOLDER_HIGH: u8 = 7;

/// Power/interest grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeholderQuadrant {
    KeyPlayers,
    MeetTheirNeeds,
    ShowConsideration,
    LeastImportant,
}

impl StakeholderQuadrant {
    pub fn label(&self) -> &'static str {
        match self {
            StakeholderQuadrant::KeyPlayers => "Key Players",
            StakeholderQuadrant::MeetTheirNeeds => "Meet Their Needs",
            StakeholderQuadrant::ShowConsideration => "Show Consideration",
            StakeholderQuadrant::LeastImportant => "Least Important",
        }
    }
}

/// Stakeholder entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeholderAnalysis {
    pub stakeholder_name: String,
    /// 1-10
    pub influence: u8,
    /// 1-10
    pub interest: u8,
    pub engagement: Engagement,
    pub actions: Vec<String>,
}

impl StakeholderAnalysis {
    /// Place the stakeholder on the power/interest grid.
    pub fn quadrant(&self) -> StakeholderQuadrant {
        let influential = self.influence >= STAKEHOLDER_HIGH;
        let interested = self.interest >= STAKEHOLDER_HIGH;
        match (influential, interested) {
            (true, true) => StakeholderQuadrant::KeyPlayers,
            (true, false) => StakeholderQuadrant::MeetTheirNeeds,
            (false, true) => StakeholderQuadrant::ShowConsideration,
            (false, false) => StakeholderQuadrant::LeastImportant,
        }
    }
}

/// Severity band of a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

/// Risk entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_name: String,
    /// 1-5
    pub probability: u8,
    /// 1-5
    pub impact: u8,
    pub mitigation_strategy: String,
    pub contingency_plan: String,
    pub owner: String,
}

impl RiskAssessment {
    /// Probability times impact, out of 25.
    pub fn score(&self) -> u32 {
        u32::from(self.probability) * u32::from(self.impact)
    }

    /// Severity band of [`RiskAssessment::score`].
    pub fn severity(&self) -> RiskSeverity {
        match self.score() {
            s if s >= 20 => RiskSeverity::High,
            s if s >= 12 => RiskSeverity::Medium,
            _ => RiskSeverity::Low,
        }
    }

    fn rated(&self, phase: Option<&str>) -> RatedRisk {
        RatedRisk {
            risk_name: self.risk_name.clone(),
            phase: phase.map(str::to_string),
            score: self.score(),
            severity: self.severity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    pub duration: String,
    pub activities: Vec<String>,
    pub deliverables: Vec<String>,
    pub stakeholders: Vec<String>,
    pub risks: Vec<RiskAssessment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
    pub metric: String,
    pub target: String,
    pub frequency: String,
}

/// Phased rollout with its KPIs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationPlan {
    pub phases: Vec<Phase>,
    pub kpis: Vec<Kpi>,
}

/// A ready-made starting point for a common business scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playbook {
    /// Unique playbook identifier (e.g., "playbook-1").
    pub id: String,
    pub name: String,
    /// Prefills the problem field.
    pub objective: String,
    /// Prefills the context field.
    pub context: String,
    pub description: String,
    pub sector: IndustryVertical,
    pub problem_category: ProblemCategory,
    #[serde(default)]
    pub frameworks: Vec<Framework>,
    #[serde(default)]
    pub implementation_plan: ImplementationPlan,
    #[serde(default)]
    pub stakeholder_templates: Vec<StakeholderAnalysis>,
    #[serde(default)]
    pub risk_templates: Vec<RiskAssessment>,
    #[serde(default)]
    pub kpis: Vec<Kpi>,
}

impl Playbook {
    /// Convert to summary for listing.
    pub fn to_summary(&self) -> PlaybookSummary {
        PlaybookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            sector: self.sector,
            problem_category: self.problem_category,
            framework_count: self.frameworks.len(),
        }
    }
}

/// Stakeholder placed on the power/interest grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedStakeholder {
    pub stakeholder_name: String,
    pub quadrant: StakeholderQuadrant,
    pub quadrant_label: &'static str,
}

/// Risk with its score and severity. `phase` is set for phase risks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedRisk {
    pub risk_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    pub score: u32,
    pub severity: RiskSeverity,
}

/// Full playbook with its stakeholder grid and risk register computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookDetail {
    pub playbook: Playbook,
    pub stakeholders: Vec<RatedStakeholder>,
    pub risks: Vec<RatedRisk>,
}

impl Playbook {
    /// Rate every stakeholder and risk template, plan risks after the
    /// playbook-wide ones.
    pub fn to_detail(&self) -> PlaybookDetail {
        let stakeholders = self
            .stakeholder_templates
            .iter()
            .map(|s| {
                let quadrant = s.quadrant();
                RatedStakeholder {
                    stakeholder_name: s.stakeholder_name.clone(),
                    quadrant,
                    quadrant_label: quadrant.label(),
                }
            })
            .collect();

        let risks = self
            .risk_templates
            .iter()
            .map(|r| r.rated(None))
            .chain(self.implementation_plan.phases.iter().flat_map(|phase| {
                phase.risks.iter().map(move |r| r.rated(Some(&phase.name)))
            }))
            .collect();

        PlaybookDetail {
            playbook: self.clone(),
            stakeholders,
            risks,
        }
    }
}

/// Playbook listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sector: IndustryVertical,
    pub problem_category: ProblemCategory,
    pub framework_count: usize,
}
