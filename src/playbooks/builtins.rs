//! Built-in playbooks for common business scenarios.

use serde_json::json;
use std::collections::HashMap;

use super::types::{
    Engagement, Framework, ImplementationPlan, IndustryVertical, Kpi, Phase, Playbook,
    ProblemCategory, RiskAssessment, StakeholderAnalysis,
};
use crate::stages::FrameworkType;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn kpi(metric: &str, target: &str, frequency: &str) -> Kpi {
    Kpi {
        metric: metric.to_string(),
        target: target.to_string(),
        frequency: frequency.to_string(),
    }
}

fn risk(
    name: &str,
    probability: u8,
    impact: u8,
    mitigation: &str,
    contingency: &str,
    owner: &str,
) -> RiskAssessment {
    RiskAssessment {
        risk_name: name.to_string(),
        probability,
        impact,
        mitigation_strategy: mitigation.to_string(),
        contingency_plan: contingency.to_string(),
        owner: owner.to_string(),
    }
}

fn stakeholder(
    name: &str,
    influence: u8,
    interest: u8,
    engagement: Engagement,
    actions: &[&str],
) -> StakeholderAnalysis {
    StakeholderAnalysis {
        stakeholder_name: name.to_string(),
        influence,
        interest,
        engagement,
        actions: strings(actions),
    }
}

/// Cost reduction for a mid-sized professional services firm.
///
/// Ships with an activity-based costing framework, a three-phase plan and
/// stakeholder and risk templates.
pub fn cost_reduction_playbook() -> Playbook {
    let headcount_risk = risk(
        "Morale drop from perceived layoffs",
        3,
        4,
        "Communicate that savings target process waste, not headcount",
        "Pause initiatives in affected teams and run listening sessions",
        "HR Director",
    );

    Playbook {
        id: "playbook-1".to_string(),
        name: "Cost Reduction & Efficiency Roadmap".to_string(),
        objective: "Our goal is to conduct a comprehensive analysis of all operational and administrative costs within our national services company. We need to identify specific areas of inefficiency, waste, and redundancy to implement a targeted cost reduction strategy that improves our operating margin by 15% without negatively impacting service quality or employee morale.".to_string(),
        context: "We are a mid-sized B2B professional services firm with 500 employees, experiencing shrinking margins due to rising operational expenses and increased market competition. Our current processes are largely manual, and we suspect there are significant opportunities for optimization through technology and workflow improvements.".to_string(),
        description: "A guided process to analyze costs, identify waste and optimization opportunities, and then implement targeted initiatives in an Italian service company.".to_string(),
        sector: IndustryVertical::Services,
        problem_category: ProblemCategory::Operational,
        frameworks: vec![
            Framework {
                id: "activity-based-costing".to_string(),
                name: "Activity-Based Costing".to_string(),
                framework_type: FrameworkType::Analysis,
                description: "Assign overhead to the activities that actually drive it.".to_string(),
                steps: strings(&[
                    "Map the main activities of each department",
                    "Identify the cost drivers of each activity",
                    "Allocate overhead by driver volume",
                    "Rank activities by cost and value added",
                ]),
                templates: HashMap::from([(
                    "activityMatrix".to_string(),
                    json!({"columns": ["Activity", "Driver", "Annual cost", "Value added"]}),
                )]),
                industry_guidance: HashMap::from([(
                    IndustryVertical::Services,
                    "Billable hours are the dominant driver; start with non-billable time.".to_string(),
                )]),
            },
            Framework {
                id: "lean-waste-walk".to_string(),
                name: "Lean Waste Walk".to_string(),
                framework_type: FrameworkType::Implementation,
                description: "Walk each process end to end and tag the eight forms of waste.".to_string(),
                steps: strings(&[
                    "Pick the three most expensive processes",
                    "Observe each process with the people who run it",
                    "Tag waiting, rework and over-processing",
                    "Agree on quick wins with process owners",
                ]),
                templates: HashMap::new(),
                industry_guidance: HashMap::new(),
            },
        ],
        implementation_plan: ImplementationPlan {
            phases: vec![
                Phase {
                    name: "Cost baseline".to_string(),
                    duration: "4 weeks".to_string(),
                    activities: strings(&["Collect 12 months of spend data", "Run activity-based costing"]),
                    deliverables: strings(&["Cost baseline report"]),
                    stakeholders: strings(&["CFO", "Department heads"]),
                    risks: vec![risk(
                        "Incomplete spend data",
                        3,
                        3,
                        "Involve finance early and sample missing months",
                        "Extrapolate from the most complete quarter",
                        "Finance Controller",
                    )],
                },
                Phase {
                    name: "Opportunity assessment".to_string(),
                    duration: "6 weeks".to_string(),
                    activities: strings(&["Waste walks", "Vendor contract review", "Automation scan"]),
                    deliverables: strings(&["Ranked savings backlog"]),
                    stakeholders: strings(&["Operations", "IT", "Procurement"]),
                    risks: vec![headcount_risk.clone()],
                },
                Phase {
                    name: "Execution".to_string(),
                    duration: "6 months".to_string(),
                    activities: strings(&["Launch quick wins", "Renegotiate top vendors", "Automate manual workflows"]),
                    deliverables: strings(&["Monthly savings tracker"]),
                    stakeholders: strings(&["Executive team"]),
                    risks: vec![risk(
                        "Service quality slips during changes",
                        2,
                        5,
                        "Track client satisfaction weekly during rollout",
                        "Roll back the change and rerun the waste walk",
                        "COO",
                    )],
                },
            ],
            kpis: vec![
                kpi("Operating margin", "+15%", "Quarterly"),
                kpi("Non-billable hours share", "< 20%", "Monthly"),
            ],
        },
        stakeholder_templates: vec![
            stakeholder("CFO", 9, 9, Engagement::Champion, &["Sponsor the programme", "Approve savings targets"]),
            stakeholder("Department heads", 7, 5, Engagement::Neutral, &["Co-own the savings backlog"]),
            stakeholder("Employees", 4, 8, Engagement::Critic, &["Share progress openly", "Collect improvement ideas"]),
        ],
        risk_templates: vec![headcount_risk],
        kpis: vec![
            kpi("Operating margin", "+15%", "Quarterly"),
            kpi("Client satisfaction", ">= current NPS", "Monthly"),
        ],
    }
}

/// Digital maturity assessment for a traditional B2B manufacturer.
pub fn digital_transformation_playbook() -> Playbook {
    Playbook {
        id: "playbook-2".to_string(),
        name: "Digital Transformation Assessment".to_string(),
        objective: "We need to develop a clear and actionable digital transformation roadmap. This involves assessing our current digital maturity across all business units, identifying key technology gaps and investment opportunities, and prioritizing initiatives that will deliver the highest ROI in a B2B environment by enhancing customer experience and operational efficiency.".to_string(),
        context: "We are a traditional manufacturing company with a strong offline presence but limited digital capabilities. Our sales process is heavily reliant on a field sales team, and our online customer engagement is minimal. We need to embrace digital to stay competitive, improve our supply chain, and open new B2B sales channels.".to_string(),
        description: "A process to perform a digital maturity assessment and identify high-ROI IT investments in a B2B context.".to_string(),
        sector: IndustryVertical::Manufacturing,
        problem_category: ProblemCategory::Digital,
        frameworks: vec![Framework {
            id: "digital-maturity-model".to_string(),
            name: "Digital Maturity Model".to_string(),
            framework_type: FrameworkType::Evaluation,
            description: "Score each business unit on five digital capability dimensions.".to_string(),
            steps: strings(&[
                "Define the capability dimensions",
                "Score each unit from 1 to 5",
                "Compare against industry peers",
                "Prioritize gaps by ROI",
            ]),
            templates: HashMap::new(),
            industry_guidance: HashMap::from([(
                IndustryVertical::Manufacturing,
                "Weight supply chain visibility and dealer portals higher than marketing automation.".to_string(),
            )]),
        }],
        implementation_plan: ImplementationPlan {
            phases: vec![],
            kpis: vec![kpi("Online B2B order share", "25%", "Quarterly")],
        },
        stakeholder_templates: vec![stakeholder(
            "Field sales team",
            6,
            8,
            Engagement::Critic,
            &["Involve top sellers in portal design"],
        )],
        risk_templates: vec![risk(
            "Channel conflict with field sales",
            4,
            4,
            "Credit online orders to account owners",
            "Restrict portal to reorders for the first year",
            "Sales Director",
        )],
        kpis: vec![kpi("Online B2B order share", "25%", "Quarterly")],
    }
}

/// Foundational ESG strategy for a listed consumer goods company.
pub fn esg_roadmap_playbook() -> Playbook {
    Playbook {
        id: "playbook-3".to_string(),
        name: "ESG Sustainability Roadmap".to_string(),
        objective: "The objective is to establish a foundational ESG (Environmental, Social, and Governance) strategy by identifying material ESG topics relevant to our industry. We need to determine our current emissions baseline, define clear sustainability goals, and build a roadmap of credible, monitorable initiatives to improve our corporate citizenship and meet growing stakeholder expectations.".to_string(),
        context: "As a publicly-listed consumer goods company, we are facing increasing pressure from investors, regulators, and customers to demonstrate a clear commitment to sustainability. We currently lack a formal ESG strategy, and our data collection for key metrics like carbon emissions is inconsistent. We need a structured approach to build a credible and impactful program.".to_string(),
        description: "A guided process to identify material ESG themes, determine emission baselines, and build a plan of sustainable and monitorable initiatives.".to_string(),
        sector: IndustryVertical::Retail,
        problem_category: ProblemCategory::Strategic,
        frameworks: vec![],
        implementation_plan: ImplementationPlan::default(),
        stakeholder_templates: vec![],
        risk_templates: vec![],
        kpis: vec![kpi("Scope 1+2 emissions", "-30% by 2030", "Yearly")],
    }
}
