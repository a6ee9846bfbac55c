//! Onboarding tour steps and progression.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::geometry::{compute_anchor, Anchor, Placement, Rect, Size, Viewport};

/// Wait after a step change before measuring, so layout can settle.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Target selector of steps that are not attached to an element.
pub const BODY_TARGET: &str = "body";

/// Progress of the tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourStatus {
    /// Not started
    Idle,
    /// A step is showing
    Running,
    /// The last step was acknowledged
    Finished,
    /// Dismissed before the end
    Skipped,
}

impl TourStatus {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TourStatus::Idle => "idle",
            TourStatus::Running => "running",
            TourStatus::Finished => "finished",
            TourStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for TourStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One tooltip of the tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourStep {
    /// CSS selector of the element to point at, or `body`.
    pub target: String,
    pub content: String,
    #[serde(default)]
    pub placement: Placement,
}

impl TourStep {
    fn new(target: &str, content: &str, placement: Placement) -> Self {
        Self {
            target: target.to_string(),
            content: content.to_string(),
            placement,
        }
    }

    /// Whether the step floats over the page instead of an element.
    pub fn is_floating(&self) -> bool {
        self.target == BODY_TARGET
    }
}

/// The six steps shown on first launch.
pub fn builtin_steps() -> Vec<TourStep> {
    vec![
        TourStep::new(
            BODY_TARGET,
            "Welcome to the AI Problem-Solving Facilitator! This guided tour will show you the key features of the application.",
            Placement::Center,
        ),
        TourStep::new(
            "#problem-definition",
            "Start here by clearly defining your problem. Be specific and detailed - the more context you provide, the better the AI can help you.",
            Placement::Bottom,
        ),
        TourStep::new(
            "#playbooks-panel",
            "Need a quick start? Choose from our pre-built playbooks for common business scenarios like cost reduction, digital transformation, or ESG strategy.",
            Placement::Bottom,
        ),
        TourStep::new(
            "#generate-suggestions",
            "Once you've defined your problem, click here to get AI-powered strategic analysis and framework recommendations.",
            Placement::Bottom,
        ),
        TourStep::new(
            "#sessions-panel",
            "Access all your saved sessions here. You can load previous work or delete old sessions to keep organized.",
            Placement::Bottom,
        ),
        TourStep::new(
            BODY_TARGET,
            "Great! You're ready to start. The AI will guide you through the rest of the process as you progress. You can always start the tour again for a refresher.",
            Placement::Center,
        ),
    ]
}

/// Current step together with where to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedStep {
    pub index: usize,
    pub total: usize,
    pub step: TourStep,
    pub anchor: Anchor,
    pub settle_delay_ms: u64,
}

/// Tour progression.
#[derive(Debug, Clone)]
pub struct Tour {
    steps: Vec<TourStep>,
    index: usize,
    status: TourStatus,
}

impl Tour {
    /// Create an idle tour over `steps`.
    pub fn new(steps: Vec<TourStep>) -> Self {
        Self {
            steps,
            index: 0,
            status: TourStatus::Idle,
        }
    }

    pub fn status(&self) -> TourStatus {
        self.status
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step being shown, if running.
    pub fn current(&self) -> Option<&TourStep> {
        match self.status {
            TourStatus::Running => self.steps.get(self.index),
            _ => None,
        }
    }

    /// Start (or restart) from the first step.
    pub fn start(&mut self) {
        if self.steps.is_empty() {
            self.status = TourStatus::Finished;
            return;
        }
        self.index = 0;
        self.status = TourStatus::Running;
    }

    /// Advance; past the last step the tour finishes.
    pub fn next(&mut self) {
        if self.status != TourStatus::Running {
            return;
        }
        if self.index + 1 >= self.steps.len() {
            self.status = TourStatus::Finished;
        } else {
            self.index += 1;
        }
    }

    pub fn back(&mut self) {
        if self.status == TourStatus::Running && self.index > 0 {
            self.index -= 1;
        }
    }

    pub fn skip(&mut self) {
        if self.status == TourStatus::Running {
            self.status = TourStatus::Skipped;
        }
    }

    /// Place the current step. `target` is the measured element, if any.
    pub fn position(
        &self,
        target: Option<Rect>,
        tooltip: Size,
        viewport: Viewport,
    ) -> Option<PositionedStep> {
        let step = self.current()?;
        let target = if step.is_floating() { None } else { target };
        Some(PositionedStep {
            index: self.index,
            total: self.steps.len(),
            step: step.clone(),
            anchor: compute_anchor(target, tooltip, viewport, step.placement),
            settle_delay_ms: SETTLE_DELAY.as_millis() as u64,
        })
    }
}

impl Default for Tour {
    fn default() -> Self {
        Self::new(builtin_steps())
    }
}
