use std::fmt;

/// Confidence tier for a vendor score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    High,
    Moderate,
    Low,
}

impl ScoreTier {
    pub const HIGH_THRESHOLD: f64 = 60.0;
    pub const MODERATE_THRESHOLD: f64 = 40.0;

    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            ScoreTier::High
        } else if score >= Self::MODERATE_THRESHOLD {
            ScoreTier::Moderate
        } else {
            ScoreTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTier::High => "high",
            ScoreTier::Moderate => "moderate",
            ScoreTier::Low => "low",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            ScoreTier::High => "🟢",
            ScoreTier::Moderate => "🟡",
            ScoreTier::Low => "🔴",
        }
    }
}

impl fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One guide RNA as reported by the vendor. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuideCandidate {
    pub sequence: Option<String>,
    pub on_target: Option<f64>,
    pub off_target: Option<f64>,
    pub position: Option<String>,
    pub strand: Option<String>,
    pub design_id: Option<String>,
}

impl GuideCandidate {
    /// High on-target efficiency with acceptable off-target risk
    pub fn is_recommended(&self) -> bool {
        matches!(
            (self.on_target, self.off_target),
            (Some(on), Some(off)) if on >= ScoreTier::HIGH_THRESHOLD && off >= 50.0
        )
    }
}

/// Vendor result projected into guides, in the order the vendor returned them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuideSet {
    pub guides: Vec<GuideCandidate>,
}

impl GuideSet {
    pub fn new(guides: Vec<GuideCandidate>) -> Self {
        Self { guides }
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn first(&self) -> Option<&GuideCandidate> {
        self.guides.first()
    }
}
