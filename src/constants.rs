//! Static reference tables for the readiness survey.
//!
//! These tables are fixed data shared with the dashboard front end. Keys,
//! ordering and wording must stay exactly as listed here.

/// Label and description of one sentiment heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDescription {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// Heatmap cell descriptions keyed `L{level}_R{reason}`, level-major.
pub const HEATMAP_DESCRIPTIONS: [CellDescription; 25] = [
    CellDescription {
        id: "L1_R1",
        label: "Fear-Driven Resistance",
        description: "Strong resistance due to job security concerns. Requires immediate \
            leadership intervention and clear communication about AI augmentation vs replacement.",
    },
    CellDescription {
        id: "L1_R2",
        label: "Knowledge Gap Crisis",
        description: "Severe lack of understanding creating paralysis. Needs comprehensive \
            education program starting with basics.",
    },
    CellDescription {
        id: "L1_R3",
        label: "Ethical Blockers",
        description: "Deep ethical concerns preventing progress. Requires transparent AI ethics \
            framework and governance.",
    },
    CellDescription {
        id: "L1_R4",
        label: "Technical Overwhelm",
        description: "Technical complexity causing complete disengagement. Needs simplified tools \
            and gradual introduction.",
    },
    CellDescription {
        id: "L1_R5",
        label: "Cultural Rejection",
        description: "Organizational culture actively rejecting AI. Requires cultural \
            transformation initiative.",
    },
    CellDescription {
        id: "L2_R1",
        label: "Job Insecurity",
        description: "Moderate resistance from job concerns. Address through reskilling programs \
            and role evolution plans.",
    },
    CellDescription {
        id: "L2_R2",
        label: "Understanding Gaps",
        description: "Limited AI knowledge creating hesitation. Implement targeted training and \
            awareness campaigns.",
    },
    CellDescription {
        id: "L2_R3",
        label: "Ethical Uncertainty",
        description: "Unresolved ethical questions causing delays. Develop clear ethical \
            guidelines and use cases.",
    },
    CellDescription {
        id: "L2_R4",
        label: "Technical Challenges",
        description: "Technical hurdles slowing adoption. Provide better support and simplified \
            interfaces. Technical hurdles slowing adoption. Provide better support and simplified \
            interfaces.",
    },
    CellDescription {
        id: "L2_R5",
        label: "Cultural Friction",
        description: "Cultural misalignment with AI adoption. Need change management and success \
            stories. Cultural misalignment with AI adoption. Need change management and success \
            stories.",
    },
    CellDescription {
        id: "L3_R1",
        label: "Cautious Observation",
        description: "Neutral stance with job-related concerns. Opportunity to shift perspective \
            through engagement.",
    },
    CellDescription {
        id: "L3_R2",
        label: "Learning Mode",
        description: "Open to learning but needs guidance. Perfect timing for structured \
            education programs.",
    },
    CellDescription {
        id: "L3_R3",
        label: "Ethical Evaluation",
        description: "Weighing ethical implications carefully. Engage in open dialogue about \
            responsible AI.",
    },
    CellDescription {
        id: "L3_R4",
        label: "Technical Assessment",
        description: "Evaluating technical readiness. Provide proof of concepts and pilot \
            opportunities. Evaluating technical readiness. Provide proof of concepts and pilot \
            opportunities.",
    },
    CellDescription {
        id: "L3_R5",
        label: "Cultural Transition",
        description: "Culture in transition toward AI. Support with change champions and quick \
            wins. Culture in transition toward AI. Support with change champions and quick wins.",
    },
    CellDescription {
        id: "L4_R1",
        label: "Confident Evolution",
        description: "Ready to evolve roles with AI. Leverage as change ambassadors and early \
            adopters. Ready to evolve roles with AI. Leverage as change ambassadors and early \
            adopters.",
    },
    CellDescription {
        id: "L4_R2",
        label: "Knowledge Seekers",
        description: "Actively seeking AI knowledge. Provide advanced training and hands-on \
            opportunities. Actively seeking AI knowledge. Provide advanced training and hands-on \
            opportunities.",
    },
    CellDescription {
        id: "L4_R3",
        label: "Ethical Champions",
        description: "Promoting responsible AI use. Engage in developing ethical frameworks and \
            policies. Promoting responsible AI use. Engage in developing ethical frameworks and \
            policies.",
    },
    CellDescription {
        id: "L4_R4",
        label: "Technical Enablers",
        description: "Building technical capabilities. Support with resources and platform access.",
    },
    CellDescription {
        id: "L4_R5",
        label: "Cultural Advocates",
        description: "Driving cultural change for AI. Empower as change agents and success story \
            creators. Driving cultural change for AI. Empower as change agents and success story \
            creators.",
    },
    CellDescription {
        id: "L5_R1",
        label: "Transformation Leaders",
        description: "Leading AI-driven transformation. Position as mentors and program leaders.",
    },
    CellDescription {
        id: "L5_R2",
        label: "AI Experts",
        description: "Deep AI understanding and advocacy. Utilize for training others and \
            strategic planning.",
    },
    CellDescription {
        id: "L5_R3",
        label: "Ethics Pioneers",
        description: "Setting ethical AI standards. Lead governance committees and policy \
            development. Setting ethical AI standards. Lead governance committees and policy \
            development.",
    },
    CellDescription {
        id: "L5_R4",
        label: "Technical Innovators",
        description: "Pushing technical boundaries. Drive innovation labs and advanced \
            implementations. Pushing technical boundaries. Drive innovation labs and advanced \
            implementations.",
    },
    CellDescription {
        id: "L5_R5",
        label: "Cultural Transformers",
        description: "Fully embracing AI culture. Model the future state and inspire \
            organization-wide change.",
    },
];

/// Look up a heatmap cell description by level (1-5) and reason (1-5).
pub fn heatmap_description(level: u8, reason: u8) -> Option<&'static CellDescription> {
    if !(1..=5).contains(&level) || !(1..=5).contains(&reason) {
        return None;
    }
    HEATMAP_DESCRIPTIONS.get(usize::from(level - 1) * 5 + usize::from(reason - 1))
}

/// Readiness level names, index 0 is level 1.
pub const SENTIMENT_LEVEL_NAMES: [&str; 5] = [
    "Highly Resistant",
    "Resistant",
    "Neutral",
    "Ready",
    "Highly Ready",
];

/// Resistance reasons, index 0 is `R1`.
pub const SENTIMENT_REASONS: [&str; 5] = [
    "Fear of Job Loss",
    "Lack of Understanding",
    "Ethical Concerns",
    "Technical Barriers",
    "Cultural Resistance",
];

/// Level colour keyed by sentiment level 1-5.
pub const SENTIMENT_COLORS: [&str; 5] = [
    "#DC2626", // Red
    "#F97316", // Orange
    "#FCD34D", // Yellow
    "#84CC16", // Lime
    "#10B981", // Green
];

/// A row of the question-based sentiment grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentLevelInfo {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
}

/// A column of the question-based sentiment grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentCategoryInfo {
    pub id: u8,
    pub name: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
}

pub const SENTIMENT_LEVELS: [SentimentLevelInfo; 5] = [
    SentimentLevelInfo {
        id: 1,
        name: "Personal Workflow Preferences",
        description: "Preferences about AI in personal workflows",
    },
    SentimentLevelInfo {
        id: 2,
        name: "Collaboration & Role Adjustments",
        description: "Collaboration and team adaptation issues",
    },
    SentimentLevelInfo {
        id: 3,
        name: "Professional Trust & Fairness Issues",
        description: "Concerns about fairness, trust, and transparency",
    },
    SentimentLevelInfo {
        id: 4,
        name: "Career Security & Job Redefinition Anxiety",
        description: "Job change and career risk concerns",
    },
    SentimentLevelInfo {
        id: 5,
        name: "Organizational Stability at Risk",
        description: "Organizational risk and instability due to AI",
    },
];

pub const SENTIMENT_CATEGORIES: [SentimentCategoryInfo; 5] = [
    SentimentCategoryInfo {
        id: 1,
        name: "AI is too Autonomous",
        short_name: "Too Autonomous",
        description: "Concern about AI acting without enough human control",
    },
    SentimentCategoryInfo {
        id: 2,
        name: "AI is too Inflexible",
        short_name: "Too Inflexible",
        description: "Concern that AI lacks flexibility or adaptability",
    },
    SentimentCategoryInfo {
        id: 3,
        name: "AI is Emotionless",
        short_name: "Emotionless",
        description: "Perception that AI lacks emotional intelligence",
    },
    SentimentCategoryInfo {
        id: 4,
        name: "AI is too Opaque",
        short_name: "Too Opaque",
        description: "Concern about transparency of AI decisions",
    },
    SentimentCategoryInfo {
        id: 5,
        name: "People Prefer Human Interaction",
        short_name: "Prefer Human",
        description: "Preference for human empathy and communication",
    },
];

/// Number of questions in the sentiment questionnaire.
pub const SENTIMENT_QUESTION_COUNT: usize = 25;

/// Grid cell id (`L{level}_C{category}`) for a 1-based question number.
///
/// Questions fill the grid row by row: `sentiment_1..5` are level 1,
/// `sentiment_6..10` level 2, and so on.
pub fn sentiment_cell_id(question: usize) -> Option<String> {
    if !(1..=SENTIMENT_QUESTION_COUNT).contains(&question) {
        return None;
    }
    let level = (question - 1) / 5 + 1;
    let category = (question - 1) % 5 + 1;
    Some(format!("L{}_C{}", level, category))
}

/// Colours used by the relative ranking of the question grid.
pub mod color_ranking {
    pub const TOP_3: &str = "#15803d";
    pub const TOP_8: &str = "#84cc16";
    pub const MIDDLE: &str = "#fcd34d";
    pub const BOTTOM_8: &str = "#fb923c";
    pub const BOTTOM_3: &str = "#dc2626";
    pub const NO_DATA: &str = "#6b7280";
}

/// One of the eight capability dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionInfo {
    /// Numeric id (1-8) used by the long-format score table.
    pub id: u8,
    /// Key used by wide-format columns (`{key}_C1..C4`).
    pub key: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    /// Construct ids (1-32) that make up this dimension.
    pub constructs: [u8; 4],
    /// Short construct labels used in the dashboard.
    pub construct_labels: [&'static str; 4],
    pub description: &'static str,
}

pub const CAPABILITY_DIMENSIONS: [DimensionInfo; 8] = [
    DimensionInfo {
        id: 1,
        key: "strategyVision",
        name: "Strategy & Vision",
        color: "#3B82F6",
        constructs: [1, 2, 3, 4],
        construct_labels: [
            "AI Vision Clarity",
            "Strategic Alignment",
            "Leadership Commitment",
            "Investment Planning",
        ],
        description: "An organization that scores high on Strategy and Vision drives AI \
            initiatives aligned with core business objectives, supported by strong leadership \
            commitment, clear long-term vision for sustainable AI transformation, and \
            well-defined resource allocation strategies.",
    },
    DimensionInfo {
        id: 2,
        key: "data",
        name: "Data",
        color: "#8B5CF6",
        constructs: [5, 6, 7, 8],
        construct_labels: [
            "Data Quality",
            "Data Governance",
            "Data Infrastructure",
            "Data Literacy",
        ],
        description: "An organization that scores high on Data ensures exceptional data quality, \
            making reliable, trustworthy data accessible for all functions. It has robust \
            governance framework that guarantees realtime insights, advanced analyses, and \
            strategic, data-driven decisions.",
    },
    DimensionInfo {
        id: 3,
        key: "technology",
        name: "Technology",
        color: "#EC4899",
        constructs: [9, 10, 11, 12],
        construct_labels: [
            "AI Tools & Platforms",
            "Technical Infrastructure",
            "Integration Capabilities",
            "Security & Compliance",
        ],
        description: "An organization that scores high on Technology makes use of advanced AI \
            tools and platforms, ensures scalability for future growth, and is well-prepared. It \
            makes use of optimized cloud and on-premises solutions tailored to business needs. \
            Seamless integration between systems and processes ensures efficient, innovative, and \
            sustainable AI-driven improvements.",
    },
    DimensionInfo {
        id: 4,
        key: "talentSkills",
        name: "Talent & Skills",
        color: "#F59E0B",
        constructs: [13, 14, 15, 16],
        construct_labels: [
            "AI Skills Availability",
            "Training Programs",
            "Talent Acquisition",
            "Knowledge Sharing",
        ],
        description: "An organization that scores high on Talent and Skills ensures advanced AI \
            expertise and invests heavily in ongoing training. It promotes a culture ready for AI \
            integration and stimulates cross-functional collaboration on AI initiatives, driving \
            innovation and organizational transformation.",
    },
    DimensionInfo {
        id: 5,
        key: "orgProcesses",
        name: "Organisation & Processes",
        color: "#10B981",
        constructs: [17, 18, 19, 20],
        construct_labels: [
            "Process Optimization",
            "Change Management",
            "Cross-functional Collaboration",
            "Performance Measurement",
        ],
        description: "An organization that scores high on Organisation and Processes has AI \
            deeply embedded in its organizational structure, supported by robust decision-making \
            framework and strategic alignment. Processes are seamlessly integrated and optimized \
            with AI, AI-enabled decision-making drives continuous improvement and data-driven \
            strategies.",
    },
    DimensionInfo {
        id: 6,
        key: "innovation",
        name: "Innovation",
        color: "#06B6D4",
        constructs: [21, 22, 23, 24],
        construct_labels: [
            "Innovation Culture",
            "Experimentation Approach",
            "R&D Investment",
            "External Partnerships",
        ],
        description: "An organization that scores high on Innovation promotes a culture of \
            experimentation, active prototyping and testing of AI solutions. It invests \
            significantly in R&D, accelerates implementation of AI, and empowers leadership to \
            stimulate innovation. This drives rapid acceptance of advanced technologies and a \
            lasting competitive advantage through AI-based, customer-centric products and \
            services.",
    },
    DimensionInfo {
        id: 7,
        key: "adaptation",
        name: "Adaptation & Adoption",
        color: "#F97316",
        constructs: [25, 26, 27, 28],
        construct_labels: [
            "User Adoption",
            "Change Readiness",
            "Pilot Programs",
            "Scaling Capabilities",
        ],
        description: "An organization that scores high on Adaptation & Adoption is acutely aware \
            that effective use of AI requires systematic updating of tools and processes to \
            ensure employees can use them as intended. It also adapts to the situation by \
            training employees on best practices and experimenting with AI work methods among \
            teams.",
    },
    DimensionInfo {
        id: 8,
        key: "ethics",
        name: "Ethics & Responsibility",
        color: "#6366F1",
        constructs: [29, 30, 31, 32],
        construct_labels: [
            "Ethical Guidelines",
            "Bias Prevention",
            "Transparency Practices",
            "Accountability Framework",
        ],
        description: "An organization that scores high on Ethics and Responsibility implements \
            robust ethical AI framework that ensures fairness, transparency, and accountability \
            in AI systems. It prioritizes preventing biases, maintains strict standards for data \
            privacy and security, and complies with privacy regulations. It ensures transparency \
            and accountability and manages legal compliance, organizes ethical review processes \
            and legally verifiable actions around AI-powered processes and decisions.",
    },
];

/// One of the 32 measured capability constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructInfo {
    pub id: u8,
    pub dimension_id: u8,
    pub name: &'static str,
}

const fn construct(id: u8, dimension_id: u8, name: &'static str) -> ConstructInfo {
    ConstructInfo {
        id,
        dimension_id,
        name,
    }
}

pub const CAPABILITY_CONSTRUCTS: [ConstructInfo; 32] = [
    construct(1, 1, "Alignment with Business Goals"),
    construct(2, 1, "Leadership Commitment"),
    construct(3, 1, "Long-Term Vision"),
    construct(4, 1, "Resource Allocation"),
    construct(5, 2, "Data Quality"),
    construct(6, 2, "Data Accessibility"),
    construct(7, 2, "Data Governance Framework"),
    construct(8, 2, "Data Integration"),
    construct(9, 3, "AI Tools and Platforms"),
    construct(10, 3, "Scalability"),
    construct(11, 3, "Cloud vs. On-Premises Solutions"),
    construct(12, 3, "Integration and Optimization"),
    construct(13, 4, "AI Skills and Expertise"),
    construct(14, 4, "Training and Development"),
    construct(15, 4, "Recruitment and Team Formation"),
    construct(16, 4, "Cross-Functional Collaboration"),
    construct(17, 5, "AI Governance and Structure"),
    construct(18, 5, "Process Integration and Optimization"),
    construct(19, 5, "Change Management"),
    construct(20, 5, "AI-Driven Decision Optimization"),
    construct(21, 6, "Prototyping and Experimentation"),
    construct(22, 6, "Products and Services"),
    construct(23, 6, "Speed of Implementation"),
    construct(24, 6, "Innovation Culture and Leadership"),
    construct(25, 7, "Tool Adoption"),
    construct(26, 7, "Job Redesign"),
    construct(27, 7, "Employee Engagement"),
    construct(28, 7, "Confidence/Authority"),
    construct(29, 8, "Ethical AI Framework"),
    construct(30, 8, "Bias and Fairness"),
    construct(31, 8, "Transparency and Explainability"),
    construct(32, 8, "Data Privacy and Security"),
];

/// Find a dimension by its wide-format key.
pub fn dimension_by_key(key: &str) -> Option<(usize, &'static DimensionInfo)> {
    CAPABILITY_DIMENSIONS
        .iter()
        .enumerate()
        .find(|(_, d)| d.key == key)
}

/// Find a dimension by its numeric id (1-8).
pub fn dimension_by_id(id: u8) -> Option<&'static DimensionInfo> {
    CAPABILITY_DIMENSIONS.iter().find(|d| d.id == id)
}

/// Constructs belonging to a dimension id, in table order.
pub fn constructs_for_dimension(dimension_id: u8) -> impl Iterator<Item = &'static ConstructInfo> {
    CAPABILITY_CONSTRUCTS
        .iter()
        .filter(move |c| c.dimension_id == dimension_id)
}

/// Scale midpoint used by construct gap analysis.
pub const SCALE_MIDPOINT: f64 = 3.0;

/// Fixed benchmark used until a population benchmark is supplied.
pub const PLACEHOLDER_BENCHMARK: f64 = 3.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heatmap_descriptions_are_level_major() {
        for level in 1..=5u8 {
            for reason in 1..=5u8 {
                let cell = heatmap_description(level, reason).unwrap();
                assert_eq!(cell.id, format!("L{}_R{}", level, reason));
            }
        }
        assert!(heatmap_description(0, 1).is_none());
        assert!(heatmap_description(3, 6).is_none());
    }

    #[test]
    fn test_sentiment_cell_id() {
        assert_eq!(sentiment_cell_id(1).as_deref(), Some("L1_C1"));
        assert_eq!(sentiment_cell_id(7).as_deref(), Some("L2_C2"));
        assert_eq!(sentiment_cell_id(25).as_deref(), Some("L5_C5"));
        assert_eq!(sentiment_cell_id(26), None);
        assert_eq!(sentiment_cell_id(0), None);
    }

    #[test]
    fn test_dimension_tables_are_consistent() {
        for (index, dim) in CAPABILITY_DIMENSIONS.iter().enumerate() {
            assert_eq!(usize::from(dim.id), index + 1);
            let ids: Vec<u8> = constructs_for_dimension(dim.id).map(|c| c.id).collect();
            assert_eq!(ids, dim.constructs.to_vec());
        }
        assert_eq!(dimension_by_key("ethics").map(|(i, _)| i), Some(7));
        assert!(dimension_by_key("unknown").is_none());
        assert_eq!(dimension_by_id(2).map(|d| d.key), Some("data"));
    }
}
