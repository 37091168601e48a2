//! Keyword-based titles and descriptions for transcript windows.

/// A window title with its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub title: String,
    pub description: String,
}

impl Label {
    fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// One labeling rule: fires when any keyword occurs in the lowercased text.
struct LabelRule {
    keywords: &'static [&'static str],
    label: fn(&str) -> Label,
}

const RULES: &[LabelRule] = &[
    LabelRule {
        keywords: &["introduces", "introduction"],
        label: |_| Label::new("Introduction", "Overview of the topic discussed."),
    },
    LabelRule {
        keywords: &["demonstrates", "setup"],
        label: |_| {
            Label::new(
                "Setup Demonstration",
                "Demonstration of initial setup or configuration.",
            )
        },
    },
    LabelRule {
        keywords: &["graph"],
        label: graph_label,
    },
];

/// Graph structures recognized by name, in priority order.
const GRAPH_TYPES: &[&str] = &[
    "Barbell", "Complete", "Cycle", "Ladder", "Path", "Star", "Wheel", "Random",
];

/// Sub-intents for a named graph, in priority order.
const GRAPH_INTENTS: &[(&str, fn(&str) -> Label)] = &[
    ("visualization", graph_visualization),
    ("properties", graph_properties),
    ("parameter", graph_parameters),
];

fn graph_visualization(g: &str) -> Label {
    Label::new(
        format!("{g} Graph Visualization"),
        format!("Visualization of the {g} graph structure."),
    )
}

fn graph_properties(g: &str) -> Label {
    Label::new(
        format!("{g} Graph Properties"),
        format!("Explanation of the {g} graph's properties."),
    )
}

fn graph_parameters(g: &str) -> Label {
    Label::new(
        format!("{g} Graph Parameter Explanation"),
        format!("Discussion of parameters for the {g} graph."),
    )
}

fn graph_label(text: &str) -> Label {
    let Some(graph) = GRAPH_TYPES
        .iter()
        .find(|g| text.contains(g.to_lowercase().as_str()))
    else {
        return Label::new(
            "Graph Discussion",
            "General discussion about graph structures.",
        );
    };

    GRAPH_INTENTS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, label)| label(graph))
        .unwrap_or_else(|| {
            Label::new(
                format!("{graph} Graph Introduction"),
                format!("Introduction to the {graph} graph."),
            )
        })
}

/// Assigns labels from an ordered rule table, first match wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicLabeler;

impl HeuristicLabeler {
    pub fn new() -> Self {
        Self
    }

    pub fn label(&self, text: &str) -> Label {
        let text = text.to_lowercase();

        RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| text.contains(k)))
            .map(|rule| (rule.label)(&text))
            .unwrap_or_else(|| Label::new("Segment", "General segment content."))
    }
}
