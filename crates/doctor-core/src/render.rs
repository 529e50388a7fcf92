//! Turns analysis results into accordion panels.
//!
//! Rendering is pure: the same results always produce the same panels, and
//! the front end only decides how a [`Block`] looks.

use crate::analysis::AnalysisResult;

/// One display line inside a panel body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Line flagged with `CAUTION:` or `URGENT:`.
    DangerAlert(String),
    /// Line carrying a `Recommendation:`.
    Recommendation(String),
    Paragraph(String),
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Block::DangerAlert(s) | Block::Recommendation(s) | Block::Paragraph(s) => s,
        }
    }
}

/// Classify a single line. First match wins; blank lines render nothing.
pub fn classify_line(line: &str) -> Option<Block> {
    if line.contains("CAUTION:") || line.contains("URGENT:") {
        Some(Block::DangerAlert(line.to_string()))
    } else if line.contains("Recommendation:") {
        Some(Block::Recommendation(line.to_string()))
    } else if !line.trim().is_empty() {
        Some(Block::Paragraph(line.to_string()))
    } else {
        None
    }
}

pub fn render_blocks(text: &str) -> Vec<Block> {
    text.split('\n').filter_map(classify_line).collect()
}

/// A collapsible section holding one agent's analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub index: usize,
    pub title: &'static str,
    pub icon: &'static str,
    pub blocks: Vec<Block>,
    pub expanded: bool,
}

impl Panel {
    /// Header line as shown on the accordion button.
    pub fn heading(&self) -> String {
        format!("{} {}", self.icon, self.title)
    }
}

/// One panel per result, in response order, with only the first expanded.
pub fn render_panels(results: &[AnalysisResult]) -> Vec<Panel> {
    results
        .iter()
        .enumerate()
        .map(|(index, result)| Panel {
            index,
            title: result.agent_type.title(),
            icon: result.agent_type.icon(),
            blocks: render_blocks(result.text()),
            expanded: index == 0,
        })
        .collect()
}

/// Accordion toggle: opening a panel closes the others.
pub fn toggle_panel(panels: &mut [Panel], index: usize) {
    let Some(was_expanded) = panels.get(index).map(|p| p.expanded) else {
        return;
    };

    for panel in panels.iter_mut() {
        panel.expanded = panel.index == index && !was_expanded;
    }
}

/// Static panel shown for any failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPanel;

impl ErrorPanel {
    pub const HEADING: &'static str = "Error Processing Request";
    pub const MESSAGE: &'static str = "An error occurred while processing your request. \
        Please check if all services are running:";
    pub const SERVICES: [(&'static str, u16); 4] = [
        ("Patient Info Agent", 5001),
        ("Diagnostic Agent", 5002),
        ("Medication Agent", 5003),
        ("Referral & Diet Agent", 5004),
    ];

    pub fn service_lines() -> Vec<String> {
        Self::SERVICES
            .iter()
            .map(|(name, port)| format!("{} (Port {})", name, port))
            .collect()
    }
}
