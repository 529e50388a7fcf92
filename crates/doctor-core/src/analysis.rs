//! Wire types shared with the analysis service.

use serde::{Deserialize, Serialize};

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSubmission {
    pub text: String,
}

/// Which backend agent produced a result segment.
///
/// Unrecognised labels are kept rather than rejected; they render with an
/// empty title and icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentType {
    PatientInfo,
    Diagnostic,
    Medication,
    ReferralDiet,
    Unknown(String),
}

impl AgentType {
    pub fn as_str(&self) -> &str {
        match self {
            AgentType::PatientInfo => "patient_info",
            AgentType::Diagnostic => "diagnostic",
            AgentType::Medication => "medication",
            AgentType::ReferralDiet => "referral_diet",
            AgentType::Unknown(s) => s,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AgentType::PatientInfo => "Patient Information",
            AgentType::Diagnostic => "Diagnostic Analysis",
            AgentType::Medication => "Medication Suggestions",
            AgentType::ReferralDiet => "Referral & Diet Recommendations",
            AgentType::Unknown(_) => "",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AgentType::PatientInfo => "👤",
            AgentType::Diagnostic => "🏥",
            AgentType::Medication => "💊",
            AgentType::ReferralDiet => "🍎",
            AgentType::Unknown(_) => "",
        }
    }
}

impl From<String> for AgentType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "patient_info" => AgentType::PatientInfo,
            "diagnostic" => AgentType::Diagnostic,
            "medication" => AgentType::Medication,
            "referral_diet" => AgentType::ReferralDiet,
            _ => AgentType::Unknown(s),
        }
    }
}

impl From<AgentType> for String {
    fn from(agent: AgentType) -> Self {
        agent.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentContent {
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub content: AgentContent,
}

/// One element of the `/analyze` response array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub agent_type: AgentType,
    pub response: AgentResponse,
}

impl AnalysisResult {
    pub fn new(agent_type: AgentType, text: impl Into<String>) -> Self {
        Self {
            agent_type,
            response: AgentResponse {
                content: AgentContent {
                    text: text.into(),
                    content_type: None,
                },
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.response.content.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_response() {
        let body = r#"[
            {"agent_type": "patient_info", "response": {"content": {"type": "text", "text": "Name: Ana"}}},
            {"agent_type": "referral_diet", "response": {"content": {"text": "Eat greens"}}}
        ]"#;

        let results: Vec<AnalysisResult> = serde_json::from_str(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].agent_type, AgentType::PatientInfo);
        assert_eq!(results[0].response.content.content_type.as_deref(), Some("text"));
        assert_eq!(results[1].agent_type, AgentType::ReferralDiet);
        assert_eq!(results[1].text(), "Eat greens");
    }

    #[test]
    fn test_unknown_agent_type_is_kept() {
        let body = r#"{"agent_type": "radiology", "response": {"content": {"text": "x"}}}"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();

        assert_eq!(result.agent_type, AgentType::Unknown("radiology".to_string()));
        assert_eq!(result.agent_type.title(), "");
        assert_eq!(result.agent_type.icon(), "");
    }

    #[test]
    fn test_missing_text_is_an_error() {
        let body = r#"{"agent_type": "diagnostic", "response": {"content": {}}}"#;
        assert!(serde_json::from_str::<AnalysisResult>(body).is_err());
    }

    #[test]
    fn test_title_and_icon_table() {
        assert_eq!(AgentType::Diagnostic.title(), "Diagnostic Analysis");
        assert_eq!(AgentType::Diagnostic.icon(), "🏥");
        assert_eq!(AgentType::Medication.icon(), "💊");
        assert_eq!(AgentType::ReferralDiet.title(), "Referral & Diet Recommendations");
    }

    #[test]
    fn test_submission_serializes_as_text_object() {
        let submission = PatientSubmission { text: "Age: 3".to_string() };
        assert_eq!(serde_json::to_string(&submission).unwrap(), r#"{"text":"Age: 3"}"#);
    }
}
