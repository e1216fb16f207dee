//! Objection Response Scenario
//!
//! Request model, prompt construction and the structured script returned
//! to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::services::knowledge::KnowledgeStore;

const PROMPT_TEMPLATE: &str = include_str!("objection_prompt.md");

/// Version of the `StructuredScript` shape, sent in `SCRIPT_SCHEMA_HEADER`.
pub const SCRIPT_SCHEMA_VERSION: &str = "1";
pub const SCRIPT_SCHEMA_HEADER: &str = "x-script-schema-version";

// ============================================================================
// Request
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ObjectionRequest {
    /// What the client said
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "O preço está alto")]
    pub objection: String,
    /// Proposal value, text or number, inserted as-is
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "5000")]
    pub value: Option<Value>,
    /// Advantages the client already perceives
    #[serde(default)]
    pub advantages: Option<String>,
    /// DISC tag: dominancia, influencia, estabilidade or conformidade
    #[serde(default)]
    pub disc_profile: Option<String>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl ObjectionRequest {
    pub fn to_input(&self) -> ObjectionInput {
        ObjectionInput {
            objection: self.objection.clone(),
            price: render_value(self.value.as_ref()),
            advantages: self.advantages.clone().unwrap_or_default(),
            profile: self
                .disc_profile
                .as_deref()
                .map(BehavioralProfile::from_tag)
                .unwrap_or_default(),
        }
    }
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Request fields as they are interpolated into the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectionInput {
    pub objection: String,
    pub price: String,
    pub advantages: String,
    pub profile: BehavioralProfile,
}

// ============================================================================
// Behavioral profile
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BehavioralProfile {
    Dominance,
    Influence,
    Steadiness,
    Compliance,
    #[default]
    Unspecified,
}

impl BehavioralProfile {
    #[cfg(test)]
    pub const ALL: [BehavioralProfile; 5] = [
        Self::Dominance,
        Self::Influence,
        Self::Steadiness,
        Self::Compliance,
        Self::Unspecified,
    ];

    /// Exact, case-sensitive match; anything else is `Unspecified`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "dominancia" => Self::Dominance,
            "influencia" => Self::Influence,
            "estabilidade" => Self::Steadiness,
            "conformidade" => Self::Compliance,
            _ => Self::Unspecified,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Dominance => "dominancia",
            Self::Influence => "influencia",
            Self::Steadiness => "estabilidade",
            Self::Compliance => "conformidade",
            Self::Unspecified => "",
        }
    }

    pub fn directive(&self) -> &'static str {
        match self {
            Self::Dominance => {
                "Perfil DISC: Dominância. Seja direto, objetivo e focado em resultados. \
                 Vá direto ao ponto, destaque ganhos concretos e evite rodeios ou detalhes excessivos."
            },
            Self::Influence => {
                "Perfil DISC: Influência. Seja entusiasmado, caloroso e inspirador. \
                 Use histórias, reconhecimento social e a visão de sucesso do cliente."
            },
            Self::Steadiness => {
                "Perfil DISC: Estabilidade. Seja calmo, paciente e acolhedor. \
                 Transmita segurança, enfatize previsibilidade e ofereça garantias passo a passo."
            },
            Self::Compliance => {
                "Perfil DISC: Conformidade. Seja preciso, lógico e detalhado. \
                 Apresente dados, números e comparativos que comprovem cada afirmação."
            },
            Self::Unspecified => {
                "Perfil DISC não informado. Use um tom equilibrado, consultivo e empático, \
                 combinando objetividade com cordialidade."
            },
        }
    }
}

// ============================================================================
// Prompt
// ============================================================================

/// Build the instruction sent to the model. Pure: same input, same bytes.
pub fn build_objection_prompt(input: &ObjectionInput, knowledge: &KnowledgeStore) -> String {
    render_template(PROMPT_TEMPLATE, |key| match key {
        "playbook" => Some(knowledge.playbook_text.as_str()),
        "cases" => Some(knowledge.cases_text.as_str()),
        "objection" => Some(input.objection.as_str()),
        "price" => Some(input.price.as_str()),
        "advantages" => Some(input.advantages.as_str()),
        "profile_directive" => Some(input.profile.directive()),
        _ => None,
    })
}

/// Single pass over the template: substituted values are never rescanned,
/// so `{{...}}` inside user text stays literal.
fn render_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len() + 1024);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match lookup(key) {
            Some(value) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            },
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

// ============================================================================
// Response
// ============================================================================

/// Sales script returned to the caller (schema version 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct StructuredScript {
    #[serde(rename = "tipo_objecao")]
    #[validate(custom(function = "validate_not_blank"))]
    pub objection_type: String,
    #[serde(rename = "roteiro")]
    #[validate(length(min = 1))]
    pub script_steps: Vec<String>,
    #[serde(rename = "tom_palavras_chave")]
    pub tone: ToneKeywords,
    pub follow_up: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ToneKeywords {
    #[serde(rename = "tom")]
    pub tone_description: String,
    #[serde(rename = "palavras_chave")]
    pub keywords: Vec<String>,
}
