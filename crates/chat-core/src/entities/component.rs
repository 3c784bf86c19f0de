//! Embeds and interactive components attached to messages
//!
//! Both are tagged by a `type` field on the wire and validated once at the
//! boundary before a message is persisted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const MAX_EMBEDS: usize = 10;
pub const MAX_COMPONENTS: usize = 25;
pub const MAX_CUSTOM_ID_LEN: usize = 100;
pub const MAX_LABEL_LEN: usize = 80;
pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_DESCRIPTION_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Embed {
    Rich {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<u32>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<EmbedField>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        footer: Option<String>,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl Embed {
    fn title(&self) -> Option<&str> {
        match self {
            Self::Rich { title, .. } | Self::Image { title, .. } | Self::Link { title, .. } => {
                title.as_deref()
            }
        }
    }

    fn description(&self) -> Option<&str> {
        match self {
            Self::Rich { description, .. } | Self::Link { description, .. } => description.as_deref(),
            Self::Image { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    /// Button that dispatches a `buttonClicked` interaction to the owning app
    Button {
        custom_id: String,
        label: String,
        #[serde(default)]
        style: ButtonStyle,
        #[serde(default)]
        disabled: bool,
    },
    /// Button that opens a URL client-side and never reaches the server
    LinkButton { url: String, label: String },
}

impl Component {
    pub fn custom_id(&self) -> Option<&str> {
        match self {
            Self::Button { custom_id, .. } => Some(custom_id),
            Self::LinkButton { .. } => None,
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::Button { label, .. } | Self::LinkButton { label, .. } => label,
        }
    }
}

fn too_long(field: &str, max: usize) -> DomainError {
    DomainError::ValidationError(format!("{field} must be at most {max} characters"))
}

pub fn validate_embeds(embeds: &[Embed]) -> Result<(), DomainError> {
    if embeds.len() > MAX_EMBEDS {
        return Err(DomainError::ValidationError(format!(
            "A message can carry at most {MAX_EMBEDS} embeds"
        )));
    }

    for embed in embeds {
        if embed.title().is_some_and(|t| t.chars().count() > MAX_TITLE_LEN) {
            return Err(too_long("Embed title", MAX_TITLE_LEN));
        }
        if embed
            .description()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
        {
            return Err(too_long("Embed description", MAX_DESCRIPTION_LEN));
        }
    }
    Ok(())
}

pub fn validate_components(components: &[Component]) -> Result<(), DomainError> {
    if components.len() > MAX_COMPONENTS {
        return Err(DomainError::ValidationError(format!(
            "A message can carry at most {MAX_COMPONENTS} components"
        )));
    }

    let mut seen = HashSet::new();
    for component in components {
        if component.label().chars().count() > MAX_LABEL_LEN {
            return Err(too_long("Component label", MAX_LABEL_LEN));
        }
        if let Some(custom_id) = component.custom_id() {
            let len = custom_id.chars().count();
            if len == 0 || len > MAX_CUSTOM_ID_LEN {
                return Err(DomainError::ValidationError(format!(
                    "custom_id must be 1-{MAX_CUSTOM_ID_LEN} characters"
                )));
            }
            if !seen.insert(custom_id) {
                return Err(DomainError::ValidationError(format!(
                    "Duplicate custom_id: {custom_id}"
                )));
            }
        }
    }
    Ok(())
}
