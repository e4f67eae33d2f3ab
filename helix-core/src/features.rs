//! Landing page feature catalogue

use serde::Serialize;

const FEATURE_IMAGE: &str = "/img/servers.png";

/// Palette slot of an action button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionColor {
    Primary,
    Secondary,
}

/// Visual weight of an action button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    Text,
    Outlined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureAction {
    pub title: &'static str,
    pub color: ActionColor,
    pub variant: ActionVariant,
}

/// One card of the feature grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub disabled: bool,
    pub actions: Vec<FeatureAction>,
}

/// A titled row of feature cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSection {
    pub title: &'static str,
    pub features: Vec<Feature>,
}

fn feature(title: &'static str, description: &'static str) -> Feature {
    Feature {
        title,
        description,
        image: FEATURE_IMAGE,
        disabled: false,
        actions: vec![
            FeatureAction {
                title: "Chat",
                color: ActionColor::Secondary,
                variant: ActionVariant::Outlined,
            },
            FeatureAction {
                title: "Docs",
                color: ActionColor::Primary,
                variant: ActionVariant::Text,
            },
        ],
    }
}

fn disabled(mut feature: Feature) -> Feature {
    feature.disabled = true;
    feature
}

/// Sections shown on the home page; the admin section only for admins.
pub fn home_sections(is_admin: bool) -> Vec<FeatureSection> {
    let mut sections = vec![
        FeatureSection {
            title: "Use",
            features: vec![
                feature("Chat", "Talk to Helix"),
                feature("Image Gen", "Generate Images"),
                feature("Apps", "View Apps"),
            ],
        },
        FeatureSection {
            title: "Customize",
            features: vec![
                feature("RAG", "Add your own documents"),
                feature("Finetune Text", "Finetune on text"),
                feature("Finetune Images", "Finetune on images"),
            ],
        },
        FeatureSection {
            title: "Develop",
            features: vec![
                feature("JS App", "Create a Javascript AI App"),
                feature("Integrate w/ API", "Use the REST API"),
                feature("GPTScript", "Run GPTScripts"),
            ],
        },
    ];

    if is_admin {
        sections.push(FeatureSection {
            title: "Admin",
            features: vec![
                feature("Dashboard", "Show the platform dashboard"),
                feature("Users", "Show Users"),
                disabled(feature("Settings", "Show Settings (coming soon)")),
            ],
        });
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_section_is_gated() {
        let titles = |sections: Vec<FeatureSection>| -> Vec<&'static str> {
            sections.into_iter().map(|s| s.title).collect()
        };

        assert_eq!(titles(home_sections(false)), vec!["Use", "Customize", "Develop"]);
        assert_eq!(
            titles(home_sections(true)),
            vec!["Use", "Customize", "Develop", "Admin"]
        );
    }

    #[test]
    fn test_only_settings_is_disabled() {
        let disabled: Vec<&str> = home_sections(true)
            .into_iter()
            .flat_map(|s| s.features)
            .filter(|f| f.disabled)
            .map(|f| f.title)
            .collect();
        assert_eq!(disabled, vec!["Settings"]);
    }

    #[test]
    fn test_every_feature_has_chat_and_docs_actions() {
        for section in home_sections(true) {
            assert_eq!(section.features.len(), 3);
            for feature in section.features {
                let actions: Vec<&str> = feature.actions.iter().map(|a| a.title).collect();
                assert_eq!(actions, vec!["Chat", "Docs"]);
                assert_eq!(feature.image, "/img/servers.png");
            }
        }
    }
}
