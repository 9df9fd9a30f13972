//! Framework catalog and suggested-question seed data.
//!
//! The exchange model only carries framework ids; this module is the
//! application-side lookup table that gives them names and descriptions.

use crate::models::{Framework, SuggestedQuestion};

/// The closed set of frameworks offered to the user.
#[derive(Debug, Clone)]
pub struct FrameworkCatalog {
    frameworks: Vec<Framework>,
}

impl Default for FrameworkCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FrameworkCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        let frameworks = [
            ("ICE", "ICE Framework", "Impact, Confidence, Ease prioritization"),
            (
                "RICE",
                "RICE Framework",
                "Reach, Impact, Confidence, Effort scoring",
            ),
            (
                "Porter",
                "Porter's Five Forces",
                "Competitive landscape analysis",
            ),
            (
                "SWOT",
                "SWOT Analysis",
                "Strengths, Weaknesses, Opportunities, Threats",
            ),
            ("OKR", "OKR Framework", "Objectives and Key Results alignment"),
            (
                "JTBD",
                "Jobs-to-be-Done",
                "The core job customers hire the product to do",
            ),
        ]
        .into_iter()
        .map(|(id, name, description)| Framework {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect();

        Self { frameworks }
    }

    pub fn all(&self) -> &[Framework] {
        &self.frameworks
    }

    /// Looks up a framework by id, ignoring case.
    pub fn find(&self, id: &str) -> Option<&Framework> {
        let id = id.trim();
        self.frameworks
            .iter()
            .find(|f| f.id.eq_ignore_ascii_case(id))
    }

    /// Maps an id or display name to the display name.
    pub fn resolve_name(&self, id_or_name: &str) -> Option<&str> {
        let key = id_or_name.trim();
        self.frameworks
            .iter()
            .find(|f| f.id.eq_ignore_ascii_case(key) || f.name.eq_ignore_ascii_case(key))
            .map(|f| f.name.as_str())
    }

    /// Comma-separated ids, for error messages and help text.
    pub fn ids(&self) -> String {
        self.frameworks
            .iter()
            .map(|f| f.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Example questions grouped by category.
pub fn suggested_questions() -> Vec<SuggestedQuestion> {
    let seed: [(&str, &str, &[&str]); 4] = [
        (
            "Prioritization",
            "target",
            &[
                "Which three features should we build next quarter?",
                "How should we rank our backlog with a two-person team?",
            ],
        ),
        (
            "Competition",
            "swords",
            &[
                "How do we respond to a competitor cutting prices by 30%?",
                "Where can we differentiate from the market leader?",
            ],
        ),
        (
            "Growth",
            "trending-up",
            &[
                "Should we expand into the mid-market segment?",
                "What is blocking our market growth after launch?",
            ],
        ),
        (
            "Resources",
            "wallet",
            &[
                "How should we split a $15k budget between product and marketing?",
                "Hire a PM or another engineer first?",
            ],
        ),
    ];

    seed.iter()
        .map(|(category, icon, questions)| SuggestedQuestion {
            category: category.to_string(),
            icon: icon.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_insensitive() {
        let catalog = FrameworkCatalog::builtin();
        assert_eq!(catalog.find("rice").unwrap().name, "RICE Framework");
        assert_eq!(catalog.find(" porter ").unwrap().id, "Porter");
        assert!(catalog.find("BCG").is_none());
    }

    #[test]
    fn test_resolve_name_accepts_id_or_name() {
        let catalog = FrameworkCatalog::builtin();
        assert_eq!(catalog.resolve_name("swot"), Some("SWOT Analysis"));
        assert_eq!(
            catalog.resolve_name("Porter's Five Forces"),
            Some("Porter's Five Forces")
        );
        assert_eq!(catalog.resolve_name("unknown"), None);
    }

    #[test]
    fn test_ids_listing() {
        let catalog = FrameworkCatalog::builtin();
        assert!(catalog.ids().starts_with("ICE, RICE"));
        assert_eq!(catalog.all().len(), 6);
    }

    #[test]
    fn test_suggested_questions_seed() {
        let suggestions = suggested_questions();
        assert_eq!(suggestions.len(), 4);
        assert!(suggestions.iter().all(|s| !s.questions.is_empty()));
        assert_eq!(suggestions[1].category, "Competition");
    }
}
