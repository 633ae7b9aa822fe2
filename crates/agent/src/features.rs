//! Platform feature shortcuts and conversation etiquette for interactive chat.

use serde::Serialize;

use crate::router::Intent;

pub const ROLE_QUESTION: &str = "Before we begin, are you here as a Buyer or a Seller?";
pub const ROLE_RETRY: &str = "Please respond with Buyer or Seller to continue.";
pub const FAREWELL: &str = "Sounds good. If you need help with credits, ESG, or sustainability insights later, I will be here.";
pub const CHAT_ERROR_REPLY: &str = "Sorry, I ran into an error.";

pub const FEATURE_MENU: &str = "\
Here are four core features I can help with:
1) Retire Credits: Permanently retire credits to document your climate action and keep records clean.
2) Certificate Authentication: Validate a credit certificate before listing or purchasing.
3) Carbon Footprint Calculator: Estimate emissions for planning and offset decisions.
4) ESG Report Generator: Create a business-friendly ESG report with key sustainability insights.
You can choose a number or just describe what you want in your own words.";

const EXIT_MESSAGES: &[&str] =
    &["exit", "quit", "bye", "no", "nope", "nothing else", "that's all", "that is all"];
const THANKS_KEYWORDS: &[&str] = &["thanks", "thank you", "appreciate it", "thx"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    RetireCredits,
    CertificateAuth,
    CarbonFootprint,
    EsgReport,
}

impl Feature {
    pub const ALL: [Feature; 4] =
        [Feature::RetireCredits, Feature::CertificateAuth, Feature::CarbonFootprint, Feature::EsgReport];

    pub fn menu_number(&self) -> &'static str {
        match self {
            Self::RetireCredits => "1",
            Self::CertificateAuth => "2",
            Self::CarbonFootprint => "3",
            Self::EsgReport => "4",
        }
    }

    pub fn link(&self) -> &'static str {
        match self {
            Self::RetireCredits => "/retire-credits",
            Self::CertificateAuth => "/certificate-auth",
            Self::CarbonFootprint => "/carbon-footprint",
            Self::EsgReport => "/esg-report",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::RetireCredits => {
                &["retire", "retirement", "offset", "offsetting", "offset emissions"]
            }
            Self::CertificateAuth => {
                &["certificate", "authenticate", "verification", "verify", "validate"]
            }
            Self::CarbonFootprint => {
                &["footprint", "calculate emissions", "emissions calculator", "carbon calculator"]
            }
            Self::EsgReport => &["esg", "report", "sustainability report", "esg reporting"],
        }
    }

    fn confirmation(&self) -> (&'static str, &'static str) {
        match self {
            Self::RetireCredits => (
                "Great, retiring credits is the right step for formalizing climate action.",
                "I can guide you through choosing quantities, beneficiaries, and retirement records.",
            ),
            Self::CertificateAuth => (
                "Got it, certificate authentication helps ensure credibility before buying or listing.",
                "I can help verify the certificate details and expected standards.",
            ),
            Self::CarbonFootprint => (
                "Understood, a footprint calculation will clarify your emissions baseline.",
                "I can estimate emissions and suggest next actions based on your profile.",
            ),
            Self::EsgReport => (
                "Sounds good, an ESG report will help summarize your sustainability position.",
                "I can prepare the report inputs and highlight material insights.",
            ),
        }
    }

    /// Fixed three-line reply: confirmation, what happens next, link.
    pub fn response(&self) -> String {
        let (confirm, next_step) = self.confirmation();
        format!("{confirm}\n{next_step}\nMock link: {}", self.link())
    }
}

/// Menu number first, then keyword groups in menu order.
pub fn detect_feature(input: &str) -> Option<Feature> {
    let text = input.trim().to_lowercase();
    if let Some(feature) = Feature::ALL.iter().find(|feature| feature.menu_number() == text) {
        return Some(*feature);
    }
    Feature::ALL
        .into_iter()
        .find(|feature| feature.keywords().iter().any(|keyword| text.contains(keyword)))
}

pub fn is_exit_message(input: &str) -> bool {
    let text = input.trim().to_lowercase();
    EXIT_MESSAGES.contains(&text.as_str())
}

pub fn is_thanks_message(input: &str) -> bool {
    let text = input.trim().to_lowercase();
    THANKS_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Entry in the chat options list offered to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatOption {
    pub id: u8,
    pub label: &'static str,
    pub description: &'static str,
    pub intent: Intent,
}

pub fn chat_options() -> Vec<ChatOption> {
    vec![
        ChatOption {
            id: 1,
            label: "Market analysis",
            description: "Compare carbon credits by price, demand, and market performance.",
            intent: Intent::MarketAnalysis,
        },
        ChatOption {
            id: 2,
            label: "Recommendations",
            description: "Get the best credits to buy based on your buyer type and goals.",
            intent: Intent::Recommendation,
        },
        ChatOption {
            id: 3,
            label: "Emissions impact",
            description: "Estimate emissions offsets and climate impact calculations.",
            intent: Intent::Emissions,
        },
        ChatOption {
            id: 4,
            label: "Theory & insights",
            description: "Ask carbon market concepts or project insight questions.",
            intent: Intent::Theory,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        chat_options, detect_feature, is_exit_message, is_thanks_message, Feature, FEATURE_MENU,
    };

    #[test]
    fn menu_numbers_select_features() {
        assert_eq!(detect_feature(" 1 "), Some(Feature::RetireCredits));
        assert_eq!(detect_feature("4"), Some(Feature::EsgReport));
        assert_eq!(detect_feature("5"), None);
    }

    #[test]
    fn keywords_select_features_in_menu_order() {
        assert_eq!(detect_feature("I want to verify a certificate"), Some(Feature::CertificateAuth));
        assert_eq!(detect_feature("what's my carbon FOOTPRINT"), Some(Feature::CarbonFootprint));
        // "offset" belongs to retirement, which precedes the ESG report.
        assert_eq!(detect_feature("offset report"), Some(Feature::RetireCredits));
        assert_eq!(detect_feature("which credits sell best"), None);
    }

    #[test]
    fn feature_response_ends_with_link() {
        let reply = Feature::CarbonFootprint.response();
        assert_eq!(reply.lines().count(), 3);
        assert!(reply.starts_with("Understood, a footprint calculation"));
        assert!(reply.ends_with("Mock link: /carbon-footprint"));
    }

    #[test]
    fn exit_requires_exact_phrase_but_thanks_is_substring() {
        assert!(is_exit_message("  That's all "));
        assert!(is_exit_message("NO"));
        assert!(!is_exit_message("no more questions about solar"));
        assert!(is_thanks_message("ok thanks a lot"));
        assert!(is_thanks_message("THX"));
        assert!(!is_thanks_message("tell me more"));
    }

    #[test]
    fn menu_mentions_all_four_features() {
        assert_eq!(FEATURE_MENU.lines().filter(|line| line.contains(") ")).count(), 4);
        let ids = chat_options().iter().map(|option| option.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
