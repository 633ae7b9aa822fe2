use greenearth_core::domain::profile::{BuyerProfile, Role, SellerProfile, SessionProfile};

const GUIDANCE_TONE: &str = "Keep the tone advisory and business-friendly.";

/// Who is chatting. Rendered into every agent prompt as "User profile context".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionContext {
    pub role: Option<Role>,
    pub user_id: Option<String>,
    pub profile: Option<SessionProfile>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_role(role: Role) -> Self {
        Self { role: Some(role), ..Self::default() }
    }

    pub fn with_profile(profile: SessionProfile) -> Self {
        Self { role: Some(profile.role()), profile: Some(profile), user_id: None }
    }

    /// Blank ids are treated as absent.
    pub fn user(mut self, user_id: Option<&str>) -> Self {
        self.user_id = user_id.map(str::trim).filter(|id| !id.is_empty()).map(str::to_string);
        self
    }

    pub fn render(&self) -> String {
        let mut text = match (&self.profile, self.role) {
            (Some(SessionProfile::Buyer(profile)), _) => render_buyer(profile),
            (Some(SessionProfile::Seller(profile)), _) => render_seller(profile),
            (None, Some(role)) => format!("User role: {}", role.display_name()),
            (None, None) => String::new(),
        };

        if let Some(user_id) = &self.user_id {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("user_id: ");
            text.push_str(user_id);
        }
        text
    }
}

fn render_buyer(profile: &BuyerProfile) -> String {
    format!(
        "User role: Buyer\n\
         Company: {} in {} based in {}.\n\
         ESG maturity: {}.\n\
         Buyer state: {}\n\
         Personalization guidance: Reference marketplace quality, seller trust, and credit availability. {}",
        profile.company,
        profile.industry,
        profile.location,
        profile.esg_maturity,
        profile.state().summary(),
        GUIDANCE_TONE
    )
}

fn render_seller(profile: &SellerProfile) -> String {
    format!(
        "User role: Seller\n\
         Organization: {} with {} projects.\n\
         Verification standard: {}. Trust score: {}.\n\
         Market demand: {}.\n\
         Personalization guidance: Reference buyer demand, emissions trends, and offset potential. {}",
        profile.organization,
        profile.project_type,
        profile.verification_standard,
        profile.trust_score,
        profile.market_demand,
        GUIDANCE_TONE
    )
}
