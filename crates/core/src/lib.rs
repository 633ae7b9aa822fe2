pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod scoring;

pub use domain::credit::{Credit, CreditId};
pub use domain::footprint::{format_footprint_for_chat, FootprintSummary, UserFootprint};
pub use domain::profile::{
    BuyerProfile, BuyerState, Role, SellerProfile, SessionProfile, UserProfile,
};
pub use domain::seller::{Seller, SellerId};
pub use domain::theory::TheoryEntry;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use scoring::{ScoreCalculator, ScoredCredit};
