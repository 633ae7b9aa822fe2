pub mod credit;
pub mod footprint;
pub mod profile;
pub mod seller;
pub mod theory;
