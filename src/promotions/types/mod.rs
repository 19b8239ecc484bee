//! Promotion Types

pub mod duo;
pub mod family_constellation;
pub mod poster_add_on;
pub mod trinity;

pub use duo::DuoPromotion;
pub use family_constellation::FamilyConstellationPromotion;
pub use poster_add_on::PosterAddOnPromotion;
pub use trinity::TrinityPromotion;
