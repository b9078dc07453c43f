pub mod accounts;
pub mod moderation;
pub mod onboarding;
pub mod portal;

pub use portal::Portal;
