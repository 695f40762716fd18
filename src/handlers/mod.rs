// Two security tiers: public (no token) and protected (bearer access token).
pub mod protected;
pub mod public;
