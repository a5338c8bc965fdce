// Handler tree: public (no auth) and protected (bearer JWT required).
pub mod protected;
pub mod public;
