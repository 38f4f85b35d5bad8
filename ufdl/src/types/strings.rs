use aliri_braid::braid;

/// UFDL user's username.
#[braid(serde)]
pub struct Username;

