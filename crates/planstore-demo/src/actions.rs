#[derive(Debug, Clone, PartialEq)]
pub enum ProfileAction {
    SetName(String),
    Post(String),
    Tick,
    /// Admin-only operation, dropped by the guest proxy
    ClearFeed,
}

impl ProfileAction {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::ClearFeed)
    }
}
