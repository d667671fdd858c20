use serde::{Deserialize, Serialize};

/// Demo state - a user profile with an activity feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileState {
    pub name: String,
    pub edits: u32,
    pub feed: FeedState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedState {
    pub entries: Vec<String>,
    pub ticks: u32,
}
