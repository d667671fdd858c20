use planstore::{combine_reducers, fallible, scoped, BoxedReducer, CombinedReducer};

use crate::actions::ProfileAction;
use crate::state::{FeedState, ProfileState};

pub fn root() -> CombinedReducer<ProfileState, ProfileAction> {
    combine_reducers(vec![
        Box::new(fallible(profile)) as BoxedReducer<ProfileState, ProfileAction>,
        Box::new(scoped(
            |state: &ProfileState| state.feed.clone(),
            |state: &mut ProfileState, slice| state.feed = slice,
            feed,
        )),
    ])
}

fn profile(mut state: ProfileState, action: &ProfileAction) -> anyhow::Result<ProfileState> {
    if let ProfileAction::SetName(name) = action {
        if name.trim().is_empty() {
            anyhow::bail!("name must not be empty");
        }
        state.name = name.clone();
        state.edits += 1;
    }
    Ok(state)
}

fn feed(mut state: FeedState, action: &ProfileAction) -> FeedState {
    match action {
        ProfileAction::Post(text) => state.entries.push(text.clone()),
        ProfileAction::Tick => state.ticks += 1,
        ProfileAction::ClearFeed => state.entries.clear(),
        ProfileAction::SetName(_) => {}
    }
    state
}
