//! Plans used by the demo

use std::time::Duration;

use futures::StreamExt;
use planstore::Action;

use crate::actions::ProfileAction;
use crate::state::ProfileState;

pub type AppAction = Action<ProfileState, ProfileAction>;

/// Rename, then announce the new name as read back from the store
pub fn rename_and_announce(name: impl Into<String>) -> AppAction {
    let name = name.into();
    Action::plan(move |ctx| {
        ctx.dispatch(ProfileAction::SetName(name))?;
        let announcement = ctx.with_state(|state: &ProfileState| format!("{} joined", state.name));
        ctx.dispatch(ProfileAction::Post(announcement))?;
        Ok(())
    })
}

/// Pretend to fetch the display name from somewhere slow
pub fn fetch_name(latency: Duration) -> AppAction {
    Action::plan_async(move |ctx| async move {
        tokio::time::sleep(latency).await;
        log::debug!("fetch_name: response after {:?}", latency);
        ctx.dispatch(ProfileAction::SetName("Grace".into()))?;
        Ok(())
    })
}

/// Emit `count` ticks, one per `interval`
pub fn ticker(count: u32, interval: Duration) -> AppAction {
    Action::publishing(move |_ctx| {
        futures::stream::iter(0..count).then(move |_| async move {
            tokio::time::sleep(interval).await;
            Some(Action::plain(ProfileAction::Tick))
        })
    })
}

/// Post every line that isn't blank; blank lines emit nothing
pub fn post_lines(lines: Vec<String>) -> AppAction {
    Action::publishing(move |_ctx| {
        futures::stream::iter(lines).map(|line| {
            let line = line.trim().to_string();
            (!line.is_empty()).then(|| Action::plain(ProfileAction::Post(line)))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer;
    use planstore::Store;
    use pretty_assertions::assert_eq;

    fn store() -> Store<ProfileState, ProfileAction> {
        Store::new(ProfileState::default(), reducer::root())
    }

    #[tokio::test]
    async fn test_rename_and_announce() {
        let store = store();
        store.send(rename_and_announce("Ada")).await.unwrap();
        assert_eq!(store.state().feed.entries, vec!["Ada joined".to_string()]);
    }

    #[tokio::test]
    async fn test_rename_with_empty_name_fails_before_announcing() {
        let store = store();
        let err = store.send(rename_and_announce("")).await.unwrap_err();
        assert!(err.is_plan());
        assert!(store.state().feed.entries.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_name() {
        let store = store();
        store.send(fetch_name(Duration::from_secs(2))).await.unwrap();
        assert_eq!(store.state().name, "Grace");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker() {
        let store = store();
        store
            .send(ticker(3, Duration::from_millis(100)))
            .await
            .unwrap();
        assert_eq!(store.state().feed.ticks, 3);
    }

    #[tokio::test]
    async fn test_post_lines_skips_blank_lines() {
        let store = store();
        let lines = vec!["one".to_string(), "   ".to_string(), "two".to_string()];
        store.send(post_lines(lines)).await.unwrap();
        assert_eq!(
            store.state().feed.entries,
            vec!["one".to_string(), "two".to_string()]
        );
    }
}
