use std::sync::Arc;
use std::time::Duration;

use planstore::{drop_matching, DispatchError, LoggingMiddleware, Store};
use planstore_config::StoreConfig;
use planstore_persist::{restore_into, Autosave, JsonFileCodec};

mod actions;
mod logger;
mod plans;
mod reducer;
mod state;

use actions::ProfileAction;
use state::ProfileState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = StoreConfig::load();
    logger::init(&config);

    log::info!("Starting planstore demo");

    let store = Store::builder(ProfileState::default(), reducer::root())
        .config(&config)
        .middleware(LoggingMiddleware::with_level(log::Level::Info))
        .build();

    let autosave = if config.persistence.enabled {
        let codec: Arc<JsonFileCodec<ProfileState>> =
            Arc::new(JsonFileCodec::new(config.persistence.state_path()?));
        restore_into(&store, &*codec);
        Some(Autosave::spawn(&store, codec, config.persistence.debounce())?)
    } else {
        None
    };

    // Render on every debounced change
    let weak = store.downgrade();
    let mut changes = store.did_change();
    let renderer = tokio::spawn(async move {
        while changes.changed().await {
            let Some(store) = weak.upgrade() else { break };
            store.with_state(|state| {
                println!(
                    "name={:?} edits={} ticks={} feed={:?}",
                    state.name, state.edits, state.feed.ticks, state.feed.entries
                )
            });
        }
    });

    store.dispatch(ProfileAction::SetName("Ada".into()))?;
    if let Err(e) = store.dispatch(ProfileAction::SetName("   ".into())) {
        log::warn!("Rejected: {}", e);
    }

    store.send(plans::rename_and_announce("Ada Lovelace")).await?;
    store.send(plans::fetch_name(Duration::from_millis(150))).await?;
    store
        .send(plans::post_lines(vec![
            "first post".into(),
            "".into(),
            "second post".into(),
        ]))
        .await?;
    store
        .send(plans::ticker(5, Duration::from_millis(40)))
        .await?;

    // A ticker that never gets to finish
    let endless = store.send(plans::ticker(u32::MAX, Duration::from_millis(40)));
    if let Some(subscription) = endless.subscription() {
        tokio::time::sleep(Duration::from_millis(130)).await;
        subscription.cancel();
    }
    match endless.await {
        Err(DispatchError::Cancelled) => log::info!("Endless ticker cancelled"),
        other => log::warn!("Endless ticker ended unexpectedly: {:?}", other),
    }

    // Guests can post but not clear the feed
    let guest = store.proxy(drop_matching(ProfileAction::is_admin));
    guest.dispatch(ProfileAction::ClearFeed).await?;
    guest
        .dispatch(ProfileAction::Post("hello from a guest".into()))
        .await?;

    let settle = match &autosave {
        Some(_) => config.persistence.debounce(),
        None => store.debounce(),
    };
    tokio::time::sleep(settle * 2 + Duration::from_millis(50)).await;

    if let Some(autosave) = &autosave {
        log::info!("Autosave wrote {} snapshot(s)", autosave.saves());
    }
    println!("final state: {:#?}", store.state());

    // The renderer ends once the last strong handle is gone
    drop(guest);
    drop(store);
    renderer.await?;

    log::info!("Exiting planstore demo");
    Ok(())
}
