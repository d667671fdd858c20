use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use planstore::{
    combine_reducers, drop_matching, fallible, handle_action, Action, BoxedReducer, PlanContext,
    DispatchError, Dispatcher, Store,
};
use pretty_assertions::assert_eq;
use tokio::time::{sleep, timeout};

#[derive(Debug, Clone, Default, PartialEq)]
struct Doc {
    name: String,
    applied: Vec<String>,
    counter: i64,
}

#[derive(Debug, Clone, PartialEq)]
enum DocAction {
    SetName(String),
    Apply(&'static str),
    Add(i64),
    Admin,
}

fn names(mut state: Doc, action: &DocAction) -> Doc {
    if let DocAction::SetName(name) = action {
        state.name = name.clone();
    }
    state
}

fn history(mut state: Doc, action: &DocAction) -> Doc {
    if let DocAction::Apply(tag) = action {
        state.applied.push(tag.to_string());
    }
    state
}

fn counter(mut state: Doc, action: &DocAction) -> Doc {
    if let DocAction::Add(n) = action {
        state.counter += n;
    }
    state
}

fn reduce(state: Doc, action: &DocAction) -> Doc {
    counter(history(names(state, action), action), action)
}

fn store() -> Store<Doc, DocAction> {
    Store::new(Doc::default(), reduce)
}

fn apply(tag: &'static str) -> Option<Action<Doc, DocAction>> {
    Some(Action::plain(DocAction::Apply(tag)))
}

#[test]
fn test_serial_dispatch_matches_fold_of_combined_reducer() {
    let root = combine_reducers(vec![
        Box::new(names) as BoxedReducer<Doc, DocAction>,
        Box::new(history),
        Box::new(counter),
    ]);
    let store = Store::new(Doc::default(), root);

    let actions = vec![
        DocAction::SetName("draft".into()),
        DocAction::Add(3),
        DocAction::Apply("a"),
        DocAction::Add(-1),
        DocAction::SetName("final".into()),
    ];
    for action in &actions {
        store.dispatch(action.clone()).unwrap();
    }

    let expected = actions.iter().fold(Doc::default(), reduce);
    assert_eq!(store.state(), expected);
}

#[tokio::test]
async fn test_set_name_then_plan_yields_bc() {
    let store = store();

    store
        .send(Action::plain(DocAction::SetName("A".into())))
        .await
        .unwrap();
    assert_eq!(store.state().name, "A");

    store
        .send(Action::plan(|ctx: &PlanContext<Doc, DocAction>| {
            ctx.dispatch(DocAction::SetName("B".into()))?;
            ctx.dispatch(DocAction::SetName(ctx.state().name + "C"))?;
            Ok(())
        }))
        .await
        .unwrap();
    assert_eq!(store.state().name, "BC");
}

#[tokio::test(start_paused = true)]
async fn test_plan_without_dispatch_does_not_notify() {
    let store = store();
    let changes = store.did_change();

    store
        .send(Action::plan_async(|ctx| async move {
            sleep(Duration::from_millis(5)).await;
            let _ = ctx.state();
            Ok(())
        }))
        .await
        .unwrap();
    sleep(Duration::from_millis(100)).await;

    assert!(!changes.has_changed());
    assert_eq!(store.state(), Doc::default());
}

#[tokio::test(start_paused = true)]
async fn test_publishing_plan_reduces_in_emission_order() {
    let store = store();

    store
        .send(Action::publishing(|_ctx| {
            futures::stream::iter(["a1", "a2", "a3"]).then(|tag| async move {
                sleep(Duration::from_millis(10)).await;
                apply(tag)
            })
        }))
        .await
        .unwrap();

    assert_eq!(store.state().applied, vec!["a1", "a2", "a3"]);
}

#[tokio::test]
async fn test_publishing_plan_skips_empty_items() {
    let store = store();

    store
        .send(Action::publishing(|_ctx| {
            futures::stream::iter(vec![apply("a1"), None, None, apply("a2")])
        }))
        .await
        .unwrap();

    assert_eq!(store.state().applied, vec!["a1", "a2"]);
}

#[tokio::test]
async fn test_publishing_plan_error_ends_the_run() {
    let store = store();

    let result = store
        .send(Action::try_publishing(|_ctx| {
            futures::stream::iter(vec![
                Ok(apply("a1")),
                Err(anyhow::anyhow!("source went away")),
                Ok(apply("a2")),
            ])
        }))
        .await;

    assert!(matches!(result, Err(DispatchError::Publishing(_))));
    assert_eq!(store.state().applied, vec!["a1"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancelling_publishing_plan_stops_emissions() {
    let store = store();

    let completion = store.send(Action::publishing(|_ctx| {
        futures::stream::iter(0..).then(|_| async {
            sleep(Duration::from_millis(10)).await;
            Some(Action::plain(DocAction::Add(1)))
        })
    }));
    let subscription = completion.subscription().unwrap();

    sleep(Duration::from_millis(35)).await;
    subscription.cancel();
    assert!(matches!(completion.await, Err(DispatchError::Cancelled)));

    let counted = store.state().counter;
    assert_eq!(counted, 3);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(store.state().counter, counted);
}

#[tokio::test]
async fn test_plans_nest_without_limit() {
    let store = store();

    store
        .send(Action::plan(|ctx| {
            ctx.dispatch(DocAction::Apply("outer"))?;
            let inner = ctx.send(Action::plan(|ctx| {
                ctx.dispatch(DocAction::Apply("inner"))?;
                let _ = ctx.send(Action::plan(|ctx| {
                    ctx.dispatch(DocAction::Apply("innermost"))?;
                    Ok(())
                }));
                Ok(())
            }));
            drop(inner);
            ctx.dispatch(DocAction::Apply("outer again"))?;
            Ok(())
        }))
        .await
        .unwrap();

    assert_eq!(
        store.state().applied,
        vec!["outer", "inner", "innermost", "outer again"]
    );
}

#[tokio::test]
async fn test_async_plan_awaits_a_publishing_plan() {
    let store = store();

    store
        .send(Action::plan_async(|ctx| async move {
            ctx.send(Action::publishing(|_ctx| {
                futures::stream::iter(vec![apply("p1"), apply("p2")])
            }))
            .await?;
            // the stream has been fully reduced by now
            let seen = ctx.with_state(|state| state.applied.len());
            ctx.dispatch(DocAction::Add(seen as i64))?;
            Ok(())
        }))
        .await
        .unwrap();

    assert_eq!(store.state().applied, vec!["p1", "p2"]);
    assert_eq!(store.state().counter, 2);
}

#[tokio::test(start_paused = true)]
async fn test_burst_produces_single_notification_with_final_state() {
    let store = store();
    let mut changes = store.did_change();

    for n in 1..=5 {
        store.dispatch(DocAction::Add(n)).unwrap();
    }

    assert!(changes.changed().await);
    assert_eq!(store.state().counter, 15);
    assert!(timeout(Duration::from_millis(200), changes.changed())
        .await
        .is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dispatches_from_plain_thread_are_coalesced() {
    let store = Store::builder(Doc::default(), reduce)
        .debounce(Duration::from_millis(50))
        .build();
    let mut changes = store.did_change();

    let sender = store.clone();
    std::thread::spawn(move || {
        for n in 1..=5 {
            sender.dispatch(DocAction::Add(n)).unwrap();
            std::thread::sleep(Duration::from_millis(2));
        }
    })
    .join()
    .unwrap();

    assert!(changes.changed().await);
    assert_eq!(store.state().counter, 15);
    assert!(timeout(Duration::from_millis(200), changes.changed())
        .await
        .is_err());
}

#[test]
fn test_committed_dispatch_succeeds_when_follow_up_is_rejected() {
    let store = Store::builder(
        Doc::default(),
        fallible(|state: Doc, action: &DocAction| {
            if let DocAction::Add(n) = action {
                if *n < 0 {
                    anyhow::bail!("negative");
                }
            }
            Ok(reduce(state, action))
        }),
    )
    .middleware(handle_action(
        |action: &DocAction, _: &Doc, d: &Dispatcher<Doc, DocAction>| {
            if *action == DocAction::Add(5) {
                d.dispatch(DocAction::Add(-1));
            }
            Ok(())
        },
    ))
    .build();

    store.dispatch(DocAction::Add(5)).unwrap();
    assert_eq!(store.state().counter, 5);

    let err = store.dispatch(DocAction::Add(-1)).unwrap_err();
    assert!(err.is_reduction());
    assert_eq!(store.state().counter, 5);
}

#[test]
fn test_three_member_chain_runs_in_order_before_reducer() {
    let trace = Arc::new(Mutex::new(Vec::new()));

    let mut builder = Store::builder(Doc::default(), {
        let trace = trace.clone();
        move |state: Doc, action: &DocAction| {
            trace.lock().push(format!("reduce:{:?}", action));
            reduce(state, action)
        }
    });
    for tag in ["m1", "m2", "m3"] {
        let trace = trace.clone();
        builder = builder.middleware(handle_action(
            move |action: &DocAction, _: &Doc, _: &Dispatcher<Doc, DocAction>| {
                trace.lock().push(format!("{}:{:?}", tag, action));
                Ok(())
            },
        ));
    }
    let store = builder.build();

    store.dispatch(DocAction::Add(1)).unwrap();
    store.dispatch(DocAction::Apply("y")).unwrap();

    assert_eq!(
        *trace.lock(),
        vec![
            "m1:Add(1)",
            "m2:Add(1)",
            "m3:Add(1)",
            "reduce:Add(1)",
            "m1:Apply(\"y\")",
            "m2:Apply(\"y\")",
            "m3:Apply(\"y\")",
            "reduce:Apply(\"y\")",
        ]
    );
}

#[tokio::test]
async fn test_proxy_drops_tagged_actions() {
    let store = store();
    let scoped = store.proxy(drop_matching(|action: &DocAction| {
        matches!(action, DocAction::Admin)
    }));

    scoped.dispatch(DocAction::Admin).await.unwrap();
    assert_eq!(store.state(), Doc::default());

    scoped.dispatch(DocAction::Add(2)).await.unwrap();
    assert_eq!(store.state().counter, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_plans_do_not_lose_updates() {
    let store = store();

    let runs: Vec<_> = (0..16)
        .map(|_| {
            store.send(Action::plan_async(|ctx| async move {
                for _ in 0..50 {
                    ctx.dispatch(DocAction::Add(1))?;
                    tokio::task::yield_now().await;
                }
                Ok(())
            }))
        })
        .collect();
    for run in runs {
        run.await.unwrap();
    }

    assert_eq!(store.state().counter, 800);
}
