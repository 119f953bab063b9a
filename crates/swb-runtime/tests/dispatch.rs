//! End-to-end dispatch behavior through a built core.

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use swb_interaction::testing::RecordingSink;
use swb_interaction::Interaction;
use swb_runtime::{Core, InteractionContext};
use swb_types::ScopedId;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn interaction(raw: serde_json::Value) -> Interaction {
    Interaction::classify(raw).expect("test interaction should classify")
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[tokio::test]
async fn command_routes_to_its_handler() {
    init_tracing();
    let core = Core::builder().build().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    core.module("ping").on_command("ping", move |_ctx: InteractionContext| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });

    let outcome = core
        .dispatch(interaction(json!({
            "kind": "command",
            "name": "ping",
            "id": fresh_id(),
        })))
        .await;

    assert_eq!(outcome.invoked, 1);
    assert_eq!(outcome.failed, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn select_registration_covers_every_variant() {
    init_tracing();
    let core = Core::builder().build().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let _unreg = core
        .module("shop")
        .register_select("shop:buy:ssel:item", move |_ctx: InteractionContext| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

    for variant in ["string_select", "user_select", "channel_select", "role_select"] {
        let outcome = core
            .dispatch(interaction(json!({
                "kind": "select",
                "custom_id": "shop:buy:ssel:item",
                "variant": variant,
                "values": ["x"],
                "id": fresh_id(),
            })))
            .await;
        assert_eq!(outcome.invoked, 1, "variant {variant} should route");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn panicking_handler_is_isolated_from_listeners() {
    init_tracing();
    let sink = Arc::new(RecordingSink::new());
    let core = Core::builder().sink(sink.clone()).build().unwrap();
    let module = core.module("m");

    module.on_command("explode", |_ctx: InteractionContext| async move {
        panic!("handler bug");
    });

    let listener_ran = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&listener_ran);
    let _unsub = module.on_interaction(
        |i| i.kind_name() == "command",
        move |_ctx: InteractionContext| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        },
    );

    let outcome = core
        .dispatch(interaction(json!({
            "kind": "command",
            "name": "explode",
            "id": fresh_id(),
        })))
        .await;

    assert_eq!(outcome.invoked, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(listener_ran.load(Ordering::SeqCst), 1);
    // Nobody acknowledged, so the generic failure reply went out once.
    assert_eq!(sink.sent_count(), 1);
}

#[tokio::test]
async fn unmatched_component_id_is_dropped() {
    init_tracing();
    let sink = Arc::new(RecordingSink::new());
    let core = Core::builder().sink(sink.clone()).build().unwrap();

    let outcome = core
        .dispatch(interaction(json!({
            "kind": "button",
            "custom_id": "nobody:owns:btn:this",
            "id": fresh_id(),
        })))
        .await;

    assert_eq!(outcome.invoked, 0);
    assert_eq!(sink.sent_count(), 0);
}

#[tokio::test]
async fn scoped_extras_survive_routing_with_escaped_separators() {
    init_tracing();
    let core = Core::builder().build().unwrap();

    // A value containing the separator: "AB:12" is stored as "AB_12".
    let custom_id = ScopedId::encode("shop", "buy", "btn", "confirm", &[("sku", "AB:12")]);
    assert_eq!(custom_id, "shop:buy:btn:confirm:sku=AB_12");

    let seen = Arc::new(Mutex::new(None));
    let sink_seen = Arc::clone(&seen);
    let _unreg = core
        .module("shop")
        .register_button(custom_id.clone(), move |ctx: InteractionContext| {
            let seen = Arc::clone(&sink_seen);
            async move {
                let decoded = ScopedId::decode(ctx.interaction().routing_key());
                *seen.lock().unwrap() = decoded.extra("sku").map(str::to_owned);
                Ok(())
            }
        });

    core.dispatch(interaction(json!({
        "kind": "button",
        "custom_id": custom_id,
        "id": fresh_id(),
    })))
    .await;

    assert_eq!(seen.lock().unwrap().as_deref(), Some("AB_12"));
}

#[tokio::test]
async fn interactions_on_one_message_share_a_session() {
    init_tracing();
    let core = Core::builder().build().unwrap();
    let module = core.module("wizard");

    let _first = module.register_button("wizard:setup:btn:next", |ctx: InteractionContext| async move {
        ctx.session().set("step", 2).await;
        Ok(())
    });
    let read = Arc::new(Mutex::new(None));
    let read_in_handler = Arc::clone(&read);
    let _second = module.register_button("wizard:setup:btn:back", move |ctx: InteractionContext| {
        let read = Arc::clone(&read_in_handler);
        async move {
            *read.lock().unwrap() = ctx.session().get("step").await;
            Ok(())
        }
    });

    core.dispatch(interaction(json!({
        "kind": "button",
        "custom_id": "wizard:setup:btn:next",
        "id": fresh_id(),
        "message_id": "msg-77",
    })))
    .await;
    core.dispatch(interaction(json!({
        "kind": "button",
        "custom_id": "wizard:setup:btn:back",
        "id": fresh_id(),
        "message_id": "msg-77",
    })))
    .await;

    assert_eq!(*read.lock().unwrap(), Some(json!(2)));
}

#[tokio::test]
async fn autocomplete_routes_by_command_name() {
    init_tracing();
    let core = Core::builder().build().unwrap();
    let partials = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&partials);
    core.module("search").on_autocomplete("search", move |ctx: InteractionContext| {
        let sink = Arc::clone(&sink);
        async move {
            if let Interaction::Autocomplete { partial, .. } = ctx.interaction() {
                sink.lock().unwrap().push(partial.clone());
            }
            Ok(())
        }
    });

    let outcome = core
        .dispatch(interaction(json!({
            "kind": "autocomplete",
            "command": "search",
            "focused": "query",
            "partial": "ru",
            "id": fresh_id(),
        })))
        .await;

    assert_eq!(outcome.invoked, 1);
    assert_eq!(partials.lock().unwrap().as_slice(), ["ru"]);
}
