//! Ambient tag context E2E: scopes on one thread, hand-off to threads and
//! tokio tasks, and recording that reads labels from the current context.

use openconsensus::metrics::Value;
use openconsensus::prelude::*;
use openconsensus::tags::ScopeError;
use std::error::Error;
use std::sync::Arc;

fn tags(pairs: &[(&str, &str)]) -> Result<TagContext, Box<dyn Error>> {
    let mut builder = TagContextBuilder::new();
    for (key, value) in pairs {
        builder = builder.put(TagKey::new(key)?, TagValue::new(value)?);
    }
    Ok(builder.build())
}

#[test]
fn nested_scopes_restore_in_lifo_order() -> Result<(), Box<dyn Error>> {
    let outer = tags(&[("tenant", "acme")])?;
    let inner = TagContextBuilder::from_context(&outer)
        .put(TagKey::new("route")?, TagValue::new("/checkout")?)
        .build();

    assert!(current().is_empty());
    let outer_scope = with_tag_context(outer.clone());
    {
        let inner_scope = with_tag_context(inner.clone());
        assert_eq!(current(), inner);
        assert_eq!(current().len(), 2);
        inner_scope.close()?;
    }
    assert_eq!(current(), outer);
    outer_scope.close()?;
    assert!(current().is_empty());
    Ok(())
}

#[test]
fn closing_an_outer_scope_first_is_reported() -> Result<(), Box<dyn Error>> {
    let outer = with_tag_context(tags(&[("a", "1")])?);
    let inner = with_tag_context(tags(&[("b", "2")])?);

    assert_eq!(
        outer.close(),
        Err(ScopeError::ClosedOutOfOrder { abandoned: 1 })
    );
    assert!(current().is_empty());
    assert_eq!(inner.close(), Err(ScopeError::AlreadyDiscarded));
    Ok(())
}

#[test]
fn wrapped_work_on_another_thread_sees_the_captured_context() -> Result<(), Box<dyn Error>> {
    let request = tags(&[("request_id", "r-42")])?;
    let handle = scoped(request.clone(), || std::thread::spawn(wrap(current)));
    let seen = handle.join().map_err(|_| "worker panicked")?;
    assert_eq!(seen, request);
    Ok(())
}

#[tokio::test]
async fn tasks_keep_their_context_across_await_points() -> Result<(), Box<dyn Error>> {
    let registry = MetricRegistry::builder()
        .resource(Resource::empty())
        .clock(Arc::new(ZeroTimeClock::new()))
        .build();
    let tenant = LabelKey::parse("tenant")?;
    let calls = registry
        .counter_long_builder("calls")?
        .label_keys([tenant.clone()])
        .build()?;

    let mut handles = Vec::new();
    for name in ["acme", "globex", "acme"] {
        let calls = calls.clone();
        let keys = [tenant.clone()];
        let task = async move {
            tokio::task::yield_now().await;
            let labels = LabelValue::from_tag_context(&current(), &keys);
            calls.get_or_create_time_series(&labels)?.add(1);
            tokio::task::yield_now().await;
            Ok::<TagContext, MetricError>(current())
        };
        let context = tags(&[("tenant", name)])?;
        handles.push(tokio::spawn(task.with_tag_context(context)));
    }
    for handle in handles {
        let seen = handle.await??;
        assert_eq!(seen.len(), 1);
    }
    assert!(current().is_empty());

    let metrics = registry.metrics();
    let metric = metrics.first().ok_or("no metrics")?;
    let acme = metric
        .series(&[LabelValue::new("acme")])
        .ok_or("acme series missing")?;
    assert_eq!(acme.point.value, Value::Long(2));
    assert_eq!(calls.time_series_count(), 2);
    Ok(())
}
