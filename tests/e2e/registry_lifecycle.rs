//! Registry lifecycle E2E: declare instruments from several "libraries",
//! record from many threads, and read one deterministic snapshot.

use openconsensus::metrics::{DescriptorType, InstrumentKind, RegisteredInstrument, Value};
use openconsensus::prelude::*;
use std::error::Error;
use std::sync::Arc;
use std::thread;

fn zero_registry(component: &str) -> MetricRegistry {
    MetricRegistry::builder()
        .component(component)
        .resource(Resource::empty())
        .clock(Arc::new(ZeroTimeClock::new()))
        .build()
}

#[test]
fn two_libraries_share_one_registry_without_name_clashes() -> Result<(), Box<dyn Error>> {
    let registry = zero_registry("app");

    // Library A and library B both want a metric called "errors".
    let a_errors = registry.counter_long_builder("http_errors")?.build()?;
    let b_errors = registry.counter_long_builder("db_errors")?.build()?;
    let clash = registry.gauge_long_builder("http_errors")?.build().err();

    assert!(clash.is_some_and(|error| error.is_duplicate_metric_name()));
    assert_eq!(a_errors.descriptor().name().as_str(), "app_http_errors");
    assert_eq!(b_errors.descriptor().name().as_str(), "app_db_errors");
    assert_eq!(registry.len(), 2);

    match registry.get("app_http_errors") {
        Some(RegisteredInstrument::CounterLong(found)) => {
            found.default_time_series().add(3);
            assert_eq!(a_errors.default_time_series().value(), 3);
        },
        other => return Err(format!("unexpected lookup: {other:?}").into()),
    }
    Ok(())
}

#[test]
fn duplicate_error_converts_to_a_stable_envelope() -> Result<(), Box<dyn Error>> {
    let registry = zero_registry("");
    registry.gauge_double_builder("load")?.build()?;

    let envelope = registry
        .counter_double_builder("load")?
        .build()
        .err()
        .map(ErrorEnvelope::from)
        .ok_or("second registration should fail")?;

    assert!(envelope.is_duplicate_metric_name());
    assert_eq!(envelope.metadata.get("name").map(String::as_str), Some("load"));
    assert_eq!(
        envelope.metadata.get("existing_kind").map(String::as_str),
        Some(InstrumentKind::GaugeDouble.as_str())
    );
    Ok(())
}

#[test]
fn many_threads_record_into_one_snapshot() -> Result<(), Box<dyn Error>> {
    let registry = Arc::new(zero_registry("worker"));
    let queue = LabelKey::parse("queue")?;
    let processed = registry
        .counter_double_builder("processed_bytes")?
        .label_keys([queue])
        .constant_labels([(LabelKey::parse("pool")?, LabelValue::new("primary"))])
        .build()?;
    let inflight = registry.gauge_long_builder("inflight")?.build()?;

    thread::scope(|scope| -> Result<(), Box<dyn Error>> {
        let mut workers = Vec::new();
        for worker in 0..4 {
            let processed = processed.clone();
            let inflight = inflight.clone();
            workers.push(scope.spawn(move || -> Result<(), MetricError> {
                let queue = if worker % 2 == 0 { "even" } else { "odd" };
                let point = processed.get_or_create_time_series(&[LabelValue::new(queue)])?;
                let gauge = inflight.default_time_series();
                for _ in 0..1_000 {
                    gauge.add(1);
                    point.add(0.5)?;
                    gauge.add(-1);
                }
                Ok(())
            }));
        }
        for worker in workers {
            worker.join().map_err(|_| "worker panicked")??;
        }
        Ok(())
    })?;

    let metrics = registry.metrics();
    let names: Vec<&str> = metrics
        .iter()
        .map(|metric| metric.descriptor.name().as_str())
        .collect();
    assert_eq!(names, vec!["worker_inflight", "worker_processed_bytes"]);

    let processed_metric = metrics.get(1).ok_or("processed metric missing")?;
    assert_eq!(
        processed_metric.descriptor.descriptor_type(),
        DescriptorType::CumulativeDouble
    );
    let keys: Vec<&str> = processed_metric
        .descriptor
        .label_keys()
        .iter()
        .map(LabelKey::as_str)
        .collect();
    assert_eq!(keys, vec!["queue", "pool"]);

    for queue in ["even", "odd"] {
        let series = processed_metric
            .series(&[LabelValue::new(queue), LabelValue::new("primary")])
            .ok_or("series missing")?;
        assert_eq!(series.point.value, Value::Double(1_000.0));
        assert_eq!(series.start_timestamp, Some(Timestamp::ZERO));
    }

    let inflight_metric = metrics.first().ok_or("inflight metric missing")?;
    let series = inflight_metric
        .time_series
        .first()
        .ok_or("inflight series missing")?;
    assert_eq!(series.point.value, Value::Long(0));
    assert_eq!(series.start_timestamp, None);
    Ok(())
}

#[test]
fn snapshot_json_is_stable_under_the_zero_clock() -> Result<(), Box<dyn Error>> {
    let render = || -> Result<String, Box<dyn Error>> {
        let registry = zero_registry("svc");
        registry
            .gauge_long_builder("connections")?
            .description("open connections")
            .unit("1")
            .build()?
            .default_time_series()
            .set(4);
        Ok(serde_json::to_string(&registry.metrics())?)
    };

    assert_eq!(render()?, render()?);
    Ok(())
}
