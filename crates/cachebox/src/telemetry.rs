// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry integration with OpenTelemetry.
//!
//! When telemetry is attached via the builder, the façade records one event
//! per operation (counter) and its duration (histogram), tagged with the
//! operation name and outcome. Without telemetry the façade records nothing.

use std::{sync::Arc, time::Duration};

use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram, Meter},
};

const CACHE_EVENT_COUNT_NAME: &str = "cache.event.count";
const CACHE_OPERATION_DURATION_NAME: &str = "cache.operation.duration";

#[derive(Debug)]
struct CacheTelemetryInner {
    events: Counter<u64>,
    operation_duration: Histogram<f64>,
}

/// Cache telemetry collector.
///
/// Construct one from an OpenTelemetry meter and pass it to the cache
/// builder via `.telemetry()`:
///
/// ```
/// use cachebox::CacheTelemetry;
///
/// let meter = opentelemetry::global::meter("cachebox");
/// let telemetry = CacheTelemetry::new(&meter);
/// ```
#[derive(Clone, Debug)]
pub struct CacheTelemetry {
    inner: Arc<CacheTelemetryInner>,
}

impl CacheTelemetry {
    /// Creates a new telemetry collector recording on the given meter.
    #[must_use]
    pub fn new(meter: &Meter) -> Self {
        Self {
            inner: Arc::new(CacheTelemetryInner {
                events: meter
                    .u64_counter(CACHE_EVENT_COUNT_NAME)
                    .with_description("Cache events")
                    .with_unit("{event}")
                    .build(),
                operation_duration: meter
                    .f64_histogram(CACHE_OPERATION_DURATION_NAME)
                    .with_description("Cache operation duration")
                    .with_unit("s")
                    .build(),
            }),
        }
    }

    pub(crate) fn record(&self, operation: &'static str, outcome: &'static str, elapsed: Duration) {
        let attributes = [KeyValue::new("operation", operation), KeyValue::new("outcome", outcome)];
        self.inner.events.add(1, &attributes);
        self.inner.operation_duration.record(elapsed.as_secs_f64(), &attributes);
    }
}
