//! OpenTelemetry exporter setup
//!
//! Traces go through a batch span processor, metrics through a periodic reader,
//! both over OTLP/gRPC to the configured collector. Providers are returned to
//! the caller so they can be flushed and shut down at process exit.

use anyhow::{Context, Result};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    runtime,
    trace::{Sampler, TracerProvider},
    Resource,
};
use std::time::Duration;

const SERVICE_NAME: &str = "taskmaster";
const METRIC_EXPORT_INTERVAL: Duration = Duration::from_secs(15);

fn resource() -> Resource {
    Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)])
}

/// Initialize the tracer provider and install it globally
pub fn init_tracer_provider(endpoint: &str) -> Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("Failed to build OTLP span exporter")?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(resource())
        .build();

    global::set_tracer_provider(provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());

    Ok(provider)
}

/// Initialize the meter provider with a periodic OTLP reader
pub fn init_meter_provider(endpoint: &str) -> Result<SdkMeterProvider> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("Failed to build OTLP metric exporter")?;

    let reader = PeriodicReader::builder(exporter, runtime::Tokio)
        .with_interval(METRIC_EXPORT_INTERVAL)
        .build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource())
        .build();

    global::set_meter_provider(provider.clone());

    Ok(provider)
}

/// Flush and shut down both providers
///
/// Export errors at shutdown are logged, not propagated; telemetry loss must
/// not turn a clean exit into a failure.
pub fn shutdown(tracer_provider: &TracerProvider, meter_provider: &SdkMeterProvider) {
    if let Err(e) = tracer_provider.shutdown() {
        tracing::warn!("Error shutting down tracer provider: {e}");
    }
    if let Err(e) = meter_provider.shutdown() {
        tracing::warn!("Error shutting down meter provider: {e}");
    }
}
