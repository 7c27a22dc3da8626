use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the file writer and the tracer provider alive. Flushes both on drop.
pub struct TracingGuard {
    _file_guard: Option<WorkerGuard>,
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to shut down tracer provider: {e}");
        }
    }
}

/// Install the global subscriber.
///
/// - console: stderr, filtered by `console_level` (`off` keeps the TUI clean)
/// - file: appended to `log_file` when given, filtered by `file_level`
/// - OTLP: exported over gRPC when `otlp_endpoint` is given
pub fn init_tracing(
    service_name: &str,
    otlp_endpoint: Option<&str>,
    console_level: &str,
    log_file: Option<&Path>,
    file_level: &str,
) -> Result<TracingGuard> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console_filter =
        EnvFilter::try_new(console_level).wrap_err("Failed to create console log filter")?;
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed(),
    );

    let file_guard = match log_file {
        Some(path) => {
            let (layer, guard) = file_layer(path, file_level)?;
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    let tracer_provider = match otlp_endpoint {
        Some(endpoint) => {
            let (layer, provider) = otlp_layer(service_name, endpoint)?;
            layers.push(layer);
            Some(provider)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("Failed to install tracing subscriber")?;

    Ok(TracingGuard {
        _file_guard: file_guard,
        tracer_provider,
    })
}

fn file_layer(path: &Path, file_level: &str) -> Result<(BoxedLayer, WorkerGuard)> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("Log file path has no file name: {}", path.display()))?;
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .wrap_err_with(|| format!("Failed to open log file: {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_new(file_level).wrap_err("Failed to create file log filter")?;
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(filter)
        .boxed();

    Ok((layer, guard))
}

fn otlp_layer(service_name: &str, endpoint: &str) -> Result<(BoxedLayer, SdkTracerProvider)> {
    let resource = Resource::builder()
        .with_attributes(vec![KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            service_name.to_string(),
        )])
        .build();

    // OTLP exporter using gRPC (Tonic)
    let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .wrap_err("Failed to create OTLP span exporter")?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(otlp_exporter)
        .with_resource(resource)
        .build();

    opentelemetry::global::set_tracer_provider(tracer_provider.clone());
    let tracer = tracer_provider.tracer("plex-playlist-sync");

    Ok((
        tracing_opentelemetry::layer().with_tracer(tracer).boxed(),
        tracer_provider,
    ))
}
