//! One-shot run: assemble providers from config, resolve, publish.
//!
//! Every path through `execute` ends in a `Resolution`; configuration and
//! setup faults become critical resolutions instead of crashes.

use std::sync::Arc;

use lf_protocol::Resolution;
use lf_providers::{
    CloudVisionOcr, DriveImageSource, HttpClient, OllamaCorrector, OllamaVisionNamer,
    PlantNetLookup, PrefetchedLookup, SpeciesLookup,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{non_blank, AppConfig, RunInputs};
use crate::error::ConfigError;
use crate::resolver::{Providers, ResolveRequest, TieredResolver};
use crate::sink::{build_sink, ResultSink, SinkOutcome};

/// Wire the live HTTP providers. A pre-fetched lookup result replaces the
/// live species lookup.
pub fn build_providers(config: &AppConfig, http: &HttpClient, inputs: &RunInputs) -> Providers {
    let species: Arc<dyn SpeciesLookup> = match &inputs.prefetched_lookup {
        Some(payload) => {
            tracing::info!("using pre-fetched species lookup result");
            Arc::new(PrefetchedLookup::new(payload.clone()))
        }
        None => Arc::new(PlantNetLookup::new(http.clone(), config.species.clone())),
    };

    Providers {
        images: Arc::new(DriveImageSource::new(http.clone(), config.drive.clone())),
        ocr: Arc::new(CloudVisionOcr::new(http.clone(), config.ocr.clone())),
        corrector: Arc::new(OllamaCorrector::new(http.clone(), config.corrector.clone())),
        species,
        vision: Arc::new(OllamaVisionNamer::new(http.clone(), config.vision.clone())),
    }
}

/// Resolve one image and publish the outcome.
pub async fn run(
    resolver: &TieredResolver,
    sink: &dyn ResultSink,
    inputs: &RunInputs,
) -> Resolution {
    let run_id = Uuid::now_v7();
    let span = tracing::info_span!("run", %run_id, image_id = %inputs.image_id);

    async {
        tracing::info!(
            image_name = inputs.image_name.as_deref().unwrap_or(""),
            row_id = inputs.row_id.as_deref().unwrap_or(""),
            "identification started"
        );
        let request = ResolveRequest {
            image_id: &inputs.image_id,
            image_name: inputs.image_name.as_deref(),
        };
        let resolution = resolver.resolve(&request).await;
        publish(sink, inputs.row_id.as_deref(), &inputs.image_id, &resolution).await;
        resolution
    }
    .instrument(span)
    .await
}

/// Hand the resolution to the sink. Publishing problems are logged only.
pub async fn publish(
    sink: &dyn ResultSink,
    row_id: Option<&str>,
    image_id: &str,
    resolution: &Resolution,
) {
    let record = resolution.to_record(image_id);
    match sink.publish(row_id, &record).await {
        Ok(SinkOutcome::Written) => {
            tracing::info!(sink = sink.sink_name(), "resolution published");
        }
        Ok(SinkOutcome::Skipped(reason)) => {
            tracing::warn!(sink = sink.sink_name(), reason = %reason, "resolution not published");
        }
        Err(e) => {
            tracing::error!(sink = sink.sink_name(), error = %e, "failed to publish resolution");
        }
    }
}

/// Full process flow: load config, read run inputs, resolve, publish.
///
/// `config_path` is optional; `lookup` supplies environment-style keys.
pub async fn execute<F>(config_path: Option<&str>, lookup: F) -> Resolution
where
    F: Fn(&str) -> Option<String>,
{
    // Without a config there is no known destination, so nothing is published.
    let config = match AppConfig::load(config_path) {
        Ok(config) => config.apply_env(&lookup),
        Err(e) => {
            tracing::error!(error = %e, "configuration unusable");
            return Resolution::critical(e);
        }
    };

    let http = match HttpClient::new(config.timeout_secs) {
        Ok(http) => http,
        Err(e) => {
            let fault = ConfigError::Client(e.to_string());
            tracing::error!(error = %fault, "cannot build HTTP client");
            return Resolution::critical(fault);
        }
    };
    let sink = build_sink(&config.sink, &http);

    let inputs = match RunInputs::from_lookup(&lookup) {
        Ok(inputs) => inputs,
        Err(e) => {
            let resolution = Resolution::critical(&e);
            let row_id = non_blank(lookup("ROW_ID"));
            let image_id = non_blank(lookup("IMAGE_ID")).unwrap_or_default();
            publish(sink.as_ref(), row_id.as_deref(), &image_id, &resolution).await;
            return resolution;
        }
    };

    let providers = build_providers(&config, &http, &inputs);
    let resolver = TieredResolver::new(providers, config.hint_mode);
    run(&resolver, sink.as_ref(), &inputs).await
}
