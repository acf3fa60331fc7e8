//! One query, end to end: geocode, registry lookup, merge, render.
//!
//! Steps run strictly in sequence. Per-query failures never become errors
//! here; they end up as a [`QueryState`] that the caller prints. Only
//! building the HTTP clients and writing the output files can fail with a
//! [`PipelineError`].

use std::future::Future;
use std::path::{Path, PathBuf};

use georisk_cli_utils::{MultiProgress, StepSpinner};
use georisk_geocoder::service_registry::{GeocodingService, nominatim_service};
use georisk_geocoder::{GeocodeError, GeocodeOutcome};
use georisk_georisques::RiskQueryOutcome;
use georisk_georisques::endpoint::{RegistryEndpoint, georisques_endpoint};
use georisk_merge::MergeReport;
use georisk_reference::ReferenceTable;
use georisk_render::{RenderError, RenderedFiles, RiskMap, RiskTable};
use georisk_risk_models::{Coordinate, Query, RiskCategory, RiskRecord, SearchRadius};
use thiserror::Error;

/// Errors from setting up or finishing a query.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The geocoder HTTP client could not be built.
    #[error("Geocoder client: {0}")]
    Geocoder(#[from] GeocodeError),

    /// The hazard registry HTTP client could not be built.
    #[error("Hazard registry client: {0}")]
    RegistryClient(#[source] reqwest::Error),

    /// Writing the map files failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The two remote collaborators of a query.
pub trait QueryBackend: Send + Sync {
    /// Resolves a free-text address.
    fn geocode(&self, address: &str) -> impl Future<Output = GeocodeOutcome> + Send;

    /// Fetches hazard declarations within `radius` of `coordinate`.
    fn risks(
        &self,
        coordinate: Coordinate,
        radius: SearchRadius,
        category: RiskCategory,
    ) -> impl Future<Output = RiskQueryOutcome> + Send;
}

/// [`QueryBackend`] talking to Nominatim and GeoRisques over HTTP.
pub struct HttpBackend {
    geocoder_client: reqwest::Client,
    geocoder: GeocodingService,
    registry_client: reqwest::Client,
    registry: RegistryEndpoint,
}

impl HttpBackend {
    /// Builds the backend from the embedded service configs and their env
    /// overrides. The geocoder client carries the service timeout; the
    /// registry client has none.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Geocoder`] or
    /// [`PipelineError::RegistryClient`] naming the client that could not be
    /// built.
    pub fn from_env() -> Result<Self, PipelineError> {
        let geocoder = nominatim_service();
        let geocoder_client = georisk_geocoder::build_client(&geocoder)?;
        let registry_client = reqwest::Client::builder()
            .build()
            .map_err(PipelineError::RegistryClient)?;

        Ok(Self {
            geocoder_client,
            geocoder,
            registry_client,
            registry: georisques_endpoint(),
        })
    }
}

impl QueryBackend for HttpBackend {
    async fn geocode(&self, address: &str) -> GeocodeOutcome {
        georisk_geocoder::geocode_address(&self.geocoder_client, &self.geocoder, address).await
    }

    async fn risks(
        &self,
        coordinate: Coordinate,
        radius: SearchRadius,
        category: RiskCategory,
    ) -> RiskQueryOutcome {
        georisk_georisques::get_risks(
            &self.registry_client,
            &self.registry,
            coordinate,
            radius,
            category,
        )
        .await
    }
}

/// Everything a query needs besides its own parameters.
pub struct QueryContext<'a, B> {
    /// Geocoder and registry.
    pub backend: B,
    /// Commune reference table for the merge.
    pub table: &'a ReferenceTable,
    /// Where the map files are written.
    pub output_dir: PathBuf,
    /// Spinner host shared with the logger.
    pub multi: MultiProgress,
}

/// A query that produced records.
#[derive(Debug)]
pub struct RenderedQuery {
    /// Geocoded address.
    pub location: Coordinate,
    /// Query point and located declarations.
    pub map: RiskMap,
    /// Every declaration, sorted by end date.
    pub table: RiskTable,
    /// Merge result, including unmatched communes.
    pub report: MergeReport,
    /// Files written for the map.
    pub files: RenderedFiles,
}

/// What the user sees after a query.
#[derive(Debug)]
pub enum QueryState {
    /// Nothing asked yet.
    NoQuery,
    /// The address could not be turned into a coordinate.
    GeocodeFailed(GeocodeOutcome),
    /// Geocoded, but the registry gave nothing back. `note` is set when
    /// that was because the request failed.
    NoResults {
        /// Geocoded address.
        location: Coordinate,
        /// Why the registry query failed, if it did.
        note: Option<String>,
    },
    /// Map and table are ready.
    Rendered(Box<RenderedQuery>),
}

/// Runs one query.
///
/// # Errors
///
/// Returns [`PipelineError::Render`] if the output files cannot be written.
pub async fn run_query<B: QueryBackend>(
    ctx: &QueryContext<'_, B>,
    query: &Query,
) -> Result<QueryState, PipelineError> {
    let spinner = StepSpinner::start(&ctx.multi, &format!("Geocoding {:?}...", query.address));
    let outcome = ctx.backend.geocode(&query.address).await;
    let Some(location) = outcome.coordinate() else {
        spinner.finish_and_clear();
        return Ok(QueryState::GeocodeFailed(outcome));
    };

    spinner.set_message(&format!(
        "Fetching {} declarations within {}...",
        query.category.label(),
        query.radius
    ));
    let outcome = ctx
        .backend
        .risks(location, query.radius, query.category)
        .await;
    let note = outcome.failure_note();
    let records = outcome.into_records();
    spinner.finish_and_clear();

    if records.is_empty() {
        return Ok(QueryState::NoResults { location, note });
    }

    let rendered = assemble(location, records, ctx.table, &ctx.output_dir)?;
    Ok(QueryState::Rendered(Box::new(rendered)))
}

/// Merges `records` with the reference table and writes the map.
///
/// # Errors
///
/// Returns [`PipelineError::Render`] if the output files cannot be written.
pub fn assemble(
    location: Coordinate,
    records: Vec<RiskRecord>,
    table: &ReferenceTable,
    output_dir: &Path,
) -> Result<RenderedQuery, PipelineError> {
    let report = georisk_merge::merge(records, table);
    let map = RiskMap::build(location, &report.records);
    let risk_table = RiskTable::build(&report.records);
    let files = georisk_render::write_outputs(&map, output_dir)?;

    Ok(RenderedQuery {
        location,
        map,
        table: risk_table,
        report,
        files,
    })
}

/// Prints a query state to stdout.
pub fn print_state(state: &QueryState) {
    match state {
        QueryState::NoQuery => {}
        QueryState::GeocodeFailed(GeocodeOutcome::ServiceUnavailable { .. }) => {
            println!(
                "Geocoding service is currently unavailable or too slow. Please try again later."
            );
        }
        QueryState::GeocodeFailed(_) => {
            println!("Couldn't geocode the address. Please try again.");
        }
        QueryState::NoResults { location, note } => {
            println!("Found location: {location}");
            match note {
                Some(note) => println!("No historical risk data found for this area ({note})."),
                None => println!("No historical risk data found for this area."),
            }
        }
        QueryState::Rendered(rendered) => {
            println!("Found location: {}", rendered.location);
            println!();
            print!("{}", rendered.table.render_text());
            println!();

            let unmatched = rendered.report.unmatched_count();
            if unmatched > 0 {
                println!(
                    "{unmatched} of {} declaration(s) have no known commune position and are not on the map",
                    rendered.table.len()
                );
            }
            println!(
                "{} marker(s) written to {}",
                rendered.map.risk_markers().count(),
                rendered.files.html.display()
            );
            println!("GeoJSON: {}", rendered.files.geojson.display());
        }
    }
}
