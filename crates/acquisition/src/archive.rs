//! Upstream archive access.
//!
//! The production implementation reads the public NOAA object store: the
//! `.idx` sidecar is fetched first, the temperature / specific-humidity /
//! geopotential-height records on isobaric levels are selected from it,
//! and each record is pulled with an HTTP Range request and decoded
//! individually. The whole multi-gigabyte product file is never
//! downloaded.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Timelike, Utc};
use futures::stream::{self, TryStreamExt};
use ndarray::Array3;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, info, instrument};
use wx_common::{AcquireError, AcquireResult};

use crate::model::ModelDescriptor;
use crate::product::RawGriddedProduct;

/// Record variables assembled into a raw product, in per-level fetch order.
const WANTED_VARS: [&str; 3] = ["TMP", "SPFH", "HGT"];

/// Concurrent Range requests per product.
const RANGE_CONCURRENCY: usize = 4;

/// A source of raw gridded products.
#[async_trait]
pub trait ArchiveClient: Send + Sync {
    /// Retrieve candidate products for (model, valid time, forecast hour).
    ///
    /// The archive may expose more than one layout for the same request;
    /// the caller probes candidates for a recognized level coordinate.
    async fn retrieve(
        &self,
        model: &ModelDescriptor,
        valid_time: DateTime<Utc>,
        forecast_hour: u32,
    ) -> AcquireResult<Vec<RawGriddedProduct>>;
}

/// Archive client over the public NOAA object store.
pub struct NoaaArchive {
    client: Client,
    base_url: String,
}

impl NoaaArchive {
    pub const DEFAULT_BASE_URL: &'static str = "https://noaa-hrrr-bdp-pds.s3.amazonaws.com";

    pub fn new() -> AcquireResult<Self> {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    /// Use an alternate endpoint (mirrors, local test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> AcquireResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AcquireError::Retrieval(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Object key of the product file for (model, time, forecast hour).
    fn object_key(model: &ModelDescriptor, valid_time: &DateTime<Utc>, forecast_hour: u32) -> String {
        format!(
            "hrrr.{}/{}/hrrr.t{:02}z.wrf{}f{:02}.grib2",
            valid_time.format("%Y%m%d"),
            model.domain,
            valid_time.hour(),
            model.product,
            forecast_hour,
        )
    }

    async fn fetch_index(&self, url: &str) -> AcquireResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::Retrieval(format!("index request failed: {e}")))?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|e| AcquireError::Retrieval(format!("failed to read index body: {e}"))),
            StatusCode::NOT_FOUND => Err(AcquireError::Retrieval(format!(
                "archive has no product at {url}"
            ))),
            status => Err(AcquireError::Retrieval(format!(
                "index request returned {status} for {url}"
            ))),
        }
    }

    async fn fetch_range(&self, url: &str, record: &IdxRecord) -> AcquireResult<Bytes> {
        let range = match record.end {
            Some(end) => format!("bytes={}-{}", record.offset, end - 1),
            None => format!("bytes={}-", record.offset),
        };

        let response = self
            .client
            .get(url)
            .header(header::RANGE, range)
            .send()
            .await
            .map_err(|e| AcquireError::Retrieval(format!("range request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AcquireError::Retrieval(format!(
                "range request returned {} for {url}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| AcquireError::Retrieval(format!("failed to read range body: {e}")))
    }
}

#[async_trait]
impl ArchiveClient for NoaaArchive {
    #[instrument(skip(self, model), fields(model = %model.name, time = %valid_time))]
    async fn retrieve(
        &self,
        model: &ModelDescriptor,
        valid_time: DateTime<Utc>,
        forecast_hour: u32,
    ) -> AcquireResult<Vec<RawGriddedProduct>> {
        let key = Self::object_key(model, &valid_time, forecast_hour);
        let url = format!("{}/{}", self.base_url, key);

        let index = self.fetch_index(&format!("{url}.idx")).await?;
        let records = parse_index(&index);
        let plan = FetchPlan::from_records(&records)?;

        info!(
            levels = plan.levels_hpa.len(),
            records = plan.selected.len(),
            key = %key,
            "Selected isobaric records from archive index"
        );

        let bodies: Vec<Bytes> = stream::iter(
            plan.selected
                .iter()
                .map(|&idx| Ok::<_, AcquireError>(self.fetch_range(&url, &records[idx]))),
        )
        .try_buffered(RANGE_CONCURRENCY)
        .try_collect()
        .await?;

        let (ny, nx) = (model.grid.ny, model.grid.nx);
        let nlev = plan.levels_hpa.len();
        let mut fields: [Vec<f32>; 3] = [
            Vec::with_capacity(nlev * ny * nx),
            Vec::with_capacity(nlev * ny * nx),
            Vec::with_capacity(nlev * ny * nx),
        ];

        for (slot, body) in bodies.iter().enumerate() {
            let values = decode_values(body)?;
            if values.len() != ny * nx {
                return Err(AcquireError::Retrieval(format!(
                    "decoded grid has {} points, expected {}",
                    values.len(),
                    ny * nx
                )));
            }
            fields[slot % WANTED_VARS.len()].extend_from_slice(&values);
        }

        let [t, q, z] = fields;
        let shape = (nlev, ny, nx);
        let temperature = Array3::from_shape_vec(shape, t)
            .map_err(|e| AcquireError::Retrieval(format!("field shape mismatch: {e}")))?;
        let specific_humidity = Array3::from_shape_vec(shape, q)
            .map_err(|e| AcquireError::Retrieval(format!("field shape mismatch: {e}")))?;
        let geopotential_height = Array3::from_shape_vec(shape, z)
            .map_err(|e| AcquireError::Retrieval(format!("field shape mismatch: {e}")))?;

        debug!(ny, nx, nlev, "Assembled raw gridded product");

        let (latitude, longitude) = model.grid.latlon_fields(&model.projection);

        Ok(vec![RawGriddedProduct {
            level_coord: "isobaricInhPa".to_string(),
            levels_hpa: plan.levels_hpa,
            latitude,
            longitude,
            temperature,
            specific_humidity,
            geopotential_height,
        }])
    }
}

/// One line of the `.idx` sidecar.
#[derive(Debug, Clone, PartialEq)]
struct IdxRecord {
    /// Byte offset of the message in the product file
    offset: u64,
    /// Byte offset of the next message (None for the last record)
    end: Option<u64>,
    /// Variable short name, e.g. "TMP"
    var: String,
    /// Level description, e.g. "500 mb"
    level: String,
}

/// Parse an `.idx` sidecar: `n:offset:d=YYYYMMDDHH:VAR:LEVEL:fcst:`.
///
/// Malformed lines are skipped. Each record's end offset is the next
/// record's start.
fn parse_index(text: &str) -> Vec<IdxRecord> {
    let mut records: Vec<IdxRecord> = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 5 {
            continue;
        }
        let Ok(offset) = fields[1].parse::<u64>() else {
            continue;
        };
        records.push(IdxRecord {
            offset,
            end: None,
            var: fields[3].to_string(),
            level: fields[4].to_string(),
        });
    }
    for k in 0..records.len().saturating_sub(1) {
        records[k].end = Some(records[k + 1].offset);
    }
    records
}

/// Pressure in hectopascals for an isobaric level description.
fn isobaric_level_hpa(level: &str) -> Option<f64> {
    level.strip_suffix(" mb")?.trim().parse().ok()
}

/// The records to fetch, grouped so every level has all wanted variables.
struct FetchPlan {
    /// Levels in decreasing pressure (surface first)
    levels_hpa: Vec<f64>,
    /// Record indices, level-major in WANTED_VARS order
    selected: Vec<usize>,
}

impl FetchPlan {
    fn from_records(records: &[IdxRecord]) -> AcquireResult<FetchPlan> {
        // level (rounded hPa) -> var -> record index
        let mut by_level: BTreeMap<i64, BTreeMap<&str, usize>> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            let Some(var) = WANTED_VARS.iter().copied().find(|v| *v == record.var) else {
                continue;
            };
            let Some(hpa) = isobaric_level_hpa(&record.level) else {
                continue;
            };
            by_level
                .entry(hpa.round() as i64)
                .or_default()
                .entry(var)
                .or_insert(idx);
        }

        let mut levels_hpa = Vec::new();
        let mut selected = Vec::new();
        // BTreeMap iterates ascending; reverse for decreasing pressure.
        for (&hpa, vars) in by_level.iter().rev() {
            if vars.len() != WANTED_VARS.len() {
                continue;
            }
            levels_hpa.push(hpa as f64);
            for var in WANTED_VARS {
                selected.push(vars[var]);
            }
        }

        if levels_hpa.is_empty() {
            return Err(AcquireError::Retrieval(
                "archive index has no complete isobaric records".to_string(),
            ));
        }
        Ok(FetchPlan {
            levels_hpa,
            selected,
        })
    }
}

/// Decode the values of a single ranged GRIB2 message.
fn decode_values(data: &[u8]) -> AcquireResult<Vec<f32>> {
    let grib2 = grib::from_reader(Cursor::new(data))
        .map_err(|e| AcquireError::Retrieval(format!("failed to parse GRIB2 message: {e:?}")))?;

    let (_, submessage) = grib2
        .iter()
        .next()
        .ok_or_else(|| AcquireError::Retrieval("GRIB2 range contained no message".to_string()))?;

    let decoder = grib::Grib2SubmessageDecoder::from(submessage)
        .map_err(|e| AcquireError::Retrieval(format!("failed to decode GRIB2 message: {e:?}")))?;
    let values = decoder
        .dispatch()
        .map_err(|e| AcquireError::Retrieval(format!("failed to unpack GRIB2 values: {e:?}")))?;

    Ok(values.collect())
}
