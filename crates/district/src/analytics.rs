use std::{fmt, str::FromStr};

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::{CITY_WIDE_ID, ClientError, display_name};

pub const DEFAULT_ANALYSIS_MONTH: &str = "2025-07-01";

/// First day of the analysed month, as the backend expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisMonth(String);

impl AnalysisMonth {
    /// `2025-07` becomes `2025-07-01`, full dates are kept.
    pub fn new(month: &str) -> Self {
        let month = month.trim();
        if month.split('-').count() == 2 {
            AnalysisMonth(format!("{month}-01"))
        } else {
            AnalysisMonth(month.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AnalysisMonth {
    fn default() -> Self {
        AnalysisMonth(DEFAULT_ANALYSIS_MONTH.to_string())
    }
}

impl fmt::Display for AnalysisMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    City,
    District(String),
}

impl Scope {
    pub fn from_identifier(identifier: &str) -> Self {
        if identifier == CITY_WIDE_ID {
            Scope::City
        } else {
            Scope::District(identifier.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    Integration,
    WeekendDominant,
    NightDemand,
    RushHour,
    LunchTime,
    AreaType,
    Underutilized,
}

impl AnomalyKind {
    fn path_segment(self) -> &'static str {
        match self {
            AnomalyKind::Integration => "integration",
            AnomalyKind::WeekendDominant => "weekend-dominant",
            AnomalyKind::NightDemand => "night-demand",
            AnomalyKind::RushHour => "rush-hour",
            AnomalyKind::LunchTime => "lunch-time",
            AnomalyKind::AreaType => "area-type",
            AnomalyKind::Underutilized => "underutilized",
        }
    }

    pub fn default_top_n(self) -> u32 {
        match self {
            AnomalyKind::Underutilized => 10,
            _ => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrtModel {
    Commuter,
    Tourism,
    Vulnerable,
}

impl DrtModel {
    pub fn as_str(self) -> &'static str {
        match self {
            DrtModel::Commuter => "commuter",
            DrtModel::Tourism => "tourism",
            DrtModel::Vulnerable => "vulnerable",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown DRT model {0}, expected commuter, tourism or vulnerable")]
pub struct ParseModelError(String);

impl FromStr for DrtModel {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commuter" => Ok(DrtModel::Commuter),
            "tourism" => Ok(DrtModel::Tourism),
            "vulnerable" => Ok(DrtModel::Vulnerable),
            other => Err(ParseModelError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Traffic,
    Heatmap,
    AnomalyPattern,
    DrtScore,
}

impl Service {
    fn path(self) -> &'static [&'static str] {
        match self {
            Service::Traffic => &["traffic", "hourly"],
            Service::Heatmap => &["heatmap"],
            Service::AnomalyPattern => &["anomaly-pattern"],
            Service::DrtScore => &["drt-score"],
        }
    }
}

/// Response envelope shared by most analytics endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub timestamp: Option<String>,
    pub execution_time: Option<f64>,
}

/// Requests understood by the analytics backend.
///
/// District-scoped requests take the localized display name, except
/// [`AnalyticsRequest::HourlyTraffic`] which is keyed by identifier and maps
/// it back to the display name itself.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsRequest {
    HourlyTraffic {
        scope: Scope,
        month: AnalysisMonth,
    },
    CityHeatmap {
        month: AnalysisMonth,
        include_station_details: bool,
        min_traffic_threshold: Option<u64>,
    },
    DistrictHeatmap {
        district_name: String,
        month: AnalysisMonth,
        min_traffic_threshold: Option<u64>,
    },
    HeatmapStatistics {
        month: AnalysisMonth,
    },
    AnomalyPattern {
        kind: AnomalyKind,
        district_name: String,
        month: AnalysisMonth,
        top_n: u32,
    },
    DistrictDrtScore {
        district_name: String,
        model: DrtModel,
        month: AnalysisMonth,
    },
    StationDrtDetail {
        station_id: String,
        model: DrtModel,
        month: AnalysisMonth,
        hour: Option<u8>,
    },
    DrtModels,
    Health(Service),
}

impl AnalyticsRequest {
    pub fn anomaly_pattern(kind: AnomalyKind, district_name: &str, month: AnalysisMonth) -> Self {
        AnalyticsRequest::AnomalyPattern {
            kind,
            district_name: district_name.to_string(),
            month,
            top_n: kind.default_top_n(),
        }
    }

    /// Path below the API root, one entry per segment.
    pub fn path_segments(&self) -> Vec<&str> {
        let mut segments = vec!["api", "v1"];
        match self {
            AnalyticsRequest::HourlyTraffic { .. } => segments.extend(["traffic", "hourly"]),
            AnalyticsRequest::CityHeatmap { .. } => segments.extend(["heatmap", "seoul"]),
            AnalyticsRequest::DistrictHeatmap { district_name, .. } => {
                segments.extend(["heatmap", "districts", district_name.as_str()])
            }
            AnalyticsRequest::HeatmapStatistics { .. } => {
                segments.extend(["heatmap", "statistics"])
            }
            AnalyticsRequest::AnomalyPattern { kind, .. } => {
                segments.extend(["anomaly-pattern", kind.path_segment()])
            }
            AnalyticsRequest::DistrictDrtScore { district_name, .. } => {
                segments.extend(["drt-score", "districts", district_name.as_str()])
            }
            AnalyticsRequest::StationDrtDetail { station_id, .. } => {
                segments.extend(["drt-score", "stations", station_id.as_str()])
            }
            AnalyticsRequest::DrtModels => segments.extend(["drt-score", "models"]),
            AnalyticsRequest::Health(service) => {
                segments.extend(service.path());
                segments.push("health");
            }
        }
        segments
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            AnalyticsRequest::HourlyTraffic { scope, month } => {
                let mut query = vec![("analysis_month", month.to_string())];
                match scope {
                    Scope::City => query.push(("region_type", CITY_WIDE_ID.to_string())),
                    Scope::District(identifier) => {
                        let name = display_name(identifier).unwrap_or(identifier.as_str());
                        query.push(("region_type", "district".to_string()));
                        query.push(("district_name", name.to_string()));
                    }
                }
                query
            }
            AnalyticsRequest::CityHeatmap {
                month,
                include_station_details,
                min_traffic_threshold,
            } => {
                let mut query = vec![
                    ("analysis_month", month.to_string()),
                    ("include_station_details", include_station_details.to_string()),
                ];
                if let Some(threshold) = min_traffic_threshold {
                    query.push(("min_traffic_threshold", threshold.to_string()));
                }
                query
            }
            AnalyticsRequest::DistrictHeatmap {
                month,
                min_traffic_threshold,
                ..
            } => {
                let mut query = vec![("analysis_month", month.to_string())];
                if let Some(threshold) = min_traffic_threshold {
                    query.push(("min_traffic_threshold", threshold.to_string()));
                }
                query
            }
            AnalyticsRequest::HeatmapStatistics { month } => {
                vec![("analysis_month", month.to_string())]
            }
            AnalyticsRequest::AnomalyPattern {
                district_name,
                month,
                top_n,
                ..
            } => vec![
                ("district_name", district_name.clone()),
                ("analysis_month", month.to_string()),
                ("top_n", top_n.to_string()),
            ],
            AnalyticsRequest::DistrictDrtScore { model, month, .. } => vec![
                ("model_type", model.as_str().to_string()),
                ("analysis_month", month.to_string()),
            ],
            AnalyticsRequest::StationDrtDetail {
                model, month, hour, ..
            } => {
                let mut query = vec![
                    ("model_type", model.as_str().to_string()),
                    ("analysis_month", month.to_string()),
                ];
                if let Some(hour) = hour {
                    query.push(("hour", hour.to_string()));
                }
                query
            }
            AnalyticsRequest::DrtModels | AnalyticsRequest::Health(_) => Vec::new(),
        }
    }

    /// Full request URL below `base`, with segments and query values encoded.
    pub fn url(&self, base: &Url) -> Result<Url, ClientError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(base.to_string()))?
            .pop_if_empty()
            .extend(self.path_segments());

        let query = self.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}
