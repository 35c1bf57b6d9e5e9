mod analytics;
mod client;

use std::{borrow::Cow, collections::HashMap, sync::LazyLock};

pub use analytics::{
    AnalysisMonth, AnalyticsRequest, AnomalyKind, ApiResponse, DEFAULT_ANALYSIS_MONTH, DrtModel,
    ParseModelError, Scope, Service,
};
pub use client::{AnalyticsClient, ClientError, DEFAULT_API_URL};

/// Identifier reserved for requests covering the whole city.
pub const CITY_WIDE_ID: &str = "seoul";

/// Seoul's 25 autonomous districts as `(display name, identifier)`.
pub const SEOUL_DISTRICTS: [(&str, &str); 25] = [
    ("종로구", "jongno"),
    ("중구", "jung"),
    ("용산구", "yongsan"),
    ("성동구", "seongdong"),
    ("광진구", "gwangjin"),
    ("동대문구", "dongdaemun"),
    ("중랑구", "jungnang"),
    ("성북구", "seongbuk"),
    ("강북구", "gangbuk"),
    ("도봉구", "dobong"),
    ("노원구", "nowon"),
    ("은평구", "eunpyeong"),
    ("서대문구", "seodaemun"),
    ("마포구", "mapo"),
    ("양천구", "yangcheon"),
    ("강서구", "gangseo"),
    ("구로구", "guro"),
    ("금천구", "geumcheon"),
    ("영등포구", "yeongdeungpo"),
    ("동작구", "dongjak"),
    ("관악구", "gwanak"),
    ("서초구", "seocho"),
    ("강남구", "gangnam"),
    ("송파구", "songpa"),
    ("강동구", "gangdong"),
];

static IDS_BY_NAME: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| SEOUL_DISTRICTS.iter().copied().collect());

static NAMES_BY_ID: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    SEOUL_DISTRICTS
        .iter()
        .map(|(name, id)| (*id, *name))
        .collect()
});

/// Converts a district display name into its identifier.
///
/// Unknown names fall back to their lowercased form, so this never fails.
pub fn resolve(display_name: &str) -> Cow<'static, str> {
    match IDS_BY_NAME.get(display_name) {
        Some(id) => Cow::Borrowed(id),
        None => Cow::Owned(display_name.to_lowercase()),
    }
}

pub fn is_known(display_name: &str) -> bool {
    IDS_BY_NAME.contains_key(display_name)
}

/// Reverse of [`resolve`] for the known districts.
pub fn display_name(identifier: &str) -> Option<&'static str> {
    NAMES_BY_ID.get(identifier).copied()
}
