use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(AssessmentId);

/// Classification of a business metric against its industry reference.
///
/// The service may introduce new tiers; anything outside the known three is
/// kept verbatim in `Other` so it survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BenchmarkStatus {
    Good,
    Ok,
    Risk,
    Other(String),
}

impl BenchmarkStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Good => "good",
            Self::Ok => "ok",
            Self::Risk => "risk",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for BenchmarkStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "good" => Self::Good,
            "ok" => Self::Ok,
            "risk" => Self::Risk,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for BenchmarkStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<BenchmarkStatus> for String {
    fn from(value: BenchmarkStatus) -> Self {
        match value {
            BenchmarkStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetric {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub business_value: Option<f64>,
    #[serde(default)]
    pub benchmark_value: Option<f64>,
    pub status: BenchmarkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub overall_score: f64,
    pub risk_level: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Vec<Metric>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub narrative: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub benchmarks: Vec<BenchmarkMetric>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One analyzed submission. `created_at` stays in the server's textual form;
/// it is only parsed when rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<AssessmentResult>,
}
