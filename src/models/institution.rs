//! One institution row as emitted in the JSON output.

use super::CidrBlock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An institution and the address space it was granted.
///
/// Field names match the JSON the downstream consumers already read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstitutionRecord {
    #[serde(rename = "Institution")]
    pub institution: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Contact")]
    pub contact: Option<String>,
    #[serde(rename = "IP-Range")]
    pub ip_range: Vec<CidrBlock>,
    #[serde(rename = "Country-Code")]
    pub country_code: Option<String>,
    #[serde(rename = "Institution-uuid")]
    pub institution_uuid: Option<Uuid>,
}

/// Stable identifier for an institution: UUID v3 of its name in the DNS namespace.
pub fn institution_uuid(name: &str) -> Uuid {
    Uuid::new_v3(&Uuid::NAMESPACE_DNS, name.as_bytes())
}
