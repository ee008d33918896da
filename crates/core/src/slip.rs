use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::date::SlipDate;
use crate::institution::InstitutionTag;

/// Everything extracted from one slip image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipResult {
    pub amount: Option<Amount>,
    pub date: Option<SlipDate>,
    pub institution: InstitutionTag,
    /// Unmodified OCR output the fields were mined from.
    #[serde(rename = "rawText")]
    pub raw_text: String,
}

impl SlipResult {
    /// True when none of the three structured fields could be extracted.
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.date.is_none() && !self.institution.is_known()
    }
}
