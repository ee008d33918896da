use std::sync::OnceLock;

use laoslip_core::InstitutionTag;
use regex::Regex;

/// One entry of the institution signature table.
pub struct Signature {
    pub name: &'static str,
    pub tag: InstitutionTag,
    pattern: Regex,
}

impl Signature {
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

// Priority order is the tie-break: the MoneyGram layout also carries digit runs
// that look like LDB/BCEL references, so its signatures are tried first.
const SIGNATURES: &[(&str, InstitutionTag, &str)] = &[
    ("moneygram-name", InstitutionTag::MoneyGram, r"MoneyGram|ລຸນບູຮວມປຮະ"),
    ("moneygram-completed", InstitutionTag::MoneyGram, r"Transfer Completed"),
    ("moneygram-accounts", InstitutionTag::MoneyGram, r"From account.*To account"),
    ("moneygram-ticket", InstitutionTag::MoneyGram, r"Bill number.*Ticket number"),
    ("moneygram-fee", InstitutionTag::MoneyGram, r"Service fee"),
    ("ldb-ft-ref", InstitutionTag::Ldb, r"FT[0-9]{5}[A-Z0-9]+"),
    ("ldb-fqr-ref", InstitutionTag::Ldb, r"FQR[0-9]{6}[A-Z0-9]+"),
    ("ldb-amount-label", InstitutionTag::Ldb, r"ຈ້ານວນເງິນ"),
    ("ldb-fee-label", InstitutionTag::Ldb, r"ຄາທໍານຽມ"),
    ("ldb-timestamp", InstitutionTag::Ldb, r"[0-9]{4}-[0-9]{2}-[0-9]{2}\s+[0-9]{2}:[0-9]{2}:[0-9]{2}"),
    ("bcel-app", InstitutionTag::Bcel, r"BCEL One|OnePay|TMN Online"),
    ("bcel-masked-account", InstitutionTag::Bcel, r"133-12-xxxxx829"),
    ("bcel-success-time", InstitutionTag::Bcel, r"ສໍາເລັດ.*[0-9]{2}:[0-9]{2}:[0-9]{2}"),
    ("bcel-reference", InstitutionTag::Bcel, r"ເລກອ້າງອີງ.*[A-Z0-9]{12}"),
];

/// The compiled signature table, in priority order.
pub fn signatures() -> &'static [Signature] {
    static TABLE: OnceLock<Vec<Signature>> = OnceLock::new();
    TABLE.get_or_init(|| {
        SIGNATURES
            .iter()
            .map(|&(name, tag, pat)| Signature {
                name,
                tag,
                pattern: Regex::new(&format!("(?i){pat}")).expect("invalid signature regex"),
            })
            .collect()
    })
}

/// Identify the issuing institution. First matching signature wins.
pub fn classify(text: &str) -> InstitutionTag {
    match signatures().iter().find(|s| s.is_match(text)) {
        Some(sig) => {
            tracing::debug!(signature = sig.name, institution = %sig.tag, "institution matched");
            sig.tag
        }
        None => InstitutionTag::Unknown,
    }
}
