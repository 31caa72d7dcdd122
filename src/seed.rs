//! In-memory fixture data backing the console.
//!
//! Everything the workspace serves is generated here: the demo job list,
//! per-job SKU field sets, per-field evidence, agent traces, and the
//! validation blockers. No I/O.

use chrono::{Duration, Utc};

use crate::export::Blocker;
use crate::store::{
    AgentMessage, Evidence, FieldName, FieldRecord, FieldStatus, ImageField, Job, JobStatus,
    MessageKind, QcStatus, SkuData, SourceType,
};

/// The demo dashboard: five jobs, one per interesting status,
/// most-recently-created first.
pub fn demo_jobs() -> Vec<Job> {
    let now = Utc::now();

    let job = |id: &str,
               input: &str,
               mpn: &str,
               brand: &str,
               status: JobStatus,
               age_secs: i64,
               cost: f64,
               duration_secs: u64,
               token_usage: u64| {
        let created_at = now - Duration::seconds(age_secs);
        Job {
            id: id.to_string(),
            input: input.to_string(),
            mpn: mpn.to_string(),
            brand: brand.to_string(),
            status,
            created_at,
            updated_at: created_at + Duration::seconds(duration_secs as i64),
            cost,
            duration_secs,
            token_usage,
        }
    };

    vec![
        job(
            "job-001",
            "HP CE285A Black Toner Cartridge Original LaserJet Pro P1102w",
            "CE285A",
            "HP",
            JobStatus::Running,
            120,
            0.23,
            120,
            4500,
        ),
        job(
            "job-002",
            "Brother TN-2420 High Yield Black Toner Cartridge",
            "TN-2420",
            "Brother",
            JobStatus::Completed,
            3_600,
            0.41,
            300,
            8_200,
        ),
        job(
            "job-003",
            "Canon CLI-551 CMYK Multipack Ink Cartridges",
            "CLI-551",
            "Canon",
            JobStatus::NeedsReview,
            7_200,
            0.35,
            200,
            6_800,
        ),
        job(
            "job-004",
            "Epson T1285 DURABrite Ultra Ink Cartridge Set",
            "",
            "Epson",
            JobStatus::Blocked,
            86_400,
            0.12,
            45,
            2_100,
        ),
        job(
            "job-005",
            "Samsung MLT-D111S Black Toner for Xpress M2020/M2070",
            "MLT-D111S",
            "Samsung",
            JobStatus::ReadyToPublish,
            172_800,
            0.48,
            400,
            9_500,
        ),
    ]
}

/// The enriched field set for a job. Extracted identifiers come from
/// the job itself when present; the remaining fields carry the demo
/// extraction results.
pub fn sku_for_job(job: &Job) -> SkuData {
    let mpn = if job.mpn.is_empty() { "CE285A" } else { &job.mpn };
    let brand = if job.brand.is_empty() { "HP" } else { &job.brand };

    SkuData {
        job_id: job.id.clone(),
        mpn: FieldRecord::new(mpn, FieldStatus::Verified, 95),
        brand: FieldRecord::new(brand, FieldStatus::Verified, 98),
        page_yield: FieldRecord::new("1600 pages", FieldStatus::Pending, 72),
        dimensions: FieldRecord::new("12.5 x 3.8 x 5.2 cm", FieldStatus::Conflict, 65),
        weight: FieldRecord::new("0.45 kg", FieldStatus::Pending, 80),
        hero_image: ImageField {
            url: "https://images.example.com/toner/ce285a-hero.jpg".to_string(),
            qc_status: QcStatus::Pending,
        },
    }
}

/// Fixture evidence for one field. Pure in the field name: job identity
/// does not change the result. Image fields have no textual evidence.
pub fn evidence_for(field: FieldName) -> Vec<Evidence> {
    let now = Utc::now();
    let ev = |n: u32,
              value: &str,
              url: &str,
              source_type: SourceType,
              snippet: &str,
              confidence: u8,
              verified: bool,
              age_secs: i64| {
        Evidence::new(
            format!("ev-{field}-{n}"),
            field,
            value,
            url,
            source_type,
            snippet,
            confidence,
            verified,
            now - Duration::seconds(age_secs),
        )
    };

    match field {
        FieldName::Mpn => vec![
            ev(
                1,
                "CE285A",
                "https://hp.example.com/products/ce285a",
                SourceType::Official,
                "HP 85A Black Original LaserJet Toner Cartridge (CE285A)",
                95,
                true,
                3_600,
            ),
            ev(
                2,
                "CE285A",
                "https://marketplace.example.com/dp/B003X7XQRU",
                SourceType::Marketplace,
                "HP CE285A Black Toner Cartridge - Original HP product",
                88,
                false,
                7_200,
            ),
            ev(
                3,
                "CE285AD",
                "https://forum.example.com/printerhelp/thread/12345",
                SourceType::Forum,
                "User confirms CE285AD is the dual pack variant of CE285A",
                45,
                false,
                86_400,
            ),
        ],
        FieldName::Brand => vec![
            ev(
                1,
                "HP",
                "https://hp.example.com/products/ce285a",
                SourceType::Official,
                "Manufactured by HP Inc.",
                98,
                true,
                3_600,
            ),
            ev(
                2,
                "HP",
                "https://marketplace.example.com/dp/B003X7XQRU",
                SourceType::Marketplace,
                "Brand: HP",
                90,
                false,
                7_200,
            ),
            ev(
                3,
                "HP",
                "https://sheets.example.com/ce285a.pdf",
                SourceType::Datasheet,
                "Hewlett-Packard consumables datasheet",
                85,
                false,
                10_800,
            ),
        ],
        FieldName::Yield => vec![
            ev(
                1,
                "1600 pages",
                "https://hp.example.com/products/ce285a/specs",
                SourceType::Official,
                "Approximate cartridge yield: 1,600 standard pages",
                92,
                true,
                3_600,
            ),
            ev(
                2,
                "1600 pages",
                "https://sheets.example.com/ce285a.pdf",
                SourceType::Datasheet,
                "Declared yield value in accordance with ISO/IEC 19752",
                89,
                false,
                10_800,
            ),
            ev(
                3,
                "1500 pages",
                "https://forum.example.com/printerhelp/thread/9980",
                SourceType::Forum,
                "Real-world yield closer to 1500 pages at 5% coverage",
                40,
                false,
                172_800,
            ),
        ],
        FieldName::Dimensions => vec![
            ev(
                1,
                "12.5 x 3.8 x 5.2 cm",
                "https://hp.example.com/products/ce285a/specs",
                SourceType::Official,
                "Package dimensions listed on the official product page",
                92,
                true,
                3_600,
            ),
            ev(
                2,
                "12.8 x 4.0 x 5.5 cm",
                "https://marketplace.example.com/dp/B003X7XQRU",
                SourceType::Marketplace,
                "Dimensions as measured by marketplace listing",
                78,
                false,
                7_200,
            ),
            ev(
                3,
                "12.5 x 3.8 x 5.2 cm",
                "https://sheets.example.com/ce285a.pdf",
                SourceType::Datasheet,
                "Cartridge dimensions per manufacturer datasheet",
                85,
                false,
                10_800,
            ),
        ],
        FieldName::Weight => vec![
            ev(
                1,
                "0.45 kg",
                "https://hp.example.com/products/ce285a/specs",
                SourceType::Official,
                "Net weight 0.45 kg",
                90,
                true,
                3_600,
            ),
            ev(
                2,
                "0.5 kg",
                "https://marketplace.example.com/dp/B003X7XQRU",
                SourceType::Marketplace,
                "Shipping weight approx. 0.5 kg",
                62,
                false,
                7_200,
            ),
            ev(
                3,
                "0.45 kg",
                "https://sheets.example.com/ce285a.pdf",
                SourceType::Datasheet,
                "Unit weight excluding packaging",
                84,
                false,
                10_800,
            ),
        ],
        FieldName::HeroImage => Vec::new(),
    }
}

/// The five-line agent trace for a job. Running jobs present all of it;
/// finished jobs only the first three lines.
pub fn trace_for(job: &Job) -> Vec<AgentMessage> {
    let now = Utc::now();
    let subject = if job.mpn.is_empty() {
        job.input.clone()
    } else {
        format!("{} {}", job.brand, job.mpn)
    };

    let msg = |n: u32, kind: MessageKind, content: String, agent: &str, task: u32, age_secs: i64| {
        AgentMessage::new(
            format!("msg-{}-{n}", job.id),
            kind,
            content,
            now - Duration::seconds(age_secs),
            agent,
            format!("task-{:03}", task),
        )
    };

    vec![
        msg(
            1,
            MessageKind::Plan,
            format!(
                "Starting enrichment pipeline for {subject}. Planned stages: \
                 Spec Extraction, Brand Verification, Image Search, Marketplace Validation."
            ),
            "Orchestrator",
            1,
            115,
        ),
        msg(
            2,
            MessageKind::Activity,
            format!("Searching official product database for {subject} specifications..."),
            "Spec Extractor",
            2,
            100,
        ),
        msg(
            3,
            MessageKind::Result,
            format!(
                "Extracted MPN and brand for {subject} from an official source with 95% confidence."
            ),
            "Spec Extractor",
            2,
            85,
        ),
        msg(
            4,
            MessageKind::Activity,
            "Cross-referencing yield specifications across marketplace and retail listings..."
                .to_string(),
            "Data Validator",
            3,
            70,
        ),
        msg(
            5,
            MessageKind::Decision,
            "Found conflicting dimension values: official page shows \"12.5 x 3.8 x 5.2 cm\" \
             vs marketplace listing \"12.8 x 4.0 x 5.5 cm\". Please select which source to trust."
                .to_string(),
            "Conflict Resolver",
            4,
            55,
        ),
    ]
}

/// Validation blockers open against the demo workspace.
pub fn demo_blockers() -> Vec<Blocker> {
    vec![
        Blocker::new(
            "blk-001",
            Some(FieldName::Yield),
            "Yield could not be confirmed against an official source",
        ),
        Blocker::new(
            "blk-002",
            Some(FieldName::HeroImage),
            "Hero image has not passed quality control",
        ),
    ]
}

/// API calls already spent by the demo session before it starts.
pub const SEED_API_CALLS: u32 = 47;
