//! Count-based report over the operational collections.

use serde::Serialize;

use crate::farm_model::{Animal, HealthRecord, ProductionRecord};

/// Chart labels, in chart order.
pub const SERIES_LABELS: [&str; 3] = ["Animals", "Health", "Production"];

const CARD_TITLES: [&str; 3] = ["Total Animals", "Health Records", "Production Records"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCounts {
    pub animals: usize,
    pub health_records: usize,
    pub production_records: usize,
}

/// One bar (or point) of the report chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub label: &'static str,
    pub value: usize,
}

/// Titled figure shown above the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportCard {
    pub id: String,
    pub title: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub counts: RecordCounts,
    pub series: Vec<SeriesPoint>,
    pub cards: Vec<ReportCard>,
}

/// Flat totals over whole collections. Cheap enough to call on every render.
pub fn summarize(
    animals: &[Animal],
    health_records: &[HealthRecord],
    production_records: &[ProductionRecord],
) -> ReportSummary {
    let counts = RecordCounts {
        animals: animals.len(),
        health_records: health_records.len(),
        production_records: production_records.len(),
    };

    let values = [counts.animals, counts.health_records, counts.production_records];

    let series = SERIES_LABELS
        .into_iter()
        .zip(values)
        .map(|(label, value)| SeriesPoint { label, value })
        .collect();

    let cards = CARD_TITLES
        .into_iter()
        .zip(values)
        .enumerate()
        .map(|(i, (title, value))| ReportCard {
            id: (i + 1).to_string(),
            title,
            value: value.to_string(),
        })
        .collect();

    ReportSummary { counts, series, cards }
}
