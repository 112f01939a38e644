use futures::stream::{self, StreamExt};
use tracing::warn;

use super::Progress;
use crate::models::{EnrichedRecord, GeoPoint};
use crate::places::{ApiPlace, PlacesApi, RetryPolicy};

/// Overlay a details response onto a search-time record.
///
/// Every field prefers the details value; a field the details response
/// lacks (or leaves blank) keeps its search-time value.
pub fn merge_details(mut record: EnrichedRecord, details: ApiPlace) -> EnrichedRecord {
    record.name = prefer(details.display_text().map(String::from), record.name);
    record.resource_name = prefer(details.name, record.resource_name);
    record.formatted_address = prefer(details.formatted_address, record.formatted_address);
    record.location = details.location.map(GeoPoint::from).or(record.location);
    if !details.types.is_empty() {
        record.types = details.types;
    }
    record.google_maps_uri = prefer(details.google_maps_uri, record.google_maps_uri);
    record.website = prefer(details.website_uri, record.website);
    record.phone_national = prefer(details.national_phone_number, record.phone_national);
    record.phone_international =
        prefer(details.international_phone_number, record.phone_international);
    record.enriched = true;
    record
}

fn prefer(details: Option<String>, current: Option<String>) -> Option<String> {
    details.filter(|v| !v.trim().is_empty()).or(current)
}

/// Enrich every record, at most `concurrency` details calls in flight.
///
/// Output order matches input order. A record whose details call fails is
/// kept with its search-time fields; the second value counts such failures.
pub(crate) async fn enrich_records<A, P>(
    api: &A,
    records: Vec<EnrichedRecord>,
    language: &str,
    concurrency: usize,
    retry: &RetryPolicy,
    progress: &P,
) -> (Vec<EnrichedRecord>, usize)
where
    A: PlacesApi + ?Sized,
    P: Progress + ?Sized,
{
    let results: Vec<(EnrichedRecord, bool)> = stream::iter(records)
        .map(move |record| async move {
            let context = format!("details '{}'", record.place_id);
            let place_id = record.place_id.clone();
            let id = place_id.as_str();
            let outcome = retry
                .run(&context, move || api.place_details(id, language))
                .await;
            progress.record_enriched();
            match outcome {
                Ok(details) => (merge_details(record, details), true),
                Err(err) => {
                    warn!("Skipping enrichment: {}", err);
                    (record, false)
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let failures = results.iter().filter(|(_, ok)| !ok).count();
    (results.into_iter().map(|(record, _)| record).collect(), failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::harvest::testing::{place, ScriptedPlaces};
    use crate::models::Provenance;
    use crate::places::LatLng;

    fn record(id: &str, address: Option<&str>) -> EnrichedRecord {
        let mut hit = place(id).into_raw_hit(Provenance {
            keyword: "cafe".into(),
            included_type: None,
        });
        hit.formatted_address = address.map(String::from);
        hit.types = vec!["cafe".into()];
        EnrichedRecord::from_hit(id.to_string(), hit)
    }

    #[test]
    fn test_missing_details_field_keeps_search_value() {
        let merged = merge_details(record("p1", Some("A")), ApiPlace::default());
        assert_eq!(merged.formatted_address.as_deref(), Some("A"));
        assert_eq!(merged.name.as_deref(), Some("Place p1"));
        assert_eq!(merged.types, vec!["cafe"]);
        assert!(merged.enriched);
    }

    #[test]
    fn test_details_field_wins() {
        let details = ApiPlace {
            formatted_address: Some("B".into()),
            website_uri: Some("https://example.com".into()),
            national_phone_number: Some("02 123 4567".into()),
            international_phone_number: Some("+66 2 123 4567".into()),
            location: Some(LatLng {
                latitude: 13.7,
                longitude: 100.5,
            }),
            types: vec!["cafe".into(), "restaurant".into()],
            ..Default::default()
        };
        let merged = merge_details(record("p1", Some("A")), details);
        assert_eq!(merged.formatted_address.as_deref(), Some("B"));
        assert_eq!(merged.website.as_deref(), Some("https://example.com"));
        assert_eq!(merged.phone_national.as_deref(), Some("02 123 4567"));
        assert_eq!(merged.phone_international.as_deref(), Some("+66 2 123 4567"));
        assert_eq!(merged.location, Some(GeoPoint::new(13.7, 100.5)));
        assert_eq!(merged.types, vec!["cafe", "restaurant"]);
    }

    #[test]
    fn test_blank_details_value_does_not_erase() {
        let details = ApiPlace {
            formatted_address: Some("  ".into()),
            ..Default::default()
        };
        let merged = merge_details(record("p1", Some("A")), details);
        assert_eq!(merged.formatted_address.as_deref(), Some("A"));
    }

    #[test]
    fn test_absent_everywhere_stays_empty() {
        let merged = merge_details(record("p1", None), ApiPlace::default());
        assert_eq!(merged.formatted_address, None);
        assert_eq!(merged.website, None);
    }

    #[tokio::test]
    async fn test_failed_enrichment_keeps_record() {
        let api = ScriptedPlaces::new();
        api.push_details(
            "p1",
            Err(ApiError::Status {
                operation: "placeDetails",
                status: 404,
                body: "not found".into(),
            }),
        );
        api.push_details(
            "p2",
            Ok(ApiPlace {
                website_uri: Some("https://p2.example".into()),
                ..Default::default()
            }),
        );

        let (records, failures) = enrich_records(
            &api,
            vec![record("p1", Some("A")), record("p2", Some("B"))],
            "th",
            1,
            &RetryPolicy::immediate(3),
            &(),
        )
        .await;

        assert_eq!(failures, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].place_id, "p1");
        assert!(!records[0].enriched);
        assert_eq!(records[0].formatted_address.as_deref(), Some("A"));
        assert_eq!(records[1].website.as_deref(), Some("https://p2.example"));
        assert!(records[1].enriched);
    }

    #[tokio::test]
    async fn test_concurrent_enrichment_preserves_order() {
        let api = ScriptedPlaces::new();
        let ids = ["a", "b", "c", "d", "e"];
        let records = ids.iter().map(|id| record(id, None)).collect();

        let (records, failures) = enrich_records(
            &api,
            records,
            "en",
            3,
            &RetryPolicy::immediate(1),
            &(),
        )
        .await;

        assert_eq!(failures, 0);
        let order: Vec<&str> = records.iter().map(|r| r.place_id.as_str()).collect();
        assert_eq!(order, ids);

        let mut requested = api.details_requests();
        requested.sort();
        assert_eq!(requested, ids);
    }
}
