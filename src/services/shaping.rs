//! Canonical record shaping.
//!
//! Flattens either provider response shape into uniform long-form rows.
//! Ordering is not guaranteed here; the store sorts on merge.

use crate::models::PriceRecord;
use crate::services::provider::ProviderResponse;

/// Turn a provider response for `requested` tickers into canonical rows,
/// dropping rows without a price.
///
/// For a single series the one requested symbol is attached to every row.
/// A table response is unpivoted to one row per `(date, ticker)`. An empty
/// response yields an empty vector.
pub fn shape_records(response: ProviderResponse, requested: &[String]) -> Vec<PriceRecord> {
    match response {
        ProviderResponse::SingleSeries(points) => {
            let Some(ticker) = requested.first() else {
                return Vec::new();
            };
            points
                .into_iter()
                .filter_map(|point| {
                    point
                        .adj_close
                        .map(|price| PriceRecord::new(point.date, ticker.clone(), price))
                })
                .collect()
        }
        ProviderResponse::MultiSeries(table) => table
            .into_iter()
            .flat_map(|(ticker, points)| {
                points.into_iter().filter_map(move |point| {
                    point
                        .adj_close
                        .map(|price| PriceRecord::new(point.date, ticker.clone(), price))
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::PricePoint;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_single_series_attaches_requested_ticker() {
        let response = ProviderResponse::SingleSeries(vec![
            PricePoint::new(day(2), Some(10.0)),
            PricePoint::new(day(3), Some(10.5)),
        ]);

        let records = shape_records(response, &["AAPL".to_string()]);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.ticker == "AAPL"));
    }

    #[test]
    fn test_multi_series_unpivots_to_long_form() {
        let mut table = HashMap::new();
        table.insert("AAPL".to_string(), vec![PricePoint::new(day(2), Some(10.0))]);
        table.insert("MSFT".to_string(), vec![PricePoint::new(day(2), Some(20.0))]);
        let response = ProviderResponse::MultiSeries(table);

        let mut records = shape_records(
            response,
            &["AAPL".to_string(), "MSFT".to_string()],
        );
        records.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ticker, "AAPL");
        assert_eq!(records[0].adj_close, 10.0);
        assert_eq!(records[1].ticker, "MSFT");
        assert_eq!(records[1].adj_close, 20.0);
    }

    #[test]
    fn test_rows_without_price_are_dropped() {
        let response = ProviderResponse::SingleSeries(vec![
            PricePoint::new(day(2), Some(10.0)),
            PricePoint::new(day(3), None),
            PricePoint::new(day(4), Some(11.0)),
        ]);

        let records = shape_records(response, &["AAPL".to_string()]);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.date != day(3)));
    }

    #[test]
    fn test_empty_response_yields_empty_sequence() {
        let single = ProviderResponse::SingleSeries(Vec::new());
        assert!(shape_records(single, &["AAPL".to_string()]).is_empty());

        let multi = ProviderResponse::MultiSeries(HashMap::new());
        assert!(shape_records(multi, &["AAPL".to_string()]).is_empty());
    }

    #[test]
    fn test_single_and_one_column_table_shape_identically() {
        let points = vec![
            PricePoint::new(day(2), Some(10.0)),
            PricePoint::new(day(3), None),
            PricePoint::new(day(4), Some(11.0)),
        ];
        let requested = vec!["AAPL".to_string()];

        let from_single =
            shape_records(ProviderResponse::SingleSeries(points.clone()), &requested);

        let mut table = HashMap::new();
        table.insert("AAPL".to_string(), points);
        let from_table = shape_records(ProviderResponse::MultiSeries(table), &requested);

        assert_eq!(from_single, from_table);
    }
}
