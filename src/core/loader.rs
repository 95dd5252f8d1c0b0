use crate::domain::model::RawTable;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::is_remote_source;
use reqwest::Client;
use std::collections::HashMap;

/// Fetch `source` (http(s) URL or local path) and parse it as a header-first CSV table.
pub async fn load_raw(client: &Client, source: &str) -> Result<RawTable> {
    let text = if is_remote_source(source) {
        tracing::debug!("Fetching dataset from: {}", source);
        let response = client
            .get(source)
            .send()
            .await
            .map_err(|e| EtlError::retrieval(source, e.to_string()))?;

        tracing::debug!("Dataset response status: {}", response.status());
        if !response.status().is_success() {
            return Err(EtlError::retrieval(
                source,
                format!("server responded with {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| EtlError::retrieval(source, e.to_string()))?
    } else {
        tracing::debug!("Reading dataset from file: {}", source);
        tokio::fs::read_to_string(source)
            .await
            .map_err(|e| EtlError::retrieval(source, e.to_string()))?
    };

    let table = parse_raw(source, &text)?;
    tracing::debug!(
        "Parsed {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        source
    );
    Ok(table)
}

/// Parse delimited text. Rows keep source order; duplicate headers get a `.N` suffix.
pub fn parse_raw(source_id: &str, text: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EtlError::retrieval(source_id, format!("malformed header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(EtlError::retrieval(source_id, "no header row"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| EtlError::retrieval(source_id, format!("malformed row: {}", e)))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(dedupe_headers(headers), rows))
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let seen = counts.entry(h.clone()).or_insert(0);
            let name = if *seen == 0 {
                h
            } else {
                format!("{}.{}", h, seen)
            };
            *seen += 1;
            name
        })
        .collect()
}

/// Serialize a table back to CSV text.
pub fn write_table(table: &RawTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| EtlError::ConfigError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_parse_raw_keeps_order() {
        let table = parse_raw("inline", "a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_parse_raw_malformed_is_retrieval_error() {
        let err = parse_raw("inline", "a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, EtlError::RetrievalError { .. }));
    }

    #[test]
    fn test_parse_raw_empty_input() {
        let err = parse_raw("inline", "").unwrap_err();
        assert!(matches!(err, EtlError::RetrievalError { .. }));
    }

    #[test]
    fn test_parse_raw_dedupes_headers() {
        let table = parse_raw("inline", "Change,Language,Change\n+1,C,x\n").unwrap();
        assert_eq!(table.headers, vec!["Change", "Language", "Change.1"]);
    }

    #[test]
    fn test_write_table_quotes_cells() {
        let table = RawTable::new(
            vec!["language".to_string()],
            vec![vec!["(Visual) Basic, classic".to_string()]],
        );
        let csv = write_table(&table).unwrap();
        assert_eq!(csv, "language\n\"(Visual) Basic, classic\"\n");
    }

    #[tokio::test]
    async fn test_load_raw_over_http() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/top.csv");
            then.status(200).body("Sept 2024,Programming Language\n1,Python\n");
        });

        let client = Client::new();
        let table = load_raw(&client, &server.url("/top.csv")).await.unwrap();

        mock.assert();
        assert_eq!(table.len(), 1);
        assert_eq!(table.headers[1], "Programming Language");
    }

    #[tokio::test]
    async fn test_load_raw_http_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.csv");
            then.status(404);
        });

        let client = Client::new();
        let err = load_raw(&client, &server.url("/missing.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::RetrievalError { .. }));
    }

    #[tokio::test]
    async fn test_load_raw_missing_file() {
        let client = Client::new();
        let err = load_raw(&client, "/definitely/not/here.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::RetrievalError { .. }));
    }
}
