use {
    crate::domain::{
        error::SinkError,
        sink::{RecordRow, RecordSink, SinkFuture},
    },
    reqwest::Url,
};

const API_BASE: &str = "https://api.airtable.com/v0/";

#[derive(Debug, Clone)]
pub struct AirtableSettings {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
}

/// Writes failed-payment rows into an Airtable table.
pub struct AirtableStore {
    client: reqwest::Client,
    api_key: String,
    endpoint: Url,
}

impl AirtableStore {
    pub fn new(client: reqwest::Client, settings: &AirtableSettings) -> Result<Self, SinkError> {
        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            endpoint: table_endpoint(&settings.base_id, &settings.table_name)?,
        })
    }

    async fn write(&self, row: &RecordRow) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request_body(row))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SinkError::Rejected {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

impl RecordSink for AirtableStore {
    fn write_record<'a>(&'a self, row: &'a RecordRow) -> SinkFuture<'a> {
        Box::pin(self.write(row))
    }
}

pub fn table_endpoint(base_id: &str, table_name: &str) -> Result<Url, SinkError> {
    let mut url = Url::parse(API_BASE).map_err(|e| SinkError::Other(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| SinkError::Other("airtable base url cannot hold a path".into()))?
        .pop_if_empty()
        .push(base_id)
        .push(table_name);
    Ok(url)
}

fn request_body(row: &RecordRow) -> serde_json::Value {
    serde_json::json!({
        "records": [{ "fields": row }],
        "typecast": true,
    })
}
