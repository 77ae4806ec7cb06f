use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

use super::{parse_count, RecordSource};
use crate::config::StoreConfig;
use crate::error::{DashboardError, Result};
use crate::record::{
    MeetingRecord, DATE_TIME, ID, LISTENER_COUNT, MEETING_COUNT, PARTICIPANT_COUNT, VIDEO_COUNT,
    VOICE_PARTICIPANT_COUNT,
};

type Item = HashMap<String, AttributeValue>;

#[derive(Clone)]
pub struct DynamoRecordSource {
    client: Client,
    table: String,
}

impl DynamoRecordSource {
    pub async fn new(config: StoreConfig) -> Result<Self> {
        if config.table.is_empty() {
            return Err(DashboardError::Config("table name cannot be empty".into()));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "static",
        );
        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&shared_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            table: config.table,
        })
    }
}

#[async_trait]
impl RecordSource for DynamoRecordSource {
    async fn scan_all(&self) -> Result<Vec<MeetingRecord>> {
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;
        let mut pages = 0usize;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|err| DashboardError::Store(DisplayErrorContext(&err).to_string()))?;
            pages += 1;

            let items = output.items.unwrap_or_default();
            debug!(page = pages, items = items.len(), "scanned page");
            records.extend(items.iter().map(record_from_item));

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        info!(table = %self.table, pages, count = records.len(), "scanned meeting records");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("dynamodb table {}", self.table)
    }
}

fn text(item: &Item, key: &str) -> Option<String> {
    match item.get(key) {
        Some(AttributeValue::S(value)) | Some(AttributeValue::N(value)) => Some(value.clone()),
        _ => None,
    }
}

fn count(item: &Item, key: &str) -> Option<i64> {
    match item.get(key) {
        Some(AttributeValue::N(value)) | Some(AttributeValue::S(value)) => parse_count(value),
        _ => None,
    }
}

pub fn record_from_item(item: &Item) -> MeetingRecord {
    MeetingRecord {
        id: text(item, ID),
        date_time: text(item, DATE_TIME),
        meeting_count: count(item, MEETING_COUNT),
        listener_count: count(item, LISTENER_COUNT),
        participant_count: count(item, PARTICIPANT_COUNT),
        video_count: count(item, VIDEO_COUNT),
        voice_participant_count: count(item, VOICE_PARTICIPANT_COUNT),
    }
}
