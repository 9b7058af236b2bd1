#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use s3_hec_forwarder::storage::{ObjectStore, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory store that remembers every key it was asked for.
#[derive(Default)]
pub struct StaticObjectStore {
    objects: HashMap<(String, String), Bytes>,
    requests: Mutex<Vec<(String, String)>>,
}

impl StaticObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, bucket: &str, key: &str, content: &'static [u8]) -> Self {
        self.objects.insert(
            (bucket.to_string(), key.to_string()),
            Bytes::from_static(content),
        );
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requested_keys(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, key)| key.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for StaticObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        self.requests
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));

        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

/// Self-signed certificate and its PKCS#8 key, both PEM.
pub struct TestIdentity {
    pub cert_pem: String,
    pub key_pem: String,
    pub cert_der: Vec<u8>,
}

pub fn test_identity() -> TestIdentity {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    TestIdentity {
        cert_pem: certified.cert.pem(),
        key_pem: certified.key_pair.serialize_pem(),
        cert_der: certified.cert.der().to_vec(),
    }
}
