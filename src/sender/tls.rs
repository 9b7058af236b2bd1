//! Outbound transport construction, optionally with a TLS client identity.
//!
//! Mutual TLS is enabled only when both a client certificate and a private key
//! are configured. The trust pool starts from the system store and falls back
//! to an empty pool when the system store cannot be loaded. A configured CA
//! bundle is appended best-effort: blocks that do not parse are skipped, never
//! fatal.

use crate::app::config::TlsMaterial;
use reqwest::{Certificate, Client, Identity};
use rustls::RootCertStore;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum TlsError {
    #[error("Invalid client certificate: {0}")]
    InvalidCertificate(String),
    #[error("Invalid client private key: {0}")]
    InvalidPrivateKey(String),
    #[error("Client certificate and private key do not form a key pair: {0}")]
    KeyMismatch(String),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Origin of the roots a trust pool starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustBase {
    SystemStore,
    Empty,
}

#[derive(Debug, Clone)]
pub struct TrustPool {
    base: TrustBase,
    extra_roots: Vec<CertificateDer<'static>>,
}

impl TrustPool {
    pub fn base(&self) -> TrustBase {
        self.base
    }

    /// Roots appended from the configured CA bundle.
    pub fn extra_roots(&self) -> &[CertificateDer<'static>] {
        &self.extra_roots
    }
}

/// Client identity and trust pool the transport was built with.
#[derive(Debug, Clone)]
pub struct MutualTls {
    certificate_chain: Vec<CertificateDer<'static>>,
    trust_pool: TrustPool,
}

impl MutualTls {
    pub fn certificate_chain(&self) -> &[CertificateDer<'static>] {
        &self.certificate_chain
    }

    pub fn trust_pool(&self) -> &TrustPool {
        &self.trust_pool
    }
}

/// HTTP client shared by every record of one invocation.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    mutual_tls: Option<MutualTls>,
}

impl Transport {
    /// Transport without client authentication.
    pub fn plain() -> Result<Self, TlsError> {
        Ok(Self {
            client: Client::builder().build()?,
            mutual_tls: None,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// `None` when no client identity is configured.
    pub fn mutual_tls(&self) -> Option<&MutualTls> {
        self.mutual_tls.as_ref()
    }
}

pub fn build_transport(tls: &TlsMaterial) -> Result<Transport, TlsError> {
    let Some((cert_pem, key_pem)) = tls.client_pair() else {
        if tls.client_cert.is_some() || tls.client_key.is_some() {
            warn!("Only one of client certificate / private key is set; mutual TLS disabled");
        }
        debug!("Building plain HTTP transport");
        return Transport::plain();
    };

    let certificate_chain = parse_certificates(cert_pem)?;
    let private_key = parse_private_key(key_pem)?;
    verify_key_pair(&certificate_chain, private_key)?;

    let extra_roots = tls
        .ca_cert
        .as_deref()
        .filter(|pem| !pem.is_empty())
        .map(parse_roots_lenient)
        .unwrap_or_default();

    let identity_pem = format!("{cert_pem}\n{key_pem}");
    let build_client = |base: TrustBase| -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder()
            .identity(Identity::from_pem(identity_pem.as_bytes())?)
            .tls_built_in_root_certs(base == TrustBase::SystemStore);
        for root in &extra_roots {
            builder = builder.add_root_certificate(Certificate::from_der(root.as_ref())?);
        }
        builder.build()
    };

    let base = system_trust_base();
    let (client, base) = match build_client(base) {
        Ok(client) => (client, base),
        Err(e) if base == TrustBase::SystemStore => {
            warn!("System trust store rejected ({}); falling back to an empty pool", e);
            (build_client(TrustBase::Empty)?, TrustBase::Empty)
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "Mutual TLS enabled: {} client certificate(s), {} extra CA root(s), base {:?}",
        certificate_chain.len(),
        extra_roots.len(),
        base
    );

    Ok(Transport {
        client,
        mutual_tls: Some(MutualTls {
            certificate_chain,
            trust_pool: TrustPool { base, extra_roots },
        }),
    })
}

/// [`TrustBase::SystemStore`] when the platform store yields at least one
/// usable root, [`TrustBase::Empty`] otherwise.
fn system_trust_base() -> TrustBase {
    let loaded = rustls_native_certs::load_native_certs();
    for e in &loaded.errors {
        debug!("System trust store: {}", e);
    }

    let (valid, invalid) = RootCertStore::empty().add_parsable_certificates(loaded.certs);
    if valid == 0 {
        warn!(
            "System trust store has no usable roots ({} invalid, {} load error(s)); using an empty pool",
            invalid,
            loaded.errors.len()
        );
        return TrustBase::Empty;
    }

    debug!("System trust store: {} root(s), {} skipped", valid, invalid);
    TrustBase::SystemStore
}

fn parse_certificates(pem: &str) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs = rustls_pemfile::certs(&mut pem.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::InvalidCertificate(e.to_string()))?;

    if certs.is_empty() {
        return Err(TlsError::InvalidCertificate(
            "no certificate found in PEM data".to_string(),
        ));
    }

    Ok(certs)
}

fn parse_private_key(pem: &str) -> Result<PrivateKeyDer<'static>, TlsError> {
    rustls_pemfile::private_key(&mut pem.as_bytes())
        .map_err(|e| TlsError::InvalidPrivateKey(e.to_string()))?
        .ok_or_else(|| TlsError::InvalidPrivateKey("no private key found in PEM data".to_string()))
}

fn verify_key_pair(
    chain: &[CertificateDer<'static>],
    key: PrivateKeyDer<'static>,
) -> Result<(), TlsError> {
    let provider = rustls::crypto::aws_lc_rs::default_provider();
    let signing_key = provider
        .key_provider
        .load_private_key(key)
        .map_err(|e| TlsError::InvalidPrivateKey(e.to_string()))?;

    match rustls::sign::CertifiedKey::new(chain.to_vec(), signing_key).keys_match() {
        // Unknown: the key type cannot expose its public half, nothing to compare.
        Ok(()) | Err(rustls::Error::InconsistentKeys(rustls::InconsistentKeys::Unknown)) => Ok(()),
        Err(e) => Err(TlsError::KeyMismatch(e.to_string())),
    }
}

/// Every CA block that parses as a usable root; the rest are dropped.
fn parse_roots_lenient(pem: &str) -> Vec<CertificateDer<'static>> {
    let mut probe = RootCertStore::empty();
    let mut skipped = 0usize;

    let roots: Vec<_> = rustls_pemfile::certs(&mut pem.as_bytes())
        .filter_map(|item| match item {
            Ok(der) if probe.add(der.clone()).is_ok() => Some(der),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 || roots.is_empty() {
        warn!(
            "Ignored {} unusable CA certificate block(s); {} root(s) appended",
            skipped,
            roots.len()
        );
    }

    roots
}
