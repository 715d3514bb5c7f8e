//! One-shot query client.
//!
//! Connects, sends a single newline-terminated query, reads the
//! verdict line, and disconnects: the client side of the protocol
//! fixed in [`crate::net::protocol`]. Used by the `haystack` CLI and
//! handy in integration tests.

use crate::core::error::{HaystackError, Result};
use crate::core::types::Verdict;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName};
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

/// How the client should treat the server certificate
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Plaintext TCP
    Off,
    /// TLS, trusting the given PEM CA bundle
    CaFile(PathBuf),
    /// TLS without certificate verification (testing only)
    Insecure,
}

/// Client connection parameters
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
}

/// Send one query and return the server's verdict.
pub async fn query(options: &ClientOptions, query: &str) -> Result<Verdict> {
    let addr = format!("{}:{}", options.host, options.port);
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(HaystackError::Transport)?;

    match &options.tls {
        TlsMode::Off => exchange(stream, query).await,
        tls_mode => {
            let connector = build_connector(tls_mode)?;
            let server_name = ServerName::try_from(options.host.clone())
                .map_err(|e| HaystackError::Tls(format!("invalid server name: {e}")))?;
            let stream = connector
                .connect(server_name, stream)
                .await
                .map_err(|e| HaystackError::Tls(format!("handshake failed: {e}")))?;
            exchange(stream, query).await
        }
    }
}

/// Write the framed query, read the whole response, parse the verdict.
async fn exchange<S>(mut stream: S, query: &str) -> Result<Verdict>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(query.as_bytes()).await?;
    stream.write_all(b"\n").await?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await?;

    match response.trim_end() {
        "STRING EXISTS" => Ok(Verdict::Found),
        "STRING NOT FOUND" => Ok(Verdict::NotFound),
        other => Err(HaystackError::Session(format!(
            "unexpected response: {other:?}"
        ))),
    }
}

fn build_connector(mode: &TlsMode) -> Result<TlsConnector> {
    let config = match mode {
        TlsMode::Off => {
            return Err(HaystackError::Tls(
                "connector requested without TLS".to_string(),
            ))
        }
        TlsMode::CaFile(path) => {
            let mut roots = RootCertStore::empty();
            for cert in load_ca_certs(path)? {
                roots
                    .add(cert)
                    .map_err(|e| HaystackError::Tls(format!("bad CA certificate: {e}")))?;
            }
            ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth()
        }
        TlsMode::Insecure => ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(danger::NoVerification::new()))
            .with_no_client_auth(),
    };

    Ok(TlsConnector::from(Arc::new(config)))
}

fn load_ca_certs(path: &std::path::Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = std::fs::File::open(path)
        .map_err(|e| HaystackError::Tls(format!("cannot read CA file {}: {e}", path.display())))?;
    let mut reader = std::io::BufReader::new(file);

    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut reader)
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| HaystackError::Tls(format!("malformed CA file {}: {e}", path.display())))?;

    if certs.is_empty() {
        return Err(HaystackError::Tls(format!(
            "no certificates found in {}",
            path.display()
        )));
    }

    Ok(certs)
}

/// Certificate verifier that accepts anything. Lets `--insecure`
/// talk to servers running on self-signed certificates.
mod danger {
    use tokio_rustls::rustls;
    use tokio_rustls::rustls::client::danger::{
        HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
    };
    use tokio_rustls::rustls::crypto::CryptoProvider;
    use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};

    #[derive(Debug)]
    pub struct NoVerification {
        provider: CryptoProvider,
    }

    impl NoVerification {
        pub fn new() -> Self {
            Self {
                provider: rustls::crypto::aws_lc_rs::default_provider(),
            }
        }
    }

    impl ServerCertVerifier for NoVerification {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &rustls::DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            rustls::crypto::verify_tls12_signature(
                message,
                cert,
                dss,
                &self.provider.signature_verification_algorithms,
            )
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &rustls::DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            rustls::crypto::verify_tls13_signature(
                message,
                cert,
                dss,
                &self.provider.signature_verification_algorithms,
            )
        }

        fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
            self.provider
                .signature_verification_algorithms
                .supported_schemes()
        }
    }
}
