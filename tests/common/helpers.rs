// Test helper functions

use haystack::core::config::Config;
use haystack::core::services::Services;
use haystack::net::Server;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A corpus file on disk that tests can mutate between queries
pub struct TestCorpus {
    file: tempfile::NamedTempFile,
}

#[allow(dead_code)] // Used across integration test binaries
impl TestCorpus {
    pub fn new(lines: &[&str]) -> Self {
        let mut file = tempfile::NamedTempFile::new().expect("failed to create corpus file");
        for line in lines {
            writeln!(file, "{line}").expect("failed to write corpus line");
        }
        file.flush().expect("failed to flush corpus file");
        Self { file }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn append_line(&mut self, line: &str) {
        writeln!(self.file, "{line}").expect("failed to append corpus line");
        self.file.flush().expect("failed to flush corpus file");
    }

    pub fn rewrite(&mut self, lines: &[&str]) {
        let mut contents = String::new();
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }
        std::fs::write(self.file.path(), contents).expect("failed to rewrite corpus file");
    }
}

/// Default test configuration pointing at the given corpus
#[allow(dead_code)]
pub fn test_config(corpus: &Path, reread_on_query: bool) -> Config {
    let mut config = Config::default();
    config.corpus.txt_file = corpus.to_path_buf();
    config.corpus.reread_on_query = reread_on_query;
    config
}

/// Bind an ephemeral port and serve the given configuration.
///
/// Returns the bound address; the server task runs until the test
/// process exits.
#[allow(dead_code)]
pub async fn spawn_server(config: Config) -> SocketAddr {
    let services = Services::new(config).await.expect("services failed");
    let server = Server::new(services).expect("server construction failed");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral bind failed");
    let addr = listener.local_addr().expect("local_addr failed");

    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    addr
}

/// Send raw bytes, half-close, and read the full response
#[allow(dead_code)]
pub async fn query_raw(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect failed");
    stream.write_all(request).await.expect("write failed");
    stream.shutdown().await.expect("half-close failed");

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read failed");
    String::from_utf8(response).expect("response is not UTF-8")
}

/// Send one newline-terminated query and read the verdict line
#[allow(dead_code)]
pub async fn query_line(addr: SocketAddr, query: &str) -> String {
    query_raw(addr, format!("{query}\n").as_bytes()).await
}

/// Self-signed certificate and key written to disk for TLS tests
#[allow(dead_code)]
pub struct TestCert {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub cert_pem: String,
    _dir: tempfile::TempDir,
}

#[allow(dead_code)]
pub fn test_cert() -> TestCert {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .expect("certificate generation failed");

    let dir = tempfile::tempdir().expect("tempdir failed");
    let cert_path = dir.path().join("server.pem");
    let key_path = dir.path().join("server.key");

    let cert_pem = cert.cert.pem();
    std::fs::write(&cert_path, &cert_pem).expect("failed to write certificate");
    std::fs::write(&key_path, cert.key_pair.serialize_pem()).expect("failed to write key");

    TestCert {
        cert_path,
        key_path,
        cert_pem,
        _dir: dir,
    }
}
