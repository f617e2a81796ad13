//! Shared utilities for integration testing: mock backends and on-disk
//! mutual-TLS material.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType,
    ExtendedKeyUsagePurpose, Ia5String, IsCa, KeyPair, SanType,
};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use middleman::config::{ListenerConfig, ObservabilityConfig, TlsConfig, UpstreamConfig};
use middleman::http::{Forwarder, GatewayServer};
use middleman::net::{self, Listener};
use middleman::routing::RouteTable;
use middleman::security;

/// Start a mock backend on an ephemeral port that answers every request
/// with a fixed 200 response.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_backend(move |socket| respond_after(socket, body, Duration::ZERO)).await
}

/// Like [`start_mock_backend`], but sleeps before answering so timeout
/// behavior can be exercised.
pub async fn start_slow_backend(body: &'static str, delay: Duration) -> SocketAddr {
    start_backend(move |socket| respond_after(socket, body, delay)).await
}

/// Start a backend that echoes the received request line back as the
/// response body, for asserting what actually reached it.
pub async fn start_echo_backend() -> SocketAddr {
    start_backend(echo_request_line).await
}

async fn start_backend<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(TcpStream) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(handler(socket));
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn respond_after(mut socket: TcpStream, body: &'static str, delay: Duration) {
    let _ = read_request_head(&mut socket).await;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn echo_request_line(mut socket: TcpStream) {
    let head = read_request_head(&mut socket).await;
    let request_line = head.lines().next().unwrap_or("").to_string();

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        request_line.len(),
        request_line
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];

    loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                data.extend_from_slice(&buf[..n]);
                if data.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }

    String::from_utf8_lossy(&data).into_owned()
}

/// On-disk mutual-TLS material for one test gateway: a CA, a server
/// pair valid for localhost, and a client pair signed by the same CA.
pub struct TlsFixture {
    // Removing the tempdir removes the material, so it rides along.
    _dir: TempDir,
    pub ca_pem: String,
    pub server_cert_path: PathBuf,
    pub server_key_path: PathBuf,
    pub client_ca_dir: PathBuf,
    pub client_identity_pem: String,
}

pub fn tls_fixture() -> TlsFixture {
    let dir = TempDir::new().unwrap();

    let ca_key = KeyPair::generate().unwrap();
    let mut ca_params = CertificateParams::default();
    ca_params.distinguished_name = common_name("middleman test CA");
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let ca_cert = ca_params.self_signed(&ca_key).unwrap();

    let server_key = KeyPair::generate().unwrap();
    let mut server_params = CertificateParams::default();
    server_params.distinguished_name = common_name("localhost");
    server_params.subject_alt_names = vec![
        SanType::DnsName(Ia5String::try_from("localhost").unwrap()),
        SanType::IpAddress("127.0.0.1".parse().unwrap()),
    ];
    server_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    let server_cert = issue(server_params, &server_key, &ca_cert, &ca_key);

    let client_key = KeyPair::generate().unwrap();
    let mut client_params = CertificateParams::default();
    client_params.distinguished_name = common_name("test client");
    client_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];
    let client_cert = issue(client_params, &client_key, &ca_cert, &ca_key);

    let server_cert_path = dir.path().join("server.crt");
    let server_key_path = dir.path().join("server.key");
    std::fs::write(&server_cert_path, server_cert.pem()).unwrap();
    std::fs::write(&server_key_path, server_key.serialize_pem()).unwrap();

    let client_ca_dir = dir.path().join("client-cas");
    std::fs::create_dir(&client_ca_dir).unwrap();
    std::fs::write(client_ca_dir.join("ca.crt"), ca_cert.pem()).unwrap();

    let client_identity_pem = format!("{}{}", client_cert.pem(), client_key.serialize_pem());

    TlsFixture {
        _dir: dir,
        ca_pem: ca_cert.pem(),
        server_cert_path,
        server_key_path,
        client_ca_dir,
        client_identity_pem,
    }
}

fn common_name(cn: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    dn
}

fn issue(
    params: CertificateParams,
    key: &KeyPair,
    ca_cert: &Certificate,
    ca_key: &KeyPair,
) -> Certificate {
    params.signed_by(key, ca_cert, ca_key).unwrap()
}

/// Boot a full gateway on an ephemeral port, proxying to `backend`.
/// Returns the bound address once the listener is accepting.
pub async fn start_gateway(
    fixture: &TlsFixture,
    backend: SocketAddr,
    verbs: &[&str],
    timeout_secs: u64,
) -> SocketAddr {
    let tls_config = TlsConfig {
        cert_path: fixture.server_cert_path.clone(),
        key_path: fixture.server_key_path.clone(),
        client_ca_dir: fixture.client_ca_dir.clone(),
    };

    let roots = security::load_trust_store(&tls_config.client_ca_dir).unwrap();
    let tls = net::build_server_config(&tls_config, roots).unwrap();

    let verbs: Vec<String> = verbs.iter().map(|v| v.to_string()).collect();
    let routes = RouteTable::from_allowed_verbs(&verbs).unwrap();

    let forwarder = Forwarder::new(&UpstreamConfig {
        base_address: format!("http://{backend}"),
        timeout_secs,
    })
    .unwrap();

    let listener = Listener::bind(&ListenerConfig {
        bind_address: "127.0.0.1:0".to_string(),
        max_connections: 16,
    })
    .await
    .unwrap();
    let addr = listener.local_addr().unwrap();

    let observability = ObservabilityConfig {
        verbose_tls_logging: true,
        metrics_address: None,
    };
    let server = GatewayServer::new(tls, routes, forwarder, &observability);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    addr
}
