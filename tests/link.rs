//! Integration tests for link establishment over loopback TCP.

use std::{net::SocketAddr, time::Duration};

use misra_pingpong::{
    config::NodeConfig,
    error::MisraError,
    link::{self, RetryPolicy},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpListener,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn bind_loopback() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let address = listener.local_addr().unwrap();
    (listener, address)
}

/// Returns a loopback address nobody is listening on.
async fn closed_address() -> SocketAddr {
    let (listener, address) = bind_loopback().await;
    drop(listener);
    address
}

fn fast_retry(max_attempts: Option<u32>) -> RetryPolicy {
    RetryPolicy {
        initial_delay_ms: 5,
        max_delay_ms: 20,
        max_attempts,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Both peers end up with one accepted and one dialed stream, and tokens flow both ways.
#[tokio::test]
async fn peers_establish_a_bidirectional_link() {
    let (listener_a, address_a) = bind_loopback().await;
    let (listener_b, address_b) = bind_loopback().await;
    let retry = fast_retry(None);
    let (address_a, address_b) = (address_a.to_string(), address_b.to_string());

    let (a, b) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::try_join!(
            link::establish(listener_a, &address_b, &retry),
            link::establish(listener_b, &address_a, &retry),
        )
    })
    .await
    .expect("link establishment timed out")
    .expect("link establishment failed");

    let (mut a_out, mut b_out) = (a.outbound, b.outbound);
    a_out.write_all(b"1\n").await.unwrap();
    b_out.write_all(b"-1\n").await.unwrap();

    let mut line = String::new();
    BufReader::new(b.inbound).read_line(&mut line).await.unwrap();
    assert_eq!(line, "1\n");

    line.clear();
    BufReader::new(a.inbound).read_line(&mut line).await.unwrap();
    assert_eq!(line, "-1\n");
}

/// Listening on a port accepts one connection from the peer.
#[tokio::test]
async fn listen_accepts_the_peer_on_a_port() {
    let port = closed_address().await.port();

    let listening = tokio::spawn(link::listen(port));
    let dialed = tokio::time::timeout(
        Duration::from_secs(5),
        link::connect(&format!("127.0.0.1:{port}"), &fast_retry(None)),
    )
    .await
    .expect("connect timed out")
    .expect("connect failed");

    let accepted = listening.await.unwrap().expect("listen failed");
    assert_eq!(accepted.peer_addr().unwrap(), dialed.local_addr().unwrap());
    assert_eq!(accepted.local_addr().unwrap().port(), port);
}

/// Dialing keeps going until the peer starts listening.
#[tokio::test]
async fn connect_waits_for_a_late_peer() {
    let address = closed_address().await;

    let late_peer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let listener = TcpListener::bind(address).await.expect("rebind");
        link::listen_on(listener).await
    });

    let stream = tokio::time::timeout(
        Duration::from_secs(5),
        link::connect(&address.to_string(), &fast_retry(None)),
    )
    .await
    .expect("connect timed out")
    .expect("connect failed");

    let accepted = late_peer.await.unwrap().expect("accept failed");
    assert_eq!(stream.peer_addr().unwrap(), accepted.local_addr().unwrap());
}

/// A bounded retry budget gives up with the number of attempts made.
#[tokio::test]
async fn connect_gives_up_after_the_budget() {
    let address = closed_address().await.to_string();

    let e = link::connect(&address, &fast_retry(Some(3))).await.unwrap_err();

    match e {
        MisraError::Connect {
            address: failed,
            attempts,
            ..
        } => {
            assert_eq!(failed, address);
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// A port that is already taken makes the node fail before dialing.
#[tokio::test]
async fn busy_port_is_a_bind_error() {
    let taken = TcpListener::bind("0.0.0.0:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let mut config = NodeConfig::new(port, String::from("127.0.0.1:1"));
    config.retry = fast_retry(Some(1));

    let e = misra_pingpong::run(config).await.unwrap_err();
    assert!(matches!(e, MisraError::Bind { port: p, .. } if p == port));
}

/// Configuration mistakes are reported before anything touches the network.
#[tokio::test]
async fn invalid_config_is_rejected() {
    let mut config = NodeConfig::new(0, String::from("127.0.0.1:1"));
    config.loss_probability = 1.5;

    assert!(matches!(
        misra_pingpong::run(config).await,
        Err(MisraError::InvalidProbability(_))
    ));
}
