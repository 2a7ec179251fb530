//! Discovery against fake fixtures on the loopback interface

use ambilight_control::{DiscoveryConfig, DiscoveryPhase, DiscoveryService};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::Instant;

const QUERY: &str = r#"{"method":"getSystemConfig","params":{}}"#;

fn config(port: u16) -> DiscoveryConfig {
    DiscoveryConfig {
        retries: 2,
        wait_between: Duration::from_millis(100),
        timeout: Duration::from_millis(400),
        port,
        broadcast: Some(Ipv4Addr::LOCALHOST),
    }
}

/// Answers every query with `replies`, after `delay`; forwards the
/// querier's address to `relay` if given
async fn spawn_fixture(
    replies: Vec<&'static str>,
    delay: Duration,
    relay: Option<mpsc::UnboundedSender<SocketAddr>>,
) -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        loop {
            let Ok((n, from)) = socket.recv_from(&mut buf).await else {
                return;
            };
            assert_eq!(&buf[..n], QUERY.as_bytes());
            if let Some(relay) = &relay {
                let _ = relay.send(from);
            }
            tokio::time::sleep(delay).await;
            for reply in &replies {
                let _ = socket.send_to(reply.as_bytes(), from).await;
            }
        }
    });
    port
}

#[tokio::test]
async fn finds_fixture_and_keeps_first_valid_reply() {
    let port = spawn_fixture(
        vec![
            "definitely not json",
            r#"{"method":"getSystemConfig","result":{"moduleName":"ESP01_SHRGB1C_31","mac":"a8bb50000001"}}"#,
            r#"{"method":"getSystemConfig","result":{"moduleName":"renamed"}}"#,
        ],
        Duration::ZERO,
        None,
    )
    .await;

    let mut service = DiscoveryService::new(config(port));
    let devices = service.run().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].name, "ESP01_SHRGB1C_31");
    assert_eq!(devices[0].ip.to_string(), "127.0.0.1");
    assert_eq!(service.phase(), DiscoveryPhase::Done);
}

#[tokio::test]
async fn name_falls_back_to_mac() {
    let port = spawn_fixture(
        vec![r#"{"result":{"mac":"a8bb50000002"}}"#],
        Duration::ZERO,
        None,
    )
    .await;

    let devices = DiscoveryService::new(config(port)).run().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].name, "a8bb50000002");
}

#[tokio::test]
async fn late_reply_is_collected_after_broadcasts() {
    // Replies land after both broadcasts but before the timeout
    let port = spawn_fixture(
        vec![r#"{"result":{"moduleName":"slowpoke"}}"#],
        Duration::from_millis(250),
        None,
    )
    .await;

    let devices = DiscoveryService::new(config(port)).run().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].name, "slowpoke");
}

#[tokio::test]
async fn separate_addresses_are_separate_devices() {
    let (tx, mut rx) = mpsc::unbounded_channel::<SocketAddr>();
    let port = spawn_fixture(
        vec![r#"{"result":{"moduleName":"lamp-a"}}"#],
        Duration::ZERO,
        Some(tx),
    )
    .await;

    // Second fixture on another loopback address answers the same querier
    let other = UdpSocket::bind("127.0.0.2:0").await.unwrap();
    tokio::spawn(async move {
        while let Some(querier) = rx.recv().await {
            let _ = other
                .send_to(br#"{"result":{"moduleName":"lamp-b"}}"#, querier)
                .await;
        }
    });

    let devices = DiscoveryService::new(config(port)).run().await.unwrap();
    let mut names: Vec<_> = devices.iter().map(|d| d.name.as_str()).collect();
    names.sort();
    assert_eq!(names, ["lamp-a", "lamp-b"]);
}

#[tokio::test]
async fn silent_network_returns_empty_after_timeout() {
    // Bound but never answers
    let mute = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = mute.local_addr().unwrap().port();

    let started = Instant::now();
    let devices = DiscoveryService::new(config(port)).run().await.unwrap();
    let elapsed = started.elapsed();

    assert!(devices.is_empty());
    assert!(elapsed >= Duration::from_millis(350), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
    drop(mute);
}
