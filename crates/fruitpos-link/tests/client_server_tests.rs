//! Integration tests pairing LinkClient and LinkServer over an in-memory
//! link, with a Vec standing in for the slave's store.
//!
//! Run with: cargo test --package fruitpos-link --test client_server_tests

use fruitpos_core::{Product, ValidationError};
use fruitpos_hardware::mock::MockLink;
use fruitpos_link::{LinkClient, LinkConfig, LinkError, LinkServer, Received};
use fruitpos_protocol::CommandCode;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;

/// What the fake slave did, for assertions.
#[derive(Debug, PartialEq)]
enum Served {
    Shown(Product),
    Message(String),
    Cleared,
}

fn spawn_slave(
    link: MockLink,
    mut products: Vec<Product>,
) -> mpsc::UnboundedReceiver<Served> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut server = LinkServer::new(link, LinkConfig::default());

    tokio::spawn(async move {
        while let Ok(request) = server.next_request().await {
            let Some(command) = request else { continue };
            let result = match command {
                CommandCode::ProductCount => server.send_count(products.len() as u8).await,
                CommandCode::SendProduct => match server.read_index().await {
                    Ok(index) => {
                        let product = products
                            .get(usize::from(index))
                            .copied()
                            .unwrap_or_else(Product::zeroed);
                        server.send_product(&product).await.map(|_| ())
                    }
                    Err(err) => Err(err),
                },
                CommandCode::ReceiveProduct => server
                    .receive_product(|_| Ok::<(), Infallible>(()))
                    .await
                    .map(|received| {
                        if let Received::Accepted(product) = received {
                            let _ = tx.send(Served::Shown(product));
                        }
                    }),
                CommandCode::SaveProduct => {
                    let stored = products.clone();
                    match server
                        .receive_product(|candidate| {
                            match stored.iter().find(|p| p.conflicts_with(candidate)) {
                                Some(_) => Err(ValidationError::DuplicateSku {
                                    sku: candidate.sku.to_string(),
                                }),
                                None => Ok(()),
                            }
                        })
                        .await
                    {
                        Ok(Received::Accepted(product)) => {
                            products.push(product);
                            Ok(())
                        }
                        Ok(Received::Rejected { .. }) => Ok(()),
                        Err(err) => Err(err),
                    }
                }
                CommandCode::PrintMessage => server.read_message().await.map(|text| {
                    let _ = tx.send(Served::Message(text));
                }),
                CommandCode::ClearScreen => {
                    let _ = tx.send(Served::Cleared);
                    Ok(())
                }
            };
            if result.is_err() {
                break;
            }
        }
    });

    rx
}

fn catalog() -> Vec<Product> {
    vec![
        Product::new("000000", "APPLE", 38).unwrap(),
        Product::new("000001", "ORANGE", 19).unwrap(),
    ]
}

fn client(link: MockLink) -> LinkClient<MockLink> {
    LinkClient::new(link, LinkConfig::default().with_timeout(Duration::from_secs(5)))
}

#[tokio::test]
async fn test_count_and_fetch() {
    let (master, slave) = MockLink::pair();
    let _served = spawn_slave(slave, catalog());
    let mut client = client(master);

    assert_eq!(client.product_count().await.unwrap(), 2);
    assert_eq!(client.fetch_product(1).await.unwrap(), catalog()[1]);
}

#[tokio::test]
async fn test_fetch_past_end_rejected() {
    let (master, slave) = MockLink::pair();
    let _served = spawn_slave(slave, catalog());
    let mut client = client(master);

    let err = client.fetch_product(9).await.unwrap_err();
    assert!(matches!(
        err,
        LinkError::Rejected {
            command: CommandCode::SendProduct
        }
    ));

    // The link is still in step afterwards.
    assert_eq!(client.product_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_save_grows_store() {
    let (master, slave) = MockLink::pair();
    let _served = spawn_slave(slave, catalog());
    let mut client = client(master);

    let kiwi = Product::new("000002", "KIWI", 70).unwrap();
    assert!(client.save_product(&kiwi).await.unwrap());
    assert_eq!(client.product_count().await.unwrap(), 3);
    assert_eq!(client.fetch_product(2).await.unwrap(), kiwi);
}

#[tokio::test]
async fn test_duplicate_save_rejected() {
    let (master, slave) = MockLink::pair();
    let _served = spawn_slave(slave, catalog());
    let mut client = client(master);

    let clash = Product::new("000001", "PEAR", 10).unwrap();
    assert!(!client.save_product(&clash).await.unwrap());
    assert_eq!(client.product_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_display_requests() {
    let (master, slave) = MockLink::pair();
    let mut served = spawn_slave(slave, catalog());
    let mut client = client(master);

    let apple = catalog()[0];
    assert!(client.show_product(&apple).await.unwrap());
    client.print_message("Come Back Soon").await.unwrap();
    client.clear_screen().await.unwrap();

    assert_eq!(served.recv().await.unwrap(), Served::Shown(apple));
    assert_eq!(
        served.recv().await.unwrap(),
        Served::Message("Come Back Soon".to_string())
    );
    assert_eq!(served.recv().await.unwrap(), Served::Cleared);
}

#[tokio::test(start_paused = true)]
async fn test_silent_slave_times_out() {
    let (master, _slave) = MockLink::pair();
    let mut client = LinkClient::new(
        master,
        LinkConfig::default().with_timeout(Duration::from_millis(200)),
    );

    let err = client.product_count().await.unwrap_err();
    assert!(err.is_timeout());
}
