// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::{stream, StreamExt};
use groupflux_core::{FluxError, StreamItem};
use groupflux_stream::GroupByExt;
use groupflux_test_utils::orders::{
    order_alice_10, order_alice_30, order_bob_20, order_bob_50, order_carol_40,
};
use groupflux_test_utils::{
    assert_no_element_emitted, assert_stream_ended, test_channel, unwrap_stream, Order,
};

#[tokio::test]
async fn test_group_by_routes_values_to_their_key() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel();
    let mut groups = stream.group_by(|order: &Order| order.customer.clone());

    // Act & Assert
    tx.send(order_alice_10())?;
    let alice = unwrap_stream(&mut groups, 500).await?;
    assert_eq!(alice.key(), "alice");
    let mut alice_orders = alice.subscribe()?;
    assert_eq!(unwrap_stream(&mut alice_orders, 500).await?, order_alice_10());

    tx.send(order_bob_20())?;
    let bob = unwrap_stream(&mut groups, 500).await?;
    assert_eq!(bob.key(), "bob");
    let mut bob_orders = bob.subscribe()?;
    assert_eq!(unwrap_stream(&mut bob_orders, 500).await?, order_bob_20());

    tx.send(order_alice_30())?;
    assert_eq!(unwrap_stream(&mut alice_orders, 500).await?, order_alice_30());

    tx.send(order_bob_50())?;
    assert_eq!(unwrap_stream(&mut bob_orders, 500).await?, order_bob_50());

    Ok(())
}

#[tokio::test]
async fn test_group_by_emits_each_key_once_in_first_seen_order() -> anyhow::Result<()> {
    // Arrange
    let source = stream::iter(
        vec![("a", 1), ("b", 2), ("a", 3), ("b", 4)]
            .into_iter()
            .map(StreamItem::Value),
    );
    let mut groups = source.group_by_with(|(key, _)| *key, |(_, value)| value);

    // Act
    let mut keys = Vec::new();
    let mut consumers = Vec::new();
    while let Some(item) = groups.next().await {
        let group = item.unwrap();
        keys.push(*group.key());
        consumers.push(tokio::spawn(group.to_values()));
    }

    // Assert
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(consumers.remove(0).await??, vec![1, 3]);
    assert_eq!(consumers.remove(0).await??, vec![2, 4]);

    Ok(())
}

#[tokio::test]
async fn test_group_by_with_maps_values() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel();
    let mut groups = stream.group_by_with(
        |order: &Order| order.customer.clone(),
        |order: Order| order.amount,
    );

    // Act
    tx.send(order_alice_10())?;
    let alice = unwrap_stream(&mut groups, 500).await?;
    let mut amounts = alice.subscribe()?;

    // Assert
    assert_eq!(unwrap_stream(&mut amounts, 500).await?, 10);
    tx.send(order_alice_30())?;
    assert_eq!(unwrap_stream(&mut amounts, 500).await?, 30);

    Ok(())
}

#[tokio::test]
async fn test_group_by_second_subscription_fails() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel();
    let mut groups = stream.group_by(|order: &Order| order.customer.clone());
    tx.send(order_carol_40())?;
    let carol = unwrap_stream(&mut groups, 500).await?;

    // Act
    let mut first = carol.subscribe()?;
    let second = carol.subscribe();

    // Assert
    assert!(carol.is_subscribed());
    assert!(matches!(second, Err(FluxError::AlreadySubscribed { .. })));
    assert_eq!(unwrap_stream(&mut first, 500).await?, order_carol_40());

    Ok(())
}

#[tokio::test]
async fn test_group_by_subscription_fails_after_group_ended() -> anyhow::Result<()> {
    // Arrange
    let source = stream::iter(vec![StreamItem::Value(order_alice_10())]);
    let mut groups = source.group_by(|order: &Order| order.customer.clone());
    let alice = unwrap_stream(&mut groups, 500).await?;

    // Act
    let values: Vec<_> = alice.subscribe()?.collect().await;

    // Assert
    assert_eq!(values.len(), 1);
    assert!(alice.subscribe().unwrap_err().is_usage_violation());

    Ok(())
}

#[tokio::test]
async fn test_group_by_completion_ends_groups_and_outer_stream() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel();
    let mut groups = stream.group_by(|order: &Order| order.customer.clone());
    tx.send(order_alice_10())?;
    let alice = unwrap_stream(&mut groups, 500).await?;
    let mut alice_orders = alice.subscribe()?;
    assert_eq!(unwrap_stream(&mut alice_orders, 500).await?, order_alice_10());

    // Act
    drop(tx);

    // Assert
    assert_stream_ended(&mut alice_orders, 500).await;
    assert_stream_ended(&mut groups, 500).await;

    Ok(())
}

#[tokio::test]
async fn test_group_by_slow_group_stalls_new_keys() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel();
    let mut groups = stream.group_by(|order: &Order| order.customer.clone());
    tx.send(order_alice_10())?;
    let alice = unwrap_stream(&mut groups, 500).await?;
    let mut alice_orders = alice.subscribe()?;
    assert_eq!(unwrap_stream(&mut alice_orders, 500).await?, order_alice_10());

    // Act: alice's consumer has not asked for the next value yet
    tx.send(order_alice_30())?;
    tx.send(order_bob_20())?;

    // Assert
    assert_no_element_emitted(&mut groups, 100).await;

    assert_eq!(unwrap_stream(&mut alice_orders, 500).await?, order_alice_30());
    let bob = unwrap_stream(&mut groups, 500).await?;
    assert_eq!(bob.key(), "bob");

    Ok(())
}

#[tokio::test]
async fn test_group_by_empty_source() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel::<Order>();
    let mut groups = stream.group_by(|order: &Order| order.customer.clone());

    // Act
    drop(tx);

    // Assert
    assert_stream_ended(&mut groups, 500).await;

    Ok(())
}
