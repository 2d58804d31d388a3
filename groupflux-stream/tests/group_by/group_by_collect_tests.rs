// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::{stream, StreamExt};
use groupflux_core::{FluxError, StreamItem};
use groupflux_stream::{GroupByExt, GroupItem, GroupedStreamsExt};
use groupflux_test_utils::orders::{
    order_alice_10, order_alice_30, order_bob_20, order_bob_50, order_carol_40,
};
use groupflux_test_utils::{unwrap_stream, ErrorInjectingStream, Order};
use std::collections::HashMap;

fn keyed(
    items: Vec<(&'static str, i32)>,
) -> impl futures::Stream<Item = StreamItem<(&'static str, i32)>> + Send + 'static {
    stream::iter(items.into_iter().map(StreamItem::Value))
}

#[tokio::test]
async fn test_to_map_collects_every_group() -> anyhow::Result<()> {
    // Arrange
    let source = keyed(vec![("x", 1), ("y", 2), ("x", 3)]);

    // Act
    let groups = source
        .group_by_with(|(key, _)| *key, |(_, value)| value)
        .to_map()
        .await?;

    // Assert
    assert_eq!(groups.len(), 2);
    assert_eq!(groups["x"], vec![1, 3]);
    assert_eq!(groups["y"], vec![2]);

    Ok(())
}

#[tokio::test]
async fn test_to_map_with_many_interleaved_keys() -> anyhow::Result<()> {
    // Arrange
    let source = stream::iter(
        vec![
            order_alice_10(),
            order_bob_20(),
            order_alice_30(),
            order_carol_40(),
            order_bob_50(),
        ]
        .into_iter()
        .map(StreamItem::Value),
    );

    // Act
    let amounts = source
        .group_by_with(|order: &Order| order.customer.clone(), |order| order.amount)
        .to_map()
        .await?;

    // Assert
    assert_eq!(amounts["alice"], vec![10, 30]);
    assert_eq!(amounts["bob"], vec![20, 50]);
    assert_eq!(amounts["carol"], vec![40]);

    Ok(())
}

#[tokio::test]
async fn test_to_map_into_keeps_unrelated_entries() -> anyhow::Result<()> {
    // Arrange
    let mut destination = HashMap::new();
    destination.insert("z", vec![99]);
    destination.insert("x", vec![0]);
    let source = keyed(vec![("x", 1), ("x", 2)]);

    // Act
    let groups = source
        .group_by_with(|(key, _)| *key, |(_, value)| value)
        .to_map_into(destination)
        .await?;

    // Assert
    assert_eq!(groups["z"], vec![99]);
    assert_eq!(groups["x"], vec![1, 2]);

    Ok(())
}

#[tokio::test]
async fn test_to_map_of_empty_source() -> anyhow::Result<()> {
    // Arrange
    let source = keyed(Vec::new());

    // Act
    let groups = source.group_by(|(key, _)| *key).to_map().await?;

    // Assert
    assert!(groups.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_to_map_propagates_source_error() -> anyhow::Result<()> {
    // Arrange
    let source = ErrorInjectingStream::new(stream::iter(vec![order_alice_10(), order_bob_20()]), 1);

    // Act
    let result = source
        .group_by(|order: &Order| order.customer.clone())
        .to_map()
        .await;

    // Assert
    assert!(matches!(result, Err(FluxError::StreamProcessingError { .. })));

    Ok(())
}

#[tokio::test]
async fn test_to_values_drains_group() -> anyhow::Result<()> {
    // Arrange
    let mut groups = keyed(vec![("k", 1), ("k", 2), ("k", 3)]).group_by(|(key, _)| *key);
    let group = unwrap_stream(&mut groups, 500).await?;

    // Act
    let values = group.to_values().await?;

    // Assert
    assert_eq!(values, vec![("k", 1), ("k", 2), ("k", 3)]);

    Ok(())
}

#[tokio::test]
async fn test_to_values_after_subscribe_fails() -> anyhow::Result<()> {
    // Arrange
    let mut groups = keyed(vec![("k", 1)]).group_by(|(key, _)| *key);
    let group = unwrap_stream(&mut groups, 500).await?;
    let mut first = group.subscribe()?;

    // Act
    let result = group.to_values().await;

    // Assert
    assert!(matches!(result, Err(FluxError::AlreadySubscribed { .. })));
    assert_eq!(first.next().await, Some(StreamItem::Value(("k", 1))));

    Ok(())
}

#[tokio::test]
async fn test_to_group_item_pairs_key_and_values() -> anyhow::Result<()> {
    // Arrange
    let mut groups = keyed(vec![("k", 1), ("k", 2)]).group_by_with(|(key, _)| *key, |(_, v)| v);
    let group = unwrap_stream(&mut groups, 500).await?;

    // Act
    let item = group.to_group_item().await?;

    // Assert
    assert_eq!(
        item,
        GroupItem {
            key: "k",
            values: vec![1, 2],
        }
    );

    Ok(())
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_group_item_serializes_as_key_and_values() -> anyhow::Result<()> {
    // Arrange
    let item = GroupItem {
        key: "alice".to_string(),
        values: vec![10, 30],
    };

    // Act
    let json = serde_json::to_string(&item)?;
    let back: GroupItem<String, i32> = serde_json::from_str(&json)?;

    // Assert
    assert_eq!(json, r#"{"key":"alice","values":[10,30]}"#);
    assert_eq!(back, item);

    Ok(())
}
