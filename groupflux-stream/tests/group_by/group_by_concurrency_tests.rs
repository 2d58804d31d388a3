// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::{stream, StreamExt};
use groupflux_core::{FluxError, StreamItem};
use groupflux_stream::{GroupByExt, GroupedStreamsExt};
use groupflux_test_utils::unwrap_value;
use std::time::Duration;
use tokio::time::timeout;

const KEYS: u32 = 17;
const ITEMS: u32 = 2000;

fn keyed_source() -> impl futures::Stream<Item = StreamItem<(u32, u32)>> + Send + 'static {
    stream::iter((0..ITEMS).map(|i| StreamItem::Value((i % KEYS, i))))
}

fn expected_run(key: u32) -> Vec<u32> {
    (0..ITEMS).filter(|i| i % KEYS == key).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_to_map_on_multi_thread_runtime_keeps_per_key_order() -> anyhow::Result<()> {
    for _ in 0..25 {
        // Act
        let groups = timeout(
            Duration::from_secs(10),
            keyed_source()
                .group_by_with(|(key, _)| *key, |(_, value)| value)
                .to_map(),
        )
        .await??;

        // Assert
        assert_eq!(groups.len(), KEYS as usize);
        for key in 0..KEYS {
            assert_eq!(groups[&key], expected_run(key));
        }
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_consumer_leaving_mid_stream_on_multi_thread_runtime() -> anyhow::Result<()> {
    for _ in 0..25 {
        // Arrange
        let mut groups = keyed_source().group_by_with(|(key, _)| *key, |(_, value)| value);
        let mut consumers = Vec::new();

        // Act: key 0 consumers take one value and leave; every other key drains
        let routed = timeout(Duration::from_secs(10), async {
            while let Some(item) = groups.next().await {
                let group = item.into_result()?;
                consumers.push(tokio::spawn(async move {
                    let key = *group.key();
                    let mut values = group.subscribe()?;
                    if key == 0 {
                        return Ok::<_, FluxError>((key, vec![unwrap_value(values.next().await)]));
                    }
                    let mut seen = Vec::new();
                    while let Some(value) = values.next().await {
                        seen.push(value.into_result()?);
                    }
                    Ok((key, seen))
                }));
            }
            Ok::<_, FluxError>(())
        })
        .await?;
        routed?;

        // Assert
        let mut first_values_of_key_zero = Vec::new();
        for consumer in consumers {
            let (key, seen) = consumer.await??;
            if key == 0 {
                assert_eq!(seen.len(), 1);
                first_values_of_key_zero.push(seen[0]);
            } else {
                assert_eq!(seen, expected_run(key));
            }
        }
        assert!(!first_values_of_key_zero.is_empty());
        assert!(first_values_of_key_zero.windows(2).all(|pair| pair[0] < pair[1]));
    }

    Ok(())
}
