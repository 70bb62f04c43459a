//! Generated round-trip checks for the transfer engine.
//!
//! Each case sends a random blob through an in-memory connection and checks
//! that the receiver rebuilds it exactly, and that the sender produced
//! `ceil(total / mtu)` fragments.

use std::{num::NonZeroUsize, time::Duration};

use proptest::{
    collection::vec,
    prelude::{Strategy, any},
    prop_assert,
    prop_assert_eq,
    test_runner::{Config as ProptestConfig, RngAlgorithm, TestCaseError, TestRng, TestRunner},
};
use rstest::rstest;
use sfp::{
    BufferPool,
    Connection,
    MemoryConnection,
    TRAILER_LEN,
    storage::{SliceSource, VecSink},
    transfer,
};
use tokio::runtime::{Builder, Runtime};

const WAIT: Duration = Duration::from_secs(5);

fn deterministic_runner(cases: u32) -> TestRunner {
    let config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    let rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
    TestRunner::new_with_rng(config, rng)
}

fn runtime() -> Runtime {
    Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("build test runtime")
}

fn pool(buffer_size: usize) -> BufferPool {
    BufferPool::new(
        NonZeroUsize::new(buffer_size).expect("non-zero buffer size"),
        NonZeroUsize::new(8).expect("non-zero capacity"),
    )
}

/// Blob plus an MTU in `1..=buffer_size - TRAILER_LEN`.
fn transfer_strategy(buffer_size: usize, max_len: usize) -> impl Strategy<Value = (Vec<u8>, u32)> {
    let max_mtu = u32::try_from(buffer_size - TRAILER_LEN).expect("mtu fits u32");
    (vec(any::<u8>(), 0..=max_len), 1..=max_mtu)
}

#[rstest]
#[case(16, 200, 64)]
#[case(64, 2_000, 64)]
#[case(256, 10_000, 32)]
fn generated_transfers_round_trip(
    #[case] buffer_size: usize,
    #[case] max_len: usize,
    #[case] cases: u32,
) {
    let rt = runtime();
    let mut runner = deterministic_runner(cases);

    runner
        .run(&transfer_strategy(buffer_size, max_len), |(data, mtu)| {
            let total = u32::try_from(data.len()).expect("length fits u32");
            let (mut tx, mut rx) = MemoryConnection::pair(pool(buffer_size), pool(buffer_size), 4);
            let mut source = SliceSource::new(&data);
            let mut sink = VecSink::new();

            let (sent, received) = rt.block_on(async {
                if total == 0 {
                    let sent = transfer::send(&mut tx, &mut source, total, mtu).await;
                    return (sent, Ok(0));
                }
                tokio::join!(
                    transfer::send(&mut tx, &mut source, total, mtu),
                    transfer::recv(&mut rx, &mut sink, WAIT),
                )
            });

            sent.map_err(|err| TestCaseError::fail(format!("send failed: {err}")))?;
            let received =
                received.map_err(|err| TestCaseError::fail(format!("recv failed: {err}")))?;
            prop_assert_eq!(received, total);
            prop_assert_eq!(sink.as_slice(), data.as_slice());
            Ok(())
        })
        .expect("generated transfers should round-trip");
}

#[rstest]
#[case(32, 64)]
#[case(128, 64)]
fn generated_transfers_use_ceiling_fragment_count(#[case] buffer_size: usize, #[case] cases: u32) {
    let rt = runtime();
    let mut runner = deterministic_runner(cases);

    runner
        .run(&transfer_strategy(buffer_size, 1_000), |(data, mtu)| {
            let total = u32::try_from(data.len()).expect("length fits u32");
            let fragments = rt.block_on(async {
                let (mut tx, mut rx) = MemoryConnection::pair(pool(buffer_size), pool(buffer_size), 4);
                let mut source = SliceSource::new(&data);
                let mut lengths = Vec::new();
                // Dropping the sending end lets the collector stop on `Closed`.
                let send = async move {
                    let sent = transfer::send(&mut tx, &mut source, total, mtu).await;
                    drop(tx);
                    sent
                };
                let collect = async {
                    while let Ok(Some(mut packet)) = rx.read(WAIT).await {
                        packet.strip_trailer().expect("fragment trailer");
                        lengths.push(packet.len());
                    }
                };
                let (sent, ()) = tokio::join!(send, collect);
                sent.map(|()| lengths)
            });

            let lengths =
                fragments.map_err(|err| TestCaseError::fail(format!("send failed: {err}")))?;
            let mtu = usize::try_from(mtu).expect("mtu fits usize");
            prop_assert_eq!(lengths.len(), data.len().div_ceil(mtu));
            if let Some((last, full)) = lengths.split_last() {
                prop_assert!(full.iter().all(|&len| len == mtu));
                prop_assert!(*last > 0 && *last <= mtu);
            }
            Ok(())
        })
        .expect("fragment counts should match ceil(total / mtu)");
}
