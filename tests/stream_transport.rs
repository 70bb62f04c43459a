//! Transfers over byte-stream connections.

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    num::NonZeroUsize,
    time::Duration,
};

use rstest::rstest;
use sfp::{
    BufferPool,
    Connection,
    ErrorKind,
    PacketFlags,
    ProtocolViolation,
    StreamConnection,
    TransferError,
    storage::{FileSink, FileSource, SliceSource, VecSink},
    transfer,
};
use tokio::{
    io::{AsyncWriteExt, duplex},
    net::TcpListener,
};

const WAIT: Duration = Duration::from_secs(5);

fn pool(buffer_size: usize) -> BufferPool {
    BufferPool::new(
        NonZeroUsize::new(buffer_size).expect("non-zero buffer size"),
        NonZeroUsize::new(4).expect("non-zero capacity"),
    )
}

fn blob(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from(i % 251).expect("below 251"))
        .collect()
}

#[rstest]
#[case(32, 100, 24)]
#[case(64, 1_000, 7)]
#[case(256, 4_096, 248)]
#[tokio::test]
async fn transfer_round_trips_over_duplex_stream(
    #[case] buffer_size: usize,
    #[case] len: usize,
    #[case] mtu: u32,
) {
    let (left, right) = duplex(1024);
    let mut tx = StreamConnection::new(left, pool(buffer_size));
    let mut rx = StreamConnection::new(right, pool(buffer_size));
    let data = blob(len);
    let total = u32::try_from(len).expect("length fits u32");
    let mut source = SliceSource::new(&data);
    let mut sink = VecSink::new();

    let (sent, received) = tokio::join!(
        transfer::send(&mut tx, &mut source, total, mtu),
        transfer::recv(&mut rx, &mut sink, WAIT),
    );

    sent.expect("send");
    assert_eq!(received.expect("recv"), total);
    assert_eq!(sink.into_inner(), data);
}

#[tokio::test]
async fn fragment_flag_and_trailer_survive_framing() {
    let (left, right) = duplex(256);
    let mut tx = StreamConnection::new(left, pool(32));
    let mut rx = StreamConnection::new(right, pool(32));
    let data = blob(10);
    let mut source = SliceSource::new(&data);

    transfer::send(&mut tx, &mut source, 10, 4)
        .await
        .expect("send");

    let mut offsets = Vec::new();
    for _ in 0..3 {
        let mut packet = rx.read(WAIT).await.expect("read").expect("fragment");
        assert!(packet.flags().contains(PacketFlags::FRAGMENT));
        let header = packet.strip_trailer().expect("trailer");
        assert_eq!(header.total_size(), 10);
        offsets.push((header.offset(), packet.len()));
    }
    assert_eq!(offsets, vec![(0, 4), (4, 4), (8, 2)]);
}

#[tokio::test]
async fn plain_frame_is_rejected_as_missing_trailer() {
    let (mut raw, right) = duplex(256);
    let mut rx = StreamConnection::new(right, pool(32));

    // length 3: flags byte 0x00 then "ab"
    raw.write_all(&[0, 0, 0, 3, 0x00, b'a', b'b'])
        .await
        .expect("write frame");

    let err = transfer::recv(&mut rx, &mut VecSink::new(), WAIT)
        .await
        .expect_err("not a fragment");
    assert!(matches!(
        err,
        TransferError::Protocol(ProtocolViolation::MissingTrailer)
    ));
}

#[tokio::test]
async fn peer_closing_mid_transfer_is_a_connection_error() {
    let (left, right) = duplex(256);
    let mut tx = StreamConnection::new(left, pool(32));
    let mut rx = StreamConnection::new(right, pool(32));
    let data = blob(8);
    let mut source = SliceSource::new(&data);

    transfer::send(&mut tx, &mut source, 8, 8)
        .await
        .expect("send");
    drop(tx);

    let mut first = rx.read(WAIT).await.expect("read").expect("fragment");
    let header = first.strip_trailer().expect("trailer");
    assert_eq!(header.total_size(), 8);
    // Relabel the fragment as the first half of a 16-byte transfer.
    first
        .append_trailer(sfp::FragmentHeader::new(0, 16))
        .expect("trailer fits");

    let err = transfer::recv_with_first(&mut rx, &mut VecSink::new(), WAIT, Some(first))
        .await
        .expect_err("closed mid-transfer");
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[tokio::test]
async fn file_round_trips_over_tcp_loopback() {
    let dir = std::env::temp_dir();
    let input_path = dir.join(format!("sfp-tcp-in-{}", std::process::id()));
    let output_path = dir.join(format!("sfp-tcp-out-{}", std::process::id()));
    let data = blob(3_000);
    File::create(&input_path)
        .and_then(|mut file| file.write_all(&data))
        .expect("write input");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let receiver = {
        let output_path = output_path.clone();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut conn = StreamConnection::new(stream, pool(128));
            let file = File::options()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&output_path)
                .expect("create output");
            let mut sink = FileSink::new(file);
            let received = transfer::recv(&mut conn, &mut sink, WAIT).await;
            (received, sink.into_inner())
        })
    };

    let mut conn = StreamConnection::connect(addr, pool(128))
        .await
        .expect("connect");
    let mut source = FileSource::new(File::open(&input_path).expect("open input"));
    transfer::send(&mut conn, &mut source, 3_000, 120)
        .await
        .expect("send");

    let (received, mut output) = receiver.await.expect("receiver task");
    assert_eq!(received.expect("recv"), 3_000);

    let mut contents = Vec::new();
    output.seek(SeekFrom::Start(0)).expect("rewind");
    output.read_to_end(&mut contents).expect("read output");
    assert_eq!(contents, data);

    std::fs::remove_file(&input_path).expect("remove input");
    std::fs::remove_file(&output_path).expect("remove output");
}
