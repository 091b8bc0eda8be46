use std::io::Write;
use std::time::Duration;

use futures::StreamExt;
use rrmux::prelude::*;
use tokio_test::io::Builder;

fn config() -> MuxConfig {
    MuxConfig::default()
        .with_timeout(Duration::from_millis(100))
        .with_max_retries(3)
}

/// Helper to merge sources and return the output plus the terminal result
async fn merge(sources: Vec<BoxedReader>, config: MuxConfig) -> (String, Result<u64, IoError>) {
    let mut mux = RoundRobinScheduler::new(sources, config).expect("valid config");
    let mut output = Vec::new();
    let result = copy_records(&mut mux, &mut output).await;
    (String::from_utf8(output).expect("Invalid UTF-8 in output"), result)
}

fn fast(data: &str) -> BoxedReader {
    Box::new(std::io::Cursor::new(data.as_bytes().to_vec()))
}

fn always_slow() -> BoxedReader {
    Box::new(DelayedReader::slow(&b"never on time\n"[..], Duration::from_secs(1)))
}

#[tokio::test(start_paused = true)]
async fn two_sources_one_record_each() {
    let (output, result) = merge(vec![fast("0\n"), fast("1\n")], config()).await;

    assert_eq!(output, "0\n1\n");
    assert_eq!(result.unwrap(), 4);
}

#[tokio::test(start_paused = true)]
async fn four_sources_two_rounds() {
    let sources = (0..4)
        .map(|i| fast(&format!("reader#{i}\nreader#{i}\n")))
        .collect();

    let (output, result) = merge(sources, config()).await;
    assert!(result.is_ok());

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 8);
    for (n, line) in lines.iter().enumerate() {
        assert_eq!(*line, format!("reader#{}", n % 4));
    }
}

#[tokio::test(start_paused = true)]
async fn hundred_sources_in_index_order() {
    let sources = (0..100).map(|i| fast(&format!("{i}\n"))).collect();

    let (output, result) = merge(sources, config()).await;
    assert!(result.is_ok());

    let expected: String = (0..100).map(|i| format!("{i}\n")).collect();
    assert_eq!(output, expected);
}

#[tokio::test(start_paused = true)]
async fn slow_source_among_fast_ones() {
    let sources = vec![
        fast("fast-a1\nfast-a2\n"),
        always_slow(),
        fast("fast-b1\nfast-b2\nfast-b3\n"),
    ];

    let (output, result) = merge(sources, config()).await;

    // Every fast record arrives before the stream gives up
    assert_eq!(output, "fast-a1\nfast-b1\nfast-a2\nfast-b2\nfast-b3\n");
    match result {
        Err(IoError::Mux(MuxError::RetriesExceeded { max_retries, source_id })) => {
            assert_eq!(max_retries, 3);
            assert_eq!(source_id, SourceId::new(1));
        }
        other => panic!("Expected RetriesExceeded, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn no_bytes_after_failure() {
    let mut mux = RoundRobinScheduler::new(vec![always_slow()], config()).unwrap();
    let mut buf = [0u8; 32];

    assert!(matches!(
        mux.read(&mut buf).await,
        Err(MuxError::RetriesExceeded { max_retries: 3, .. })
    ));
    assert_eq!(mux.state(), SchedulerState::Failed);
    assert_eq!(mux.stats().timeouts, 3);

    for _ in 0..5 {
        assert!(matches!(
            mux.read(&mut buf).await,
            Err(MuxError::RetriesExceeded { .. })
        ));
    }
    assert_eq!(mux.stats().timeouts, 3);
    assert_eq!(mux.stats().bytes, 0);
}

#[tokio::test(start_paused = true)]
async fn intermittent_stall_is_tolerated() {
    // Stalls once, long enough to miss one turn, then recovers.
    let stalling = Builder::new()
        .read(b"s1\n")
        .wait(Duration::from_millis(150))
        .read(b"s2\n")
        .build();
    let sources: Vec<BoxedReader> = vec![fast("f1\nf2\nf3\n"), Box::new(stalling)];

    let (output, result) = merge(sources, config()).await;
    assert!(result.is_ok());

    // "s2" arrived after its deadline and was dropped with the attempt
    assert_eq!(output, "f1\ns1\nf2\nf3\n");
}

#[tokio::test(start_paused = true)]
async fn failing_source_aborts_with_its_id() {
    let failing = Builder::new()
        .read(b"partial")
        .read_error(std::io::Error::other("device gone"))
        .build();
    let sources: Vec<BoxedReader> = vec![fast("a\nb\n"), fast("c\n"), Box::new(failing)];

    let (output, result) = merge(sources, config()).await;

    assert_eq!(output, "a\nc\n");
    match result {
        Err(IoError::Mux(MuxError::Source { source_id, error })) => {
            assert_eq!(source_id, SourceId::new(2));
            assert_eq!(error.to_string(), "device gone");
        }
        other => panic!("Expected Source error, got {other:?}"),
    }
}

#[tokio::test]
async fn files_are_merged_line_by_line() {
    let mut first = tempfile::NamedTempFile::new().unwrap();
    let mut second = tempfile::NamedTempFile::new().unwrap();
    write!(first, "alpha\nbeta\ngamma").unwrap();
    write!(second, "one\ntwo\n").unwrap();

    let sources = open_sources(&[first.path(), second.path()]).await.unwrap();
    let (output, result) = merge(sources, config().with_timeout(Duration::from_secs(5))).await;

    assert!(result.is_ok());
    assert_eq!(output, "alpha\none\nbeta\ntwo\ngamma");
}

#[tokio::test(start_paused = true)]
async fn futures_readers_can_be_sources() {
    let sources = vec![
        from_futures(futures::io::Cursor::new(b"x1\nx2\n".to_vec())),
        from_futures(futures::io::Cursor::new(b"y1\n".to_vec())),
    ];

    let (output, result) = merge(sources, config()).await;
    assert!(result.is_ok());
    assert_eq!(output, "x1\ny1\nx2\n");
}

#[tokio::test(start_paused = true)]
async fn records_stream_collects_whole_records() {
    let mux = RoundRobinScheduler::new(
        vec![fast("a|b|"), fast("c|")],
        config().with_delimiter(b'|'),
    )
    .unwrap();

    let records: Vec<String> = mux
        .into_records()
        .map(|r| String::from_utf8(r.unwrap().to_vec()).unwrap())
        .collect()
        .await;

    assert_eq!(records, vec!["a|", "c|", "b|"]);
}

#[tokio::test(start_paused = true)]
async fn single_byte_reads_see_the_same_bytes() {
    let mut mux = RoundRobinScheduler::new(
        vec![fast("first record\n"), fast("second record\n")],
        config(),
    )
    .unwrap();

    let mut output = Vec::new();
    let mut buf = [0u8; 1];
    while let ReadOutcome::Data(n) = mux.read(&mut buf).await.unwrap() {
        output.extend_from_slice(&buf[..n]);
    }
    assert_eq!(output, b"first record\nsecond record\n");
}

#[tokio::test(start_paused = true)]
async fn per_source_scope_is_stricter_than_global() {
    let make = || vec![fast("a\nb\nc\nd\n"), always_slow()];

    let (global_out, global) = merge(make(), config()).await;
    let (per_source_out, per_source) =
        merge(make(), config().with_retry_scope(RetryScope::PerSource)).await;

    assert_eq!(global_out, "a\nb\nc\nd\n");
    assert!(global.is_err());
    assert_eq!(per_source_out, "a\nb\nc\n");
    assert!(per_source.is_err());
}

#[tokio::test(start_paused = true)]
async fn standalone_timeout_reader() {
    let mut fast_guard = TimeoutGuard::new(
        Source::new(SourceId::new(0), &b"Hello World!\n"[..]),
        Duration::from_millis(100),
    );
    let mut buf = [0u8; 64];
    let n = fast_guard.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"Hello World!\n");

    let slow = DelayedReader::slow(&b"zzzz\n"[..], Duration::from_millis(100));
    let mut slow_guard = TimeoutGuard::new(
        Source::new(SourceId::new(1), slow),
        Duration::from_millis(70),
    );
    let err = slow_guard.read(&mut buf).await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "read from source #1 timed out after 70ms");
}

#[tokio::test(start_paused = true)]
async fn config_file_drives_the_scheduler() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "delimiter = \",\"").unwrap();
    writeln!(file, "max_retries = 1").unwrap();

    let config = MuxConfig::load(file.path()).await.unwrap();
    assert_eq!(config.max_retries, 1);

    let (output, result) = merge(vec![fast("a,b,"), fast("c,")], config).await;
    assert!(result.is_ok());
    assert_eq!(output, "a,c,b,");
}
