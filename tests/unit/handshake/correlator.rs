use super::*;

#[tokio::test(start_paused = true)]
async fn response_before_timeout_resolves() {
    let corr = Correlator::<u32>::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<&'static str>();

    let responder = corr.clone();
    let answer = tokio::spawn(async move {
        let payload = rx.recv().await.unwrap();
        assert_eq!(payload, "hello");
        tokio::time::sleep(Duration::from_secs(5)).await;
        responder.resolve("job-1", 42)
    });

    let got = corr
        .request(&tx, "hello", "job-1", Duration::from_secs(20), "text generation")
        .await
        .unwrap();
    assert_eq!(got, 42);
    assert!(answer.await.unwrap());
    assert_eq!(corr.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn timeout_unregisters_and_ignores_late_response() {
    let corr = Correlator::<u32>::new();
    let (tx, _rx) = mpsc::unbounded_channel::<()>();

    let started = tokio::time::Instant::now();
    let err = corr
        .request(&tx, (), "job-2", Duration::from_secs(20), "shadow generation")
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "timeout error: shadow generation timed out");
    assert!(started.elapsed() >= Duration::from_secs(20));
    assert_eq!(corr.pending_count(), 0);

    assert!(!corr.resolve("job-2", 7));
}

#[tokio::test]
async fn second_response_is_not_delivered() {
    let corr = Correlator::<u32>::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<()>();

    let responder = corr.clone();
    let answer = tokio::spawn(async move {
        rx.recv().await.unwrap();
        (responder.resolve("job-3", 1), responder.resolve("job-3", 2))
    });

    let got = corr
        .request(&tx, (), "job-3", Duration::from_secs(20), "text generation")
        .await
        .unwrap();
    assert_eq!(got, 1);
    assert_eq!(answer.await.unwrap(), (true, false));
}

#[tokio::test]
async fn duplicate_id_is_rejected() {
    let corr = Correlator::<u32>::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<u8>();

    let first = {
        let corr = corr.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            corr.request(&tx, 1, "dup", Duration::from_secs(20), "text generation")
                .await
        })
    };
    assert_eq!(rx.recv().await, Some(1));

    let err = corr
        .request(&tx, 2, "dup", Duration::from_secs(20), "text generation")
        .await
        .unwrap_err();
    assert!(matches!(err, FramemarkError::Validation(_)));

    assert!(corr.resolve("dup", 9));
    assert_eq!(first.await.unwrap().unwrap(), 9);
}

#[tokio::test]
async fn closed_channel_fails_without_leaking() {
    let corr = Correlator::<u32>::new();
    let (tx, rx) = mpsc::unbounded_channel::<()>();
    drop(rx);

    let err = corr
        .request(&tx, (), "job-4", Duration::from_secs(20), "text generation")
        .await
        .unwrap_err();
    assert!(matches!(err, FramemarkError::Other(_)));
    assert_eq!(corr.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_waiter_cleans_up() {
    let corr = Correlator::<u32>::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<()>();

    let waiter = {
        let corr = corr.clone();
        tokio::spawn(async move {
            corr.request(&tx, (), "job-5", Duration::from_secs(20), "text generation")
                .await
        })
    };
    rx.recv().await.unwrap();
    assert_eq!(corr.pending_count(), 1);

    waiter.abort();
    assert!(waiter.await.unwrap_err().is_cancelled());
    assert_eq!(corr.pending_count(), 0);
}
