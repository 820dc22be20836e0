use tokio::runtime::Runtime;

pub(crate) fn new(worker_threads: usize, blocking_threads: usize) -> std::io::Result<Runtime> {
    assert!(
        worker_threads > 0,
        "Parameter worker_threads must be larger than 0"
    );
    assert!(
        blocking_threads > 0,
        "Parameter blocking_threads must be larger than 0"
    );

    return tokio::runtime::Builder::new_multi_thread()
        .thread_name("pactmock-endpoint")
        .worker_threads(worker_threads)
        .max_blocking_threads(blocking_threads) // This is a maximum
        .enable_all()
        .build();
}
