//! Helpers shared by the integration tests.

/// Start the mock document server on a random port and return its base URL.
pub fn start_mock(api_key: Option<&str>) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let api_key = api_key.map(str::to_string);

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, api_key).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}
