use envfile::{EnvLoader, Error, from_url};

#[test]
fn from_url_parses_response_body() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/app.env")
        .with_status(200)
        .with_body("ONE=1\nTWO='2'\nTHREE = \"3\"\nFOUR=${TWO}")
        .create();

    let map = from_url(&format!("{}/app.env", server.url())).expect("fetch should succeed");

    mock.assert();
    assert_eq!(map.get("ONE"), Some("1"));
    assert_eq!(map.get("TWO"), Some("2"));
    assert_eq!(map.get("THREE"), Some("3"));
    assert_eq!(map.get("FOUR"), Some("2"));
}

#[test]
fn from_url_rejects_non_success_status() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/missing.env")
        .with_status(404)
        .with_body("A=1\n")
        .create();

    let err = from_url(&format!("{}/missing.env", server.url())).expect_err("expected error");

    assert!(err.is_acquisition());
    match err {
        Error::HttpStatus { status, .. } => assert_eq!(status, 404),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn from_url_failures_are_acquisition_errors() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let url = format!("http://{}/app.env", listener.local_addr().expect("local addr"));
    drop(listener);

    let err = from_url(&url).expect_err("expected error");
    assert!(err.is_acquisition());
}

#[test]
fn loader_reads_urls_in_order() {
    let mut server = mockito::Server::new();
    let _base = server
        .mock("GET", "/base.env")
        .with_body("A=base\nB=base\n")
        .create();
    let _local = server
        .mock("GET", "/local.env")
        .with_body("B=local\n")
        .create();

    let parsed = EnvLoader::new()
        .url(format!("{}/base.env", server.url()))
        .url(format!("{}/local.env", server.url()))
        .parse_only()
        .expect("load should succeed");

    assert_eq!(parsed.get("A"), Some("base"));
    assert_eq!(parsed.get("B"), Some("local"));
}
