pub async fn check() -> &'static str {
    "Healthy"
}

#[test]
fn reports_healthy() {
    use tokio_test::block_on;

    assert_eq!(block_on(check()), "Healthy");
}
