mod common;
use common::*;
use goodwe_bridge::prelude::*;
use goodwe_bridge::Outcome;

use mockito::Matcher;

#[tokio::test]
async fn app_reads_inverter_and_uploads() -> Result<()> {
    common_setup();

    let inverter = FakeInverter::start(vec![Some(Factory::response(&Factory::payload()))]).await;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/addstatus.jsp")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("v1".into(), "12300".into()),
            Matcher::UrlEncoded("v2".into(), "2875".into()),
            Matcher::UrlEncoded("v5".into(), "41".into()),
            Matcher::UrlEncoded("v6".into(), "231".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let config = Factory::config(inverter.addr, &format!("{}/addstatus.jsp", server.url()));
    assert_eq!(goodwe_bridge::app(config).await?, Outcome::Uploaded);

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn app_debug_mode_skips_upload() -> Result<()> {
    common_setup();

    let inverter = FakeInverter::start(vec![Some(Factory::response(&Factory::payload()))]).await;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = Factory::config(inverter.addr, &server.url());
    config.debug = true;
    assert_eq!(goodwe_bridge::app(config).await?, Outcome::Printed);

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn inverter_failure_is_not_reported_as_upload_failure() {
    common_setup();

    let inverter = FakeInverter::start(vec![None]).await;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = Factory::config(inverter.addr, &server.url());
    config.inverter.attempts = Some(2);
    let err = goodwe_bridge::app(config).await.unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("failed to read inverter"), "{}", message);
    assert!(!message.contains("PVOutput"), "{}", message);
    assert!(matches!(
        err.downcast_ref::<ExchangeError>(),
        Some(ExchangeError::Exhausted { attempts: 2 })
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn upload_failure_is_reported_as_such() {
    common_setup();

    let inverter = FakeInverter::start(vec![Some(Factory::response(&Factory::payload()))]).await;

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/addstatus.jsp")
        .with_status(500)
        .create_async()
        .await;

    let config = Factory::config(inverter.addr, &format!("{}/addstatus.jsp", server.url()));
    let err = goodwe_bridge::app(config).await.unwrap_err();

    assert!(format!("{:#}", err).contains("upload to PVOutput failed"));
    assert!(err.downcast_ref::<UploadError>().is_some());
}
