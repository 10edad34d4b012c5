//! Standard operations against a scripted camera

mod common;

use pretty_assertions::assert_eq;
use ptpip::{Camera, DataPhase, Error};
use ptpip_types::codes::{operation, response};

use common::{Delivery, FakeCamera, Script};

async fn connected(fake: &FakeCamera) -> Camera {
    let mut camera = Camera::new(fake.config());
    camera.connect().await.unwrap();
    camera
}

#[tokio::test]
async fn test_device_info_split_delivery() {
    let fake = FakeCamera::start(Script {
        delivery: Delivery::Split,
        ..Script::default()
    })
    .await;
    let mut camera = connected(&fake).await;

    let info = camera.get_device_info().await.unwrap();

    assert_eq!(info, common::descriptor(false));
    assert_eq!(camera.descriptor(), Some(&info));
    assert!(!info.supports_data_commit());
    camera.release().await;
}

#[tokio::test]
async fn test_end_data_after_response() {
    let fake = FakeCamera::start(Script {
        delivery: Delivery::EndDataLast,
        ..Script::default()
    })
    .await;
    let mut camera = connected(&fake).await;

    let info = camera.get_device_info().await.unwrap();
    assert_eq!(info, common::descriptor(false));

    // nothing is left over for the next transaction
    let storages = camera.get_storage_ids().await.unwrap();
    assert_eq!(storages, vec![0x0001_0001]);
    camera.release().await;
}

#[tokio::test]
async fn test_data_after_response() {
    let fake = FakeCamera::start(Script {
        delivery: Delivery::ResponseFirst,
        ..Script::default()
    })
    .await;
    let mut camera = connected(&fake).await;

    let info = camera.get_device_info().await.unwrap();
    assert_eq!(info, common::descriptor(false));

    let storages = camera.get_storage_ids().await.unwrap();
    assert_eq!(storages, vec![0x0001_0001]);

    let data = camera
        .fetch_vendor_data(operation::NIKON_DATA_FETCH_PRE)
        .await
        .unwrap();
    assert_eq!(data.as_ref(), &[0xAB; 16]);
    camera.release().await;
}

#[tokio::test]
async fn test_session_lifecycle() {
    let fake = FakeCamera::start(Script::default()).await;
    let mut camera = connected(&fake).await;
    assert_eq!(camera.session().connection_number(), 1);
    assert_eq!(camera.session().responder_name().as_deref(), Some("Z 6_6012345"));

    camera.open_session().await.unwrap();
    assert!(camera.session().is_open());
    assert_eq!(camera.transaction_counter(), 1);

    camera.close_session().await.unwrap();
    assert!(!camera.session().is_open());
    assert!(camera.session().is_connected());

    assert_eq!(
        fake.requests_on(1),
        vec![(operation::OPEN_SESSION, 0), (operation::CLOSE_SESSION, 1)]
    );

    camera.release().await;
    assert!(!camera.is_connected());
}

#[tokio::test]
async fn test_outbound_data_phase() {
    let fake = FakeCamera::start(Script::default()).await;
    let mut camera = connected(&fake).await;

    let response = camera
        .transact_send(operation::SET_DEVICE_PROP_VALUE, [0x5001], &[0x01, 0x02, 0x03])
        .await
        .unwrap();

    assert!(response.is_ok());
    let recorded = fake.find(1, operation::SET_DEVICE_PROP_VALUE).unwrap();
    assert_eq!(recorded.data_phase, DataPhase::Sending);
    assert_eq!(recorded.parameters, vec![0x5001]);
    assert_eq!(recorded.data, vec![0x01, 0x02, 0x03]);
    camera.release().await;
}

#[tokio::test]
async fn test_unsupported_operation_returns_code() {
    let fake = FakeCamera::start(Script::default()).await;
    let mut camera = connected(&fake).await;

    let (response, data) = camera
        .transact(DataPhase::None, operation::GET_NUM_OBJECTS, [0xFFFF_FFFF])
        .await
        .unwrap();

    assert_eq!(response.response_code, response::OPERATION_NOT_SUPPORTED);
    assert!(data.is_empty());
    assert_eq!(camera.transaction_counter(), 1);

    // the connection stays usable
    let storages = camera.get_storage_ids().await.unwrap();
    assert_eq!(storages, vec![0x0001_0001]);
    assert_eq!(
        fake.requests_on(1),
        vec![(operation::GET_NUM_OBJECTS, 0), (operation::GET_STORAGE_IDS, 1)]
    );
    camera.release().await;
}

#[tokio::test]
async fn test_connect_twice() {
    let fake = FakeCamera::start(Script::default()).await;
    let mut camera = connected(&fake).await;

    let err = camera.connect().await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert!(camera.is_connected());
    camera.release().await;
}

#[tokio::test]
async fn test_operations_need_a_connection() {
    let fake = FakeCamera::start(Script::default()).await;
    let mut camera = Camera::new(fake.config());

    let err = camera.get_device_info().await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));

    // releasing an idle camera is harmless
    camera.release().await;
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_reconnect_resets_counter() {
    let fake = FakeCamera::start(Script::default()).await;
    let mut camera = connected(&fake).await;
    camera.get_device_info().await.unwrap();
    camera.get_storage_ids().await.unwrap();
    assert_eq!(camera.transaction_counter(), 2);
    camera.release().await;

    camera.connect().await.unwrap();
    assert_eq!(camera.transaction_counter(), 0);
    assert_eq!(camera.descriptor(), None);
    assert_eq!(camera.session().connection_number(), 2);
    camera.release().await;
}
