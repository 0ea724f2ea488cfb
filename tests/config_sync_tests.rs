//! Integration tests for the config load/save/clear flows
//!
//! Covers the post-save reconnect handshake of both variants, including
//! the failure and deadline paths.

mod common;

use common::{drain_events, MockDeviceServer};
use espdash_rust::client::models::ConfigForm;
use espdash_rust::{
    ClearOutcome, ConfigSync, DashboardEvent, DashboardVariant, Navigation, ReconnectPolicy,
    SaveOutcome,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy {
        status_poll_interval: Duration::from_millis(10),
        deadline: Duration::from_secs(2),
        redirect_delay: Duration::from_millis(20),
    }
}

#[tokio::test]
async fn test_load_populates_only_fields_present() {
    let device = MockDeviceServer::start().await;
    device
        .mock_config(json!({"ssid": "home", "port": 1883}))
        .await;

    let sync = ConfigSync::new(device.client(), DashboardVariant::Gateway);
    let form = sync.load().await.unwrap();

    assert_eq!(form.ssid, "home");
    assert_eq!(form.port, "1883");
    assert_eq!(form.broker, "");
    assert_eq!(form.qos, "");
}

#[tokio::test]
async fn test_save_failure_restores_submit_without_navigation() {
    let device = MockDeviceServer::start().await;
    device.mock_save(500, None).await;

    let sync = ConfigSync::new(device.client(), DashboardVariant::Gateway);
    let mut rx = sync.subscribe();

    let outcome = sync.save(&ConfigForm::default()).await;
    assert_eq!(outcome, SaveOutcome::Failed);

    let events = drain_events(&mut rx);
    assert!(matches!(events.first(), Some(DashboardEvent::SaveStarted)));
    assert!(matches!(events.last(), Some(DashboardEvent::SaveFinished)));
    // the device never accepted anything
    assert!(!events
        .iter()
        .any(|e| matches!(e, DashboardEvent::ConfigAccepted)));
}

#[tokio::test]
async fn test_gateway_save_redirects_once_station_address_appears() {
    let device = MockDeviceServer::start().await;
    device.mock_save(200, None).await;
    // device is still associating for the first two polls
    device
        .mock_status_times(json!({"wifi_connected": false, "ip": "0.0.0.0"}), 2)
        .await;
    device
        .mock_status(json!({"wifi_connected": true, "ip": "192.168.1.42"}))
        .await;

    let sync =
        ConfigSync::new(device.client(), DashboardVariant::Gateway).with_policy(fast_policy());
    let mut rx = sync.subscribe();

    let outcome = sync.save(&ConfigForm::default()).await;
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            navigation: Navigation::Redirect {
                url: "http://192.168.1.42/".to_string(),
                after: Duration::ZERO,
            }
        }
    );

    let events = drain_events(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, DashboardEvent::ConfigAccepted)));
    assert!(matches!(events.last(), Some(DashboardEvent::SaveFinished)));
}

#[tokio::test]
async fn test_gateway_save_ignores_placeholder_address() {
    let device = MockDeviceServer::start().await;
    device.mock_save(200, None).await;
    // wifi reports connected but DHCP has not finished yet
    device
        .mock_status_times(json!({"wifi_connected": true, "ip": "0.0.0.0"}), 3)
        .await;
    device
        .mock_status(json!({"wifi_connected": true, "ip": "10.0.0.5"}))
        .await;

    let sync =
        ConfigSync::new(device.client(), DashboardVariant::Gateway).with_policy(fast_policy());

    let outcome = sync.save(&ConfigForm::default()).await;
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            navigation: Navigation::Redirect {
                url: "http://10.0.0.5/".to_string(),
                after: Duration::ZERO,
            }
        }
    );
}

#[tokio::test]
async fn test_gateway_save_times_out_without_station_address() {
    let device = MockDeviceServer::start().await;
    device.mock_save(200, None).await;
    device
        .mock_status(json!({"wifi_connected": false, "ip": "0.0.0.0"}))
        .await;

    let policy = ReconnectPolicy {
        status_poll_interval: Duration::from_millis(20),
        deadline: Duration::from_millis(100),
        redirect_delay: Duration::from_millis(20),
    };
    let sync = ConfigSync::new(device.client(), DashboardVariant::Gateway).with_policy(policy);
    let mut rx = sync.subscribe();

    let outcome = sync.save(&ConfigForm::default()).await;
    assert_eq!(outcome, SaveOutcome::TimedOut);
    // the submit control is restored even on the deadline path
    let events = drain_events(&mut rx);
    assert!(matches!(events.last(), Some(DashboardEvent::SaveFinished)));
}

#[tokio::test]
async fn test_sensor_save_follows_next_url() {
    let device = MockDeviceServer::start().await;
    device
        .mock_save(200, Some(json!({"next_url": "http://192.168.1.77/"})))
        .await;

    let sync = ConfigSync::new(device.client(), DashboardVariant::Sensor);

    let outcome = sync.save(&ConfigForm::default()).await;
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            navigation: Navigation::Redirect {
                url: "http://192.168.1.77/".to_string(),
                after: Duration::from_millis(1500),
            }
        }
    );
}

#[tokio::test]
async fn test_sensor_save_without_redirect_returns_home() {
    let device = MockDeviceServer::start().await;
    device.mock_save(200, None).await;

    let sync = ConfigSync::new(device.client(), DashboardVariant::Sensor);

    let outcome = sync.save(&ConfigForm::default()).await;
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            navigation: Navigation::ReturnHome
        }
    );
}

#[tokio::test]
async fn test_clear_gateway_falls_back_to_ap_default() {
    let device = MockDeviceServer::start().await;
    device.mock_clear(200, None).await;

    let sync =
        ConfigSync::new(device.client(), DashboardVariant::Gateway).with_policy(fast_policy());

    let outcome = sync.clear().await;
    assert_eq!(
        outcome,
        ClearOutcome::Cleared {
            navigation: Some(Navigation::Redirect {
                url: "http://192.168.4.1/".to_string(),
                after: Duration::from_millis(20),
            })
        }
    );
}

#[tokio::test]
async fn test_clear_sensor_uses_ap_url_from_response() {
    let device = MockDeviceServer::start().await;
    device
        .mock_clear(200, Some(json!({"ap_url": "http://192.168.4.2/"})))
        .await;

    let sync =
        ConfigSync::new(device.client(), DashboardVariant::Sensor).with_policy(fast_policy());

    let outcome = sync.clear().await;
    assert_eq!(
        outcome,
        ClearOutcome::Cleared {
            navigation: Some(Navigation::Redirect {
                url: "http://192.168.4.2/".to_string(),
                after: Duration::from_millis(20),
            })
        }
    );
}

#[tokio::test]
async fn test_clear_sensor_without_ap_url_has_no_navigation() {
    let device = MockDeviceServer::start().await;
    device.mock_clear(200, None).await;

    let sync = ConfigSync::new(device.client(), DashboardVariant::Sensor);

    let outcome = sync.clear().await;
    assert_eq!(outcome, ClearOutcome::Cleared { navigation: None });
}

#[tokio::test]
async fn test_clear_failure_reports_error() {
    let device = MockDeviceServer::start().await;
    device.mock_clear(500, None).await;

    let sync = ConfigSync::new(device.client(), DashboardVariant::Gateway);
    assert_eq!(sync.clear().await, ClearOutcome::Failed);
}
